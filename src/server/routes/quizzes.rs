use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category,
            questions::{get_all_questions, get_questions_for_category},
        },
        Question,
    },
    quiz::{pick_question, ALL_CATEGORIES},
    server::{app::AppState, deserializers::LooseI64, extract::ApiJson},
    telemetry::QUIZ_DRAWS_CNTR,
};

use super::ApiResponse;

// the client also sends the category `type`, only the id matters here
#[derive(Deserialize)]
struct QuizCategory {
    id: LooseI64,
}

#[derive(Deserialize)]
struct QuizBody {
    quiz_category: QuizCategory,
    previous_questions: Vec<i64>,
}

#[derive(Serialize)]
struct NextQuestion {
    success: bool,
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<QuizBody>,
) -> ApiResponse<Json<NextQuestion>> {
    let category = body.quiz_category.id.0;
    let (candidates, label) = if category == ALL_CATEGORIES {
        (get_all_questions(&pool).await?, "all".to_owned())
    } else {
        // metric labels stay bounded by the categories table, whatever id the client sends
        let label = match get_category(&pool, category).await {
            Ok(c) => c.id.to_string(),
            Err(sqlx::Error::RowNotFound) => "unknown".to_owned(),
            Err(e) => return Err(e.into()),
        };
        let candidates = get_questions_for_category(&pool, &category.to_string()).await?;
        (candidates, label)
    };

    let question = pick_question(
        candidates,
        &body.previous_questions,
        &mut rand::thread_rng(),
    );
    let outcome = if question.is_some() { "served" } else { "exhausted" };
    QUIZ_DRAWS_CNTR
        .with_label_values(&[label.as_str(), outcome])
        .inc();
    tracing::debug!(category, outcome, asked = body.previous_questions.len(), "Quiz draw");

    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
