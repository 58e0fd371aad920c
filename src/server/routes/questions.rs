use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{self, get_all_questions, search_questions},
        Category, NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::LooseI64,
        error::ApiError,
        extract::{ApiJson, ApiPath},
        pagination::{paginate, PageQuery},
    },
};

use super::{categories_by_id, ApiResponse};

#[derive(Deserialize)]
struct CreateQuestionBody {
    question: String,
    answer: String,
    difficulty: LooseI64,
    category: LooseI64,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, Category>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> ApiResponse<Json<QuestionsPage>> {
    let questions = get_all_questions(&pool).await?;
    let page_questions = paginate(&questions, page);
    if page_questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPage {
        success: true,
        questions: page_questions,
        total_questions: questions.len(),
        categories: categories_by_id(&pool).await?,
        current_category: None,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResponse<Json<Deleted>> {
    questions::delete_question(&pool, id).await?;
    tracing::info!(question_id = id, "Question deleted");
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<CreateQuestionBody>,
) -> ApiResponse<Json<Created>> {
    let new_question = NewQuestion {
        question: body.question,
        answer: body.answer,
        category: body.category.0.to_string(),
        difficulty: body.difficulty.0,
    };
    let id = questions::create_question(&pool, &new_question)
        .await
        .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    tracing::info!(question_id = id, category = %new_question.category, "Question created");
    Ok(Json(Created {
        success: true,
        created: id,
    }))
}

async fn search(
    State(pool): State<SqlitePool>,
    ApiJson(body): ApiJson<SearchBody>,
) -> ApiResponse<Json<SearchResults>> {
    let questions = search_questions(&pool, &body.search_term).await?;
    Ok(Json(SearchResults {
        success: true,
        total_questions: questions.len(),
        questions,
        current_category: None,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/search", post(search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
