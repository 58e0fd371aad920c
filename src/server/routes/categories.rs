use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category, questions::get_questions_for_category},
        Category, Question,
    },
    server::{
        app::AppState,
        extract::ApiPath,
        pagination::{paginate, PageQuery},
    },
};

use super::{categories_by_id, ApiResponse};

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, Category>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = categories_by_id(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> ApiResponse<Json<CategoryQuestionsResponse>> {
    let category = get_category(&pool, id).await?;
    let questions = get_questions_for_category(&pool, &category.id.to_string()).await?;

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        total_questions: questions.len(),
        questions: paginate(&questions, page),
        current_category: category.id,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}
