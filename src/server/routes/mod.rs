mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use sqlx::SqlitePool;

use super::error::ApiError;
use crate::db::{queries::categories::get_all_categories, Category};

pub type ApiResponse<T> = Result<T, ApiError>;

/// All categories keyed by id, the shape both `/categories` and `/questions` return.
async fn categories_by_id(pool: &SqlitePool) -> sqlx::Result<BTreeMap<i64, Category>> {
    Ok(get_all_categories(pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect())
}
