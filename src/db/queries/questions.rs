use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// String form of the owning category id.
    pub category: String,
    pub difficulty: i64,
}

pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: &str,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match on the question text, folding case with Unicode rules.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let term = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&term))
        .collect())
}

pub async fn create_question(pool: &SqlitePool, new_question: &NewQuestion) -> sqlx::Result<i64> {
    let mut tx = pool.begin().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&new_question.question)
    .bind(&new_question.answer)
    .bind(&new_question.category)
    .bind(new_question.difficulty)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    tx.commit().await?;
    Ok(id)
}

/// Fails with `RowNotFound` when no question has this id.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }

    tx.commit().await
}

/// Makes the questions table match `questions` exactly, matching rows by id.
/// Runs on the caller's connection so it can share a transaction with other imports.
pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: Vec<Question>,
) -> sqlx::Result<()> {
    let existing_ids: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM questions")
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    for id in existing_ids.difference(&new_ids) {
        sqlx::query("DELETE FROM questions WHERE questions.id = ?1")
            .bind(*id)
            .execute(&mut *conn)
            .await?;
    }
    for question in questions {
        let statement = if existing_ids.contains(&question.id) {
            r#"
            UPDATE questions SET question = ?2, answer = ?3, category = ?4, difficulty = ?5
            WHERE questions.id = ?1
            "#
        } else {
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#
        };
        sqlx::query(statement)
            .bind(question.id)
            .bind(&question.question)
            .bind(&question.answer)
            .bind(&question.category)
            .bind(question.difficulty)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_question(question: &str, category: &str) -> NewQuestion {
        NewQuestion {
            question: question.to_owned(),
            answer: "answer".to_owned(),
            category: category.to_owned(),
            difficulty: 2,
        }
    }

    #[tokio::test]
    async fn create_then_fetch() {
        let pool = test_pool().await;
        let id = create_question(&pool, &new_question("What is the capital of Brazil?", "3"))
            .await
            .unwrap();

        let question = get_question_by_id(&pool, id).await.unwrap();
        assert_eq!(question.question, "What is the capital of Brazil?");
        assert_eq!(question.category, "3");
        assert_eq!(question.difficulty, 2);
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_difficulty() {
        let pool = test_pool().await;
        let mut question = new_question("Too hard?", "1");
        question.difficulty = 9;
        assert!(create_question(&pool, &question).await.is_err());
        assert!(get_all_questions(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_question() {
        let pool = test_pool().await;
        let err = delete_question(&pool, 1000).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let pool = test_pool().await;
        let id = create_question(&pool, &new_question("Gone soon", "1"))
            .await
            .unwrap();
        delete_question(&pool, id).await.unwrap();
        assert!(matches!(
            get_question_by_id(&pool, id).await,
            Err(sqlx::Error::RowNotFound)
        ));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("What is the capital of Brazil?", "3"))
            .await
            .unwrap();
        create_question(&pool, &new_question("Who painted the Mona Lisa?", "2"))
            .await
            .unwrap();

        let found = search_questions(&pool, "bRAZ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(search_questions(&pool, "100%").await.unwrap().is_empty());
        assert_eq!(search_questions(&pool, "").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("Qual é a CAPITAL do ÉSTADO?", "3"))
            .await
            .unwrap();

        let found = search_questions(&pool, "éstado").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(search_questions(&pool, "ÉSTADO").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn filter_by_category_string() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("Q1", "3")).await.unwrap();
        create_question(&pool, &new_question("Q2", "4")).await.unwrap();
        create_question(&pool, &new_question("Q3", "3")).await.unwrap();

        let questions = get_questions_for_category(&pool, "3").await.unwrap();
        let texts: Vec<&str> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, ["Q1", "Q3"]);
    }

    #[tokio::test]
    async fn import_syncs_rows() {
        let pool = test_pool().await;
        let keep = create_question(&pool, &new_question("Keep", "1")).await.unwrap();
        create_question(&pool, &new_question("Drop", "1")).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        import_questions(
            &mut *conn,
            vec![
                Question {
                    id: keep,
                    question: "Kept and edited".to_owned(),
                    answer: "a".to_owned(),
                    category: "2".to_owned(),
                    difficulty: 3,
                },
                Question {
                    id: 50,
                    question: "Imported".to_owned(),
                    answer: "b".to_owned(),
                    category: "5".to_owned(),
                    difficulty: 1,
                },
            ],
        )
        .await
        .unwrap();
        drop(conn);

        let questions = get_all_questions(&pool).await.unwrap();
        let ids: Vec<i64> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids, [keep, 50]);
        assert_eq!(questions[0].question, "Kept and edited");
    }
}
