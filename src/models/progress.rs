use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProgress{
    pub id: Uuid,
    pub user_id: String,
    pub chapter_id: Uuid,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Share of published chapters the user has completed, from 0 to 100.
pub fn progress_percentage(completed:i64, published:i64) -> f64 {
    if published <= 0 {
        return 0.0;
    }
    (completed.min(published) as f64 / published as f64) * 100.0
}

pub fn is_course_completed(progress:f64) -> bool {
    progress >= 100.0
}

pub async fn upsert_progress(pool:&Pool<Postgres>, user_id:&str, chapter_id:Uuid, is_completed:bool) -> Result<UserProgress, sqlx::Error>{
    sqlx::query_as::<_, UserProgress>(
        r#"
            INSERT INTO user_progress (user_id, chapter_id, is_completed)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, chapter_id)
            DO UPDATE SET is_completed = EXCLUDED.is_completed, updated_at = NOW()
            RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(chapter_id)
    .bind(is_completed)
    .fetch_one(pool)
    .await
}

pub async fn get_user_progress(pool:&Pool<Postgres>, user_id:&str, chapter_id:Uuid) -> Result<Option<UserProgress>, sqlx::Error>{
    sqlx::query_as::<_, UserProgress>("SELECT * FROM user_progress WHERE user_id = $1 AND chapter_id = $2")
        .bind(user_id)
        .bind(chapter_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_course_progress(pool:&Pool<Postgres>, user_id:&str, course_id:Uuid) -> Result<f64, sqlx::Error>{
    let (published, completed): (i64, i64) = sqlx::query_as(
        r#"
            SELECT COUNT(ch.id) AS published,
                   COUNT(up.id) FILTER (WHERE up.is_completed) AS completed
            FROM chapters ch
            LEFT JOIN user_progress up ON up.chapter_id = ch.id AND up.user_id = $2
            WHERE ch.course_id = $1 AND ch.is_published = TRUE
        "#,
    )
    .bind(course_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(progress_percentage(completed, published))
}
