use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attachment{
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name used when the uploader did not send one: the last path segment of the url.
pub fn default_attachment_name(url:&str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .unwrap_or("attachment")
        .to_string()
}

pub async fn create_attachment(pool:&Pool<Postgres>, course_id:Uuid, name:&str, url:&str) -> Result<Attachment, sqlx::Error>{
    sqlx::query_as::<_, Attachment>(
        r#"
            INSERT INTO attachments (course_id, name, url)
            VALUES ($1, $2, $3)
            RETURNING *
        "#,
    )
    .bind(course_id)
    .bind(name)
    .bind(url)
    .fetch_one(pool)
    .await
}

pub async fn list_attachments(pool:&Pool<Postgres>, course_id:Uuid) -> Result<Vec<Attachment>, sqlx::Error>{
    sqlx::query_as::<_, Attachment>("SELECT * FROM attachments WHERE course_id = $1 ORDER BY created_at DESC")
        .bind(course_id)
        .fetch_all(pool)
        .await
}

pub async fn delete_attachment(pool:&Pool<Postgres>, course_id:Uuid, attachment_id:Uuid) -> Result<Option<Attachment>, sqlx::Error>{
    sqlx::query_as::<_, Attachment>("DELETE FROM attachments WHERE id = $1 AND course_id = $2 RETURNING *")
        .bind(attachment_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await
}
