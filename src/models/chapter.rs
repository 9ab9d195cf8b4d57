use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::chapter::{ReorderItem, UpdateChapter};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Chapter{
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub position: i32,
    pub is_published: bool,
    pub is_free: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    /// A chapter needs a title, a description and a video before it goes live.
    pub fn is_ready_to_publish(&self) -> bool {
        let filled = |val: &Option<String>| val.as_deref().is_some_and(|s| !s.trim().is_empty());
        !self.title.trim().is_empty() && filled(&self.description) && filled(&self.video_url)
    }
}

/// Full chapter content is shown for free previews and to buyers of the course.
pub fn can_view_chapter(is_free: bool, has_purchase: bool) -> bool {
    is_free || has_purchase
}

pub async fn count_chapters(pool:&Pool<Postgres>, course_id:Uuid) -> Result<i64, sqlx::Error>{
    sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
}

pub async fn count_published_chapters(pool:&Pool<Postgres>, course_id:Uuid) -> Result<i64, sqlx::Error>{
    sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE course_id = $1 AND is_published = TRUE")
        .bind(course_id)
        .fetch_one(pool)
        .await
}

pub async fn create_chapter(pool:&Pool<Postgres>, course_id:Uuid, title:&str, position:i32) -> Result<Chapter, sqlx::Error>{
    sqlx::query_as::<_, Chapter>(
        r#"
            INSERT INTO chapters (course_id, title, position)
            VALUES ($1, $2, $3)
            RETURNING *
        "#,
    )
    .bind(course_id)
    .bind(title)
    .bind(position)
    .fetch_one(pool)
    .await
}

pub async fn get_chapter(pool:&Pool<Postgres>, course_id:Uuid, chapter_id:Uuid) -> Result<Option<Chapter>, sqlx::Error>{
    sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE id = $1 AND course_id = $2")
        .bind(chapter_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_chapters(pool:&Pool<Postgres>, course_id:Uuid) -> Result<Vec<Chapter>, sqlx::Error>{
    sqlx::query_as::<_, Chapter>("SELECT * FROM chapters WHERE course_id = $1 ORDER BY position ASC")
        .bind(course_id)
        .fetch_all(pool)
        .await
}

pub async fn list_published_chapters(pool:&Pool<Postgres>, course_id:Uuid) -> Result<Vec<Chapter>, sqlx::Error>{
    sqlx::query_as::<_, Chapter>(
        r#"
            SELECT * FROM chapters
            WHERE course_id = $1 AND is_published = TRUE
            ORDER BY position ASC
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub async fn next_published_chapter(pool:&Pool<Postgres>, course_id:Uuid, after_position:i32) -> Result<Option<Chapter>, sqlx::Error>{
    sqlx::query_as::<_, Chapter>(
        r#"
            SELECT * FROM chapters
            WHERE course_id = $1 AND is_published = TRUE AND position > $2
            ORDER BY position ASC
            LIMIT 1
        "#,
    )
    .bind(course_id)
    .bind(after_position)
    .fetch_optional(pool)
    .await
}

/// Fields left as `None` keep their stored value.
pub async fn update_chapter(pool:&Pool<Postgres>, chapter_id:Uuid, changes:&UpdateChapter) -> Result<Chapter, sqlx::Error>{
    sqlx::query_as::<_, Chapter>(
        r#"
            UPDATE chapters
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_free = COALESCE($4, is_free),
                video_url = COALESCE($5, video_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(chapter_id)
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.is_free)
    .bind(changes.video_url.as_deref())
    .fetch_one(pool)
    .await
}

pub async fn set_chapter_published(pool:&Pool<Postgres>, chapter_id:Uuid, is_published:bool) -> Result<Chapter, sqlx::Error>{
    sqlx::query_as::<_, Chapter>(
        r#"
            UPDATE chapters
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(chapter_id)
    .bind(is_published)
    .fetch_one(pool)
    .await
}

pub async fn delete_chapter(pool:&Pool<Postgres>, chapter_id:Uuid) -> Result<Chapter, sqlx::Error>{
    sqlx::query_as::<_, Chapter>("DELETE FROM chapters WHERE id = $1 RETURNING *")
        .bind(chapter_id)
        .fetch_one(pool)
        .await
}

/// Assigns every listed chapter its new position in one transaction.
/// Ids that do not belong to the course are skipped. Returns the number of rows moved.
pub async fn reorder_chapters(pool:&Pool<Postgres>, course_id:Uuid, list:&[ReorderItem]) -> Result<u64, sqlx::Error>{
    let mut tx = pool.begin().await?;
    let mut moved = 0;

    for item in list {
        moved += sqlx::query(
            r#"
                UPDATE chapters
                SET position = $3, updated_at = NOW()
                WHERE id = $1 AND course_id = $2
            "#,
        )
        .bind(item.id)
        .bind(course_id)
        .bind(item.position)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter() -> Chapter {
        Chapter {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: "Lifetimes".to_string(),
            description: Some("Why the borrow checker complains".to_string()),
            video_url: Some("https://files.example.com/lifetimes.mp4".to_string()),
            position: 1,
            is_published: false,
            is_free: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn free_chapter_is_always_viewable() {
        assert!(can_view_chapter(true, false));
        assert!(can_view_chapter(true, true));
    }

    #[test]
    fn paid_chapter_requires_purchase() {
        assert!(!can_view_chapter(false, false));
        assert!(can_view_chapter(false, true));
    }

    #[test]
    fn publishing_requires_description_and_video() {
        let ready = chapter();
        assert!(ready.is_ready_to_publish());

        let mut no_video = chapter();
        no_video.video_url = None;
        assert!(!no_video.is_ready_to_publish());

        let mut blank_description = chapter();
        blank_description.description = Some(String::new());
        assert!(!blank_description.is_ready_to_publish());
    }
}
