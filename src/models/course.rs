use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::schema::course::{CourseSearchQuery, UpdateCourse};

/// Number of checks a course must pass before it can be published.
pub const REQUIRED_FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course{
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Price in cents.
    pub price: Option<i32>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Published course as shown in the browse listing.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseListing{
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i32>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub chapter_count: i64,
}

fn present(val: &Option<String>) -> bool {
    val.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl Course {
    /// Title, description, image, price, category and a published chapter.
    pub fn required_fields(&self, has_published_chapter: bool) -> [bool; REQUIRED_FIELD_COUNT] {
        [
            !self.title.trim().is_empty(),
            present(&self.description),
            present(&self.image_url),
            self.price.is_some(),
            self.category_id.is_some(),
            has_published_chapter,
        ]
    }

    pub fn completed_field_count(&self, has_published_chapter: bool) -> usize {
        self.required_fields(has_published_chapter).iter().filter(|done| **done).count()
    }

    pub fn is_complete(&self, has_published_chapter: bool) -> bool {
        self.required_fields(has_published_chapter).iter().all(|done| *done)
    }

    pub fn is_free(&self) -> bool {
        self.price.unwrap_or(0) == 0
    }
}

pub async fn create_course(pool:&Pool<Postgres>, user_id:&str, title:&str) -> Result<Course, sqlx::Error>{
    sqlx::query_as::<_, Course>(
        r#"
            INSERT INTO courses (user_id, title)
            VALUES ($1, $2)
            RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn get_owned_course(pool:&Pool<Postgres>, id:Uuid, user_id:&str) -> Result<Option<Course>, sqlx::Error>{
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_published_course(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Course>, sqlx::Error>{
    sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1 AND is_published = TRUE")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fields left as `None` keep their stored value.
pub async fn update_course(pool:&Pool<Postgres>, id:Uuid, changes:&UpdateCourse) -> Result<Course, sqlx::Error>{
    sqlx::query_as::<_, Course>(
        r#"
            UPDATE courses
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                price = COALESCE($5, price),
                category_id = COALESCE($6, category_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.title.as_deref())
    .bind(changes.description.as_deref())
    .bind(changes.image_url.as_deref())
    .bind(changes.price)
    .bind(changes.category_id)
    .fetch_one(pool)
    .await
}

pub async fn set_course_published(pool:&Pool<Postgres>, id:Uuid, is_published:bool) -> Result<Course, sqlx::Error>{
    sqlx::query_as::<_, Course>(
        r#"
            UPDATE courses
            SET is_published = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#,
    )
    .bind(id)
    .bind(is_published)
    .fetch_one(pool)
    .await
}

pub async fn delete_course(pool:&Pool<Postgres>, id:Uuid) -> Result<Course, sqlx::Error>{
    sqlx::query_as::<_, Course>("DELETE FROM courses WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_teacher_courses(pool:&Pool<Postgres>, user_id:&str) -> Result<Vec<Course>, sqlx::Error>{
    sqlx::query_as::<_, Course>(
        r#"
            SELECT * FROM courses
            WHERE user_id = $1
            ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Makes `%`, `_` and `\` match literally inside an ILIKE pattern.
pub fn escape_like(raw:&str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub async fn search_published_courses(pool:&Pool<Postgres>, query:&CourseSearchQuery) -> Result<Vec<CourseListing>, sqlx::Error>{
    let title_pattern = query
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", escape_like(t)));

    sqlx::query_as::<_, CourseListing>(
        r#"
            SELECT c.id, c.title, c.description, c.image_url, c.price, c.category_id,
                   cat.name AS category_name,
                   COUNT(ch.id) AS chapter_count
            FROM courses c
            LEFT JOIN categories cat ON cat.id = c.category_id
            LEFT JOIN chapters ch ON ch.course_id = c.id AND ch.is_published = TRUE
            WHERE c.is_published = TRUE
              AND ($1::TEXT IS NULL OR c.title ILIKE $1 ESCAPE '\')
              AND ($2::UUID IS NULL OR c.category_id = $2)
            GROUP BY c.id, cat.name
            ORDER BY c.created_at DESC
        "#,
    )
    .bind(title_pattern)
    .bind(query.category_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_course() -> Course {
        Course {
            id: Uuid::new_v4(),
            user_id: "user_teacher".to_string(),
            title: "Rust for Beginners".to_string(),
            description: Some("Ownership and borrowing".to_string()),
            image_url: Some("https://files.example.com/rust.png".to_string()),
            price: Some(4999),
            is_published: false,
            category_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn complete_course_needs_a_published_chapter() {
        let course = sample_course();
        assert!(course.is_complete(true));
        assert!(!course.is_complete(false));
        assert_eq!(course.completed_field_count(false), 5);
    }

    #[test]
    fn blank_fields_do_not_count() {
        let mut course = sample_course();
        course.description = Some("   ".to_string());
        course.image_url = None;

        assert!(!course.is_complete(true));
        assert_eq!(course.completed_field_count(true), 4);
    }

    #[test]
    fn missing_price_or_category_blocks_publishing() {
        let mut course = sample_course();
        course.price = None;
        assert!(!course.is_complete(true));

        let mut course = sample_course();
        course.category_id = None;
        assert!(!course.is_complete(true));
    }

    #[test]
    fn zero_price_is_a_set_price() {
        let mut course = sample_course();
        course.price = Some(0);

        assert!(course.is_complete(true));
        assert!(course.is_free());
    }

    #[test]
    fn unpriced_course_is_free() {
        let mut course = sample_course();
        assert!(!course.is_free());
        course.price = None;
        assert!(course.is_free());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("Rust"), "Rust");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
