use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

use crate::models::course::Course;

#[derive(Serialize, Deserialize, Debug, Clone, FromRow)]
pub struct Purchase{
    pub id: Uuid,
    pub user_id: String,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One purchase of a course owned by a teacher.
#[derive(Debug, Clone, FromRow)]
pub struct Sale{
    pub title: String,
    pub price: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry{
    pub name: String,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics{
    pub data: Vec<RevenueEntry>,
    pub total_revenue: i64,
    pub total_sales: usize,
}

/// Sums sale prices per course title. Unpriced courses contribute 0.
pub fn group_earnings(sales:&[Sale]) -> Vec<RevenueEntry> {
    let mut grouped: BTreeMap<&str, i64> = BTreeMap::new();

    for sale in sales {
        *grouped.entry(sale.title.as_str()).or_insert(0) += i64::from(sale.price.unwrap_or(0));
    }

    grouped
        .into_iter()
        .map(|(name, total)| RevenueEntry{name: name.to_string(), total})
        .collect()
}

pub fn summarize_sales(sales:&[Sale]) -> Analytics {
    let data = group_earnings(sales);
    let total_revenue = data.iter().map(|entry| entry.total).sum();

    Analytics{data, total_revenue, total_sales: sales.len()}
}

pub async fn get_user_purchases(pool:&Pool<Postgres>, user_id:&str) -> Result<Vec<Purchase>, sqlx::Error>{
    sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn get_purchase(pool:&Pool<Postgres>, user_id:&str, course_id:Uuid) -> Result<Option<Purchase>, sqlx::Error>{
    sqlx::query_as::<_, Purchase>("SELECT * FROM purchases WHERE user_id = $1 AND course_id = $2")
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

/// Returns `None` when the user already owns the course.
pub async fn create_purchase(pool:&Pool<Postgres>, user_id:&str, course_id:Uuid) -> Result<Option<Purchase>, sqlx::Error>{
    sqlx::query_as::<_, Purchase>(
        r#"
            INSERT INTO purchases (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_purchased_courses(pool:&Pool<Postgres>, user_id:&str) -> Result<Vec<Course>, sqlx::Error>{
    sqlx::query_as::<_, Course>(
        r#"
            SELECT c.* FROM purchases p
            JOIN courses c ON c.id = p.course_id
            WHERE p.user_id = $1
            ORDER BY p.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_teacher_sales(pool:&Pool<Postgres>, owner_id:&str) -> Result<Vec<Sale>, sqlx::Error>{
    sqlx::query_as::<_, Sale>(
        r#"
            SELECT c.title, c.price FROM purchases p
            JOIN courses c ON c.id = p.course_id
            WHERE c.user_id = $1
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(title:&str, price:Option<i32>) -> Sale {
        Sale{title: title.to_string(), price}
    }

    #[test]
    fn groups_revenue_by_course_title() {
        let sales = vec![
            sale("Rust Basics", Some(2000)),
            sale("Async Rust", Some(3500)),
            sale("Rust Basics", Some(2000)),
        ];

        let analytics = summarize_sales(&sales);

        assert_eq!(analytics.data, vec![
            RevenueEntry{name: "Async Rust".to_string(), total: 3500},
            RevenueEntry{name: "Rust Basics".to_string(), total: 4000},
        ]);
        assert_eq!(analytics.total_revenue, 7500);
        assert_eq!(analytics.total_sales, 3);
    }

    #[test]
    fn free_courses_count_as_sales_without_revenue() {
        let analytics = summarize_sales(&[sale("Intro", None), sale("Intro", Some(0))]);

        assert_eq!(analytics.total_revenue, 0);
        assert_eq!(analytics.total_sales, 2);
        assert_eq!(analytics.data.len(), 1);
    }

    #[test]
    fn no_sales_yields_empty_report() {
        let analytics = summarize_sales(&[]);
        assert!(analytics.data.is_empty());
        assert_eq!(analytics.total_revenue, 0);
        assert_eq!(analytics.total_sales, 0);
    }
}
