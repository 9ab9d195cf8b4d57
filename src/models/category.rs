use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Computer Science",
    "Music",
    "Fitness",
    "Photography",
    "Accounting",
    "Engineering",
    "Filming",
];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category{
    pub id: Uuid,
    pub name: String,
}

pub async fn list_categories(pool:&Pool<Postgres>) -> Result<Vec<Category>, sqlx::Error>{
    sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

pub async fn get_category(pool:&Pool<Postgres>, id:Uuid) -> Result<Option<Category>, sqlx::Error>{
    sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn seed_categories(pool:&Pool<Postgres>) -> Result<u64, sqlx::Error>{
    let names: Vec<String> = DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect();

    let result = sqlx::query(
        r#"
            INSERT INTO categories (name)
            SELECT * FROM UNNEST($1::TEXT[])
            ON CONFLICT (name) DO NOTHING
        "#,
    )
    .bind(names)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
