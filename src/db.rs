use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use tracing::info;

use crate::models::category::seed_categories;

pub async fn create_pool(database_url:&str, max_connections:u32) -> Result<Pool<Postgres>, sqlx::Error>{
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

const SCHEMA: [(&str, &str); 7] = [
    ("categories", r#"
        CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT NOT NULL UNIQUE
        )
    "#),
    ("courses", r#"
        CREATE TABLE IF NOT EXISTS courses (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            price INTEGER CHECK (price >= 0),
            is_published BOOLEAN NOT NULL DEFAULT FALSE,
            category_id UUID REFERENCES categories(id) ON DELETE SET NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
    "#),
    ("chapters", r#"
        CREATE TABLE IF NOT EXISTS chapters (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            video_url TEXT,
            position INTEGER NOT NULL,
            is_published BOOLEAN NOT NULL DEFAULT FALSE,
            is_free BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
    "#),
    ("attachments", r#"
        CREATE TABLE IF NOT EXISTS attachments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
    "#),
    ("mux_data", r#"
        CREATE TABLE IF NOT EXISTS mux_data (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            chapter_id UUID NOT NULL UNIQUE REFERENCES chapters(id) ON DELETE CASCADE,
            asset_id TEXT NOT NULL,
            playback_id TEXT
        )
    "#),
    ("user_progress", r#"
        CREATE TABLE IF NOT EXISTS user_progress (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id TEXT NOT NULL,
            chapter_id UUID NOT NULL REFERENCES chapters(id) ON DELETE CASCADE,
            is_completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, chapter_id)
        )
    "#),
    ("purchases", r#"
        CREATE TABLE IF NOT EXISTS purchases (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id TEXT NOT NULL,
            course_id UUID NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, course_id)
        )
    "#),
];

/// Creates missing tables and seeds the default categories. Safe to run on every start.
pub async fn run_migrations(pool:&Pool<Postgres>) -> Result<(), sqlx::Error>{
    for (table, ddl) in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
        tracing::debug!(table, "table ready");
    }

    let seeded = seed_categories(pool).await?;
    info!(seeded, "schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_created_after_their_references() {
        let order: Vec<&str> = SCHEMA.iter().map(|(table, _)| *table).collect();
        let position = |name: &str| order.iter().position(|t| *t == name).unwrap();

        for (table, ddl) in SCHEMA {
            for referenced in order.iter().filter(|t| ddl.contains(&format!("REFERENCES {t}("))) {
                assert!(position(referenced) < position(table), "{table} references {referenced} before it exists");
            }
        }
    }

    #[actix_web::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url, 2).await.expect("pool creation failed");

        run_migrations(&pool).await.expect("first run failed");
        run_migrations(&pool).await.expect("second run failed");

        let categories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(categories >= 7);
    }
}
