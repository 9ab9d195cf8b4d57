use serde::{Deserialize, Serialize};
use sqlx::{types::Uuid, FromRow, Pool, Postgres};

/// Video host identifiers for a chapter's transcoded asset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MuxData{
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub asset_id: String,
    pub playback_id: Option<String>,
}

pub async fn get_mux_data(pool:&Pool<Postgres>, chapter_id:Uuid) -> Result<Option<MuxData>, sqlx::Error>{
    sqlx::query_as::<_, MuxData>("SELECT * FROM mux_data WHERE chapter_id = $1")
        .bind(chapter_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_course_mux_data(pool:&Pool<Postgres>, course_id:Uuid) -> Result<Vec<MuxData>, sqlx::Error>{
    sqlx::query_as::<_, MuxData>(
        r#"
            SELECT m.* FROM mux_data m
            JOIN chapters ch ON ch.id = m.chapter_id
            WHERE ch.course_id = $1
        "#,
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub async fn create_mux_data(pool:&Pool<Postgres>, chapter_id:Uuid, asset_id:&str, playback_id:Option<&str>) -> Result<MuxData, sqlx::Error>{
    sqlx::query_as::<_, MuxData>(
        r#"
            INSERT INTO mux_data (chapter_id, asset_id, playback_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (chapter_id)
            DO UPDATE SET asset_id = EXCLUDED.asset_id, playback_id = EXCLUDED.playback_id
            RETURNING *
        "#,
    )
    .bind(chapter_id)
    .bind(asset_id)
    .bind(playback_id)
    .fetch_one(pool)
    .await
}

pub async fn delete_mux_data(pool:&Pool<Postgres>, id:Uuid) -> Result<(), sqlx::Error>{
    sqlx::query("DELETE FROM mux_data WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
