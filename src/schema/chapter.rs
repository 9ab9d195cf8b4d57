use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;

use crate::models::{attachment::Attachment, progress::UserProgress};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateChapter{
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateChapter{
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_free: Option<bool>,
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReorderItem{
    pub id: Uuid,
    pub position: i32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReorderChapters{
    pub list: Vec<ReorderItem>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateProgress{
    pub is_completed: bool,
}

/// What a student sees of one chapter. Locked chapters carry metadata only.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChapterView{
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub is_free: bool,
    pub is_locked: bool,
    pub purchased: bool,
    pub price: Option<i32>,
    pub video_url: Option<String>,
    pub playback_id: Option<String>,
    pub attachments: Vec<Attachment>,
    pub next_chapter_id: Option<Uuid>,
    pub user_progress: Option<UserProgress>,
}
