use actix_web::{delete, get, patch, post, put, web::{self, Json}, HttpResponse};
use sqlx::{types::Uuid, Pool, Postgres};

use crate::{errors::AppError, handlers::{owned_course, release_video}, middlewares::auth::AuthUser, models::{attachment::list_attachments, chapter::{self, can_view_chapter, Chapter}, course::{get_published_course, set_course_published, Course}, mux_data::{create_mux_data, get_mux_data}, progress::{get_user_progress, upsert_progress}, purchase::get_purchase}, schema::{chapter::{ChapterView, CreateChapter, ReorderChapters, UpdateChapter, UpdateProgress}, MessageResponse}, GlobalState};

async fn find_chapter(pool:&Pool<Postgres>, course_id:Uuid, chapter_id:Uuid) -> Result<Chapter, AppError>{
    chapter::get_chapter(pool, course_id, chapter_id)
        .await?
        .ok_or(AppError::NotFound("Chapter not found"))
}

/// A course without published chapters cannot stay published.
async fn unpublish_course_if_empty(pool:&Pool<Postgres>, course:&Course) -> Result<(), AppError>{
    if course.is_published && chapter::count_published_chapters(pool, course.id).await? == 0 {
        set_course_published(pool, course.id, false).await?;
        tracing::info!(course_id = %course.id, "last published chapter gone, course unpublished");
    }
    Ok(())
}

#[post("/{course_id}/chapters")]
pub async fn create_chapter_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>, new_chapter:Json<CreateChapter>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let course_id = path.into_inner();

    let title = new_chapter
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::bad_request("Title is required"))?;

    owned_course(pool, course_id, &user).await?;

    let count = chapter::count_chapters(pool, course_id).await?;
    let position = i32::try_from(count + 1).map_err(|_| AppError::bad_request("Too many chapters"))?;

    let created = chapter::create_chapter(pool, course_id, title, position).await?;
    tracing::info!(%course_id, chapter_id = %created.id, position, "chapter created");

    Ok(HttpResponse::Created().json(created))
}

#[put("/{course_id}/chapters/reorder")]
pub async fn reorder_chapters_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>, body:Json<ReorderChapters>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let course_id = path.into_inner();

    owned_course(pool, course_id, &user).await?;

    let moved = chapter::reorder_chapters(pool, course_id, &body.list).await?;
    if moved < body.list.len() as u64 {
        tracing::warn!(%course_id, requested = body.list.len(), moved, "reorder skipped chapters outside the course");
    }

    Ok(HttpResponse::Ok().json(MessageResponse{message: "Success".to_string()}))
}

#[get("/{course_id}/chapters/{chapter_id}")]
pub async fn get_chapter_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, chapter_id) = path.into_inner();

    let course = get_published_course(pool, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found"))?;

    let chapter = find_chapter(pool, course_id, chapter_id).await?;
    if !chapter.is_published {
        return Err(AppError::NotFound("Chapter not found"));
    }

    let purchased = get_purchase(pool, &user.user_id, course_id).await?.is_some();
    let is_locked = !can_view_chapter(chapter.is_free, purchased);
    let user_progress = get_user_progress(pool, &user.user_id, chapter_id).await?;

    let mut view = ChapterView{
        id: chapter.id,
        course_id,
        title: chapter.title,
        description: chapter.description,
        position: chapter.position,
        is_free: chapter.is_free,
        is_locked,
        purchased,
        price: course.price,
        video_url: None,
        playback_id: None,
        attachments: Vec::new(),
        next_chapter_id: None,
        user_progress,
    };

    if !is_locked {
        view.video_url = chapter.video_url;
        view.playback_id = get_mux_data(pool, chapter_id).await?.and_then(|mux| mux.playback_id);
        view.next_chapter_id = chapter::next_published_chapter(pool, course_id, chapter.position)
            .await?
            .map(|next| next.id);
    }
    if purchased {
        view.attachments = list_attachments(pool, course_id).await?;
    }

    Ok(HttpResponse::Ok().json(view))
}

#[patch("/{course_id}/chapters/{chapter_id}")]
pub async fn update_chapter_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>, changes:Json<UpdateChapter>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, chapter_id) = path.into_inner();

    owned_course(pool, course_id, &user).await?;
    find_chapter(pool, course_id, chapter_id).await?;

    let mut changes = changes.into_inner();
    if changes.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(AppError::bad_request("Title cannot be empty"));
    }
    changes.video_url = changes.video_url.filter(|url| !url.trim().is_empty());

    if let Some(video_url) = changes.video_url.as_deref() {
        if let Some(existing) = get_mux_data(pool, chapter_id).await? {
            release_video(&data, &existing).await?;
        }

        let asset = data.video.create_asset(video_url).await?;
        create_mux_data(pool, chapter_id, &asset.asset_id, Some(&asset.playback_id)).await?;
        tracing::info!(%chapter_id, asset_id = %asset.asset_id, "chapter video replaced");
    }

    let updated = chapter::update_chapter(pool, chapter_id, &changes).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{course_id}/chapters/{chapter_id}")]
pub async fn delete_chapter_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, chapter_id) = path.into_inner();

    let course = owned_course(pool, course_id, &user).await?;
    find_chapter(pool, course_id, chapter_id).await?;

    if let Some(existing) = get_mux_data(pool, chapter_id).await? {
        release_video(&data, &existing).await?;
    }

    let deleted = chapter::delete_chapter(pool, chapter_id).await?;
    unpublish_course_if_empty(pool, &course).await?;
    tracing::info!(%course_id, %chapter_id, "chapter deleted");

    Ok(HttpResponse::Ok().json(deleted))
}

#[patch("/{course_id}/chapters/{chapter_id}/publish")]
pub async fn publish_chapter_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, chapter_id) = path.into_inner();

    owned_course(pool, course_id, &user).await?;
    let existing = find_chapter(pool, course_id, chapter_id).await?;

    if !existing.is_ready_to_publish() {
        return Err(AppError::bad_request("Missing required fields"));
    }

    let published = chapter::set_chapter_published(pool, chapter_id, true).await?;
    Ok(HttpResponse::Ok().json(published))
}

#[patch("/{course_id}/chapters/{chapter_id}/unpublish")]
pub async fn unpublish_chapter_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, chapter_id) = path.into_inner();

    let course = owned_course(pool, course_id, &user).await?;
    find_chapter(pool, course_id, chapter_id).await?;

    let unpublished = chapter::set_chapter_published(pool, chapter_id, false).await?;
    unpublish_course_if_empty(pool, &course).await?;

    Ok(HttpResponse::Ok().json(unpublished))
}

#[put("/{course_id}/chapters/{chapter_id}/progress")]
pub async fn update_progress_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>, body:Json<UpdateProgress>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, chapter_id) = path.into_inner();

    get_published_course(pool, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found"))?;

    let existing = find_chapter(pool, course_id, chapter_id).await?;
    if !existing.is_published {
        return Err(AppError::NotFound("Chapter not found"));
    }

    let purchased = get_purchase(pool, &user.user_id, course_id).await?.is_some();

    if !can_view_chapter(existing.is_free, purchased) {
        return Err(AppError::Unauthorized);
    }

    let progress = upsert_progress(pool, &user.user_id, chapter_id, body.is_completed).await?;
    Ok(HttpResponse::Ok().json(progress))
}
