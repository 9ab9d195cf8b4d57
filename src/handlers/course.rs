use std::collections::HashSet;

use actix_web::{delete, get, patch, web, HttpResponse};
use futures_util::future::try_join_all;
use sqlx::types::Uuid;

use crate::{errors::AppError, handlers::{owned_course, release_video}, middlewares::auth::AuthUser, models::{category::get_category, chapter::{count_published_chapters, list_published_chapters}, course::{self, get_published_course}, mux_data::list_course_mux_data, progress::get_course_progress, purchase::{get_purchase, get_user_purchases}}, schema::course::{CourseDetail, CourseSearchQuery, CourseWithProgress, UpdateCourse}, GlobalState};

#[get("")]
pub async fn search_courses_handler(data:web::Data<GlobalState>, user:AuthUser, query:web::Query<CourseSearchQuery>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;

    let listings = course::search_published_courses(pool, &query).await?;
    let purchased: HashSet<Uuid> = get_user_purchases(pool, &user.user_id)
        .await?
        .into_iter()
        .map(|purchase| purchase.course_id)
        .collect();

    let courses = try_join_all(listings.into_iter().map(|listing| {
        let owned = purchased.contains(&listing.id);
        let user_id = user.user_id.as_str();
        async move {
            let progress = if owned {
                Some(get_course_progress(pool, user_id, listing.id).await?)
            } else {
                None
            };
            Ok::<_, sqlx::Error>(CourseWithProgress{course: listing, progress})
        }
    }))
    .await?;

    Ok(HttpResponse::Ok().json(courses))
}

#[get("/{course_id}")]
pub async fn get_course_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;
    let course_id = path.into_inner();

    let course = get_published_course(pool, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found"))?;

    let chapters = list_published_chapters(pool, course_id).await?;
    let purchased = get_purchase(pool, &user.user_id, course_id).await?.is_some();
    let progress = if purchased {
        Some(get_course_progress(pool, &user.user_id, course_id).await?)
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(CourseDetail{course, chapters, purchased, progress}))
}

#[patch("/{course_id}")]
pub async fn update_course_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>, changes:web::Json<UpdateCourse>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;
    let course_id = path.into_inner();

    owned_course(pool, course_id, &user).await?;

    if changes.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
        return Err(AppError::bad_request("Title cannot be empty"));
    }
    if changes.price.is_some_and(|price| price < 0) {
        return Err(AppError::bad_request("Price cannot be negative"));
    }
    if let Some(category_id) = changes.category_id {
        if get_category(pool, category_id).await?.is_none() {
            return Err(AppError::bad_request("Invalid category"));
        }
    }

    let updated = course::update_course(pool, course_id, &changes).await?;
    tracing::info!(%course_id, "course updated");

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/{course_id}")]
pub async fn delete_course_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;
    let course_id = path.into_inner();

    owned_course(pool, course_id, &user).await?;

    for mux in list_course_mux_data(pool, course_id).await? {
        release_video(&data, &mux).await?;
    }

    let deleted = course::delete_course(pool, course_id).await?;
    tracing::info!(%course_id, "course deleted");

    Ok(HttpResponse::Ok().json(deleted))
}

#[patch("/{course_id}/publish")]
pub async fn publish_course_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;
    let course_id = path.into_inner();

    let existing = owned_course(pool, course_id, &user).await?;
    let has_published_chapter = count_published_chapters(pool, course_id).await? > 0;

    if !existing.is_complete(has_published_chapter) {
        return Err(AppError::bad_request("Missing required fields"));
    }

    let published = course::set_course_published(pool, course_id, true).await?;
    tracing::info!(%course_id, "course published");

    Ok(HttpResponse::Ok().json(published))
}

#[patch("/{course_id}/unpublish")]
pub async fn unpublish_course_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;
    let course_id = path.into_inner();

    owned_course(pool, course_id, &user).await?;

    let unpublished = course::set_course_published(pool, course_id, false).await?;
    tracing::info!(%course_id, "course unpublished");

    Ok(HttpResponse::Ok().json(unpublished))
}
