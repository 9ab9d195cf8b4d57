use actix_web::{get, post, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;

use crate::{errors::AppError, handlers::owned_course, middlewares::auth::AuthUser, models::{attachment::list_attachments, chapter::list_chapters, course::{self, REQUIRED_FIELD_COUNT}, purchase::{get_teacher_sales, summarize_sales}}, schema::course::{CourseSetup, CreateCourse}, GlobalState};

#[post("/courses")]
pub async fn create_course_handler(data:web::Data<GlobalState>, user:AuthUser, new_course:Json<CreateCourse>) -> Result<HttpResponse, AppError>{
    let title = new_course
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::bad_request("Title is required"))?;

    let created = course::create_course(&data.pool, &user.user_id, title).await?;
    tracing::info!(course_id = %created.id, user_id = %user.user_id, "course created");

    Ok(HttpResponse::Created().json(created))
}

#[get("/courses")]
pub async fn get_teacher_courses_handler(data:web::Data<GlobalState>, user:AuthUser) -> Result<HttpResponse, AppError> {
    let courses = course::get_teacher_courses(&data.pool, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[get("/courses/{course_id}")]
pub async fn get_course_setup_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let pool = &data.pool;
    let course_id = path.into_inner();

    let existing = owned_course(pool, course_id, &user).await?;
    let chapters = list_chapters(pool, course_id).await?;
    let attachments = list_attachments(pool, course_id).await?;

    let has_published_chapter = chapters.iter().any(|chapter| chapter.is_published);

    Ok(HttpResponse::Ok().json(CourseSetup{
        completed_fields: existing.completed_field_count(has_published_chapter),
        total_fields: REQUIRED_FIELD_COUNT,
        is_complete: existing.is_complete(has_published_chapter),
        course: existing,
        chapters,
        attachments,
    }))
}

#[get("/analytics")]
pub async fn analytics_handler(data:web::Data<GlobalState>, user:AuthUser) -> Result<HttpResponse, AppError> {
    let sales = get_teacher_sales(&data.pool, &user.user_id).await?;
    Ok(HttpResponse::Ok().json(summarize_sales(&sales)))
}
