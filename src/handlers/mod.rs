pub mod attachment;
pub mod category;
pub mod chapter;
pub mod course;
pub mod dashboard;
pub mod purchase;
pub mod teacher;

use actix_web::{get, middleware::from_fn, web::{self, scope}, Responder};
use sqlx::{types::Uuid, Pool, Postgres};

use crate::{errors::AppError, middlewares::{auth::{auth_middleware, AuthUser}, teacher::teacher_middleware}, models::{course::{get_owned_course, Course}, mux_data::{delete_mux_data, MuxData}}, GlobalState};

#[get("/hello")]
pub async fn hello_world() -> impl Responder{
    "hello_world!"
}

/// Registers every route under the caller's scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(hello_world)
        .service(category::list_categories_handler)
        .service(purchase::stripe_webhook_handler)
        .service(
            scope("/dashboard")
                .wrap(from_fn(auth_middleware))
                .service(dashboard::dashboard_handler)
        )
        .service(
            // wraps run last-registered first: auth, then the teacher check
            scope("/teacher")
                .wrap(from_fn(teacher_middleware))
                .wrap(from_fn(auth_middleware))
                .service(teacher::create_course_handler)
                .service(teacher::get_teacher_courses_handler)
                .service(teacher::get_course_setup_handler)
                .service(teacher::analytics_handler)
        )
        .service(
            scope("/courses")
                .wrap(from_fn(auth_middleware))
                .service(course::search_courses_handler)
                .service(course::get_course_handler)
                .service(course::update_course_handler)
                .service(course::delete_course_handler)
                .service(course::publish_course_handler)
                .service(course::unpublish_course_handler)
                .service(purchase::enroll_handler)
                .service(purchase::checkout_handler)
                .service(attachment::create_attachment_handler)
                .service(attachment::delete_attachment_handler)
                .service(chapter::create_chapter_handler)
                .service(chapter::reorder_chapters_handler)
                .service(chapter::get_chapter_handler)
                .service(chapter::update_chapter_handler)
                .service(chapter::delete_chapter_handler)
                .service(chapter::publish_chapter_handler)
                .service(chapter::unpublish_chapter_handler)
                .service(chapter::update_progress_handler)
        );
}

/// The course if the caller owns it. Ownership failures are reported as 401.
pub(crate) async fn owned_course(pool:&Pool<Postgres>, course_id:Uuid, user:&AuthUser) -> Result<Course, AppError>{
    get_owned_course(pool, course_id, &user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Drops the hosted asset and its row. Host failures are logged and swallowed.
pub(crate) async fn release_video(data:&GlobalState, mux:&MuxData) -> Result<(), AppError>{
    if let Err(e) = data.video.delete_asset(&mux.asset_id).await {
        tracing::error!(asset_id = %mux.asset_id, error = %e, "failed to delete video asset");
    }
    delete_mux_data(&data.pool, mux.id).await?;
    Ok(())
}
