use actix_web::{delete, post, web::{self, Json}, HttpResponse};
use sqlx::types::Uuid;

use crate::{errors::AppError, handlers::owned_course, middlewares::auth::AuthUser, models::attachment::{self, default_attachment_name}, schema::attachment::CreateAttachment, GlobalState};

#[post("/{course_id}/attachments")]
pub async fn create_attachment_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>, body:Json<CreateAttachment>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let course_id = path.into_inner();

    let url = body.url.trim();
    if url.is_empty() {
        return Err(AppError::bad_request("Url is required"));
    }

    owned_course(pool, course_id, &user).await?;

    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .unwrap_or_else(|| default_attachment_name(url));

    let created = attachment::create_attachment(pool, course_id, &name, url).await?;
    tracing::info!(%course_id, attachment_id = %created.id, "attachment added");

    Ok(HttpResponse::Ok().json(created))
}

#[delete("/{course_id}/attachments/{attachment_id}")]
pub async fn delete_attachment_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<(Uuid, Uuid)>) -> Result<HttpResponse, AppError>{
    let pool = &data.pool;
    let (course_id, attachment_id) = path.into_inner();

    owned_course(pool, course_id, &user).await?;

    let deleted = attachment::delete_attachment(pool, course_id, attachment_id)
        .await?
        .ok_or(AppError::NotFound("Attachment not found"))?;

    Ok(HttpResponse::Ok().json(deleted))
}
