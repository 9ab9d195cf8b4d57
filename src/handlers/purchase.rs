use actix_web::{post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sqlx::types::Uuid;

use crate::{errors::AppError, middlewares::auth::AuthUser, models::{course::{get_published_course, Course}, purchase::{create_purchase, get_purchase}}, providers::{stripe::{verify_signature, WebhookEvent}, CheckoutRequest}, schema::{CheckoutResponse, MessageResponse}, GlobalState};

const SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Published course the caller does not own yet.
async fn purchasable_course(data:&GlobalState, course_id:Uuid, user:&AuthUser, owned_message:&'static str) -> Result<Course, AppError>{
    let course = get_published_course(&data.pool, course_id)
        .await?
        .ok_or(AppError::NotFound("Course not found"))?;

    if get_purchase(&data.pool, &user.user_id, course_id).await?.is_some() {
        return Err(AppError::bad_request(owned_message));
    }
    Ok(course)
}

#[post("/{course_id}/enroll")]
pub async fn enroll_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError>{
    let course_id = path.into_inner();
    let course = purchasable_course(&data, course_id, &user, "Already enrolled").await?;

    if !course.is_free() {
        return Err(AppError::bad_request("Course requires checkout"));
    }

    let purchase = create_purchase(&data.pool, &user.user_id, course_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Already enrolled"))?;
    tracing::info!(%course_id, user_id = %user.user_id, "enrolled in free course");

    Ok(HttpResponse::Created().json(purchase))
}

#[post("/{course_id}/checkout")]
pub async fn checkout_handler(data:web::Data<GlobalState>, user:AuthUser, path:web::Path<Uuid>) -> Result<HttpResponse, AppError>{
    let course_id = path.into_inner();
    let course = purchasable_course(&data, course_id, &user, "Already purchased").await?;

    let unit_amount = match course.price {
        Some(price) if price > 0 => i64::from(price),
        _ => return Err(AppError::bad_request("Free courses do not need checkout")),
    };

    let session = data
        .payments
        .create_checkout_session(CheckoutRequest{
            user_id: &user.user_id,
            course_id,
            title: &course.title,
            description: course.description.as_deref(),
            unit_amount,
        })
        .await?;

    Ok(HttpResponse::Ok().json(CheckoutResponse{url: session.url}))
}

#[post("/webhook")]
pub async fn stripe_webhook_handler(data:web::Data<GlobalState>, req:HttpRequest, body:web::Bytes) -> Result<HttpResponse, AppError>{
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request("Webhook Error: missing signature"))?;

    verify_signature(&body, signature, &data.webhook_secret, Utc::now().timestamp()).map_err(|e| {
        tracing::warn!(error = %e, "webhook signature rejected");
        AppError::bad_request(format!("Webhook Error: {e}"))
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("Webhook Error: {e}")))?;

    if !event.is_checkout_completed() {
        tracing::debug!(event_type = %event.event_type, "ignoring webhook event");
        return Ok(HttpResponse::Ok().json(MessageResponse{message: "Ignored".into()}));
    }

    let metadata = event
        .purchase_metadata()
        .ok_or_else(|| AppError::bad_request("Webhook Error: Missing metadata"))?;

    // deliveries may repeat; an existing purchase is not an error
    match create_purchase(&data.pool, &metadata.user_id, metadata.course_id).await? {
        Some(purchase) => tracing::info!(purchase_id = %purchase.id, course_id = %metadata.course_id, "purchase recorded"),
        None => tracing::info!(course_id = %metadata.course_id, "duplicate checkout delivery"),
    }

    Ok(HttpResponse::Ok().json(MessageResponse{message: "Success".into()}))
}
