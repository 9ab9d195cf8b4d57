use std::collections::HashSet;

use actix_web::{body::{EitherBody, MessageBody}, dev::{ServiceRequest, ServiceResponse}, middleware::Next, web, Error, HttpMessage};

use crate::{errors::AppError, middlewares::auth::AuthUser, GlobalState};

/// An empty allow list lets every signed-in user teach.
pub fn is_teacher(teacher_ids:&HashSet<String>, user_id:&str) -> bool {
    teacher_ids.is_empty() || teacher_ids.contains(user_id)
}

/// Must run after `auth_middleware`.
pub async fn teacher_middleware(
    req:ServiceRequest,
    next: Next<impl MessageBody>
) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error>{

    let allowed = match (req.app_data::<web::Data<GlobalState>>(), req.extensions().get::<AuthUser>()) {
        (Some(data), Some(user)) => is_teacher(&data.teacher_ids, &user.user_id),
        _ => false,
    };

    if !allowed {
        tracing::warn!(path = %req.path(), "non-teacher rejected");
        return Ok(req.error_response(AppError::Unauthorized).map_into_right_body());
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_admits_everyone() {
        assert!(is_teacher(&HashSet::new(), "user_anyone"));
    }

    #[test]
    fn allow_list_is_enforced() {
        let ids: HashSet<String> = ["user_teacher".to_string()].into_iter().collect();
        assert!(is_teacher(&ids, "user_teacher"));
        assert!(!is_teacher(&ids, "user_student"));
    }
}
