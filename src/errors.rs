use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use derive_more::derive::{Display, Error as DeriveMoreError};

#[derive(Debug, Error)]
pub enum AppError{
    #[error("Cant bind to the Socket")]
    SocketBind,
    #[error("Cant connect to the DB")]
    DbConnect,
    #[error("Cant start the server")]
    ServerStart,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Internal Server Error")]
    InternalError
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

/// JSON body of every error response.
#[derive(Debug, Display, DeriveMoreError, Serialize, Deserialize)]
#[display("error :{}", error)]
pub struct CustomError{
    pub error:String
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let error = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal Error".to_string()
            }
            AppError::Provider(msg) => {
                tracing::error!(error = %msg, "provider error");
                "Internal Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(CustomError{error})
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DbConnect
            | AppError::ServerStart
            | AppError::SocketBind
            | AppError::Config(_)
            | AppError::Database(_)
            | AppError::Provider(_)
            | AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound("Course not found").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::bad_request("nope").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Provider("mux down".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn hides_database_details_from_clients() {
        let res = AppError::Database(sqlx::Error::RowNotFound).error_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(res.into_body()).await.unwrap();
        let body: CustomError = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.error, "Internal Error");
    }
}
