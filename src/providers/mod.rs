//! Clients for the hosted services the platform delegates to.
//!
//! Handlers only see the traits so tests can swap in fakes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;

pub mod mux;
pub mod stripe;

#[derive(Debug, Error)]
pub enum ProviderError{
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        AppError::Provider(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoAsset{
    pub asset_id: String,
    pub playback_id: String,
}

/// Video hosting and transcoding.
#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn create_asset(&self, input_url:&str) -> Result<VideoAsset, ProviderError>;
    async fn delete_asset(&self, asset_id:&str) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a>{
    pub user_id: &'a str,
    pub course_id: Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    /// Price in cents.
    pub unit_amount: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession{
    pub id: String,
    pub url: String,
}

/// Hosted checkout.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, request:CheckoutRequest<'_>) -> Result<CheckoutSession, ProviderError>;
}
