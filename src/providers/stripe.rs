use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use super::{CheckoutRequest, CheckoutSession, PaymentGateway, ProviderError};

const STRIPE_API_URL: &str = "https://api.stripe.com";

/// Oldest signature timestamp accepted, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError{
    #[error("malformed signature header")]
    Malformed,
    #[error("signature timestamp outside tolerance")]
    Expired,
    #[error("no matching signature")]
    Mismatch,
}

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>,...`) against the raw payload.
pub fn verify_signature(payload:&[u8], header:&str, secret:&str, now:i64) -> Result<(), SignatureError>{
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", val)) => timestamp = val.parse::<i64>().ok(),
            Some(("v1", val)) => signatures.push(val),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig).is_ok_and(|bytes| mac.clone().verify_slice(&bytes).is_ok())
    });

    if !matched {
        return Err(SignatureError::Mismatch);
    }
    if now - timestamp > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    Ok(())
}

/// Builds a header value the way Stripe signs deliveries.
#[cfg(test)]
pub fn sign_payload(payload:&[u8], secret:&str, timestamp:i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent{
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData{
    pub object: serde_json::Value,
}

/// Purchase keys carried in a completed checkout session's metadata.
#[derive(Debug, PartialEq)]
pub struct PurchaseMetadata{
    pub user_id: String,
    pub course_id: Uuid,
}

impl WebhookEvent {
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_COMPLETED
    }

    pub fn purchase_metadata(&self) -> Option<PurchaseMetadata>{
        let metadata = self.data.object.get("metadata")?;
        let user_id = metadata.get("userId")?.as_str().filter(|id| !id.is_empty())?;
        let course_id = metadata.get("courseId")?.as_str()?.parse::<Uuid>().ok()?;

        Some(PurchaseMetadata{user_id: user_id.to_string(), course_id})
    }
}

pub struct StripeClient{
    http: reqwest::Client,
    secret_key: String,
    app_url: String,
    base_url: String,
}

#[derive(Deserialize)]
struct SessionResponse{
    id: String,
    url: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key:String, app_url:String) -> Result<Self, ProviderError>{
        let http = reqwest::Client::builder().build()?;
        Ok(Self{http, secret_key, app_url, base_url: STRIPE_API_URL.to_string()})
    }

    fn session_form(&self, request:&CheckoutRequest<'_>) -> Vec<(&'static str, String)>{
        let course_url = format!("{}/courses/{}", self.app_url, request.course_id);
        let mut form = vec![
            ("mode", "payment".to_string()),
            ("success_url", format!("{course_url}?success=1")),
            ("cancel_url", format!("{course_url}?canceled=1")),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            ("line_items[0][price_data][unit_amount]", request.unit_amount.to_string()),
            ("line_items[0][price_data][product_data][name]", request.title.to_string()),
            ("metadata[courseId]", request.course_id.to_string()),
            ("metadata[userId]", request.user_id.to_string()),
        ];
        if let Some(description) = request.description.filter(|d| !d.trim().is_empty()) {
            form.push(("line_items[0][price_data][product_data][description]", description.to_string()));
        }
        form
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout_session(&self, request:CheckoutRequest<'_>) -> Result<CheckoutSession, ProviderError>{
        let session = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&self.session_form(&request))
            .send()
            .await?
            .error_for_status()?
            .json::<SessionResponse>()
            .await?;

        let url = session
            .url
            .ok_or_else(|| ProviderError::UnexpectedResponse("checkout session without url".into()))?;

        tracing::info!(session_id = %session.id, course_id = %request.course_id, "checkout session created");
        Ok(CheckoutSession{id: session.id, url})
    }
}
