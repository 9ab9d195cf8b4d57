use actix_web::{body::{EitherBody, MessageBody}, dev::{Payload, ServiceRequest, ServiceResponse}, http::header::{HeaderMap, AUTHORIZATION}, middleware::Next, web, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{config::SessionKey, errors::AppError, schema::JWTClaims, GlobalState};

/// Signed-in user, placed in request extensions by [`auth_middleware`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser{
    pub user_id: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<AuthUser>().cloned().ok_or(AppError::Unauthorized))
    }
}

/// Verifies session tokens issued by the identity provider.
#[derive(Clone)]
pub struct SessionVerifier{
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(key:&SessionKey) -> Result<Self, AppError>{
        let (key, algorithm) = match key {
            SessionKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            SessionKey::PublicKeyPem(pem) => {
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AppError::Config(format!("invalid AUTH_JWT_PUBLIC_KEY: {e}")))?;
                (key, Algorithm::RS256)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;

        Ok(SessionVerifier{key, validation})
    }

    /// Returns the user id carried in the token's subject.
    pub fn verify(&self, token:&str) -> Result<String, AppError>{
        let claims = decode::<JWTClaims>(token, &self.key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                AppError::Unauthorized
            })?
            .claims;

        if claims.sub.is_empty() {
            return Err(AppError::Unauthorized);
        }
        Ok(claims.sub)
    }
}

/// Accepts `Bearer <token>` as well as a bare token.
pub fn bearer_token(headers:&HeaderMap) -> Option<&str>{
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

fn authenticate(req:&ServiceRequest) -> Result<AuthUser, AppError>{
    let data = req
        .app_data::<web::Data<GlobalState>>()
        .ok_or(AppError::InternalError)?;

    let token = bearer_token(req.headers()).ok_or(AppError::Unauthorized)?;
    let user_id = data.sessions.verify(token)?;
    Ok(AuthUser{user_id})
}

pub async fn auth_middleware(
    req:ServiceRequest,
    next: Next<impl MessageBody>) -> Result<ServiceResponse<EitherBody<impl MessageBody>>, Error>
{
    match authenticate(&req) {
        Ok(user) => {
            // handlers read the user back through the AuthUser extractor
            req.extensions_mut().insert(user);
            next.call(req).await.map(ServiceResponse::map_into_left_body)
        }
        Err(err) => Ok(req.error_response(err).map_into_right_body()),
    }
}
