use serde::{Deserialize, Serialize};

pub mod attachment;
pub mod chapter;
pub mod course;

/// Claims of a session token issued by the identity provider.
#[derive(Deserialize, Serialize, Debug)]
pub struct JWTClaims{
    pub sub: String,
    pub exp: usize,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse{
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CheckoutResponse{
    pub url: String,
}
