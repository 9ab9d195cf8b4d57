use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAttachment{
    pub url: String,
    pub name: Option<String>,
}
