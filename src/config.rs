use std::collections::HashSet;

use dotenv::dotenv;

use crate::errors::AppError;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// How session tokens from the identity provider are verified.
#[derive(Debug, Clone)]
pub enum SessionKey {
    Secret(String),
    PublicKeyPem(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub max_connections: u32,
    pub session_key: SessionKey,
    /// Empty means every signed-in user may teach.
    pub teacher_ids: HashSet<String>,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub mux_token_id: String,
    pub mux_token_secret: String,
    pub app_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| {
            lookup(key)
                .filter(|val| !val.trim().is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} must be set")))
        };

        let session_key = match (lookup("AUTH_JWT_PUBLIC_KEY"), lookup("AUTH_JWT_SECRET")) {
            (Some(pem), _) if !pem.trim().is_empty() => SessionKey::PublicKeyPem(pem),
            (_, Some(secret)) if !secret.trim().is_empty() => SessionKey::Secret(secret),
            _ => return Err(AppError::Config("AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY must be set".into())),
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(val) => val
                .parse()
                .map_err(|_| AppError::Config(format!("DATABASE_MAX_CONNECTIONS is not a number: {val}")))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            max_connections,
            session_key,
            teacher_ids: parse_teacher_ids(lookup("TEACHER_IDS").as_deref().unwrap_or("")),
            stripe_secret_key: required("STRIPE_SECRET_KEY")?,
            stripe_webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
            mux_token_id: required("MUX_TOKEN_ID")?,
            mux_token_secret: required("MUX_TOKEN_SECRET")?,
            app_url: lookup("APP_URL")
                .unwrap_or_else(|| DEFAULT_APP_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

fn parse_teacher_ids(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn base() -> HashMap<String, String> {
        env(&[
            ("DATABASE_URL", "postgres://localhost/lms"),
            ("AUTH_JWT_SECRET", "session-secret"),
            ("STRIPE_SECRET_KEY", "sk_test"),
            ("STRIPE_WEBHOOK_SECRET", "whsec_test"),
            ("MUX_TOKEN_ID", "mux-id"),
            ("MUX_TOKEN_SECRET", "mux-secret"),
        ])
    }

    #[test]
    fn applies_defaults() {
        let vars = base();
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.app_url, "http://localhost:3000");
        assert!(config.teacher_ids.is_empty());
        assert!(matches!(config.session_key, SessionKey::Secret(ref s) if s == "session-secret"));
    }

    #[test]
    fn prefers_public_key_over_secret() {
        let mut vars = base();
        vars.insert("AUTH_JWT_PUBLIC_KEY".into(), "-----BEGIN PUBLIC KEY-----".into());
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();

        assert!(matches!(config.session_key, SessionKey::PublicKeyPem(_)));
    }

    #[test]
    fn rejects_missing_required_values() {
        let mut vars = base();
        vars.remove("STRIPE_WEBHOOK_SECRET");
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();

        assert_eq!(err.to_string(), "Invalid configuration: STRIPE_WEBHOOK_SECRET must be set");
    }

    #[test]
    fn parses_teacher_allow_list() {
        let ids = parse_teacher_ids(" user_1, ,user_2,");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("user_1"));
        assert!(ids.contains("user_2"));
    }
}
