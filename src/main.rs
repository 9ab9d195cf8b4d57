use std::{collections::HashSet, sync::Arc};

use actix_web::{middleware::Logger, web, App, HttpServer};
use config::Config;
use errors::AppError;
use middlewares::auth::SessionVerifier;
use providers::{mux::MuxClient, stripe::StripeClient, PaymentGateway, VideoHost};
use sqlx::{Pool, Postgres};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod handlers;
mod middlewares;
mod models;
mod providers;
mod schema;
#[cfg(test)]
mod test_init_app;

pub struct GlobalState{
    pub pool: Pool<Postgres>,
    pub sessions: SessionVerifier,
    pub teacher_ids: HashSet<String>,
    pub webhook_secret: String,
    pub video: Arc<dyn VideoHost>,
    pub payments: Arc<dyn PaymentGateway>,
}

#[actix_web::main]
async fn main() -> Result<(), AppError> {

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, config.max_connections)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "database connection failed");
            AppError::DbConnect
        })?;

    db::run_migrations(&pool).await?;

    let video = MuxClient::new(config.mux_token_id, config.mux_token_secret)?;
    let payments = StripeClient::new(config.stripe_secret_key, config.app_url)?;

    let global_state = GlobalState{
        pool,
        sessions: SessionVerifier::new(&config.session_key)?,
        teacher_ids: config.teacher_ids,
        webhook_secret: config.stripe_webhook_secret,
        video: Arc::new(video),
        payments: Arc::new(payments),
    };

    let app_data = web::Data::new(global_state);

    tracing::info!(address = %config.bind_address, "server starting");

    HttpServer::new(
        move||{
            App::new()
            .wrap(Logger::default())
            .app_data(app_data.clone())
            .service(
                web::scope("/api/v1")
                .configure(handlers::configure)
            )
        }
    ).bind(&config.bind_address)
    .map_err(|_e|AppError::SocketBind)?
    .run()
    .await
    .map_err(|_e|AppError::ServerStart)?;

    Ok(())
}
