use std::{collections::HashSet, sync::{atomic::{AtomicUsize, Ordering}, Arc, Mutex}};

use actix_web::{dev::ServiceResponse, test, web::{self, scope}, App, Error};
use actix_service::Service;
use actix_http::Request;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use dotenv::dotenv;
use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::{postgres::PgPoolOptions, types::Uuid, Pool, Postgres};

use crate::{config::SessionKey, db::run_migrations, handlers, middlewares::auth::SessionVerifier, models::course::Course, providers::{CheckoutRequest, CheckoutSession, PaymentGateway, ProviderError, VideoAsset, VideoHost}, schema::JWTClaims, GlobalState};

const TEST_SESSION_SECRET: &str = "test-session-secret";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Hands out sequential asset ids and remembers deletions.
#[derive(Default)]
pub struct FakeVideoHost{
    created: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl FakeVideoHost {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoHost for FakeVideoHost {
    async fn create_asset(&self, _input_url:&str) -> Result<VideoAsset, ProviderError>{
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(VideoAsset{asset_id: format!("asset_{n}"), playback_id: format!("playback_{n}")})
    }

    async fn delete_asset(&self, asset_id:&str) -> Result<(), ProviderError>{
        self.deleted.lock().unwrap().push(asset_id.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakePayments{
    requests: Mutex<Vec<(String, Uuid, i64)>>,
}

impl FakePayments {
    pub fn requests(&self) -> Vec<(String, Uuid, i64)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_checkout_session(&self, request:CheckoutRequest<'_>) -> Result<CheckoutSession, ProviderError>{
        self.requests.lock().unwrap().push((request.user_id.to_string(), request.course_id, request.unit_amount));
        Ok(CheckoutSession{
            id: "cs_test".into(),
            url: format!("https://checkout.test/{}", request.course_id),
        })
    }
}

pub struct TestState{
    pub pool: Pool<Postgres>,
    pub video_host: Arc<FakeVideoHost>,
    pub payments: Arc<FakePayments>,
}

pub async fn init() -> (impl Service<Request, Response = ServiceResponse, Error = Error>, TestState) {
    init_with_teachers(&[]).await
}

/// The pool connects lazily, so requests rejected before any query run without Postgres.
pub async fn init_with_teachers(teachers:&[&str]) -> (impl Service<Request, Response = ServiceResponse, Error = Error>, TestState) {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/course_platform_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(&database_url)
        .expect("invalid DATABASE_URL");

    if std::env::var("DATABASE_URL").is_ok() {
        // concurrent tests race on CREATE TABLE; whichever wins leaves the schema ready
        if let Err(e) = run_migrations(&pool).await {
            eprintln!("migrations skipped: {e}");
        }
    }

    let video_host = Arc::new(FakeVideoHost::default());
    let payments = Arc::new(FakePayments::default());

    let global_state = GlobalState{
        pool: pool.clone(),
        sessions: SessionVerifier::new(&SessionKey::Secret(TEST_SESSION_SECRET.into())).expect("session key"),
        teacher_ids: teachers.iter().map(|id| id.to_string()).collect::<HashSet<_>>(),
        webhook_secret: TEST_WEBHOOK_SECRET.into(),
        video: video_host.clone(),
        payments: payments.clone(),
    };

    let app_data = web::Data::new(global_state);

    let app = test::init_service(
        App::new()
            .app_data(app_data)
            .service(scope("/api/v1").configure(handlers::configure))
    ).await;

    (app, TestState{pool, video_host, payments})
}

pub fn session_token(user_id:&str) -> String {
    let claims = JWTClaims{sub: user_id.to_string(), exp: (Utc::now() + Duration::hours(1)).timestamp() as usize};
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SESSION_SECRET.as_bytes())).unwrap()
}

pub async fn seed_course(pool:&Pool<Postgres>, user_id:&str, title:&str) -> Course {
    sqlx::query_as::<_, Course>("INSERT INTO courses (user_id, title) VALUES ($1, $2) RETURNING *")
        .bind(user_id)
        .bind(title)
        .fetch_one(pool)
        .await
        .expect("failed to seed course")
}
