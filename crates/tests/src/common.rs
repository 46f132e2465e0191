use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use server::auth::jwt::{SupabaseClaims, SUPABASE_AUDIENCE};
use server::db::AppState;
use server::razorpay::RazorpayClient;
use shared_types::FeatureFlags;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

/// Global mutex ensuring tests run sequentially against the shared database.
/// Each test acquires this lock before truncating and seeding.
static TEST_MUTEX: std::sync::LazyLock<Mutex<()>> = std::sync::LazyLock::new(|| Mutex::new(()));

pub const JWT_SECRET: &str = "integration-test-supabase-jwt-secret";
pub const KEY_SECRET: &str = "integration-test-razorpay-key-secret";
pub const WEBHOOK_SECRET: &str = "integration-test-razorpay-webhook-secret";

pub const ADVOCATE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
pub const OTHER_ADVOCATE_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0002);
pub const CLERK_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0003);
pub const STUDENT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0004);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0005);

/// Access tokens for each seeded user.
pub struct Tokens {
    pub advocate: String,
    pub other_advocate: String,
    pub clerk: String,
    pub student: String,
    pub admin: String,
}

/// Build a test router backed by a real Postgres pool.
/// Acquires the global lock, truncates every table and seeds one user per
/// role. The returned `MutexGuard` must be held for the duration of the test.
pub async fn test_app() -> (Router, Pool<Postgres>, Tokens, tokio::sync::MutexGuard<'static, ()>) {
    let guard = TEST_MUTEX.lock().await;

    let _ = dotenvy::dotenv();
    std::env::set_var("SUPABASE_JWT_SECRET", JWT_SECRET);

    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("TEST_DATABASE_URL or DATABASE_URL must be set for tests");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    sqlx::query(
        "TRUNCATE payment_webhook_events, payments, activities, schedules, notifications, \
         documents, hearings, cases, clients, users CASCADE",
    )
    .execute(&pool)
    .await
    .expect("Failed to truncate");

    for (id, email, name, role) in [
        (ADVOCATE_ID, "asha@chakshi.test", "Asha Rao", "advocate"),
        (OTHER_ADVOCATE_ID, "vikram@chakshi.test", "Vikram Shah", "advocate"),
        (CLERK_ID, "meera@chakshi.test", "Meera Iyer", "clerk"),
        (STUDENT_ID, "kabir@chakshi.test", "Kabir Das", "student"),
        (ADMIN_ID, "admin@chakshi.test", "Firm Admin", "admin"),
    ] {
        sqlx::query("INSERT INTO users (id, email, full_name, role) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(email)
            .bind(name)
            .bind(role)
            .execute(&pool)
            .await
            .expect("Failed to seed user");
    }

    let tokens = Tokens {
        advocate: token_for(ADVOCATE_ID),
        other_advocate: token_for(OTHER_ADVOCATE_ID),
        clerk: token_for(CLERK_ID),
        student: token_for(STUDENT_ID),
        admin: token_for(ADMIN_ID),
    };

    let razorpay = RazorpayClient::new(
        "rzp_test_integration",
        KEY_SECRET,
        Some(WEBHOOK_SECRET.to_string()),
    );
    let state = AppState::with_pool(pool.clone()).with_razorpay(Some(Arc::new(razorpay)));
    let flags = FeatureFlags {
        payments: true,
        ..FeatureFlags::default()
    };
    let router = server::app::api_app(state, &flags);

    (router, pool, tokens, guard)
}

/// Mint a Supabase access token for `user_id`.
pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now();
    let claims = SupabaseClaims {
        sub: user_id,
        email: None,
        role: Some("authenticated".into()),
        aud: SUPABASE_AUDIENCE.into(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
        session_id: None,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn with_auth(builder: axum::http::request::Builder, token: &str) -> axum::http::request::Builder {
    builder.header("authorization", format!("Bearer {token}"))
}

/// GET a route as the holder of `token`.
pub async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = with_auth(Request::builder().method("GET").uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

/// Send a JSON body with the given method.
pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(t) = token {
        builder = with_auth(builder, t);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    send(app, req).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
    send_json(app, "POST", uri, body, Some(token)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value, token: &str) -> (StatusCode, Value) {
    send_json(app, "PUT", uri, body, Some(token)).await
}

/// PATCH without a body.
pub async fn patch(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = with_auth(Request::builder().method("PATCH").uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let req = with_auth(Request::builder().method("DELETE").uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

/// POST raw bytes with extra headers and no auth.
pub async fn post_raw(
    app: &Router,
    uri: &str,
    body: Vec<u8>,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Body::from(body)).unwrap();
    send(app, req).await
}

/// Create a case through the API as `token` and return its id.
pub async fn create_test_case(
    app: &Router,
    token: &str,
    case_number: &str,
    advocate_id: Option<Uuid>,
) -> String {
    let mut body = serde_json::json!({
        "case_number": case_number,
        "title": format!("State v. {case_number}"),
        "description": "Test matter",
        "case_type": "civil",
        "court_name": "Bombay High Court",
    });
    if let Some(id) = advocate_id {
        body["advocate_id"] = serde_json::json!(id);
    }
    let (status, resp) = post_json(app, "/api/cases", body, token).await;
    assert_eq!(status, StatusCode::CREATED, "create case failed: {resp}");
    resp["data"]["id"].as_str().unwrap().to_string()
}

/// Create a client through the API as `token` and return its id.
pub async fn create_test_client(
    app: &Router,
    token: &str,
    name: &str,
    advocate_id: Option<Uuid>,
) -> String {
    let mut body = serde_json::json!({ "name": name, "email": "client@example.in" });
    if let Some(id) = advocate_id {
        body["advocate_id"] = serde_json::json!(id);
    }
    let (status, resp) = post_json(app, "/api/clients", body, token).await;
    assert_eq!(status, StatusCode::CREATED, "create client failed: {resp}");
    resp["data"]["id"].as_str().unwrap().to_string()
}

/// Create a hearing `days_ahead` days from now and return its id.
pub async fn create_test_hearing(app: &Router, token: &str, case_id: &str, days_ahead: i64) -> String {
    let body = serde_json::json!({
        "case_id": case_id,
        "title": "Arguments",
        "hearing_date": (Utc::now() + Duration::days(days_ahead)).to_rfc3339(),
        "court_room": "Court 12",
    });
    let (status, resp) = post_json(app, "/api/hearings", body, token).await;
    assert_eq!(status, StatusCode::CREATED, "create hearing failed: {resp}");
    resp["data"]["id"].as_str().unwrap().to_string()
}
