use axum::extract::FromRef;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use crate::razorpay::RazorpayClient;
use crate::storage::{DynObjectStore, MemoryObjectStore};
use crate::supabase::SupabaseAuth;

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract `State<PgPool>` directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Pool<Postgres>,
    pub storage: DynObjectStore,
    /// `None` when the Supabase project URL / anon key are not configured.
    pub supabase: Option<Arc<SupabaseAuth>>,
    /// `None` when Razorpay keys are not configured.
    pub razorpay: Option<Arc<RazorpayClient>>,
}

impl AppState {
    /// State with an in-memory object store and no external clients.
    /// Used by tests and by deployments that only need the database.
    pub fn with_pool(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            storage: Arc::new(MemoryObjectStore::default()),
            supabase: None,
            razorpay: None,
        }
    }

    pub fn with_storage(mut self, storage: DynObjectStore) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_supabase(mut self, supabase: Option<Arc<SupabaseAuth>>) -> Self {
        self.supabase = supabase;
        self
    }

    pub fn with_razorpay(mut self, razorpay: Option<Arc<RazorpayClient>>) -> Self {
        self.razorpay = razorpay;
        self
    }
}

/// Create a new database connection pool from environment variables.
/// Uses `connect_lazy` so no connections open until the first query.
pub fn create_pool() -> Result<Pool<Postgres>, sqlx::Error> {
    // Load .env file if present (ignored in production where env vars are set directly).
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| sqlx::Error::Configuration("DATABASE_URL must be set".into()))?;

    let max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(&database_url)
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
