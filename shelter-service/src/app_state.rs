use std::sync::Arc;

use common_auth::AuthGate;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gate: Arc<AuthGate>,
}

impl AppState {
    pub fn new(db: PgPool, gate: Arc<AuthGate>) -> Self {
        Self { db, gate }
    }
}
