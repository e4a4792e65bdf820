use std::sync::Arc;

use common::storage::ObjectStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: Arc<dyn ObjectStore>,
    /// Client for proxying backend content, built with the configured fetch
    /// timeout.
    pub http: reqwest::Client,
    pub config: AppConfig,
}
