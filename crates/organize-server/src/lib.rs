pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod service;
pub mod telemetry;
pub mod workers;

use anyhow::Result;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::api::routes;
use crate::config::Config;
use crate::repository::{PgStore, Repositories};
use crate::service::AppointmentService;
use crate::workers::HttpWebhookDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub appointments: AppointmentService,
    /// Only used by the readiness probe; `None` when wired without Postgres.
    pub db: Option<PgPool>,
}

pub struct App {
    state: Arc<AppState>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&db).await?;

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let repos = Repositories::from_store(Arc::new(PgStore::new(db.clone())));
        let dispatcher = HttpWebhookDispatcher::new(http_client, config.webhook_timeout);

        Ok(Self::with_state(AppState {
            appointments: AppointmentService::new(repos, Arc::new(dispatcher)),
            db: Some(db),
        }))
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    pub fn router(&self) -> Router {
        routes::build(self.state.clone())
    }
}
