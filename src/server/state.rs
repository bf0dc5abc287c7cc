//! Application state shared across handlers.

use crate::auth::AuthService;
use crate::catalog::CatalogService;
use crate::config::Config;
use crate::dashboard::DashboardService;
use crate::db::Database;
use crate::reviews::ReviewService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Database connection.
    pub db: Database,
    /// Authentication service.
    pub auth: Arc<AuthService>,
    /// Authors and books.
    pub catalog: CatalogService,
    /// Review submission.
    pub reviews: ReviewService,
    /// Page data.
    pub dashboard: DashboardService,
}

impl AppState {
    /// Create new application state with database.
    pub fn new_with_db(config: Config, db: Database) -> Self {
        let auth = AuthService::new(
            db.clone(),
            config.auth.session_days,
            config.auth.registration_enabled(),
        );
        let catalog = CatalogService::new(db.clone());

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            reviews: ReviewService::new(db.clone(), catalog.clone()),
            dashboard: DashboardService::new(db.clone()),
            catalog,
            db,
        }
    }

    /// Site title.
    pub fn title(&self) -> String {
        self.config.server.title.clone()
    }

    /// Run the one-time startup seeding.
    pub fn seed(&self) -> crate::error::Result<usize> {
        self.catalog.seed_authors(&self.config.seed.authors)
    }
}
