use sea_orm::DatabaseConnection;

use crate::config::loyalty::LoyaltyConfig;
use crate::config::CONFIG;

/// Database connection type alias
pub type DbConn = DatabaseConnection;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub loyalty: LoyaltyConfig,
}

impl AppState {
    pub fn new(db: DbConn) -> Self {
        Self::with_loyalty(db, CONFIG.loyalty.clone())
    }

    pub fn with_loyalty(db: DbConn, loyalty: LoyaltyConfig) -> Self {
        Self { db, loyalty }
    }
}
