use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::migrations::Migrator;
use crate::models::user::{self, UserRole};
use crate::services::referral;
use crate::services::security::hash_password;

pub type DbConn = DatabaseConnection;

/// Create a new database connection and run migrations using config
pub async fn connect() -> Result<DbConn> {
    connect_with_url(&CONFIG.database.database_url).await
}

/// Create a new database connection with a specific URL and run migrations
pub async fn connect_with_url(database_url: &str) -> Result<DbConn> {
    tracing::info!("Connecting to database...");

    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(CONFIG.database.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))?;

    tracing::info!("Running database migrations...");
    Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Database migrations completed");

    Ok(db)
}

/// Ensure an admin account exists for the configured credentials.
///
/// Does nothing when `ARTEXPO_ADMIN_EMAIL` / `ARTEXPO_ADMIN_PASSWORD` are unset or the
/// email is already registered.
pub async fn seed_admin(db: &DbConn) -> Result<Option<user::Model>> {
    let (Some(email), Some(password)) = (
        CONFIG.auth.admin_email.as_deref(),
        CONFIG.auth.admin_password.as_deref(),
    ) else {
        return Ok(None);
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        tracing::debug!("Admin account {} already present", email);
        return Ok(None);
    }

    let now = chrono::Utc::now();
    let admin = user::ActiveModel {
        username: Set(email.split('@').next().unwrap_or("admin").to_string()),
        email: Set(email.to_string()),
        hashed_password: Set(hash_password(password)?),
        role: Set(UserRole::Admin),
        points: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    referral::issue_code(db, admin.id).await?;
    tracing::info!("Seeded admin account {}", admin.email);

    Ok(Some(admin))
}
