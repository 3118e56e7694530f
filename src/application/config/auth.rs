use std::env;

/// Development fallback; any real deployment sets `ARTEXPO_JWT_SECRET`.
pub const DEV_JWT_SECRET: &str = "artexpo-dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: i64,
    pub refresh_token_ttl: i64,
    pub bcrypt_cost: u32,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("ARTEXPO_JWT_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEV_JWT_SECRET.to_string()),
            access_token_ttl: env::var("ARTEXPO_ACCESS_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            refresh_token_ttl: env::var("ARTEXPO_REFRESH_TOKEN_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(604800),
            bcrypt_cost: env::var("ARTEXPO_BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|c| (4..=31).contains(c))
                .unwrap_or(bcrypt::DEFAULT_COST),
            admin_email: env::var("ARTEXPO_ADMIN_EMAIL").ok(),
            admin_password: env::var("ARTEXPO_ADMIN_PASSWORD").ok(),
        }
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}
