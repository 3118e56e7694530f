use std::env;

/// Rupiah value of a single loyalty point.
pub const DEFAULT_POINT_VALUE: i64 = 1000;

/// Points credited to a referral code owner per successful registration.
pub const DEFAULT_REFERRAL_POINTS: i64 = 10;

#[derive(Debug, Clone)]
pub struct LoyaltyConfig {
    pub point_value: i64,
    pub referral_points: i64,
}

impl LoyaltyConfig {
    pub fn from_env() -> Self {
        Self {
            point_value: env::var("ARTEXPO_POINT_VALUE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(DEFAULT_POINT_VALUE),
            referral_points: env::var("ARTEXPO_REFERRAL_POINTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v >= 0)
                .unwrap_or(DEFAULT_REFERRAL_POINTS),
        }
    }
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            point_value: DEFAULT_POINT_VALUE,
            referral_points: DEFAULT_REFERRAL_POINTS,
        }
    }
}
