use std::env;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dotenvy::dotenv;

use crate::service::policy::{AutoApprovalPolicy, LeavePolicy, RecommendationWindow};
use crate::service::scoring::{RandomWorkload, SeededWorkload, WorkloadScorer};

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// memory store when unset
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub api_prefix: String,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    // Leave policy
    pub auto_approve_max_days: i64,
    pub auto_approve_reason: String,
    pub max_duration_days: i64,

    // Recommendations
    pub recommendation_window_days: u32,
    pub recommendation_limit: usize,
    pub recommendation_start: Option<NaiveDate>,
    pub recommendation_seed: Option<u64>,

    pub directory_cache_ttl: Duration,

    pub log_dir: String,
    pub log_level: tracing::Level,

    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let recommendation_start = optional_var("RECOMMENDATION_START")
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .with_context(|| format!("RECOMMENDATION_START must be YYYY-MM-DD, got {raw}"))
            })
            .transpose()?;

        let recommendation_seed = optional_var("RECOMMENDATION_SEED")
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("RECOMMENDATION_SEED has an invalid value: {raw}"))
            })
            .transpose()?;

        let log_level = optional_var("LOG_LEVEL")
            .map(|raw| {
                tracing::Level::from_str(raw.trim())
                    .with_context(|| format!("LOG_LEVEL has an invalid value: {raw}"))
            })
            .transpose()?
            .unwrap_or(tracing::Level::DEBUG);

        let bootstrap_admin = match (
            optional_var("BOOTSTRAP_ADMIN_EMAIL"),
            optional_var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                name: optional_var("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|| "Administrator".into()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: optional_var("DATABASE_URL"),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: var_or("ACCESS_TOKEN_TTL", 900)?, // default 15 min
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: var_or("RATE_REGISTER_PER_MIN", 30)?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,

            auto_approve_max_days: var_or("LEAVE_AUTO_APPROVE_MAX_DAYS", 2)?,
            auto_approve_reason: env::var("LEAVE_AUTO_APPROVE_REASON")
                .unwrap_or_else(|_| "casual".to_string()),
            max_duration_days: var_or("LEAVE_MAX_DURATION_DAYS", 30)?,

            recommendation_window_days: var_or("RECOMMENDATION_WINDOW_DAYS", 30)?,
            recommendation_limit: var_or("RECOMMENDATION_LIMIT", 3)?,
            recommendation_start,
            recommendation_seed,

            directory_cache_ttl: Duration::from_secs(var_or("DIRECTORY_CACHE_TTL_SECS", 300)?),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level,

            bootstrap_admin,
        })
    }

    pub fn leave_policy(&self) -> LeavePolicy {
        LeavePolicy {
            auto_approval: AutoApprovalPolicy {
                max_days: self.auto_approve_max_days,
                match_reason: self.auto_approve_reason.clone(),
            },
            max_duration_days: self.max_duration_days,
            ..LeavePolicy::default()
        }
    }

    pub fn recommendation_window(&self) -> RecommendationWindow {
        RecommendationWindow {
            start: self.recommendation_start,
            days: self.recommendation_window_days,
            limit: self.recommendation_limit,
        }
    }

    /// Seeded scoring makes recommendations reproducible across restarts.
    pub fn workload_scorer(&self) -> Arc<dyn WorkloadScorer> {
        match self.recommendation_seed {
            Some(seed) => Arc::new(SeededWorkload { seed }),
            None => Arc::new(RandomWorkload),
        }
    }
}

#[cfg(test)]
impl Config {
    /// In-process configuration for handler tests.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            database_url: None,
            jwt_secret: "test-secret".into(),
            access_token_ttl: 900,
            api_prefix: "/api".into(),
            rate_login_per_min: 60,
            rate_register_per_min: 30,
            rate_protected_per_min: 1000,
            auto_approve_max_days: 2,
            auto_approve_reason: "casual".into(),
            max_duration_days: 30,
            recommendation_window_days: 30,
            recommendation_limit: 3,
            recommendation_start: NaiveDate::from_ymd_opt(2025, 5, 1),
            recommendation_seed: Some(7),
            directory_cache_ttl: Duration::from_secs(300),
            log_dir: "logs".into(),
            log_level: tracing::Level::DEBUG,
            bootstrap_admin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_follows_config() {
        let mut config = Config::for_tests();
        config.auto_approve_max_days = 1;
        config.auto_approve_reason = "family".into();

        let policy = config.leave_policy();
        assert_eq!(policy.auto_approval.max_days, 1);
        assert_eq!(policy.auto_approval.match_reason, "family");
        assert_eq!(policy.max_text_len, 500);

        let window = config.recommendation_window();
        assert_eq!(window.days, 30);
        assert_eq!(window.limit, 3);
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 5, 1));
    }
}
