//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Kernel configuration.
///
/// Defaults match the listing sizes the view layer historically used; each
/// value can be overridden through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many posts `new_posts` returns by default (default: 5).
    pub new_posts_limit: usize,

    /// Horizon in days for `recent_posts` (default: 30).
    pub recent_horizon_days: i64,

    /// How many related posts to suggest by default (default: 5).
    pub related_posts_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            new_posts_limit: 5,
            recent_horizon_days: 30,
            related_posts_limit: 5,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let new_posts_limit = env::var("NEW_POSTS_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("NEW_POSTS_LIMIT must be a valid usize")?;

        let recent_horizon_days = env::var("RECENT_HORIZON_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("RECENT_HORIZON_DAYS must be a valid i64")?;

        let related_posts_limit = env::var("RELATED_POSTS_LIMIT")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("RELATED_POSTS_LIMIT must be a valid usize")?;

        Ok(Self {
            new_posts_limit,
            recent_horizon_days,
            related_posts_limit,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.new_posts_limit, 5);
        assert_eq!(config.recent_horizon_days, 30);
        assert_eq!(config.related_posts_limit, 5);
    }
}
