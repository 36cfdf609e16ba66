use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub banner: BannerConfig,
    pub poll: PollConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            banner: BannerConfig::from_env(),
            poll: PollConfig::from_env(),
        }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  banner:  base_url={}", self.banner.base_url);
        tracing::info!("  banner:  timeout={}s", self.banner.timeout_secs);
        tracing::info!(
            "  poll:    interval={}s, concurrency={}",
            self.poll.interval_secs,
            self.poll.concurrency
        );
    }
}

// ── Registration platform ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Base URL of the Student Registration SSB deployment, without a
    /// trailing slash.
    pub base_url: String,
    /// Deadline for the whole two-round-trip query exchange.
    pub timeout_secs: u64,
}

impl BannerConfig {
    fn from_env() -> Self {
        let mut base_url = env_or(
            "SEATWATCH_BANNER_BASE_URL",
            "https://registration.example.edu/StudentRegistrationSsb/ssb",
        );
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout_secs: env_u64("SEATWATCH_QUERY_TIMEOUT_SECS", 30),
        }
    }
}

// ── Polling ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between sweeps.
    pub interval_secs: u64,
    /// Maximum concurrent queries within one sweep.
    pub concurrency: usize,
}

impl PollConfig {
    fn from_env() -> Self {
        Self {
            interval_secs: env_u64("SEATWATCH_POLL_INTERVAL_SECS", 300),
            concurrency: env_usize("SEATWATCH_POLL_CONCURRENCY", 4).max(1),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            concurrency: 4,
        }
    }
}
