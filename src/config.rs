//! Run configuration
//!
//! Positional CLI arguments carry the run itself. Optional deadlines come
//! from the environment (or a `.env` file):
//! - `TOLLING_VISION_CALL_TIMEOUT_SECS`: give up on one analyze call after this long
//! - `TOLLING_VISION_CONNECT_TIMEOUT_SECS`: limit connection establishment

use crate::cli::Cli;
use std::path::PathBuf;
use std::time::Duration;

pub const CALL_TIMEOUT_ENV: &str = "TOLLING_VISION_CALL_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_ENV: &str = "TOLLING_VISION_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub service_address: String,
    pub secured: bool,
    pub max_parallel: usize,
    pub image_root: PathBuf,
    pub output_path: PathBuf,
    pub group_pattern: String,
    pub front_pattern: String,
    pub rear_pattern: String,
    pub overview_pattern: String,
    /// No deadline when unset: a call that never terminates blocks the run
    pub call_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl BatchConfig {
    pub fn from_cli(cli: Cli) -> Self {
        Self {
            service_address: cli.service_url,
            secured: cli.secured,
            max_parallel: cli.max_parallel_requests,
            image_root: cli.image_folder_path,
            output_path: cli.csv_file_path,
            group_pattern: cli.group_regex,
            front_pattern: cli.front_regex,
            rear_pattern: cli.rear_regex,
            overview_pattern: cli.overview_regex,
            call_timeout: None,
            connect_timeout: None,
        }
    }

    /// Apply deadlines from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(timeout) = seconds_from(&lookup, CALL_TIMEOUT_ENV) {
            self.call_timeout = Some(timeout);
        }
        if let Some(timeout) = seconds_from(&lookup, CONNECT_TIMEOUT_ENV) {
            self.connect_timeout = Some(timeout);
        }
        self
    }
}

fn seconds_from<F>(lookup: &F, name: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "[Config] Ignoring non-numeric timeout");
            None
        }
    }
}

/// Load `.env` from the working directory, falling back to its parent
pub fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }
}
