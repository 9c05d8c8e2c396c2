use std::path::PathBuf;
use std::time::Duration;

use scenegen_core::config::{env_parse, env_string};
use scenegen_core::error::CoreError;
use scenegen_core::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Submission worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Generation endpoint requests are posted to.
    pub api_url: String,
    /// URL the remote API should post completion callbacks to.
    pub callback_url: String,
    /// Root under which the batch directory is created.
    pub data_dir: PathBuf,
    /// Retry and pacing parameters.
    pub policy: RetryPolicy,
    /// Per-request HTTP timeout.
    pub submit_timeout: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                        |
    /// |-------------------------|------------------------------------------------|
    /// | `SCENEGEN_API_URL`      | `http://localhost:7865/comfyui/scene_text2img` |
    /// | `CALLBACK_URL`          | `http://localhost:9983/callback`               |
    /// | `DATA_DIR`              | `.`                                            |
    /// | `REQUEST_INTERVAL_SECS` | `20`                                           |
    /// | `RETRY_WAIT_BASE_SECS`  | `10`                                           |
    /// | `MAX_ATTEMPTS`          | `3`                                            |
    /// | `SUBMIT_TIMEOUT_SECS`   | `60`                                           |
    pub fn from_env() -> Result<Self, CoreError> {
        let defaults = RetryPolicy::default();

        let policy = RetryPolicy {
            max_attempts: env_parse("MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            retry_wait_base: Duration::from_secs(env_parse(
                "RETRY_WAIT_BASE_SECS",
                defaults.retry_wait_base.as_secs(),
            )?),
            request_interval: Duration::from_secs(env_parse(
                "REQUEST_INTERVAL_SECS",
                defaults.request_interval.as_secs(),
            )?),
        };

        if policy.max_attempts == 0 {
            return Err(CoreError::Validation(
                "MAX_ATTEMPTS must be at least 1".into(),
            ));
        }

        Ok(Self {
            api_url: env_string(
                "SCENEGEN_API_URL",
                "http://localhost:7865/comfyui/scene_text2img",
            ),
            callback_url: env_string("CALLBACK_URL", "http://localhost:9983/callback"),
            data_dir: PathBuf::from(env_string("DATA_DIR", ".")),
            policy,
            submit_timeout: Duration::from_secs(env_parse("SUBMIT_TIMEOUT_SECS", 60)?),
        })
    }

    /// Apply the optional `interval_seconds` command-line argument.
    ///
    /// Only a positive integer replaces the configured interval; anything
    /// else is ignored. Returns whether the interval changed.
    pub fn apply_interval_arg(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => {
                self.policy.request_interval = Duration::from_secs(secs);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorkerConfig {
        WorkerConfig {
            api_url: "http://api".into(),
            callback_url: "http://cb".into(),
            data_dir: PathBuf::from("."),
            policy: RetryPolicy::default(),
            submit_timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn positive_interval_overrides() {
        let mut c = config();
        assert!(c.apply_interval_arg("5"));
        assert_eq!(c.policy.request_interval, Duration::from_secs(5));
    }

    #[test]
    fn invalid_interval_is_ignored() {
        let mut c = config();
        assert!(!c.apply_interval_arg("0"));
        assert!(!c.apply_interval_arg("-3"));
        assert!(!c.apply_interval_arg("soon"));
        assert_eq!(c.policy.request_interval, Duration::from_secs(20));
    }
}
