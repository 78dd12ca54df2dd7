//! Agent configuration loaded from the environment.
//!
//! The configuration is read once at startup into an immutable struct and
//! passed by reference into each component; no component reads ambient
//! global state. Missing required variables are accumulated so the operator
//! sees all of them at once.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use snafu::prelude::*;

use crate::error::{ConfigError, InvalidAttemptBudgetSnafu, InvalidVarSnafu, MissingVarsSnafu};
use crate::upload::RetryPolicy;

/// Default local source file when `SOURCE_FILE` is unset.
pub const DEFAULT_SOURCE_FILE: &str = "/mnt/sample.csv";

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_RETRY_DELAY_SECS: u64 = 3;

/// Immutable agent configuration, constructed once at startup.
#[derive(Clone)]
pub struct AgentConfig {
    /// Region identifier; names the log stream and appears in startup
    /// messages.
    pub region: String,
    /// SFTP endpoint hostname.
    pub ftp_host: String,
    /// SFTP username.
    pub ftp_user: String,
    /// SFTP password.
    pub ftp_password: String,
    /// Remote directory the archive is uploaded into.
    pub ftp_target_dir: String,
    /// SNS topic receiving alerts.
    pub sns_topic_arn: String,
    /// Local file to compress and upload.
    pub source_path: PathBuf,
    /// Attempt budget and inter-attempt delay for the upload loop.
    pub retry: RetryPolicy,
}

impl AgentConfig {
    /// Build the configuration from the process environment.
    ///
    /// Required: `REGION`, `FTP_HOST`, `FTP_USER`, `FTP_PASSWORD`,
    /// `FTP_TARGET_DIR`, `SNS_TOPIC_ARN`. Optional: `SOURCE_FILE`,
    /// `UPLOAD_MAX_ATTEMPTS`, `UPLOAD_RETRY_DELAY_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();

        let region = require("REGION", &mut missing);
        let ftp_host = require("FTP_HOST", &mut missing);
        let ftp_user = require("FTP_USER", &mut missing);
        let ftp_password = require("FTP_PASSWORD", &mut missing);
        let ftp_target_dir = require("FTP_TARGET_DIR", &mut missing);
        let sns_topic_arn = require("SNS_TOPIC_ARN", &mut missing);

        ensure!(missing.is_empty(), MissingVarsSnafu { missing });

        let source_path = env::var("SOURCE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOURCE_FILE));

        let max_attempts: u32 = parse_var("UPLOAD_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        ensure!(
            max_attempts >= 1,
            InvalidAttemptBudgetSnafu {
                name: "UPLOAD_MAX_ATTEMPTS",
            }
        );
        let delay_secs: u64 = parse_var("UPLOAD_RETRY_DELAY_SECS", DEFAULT_RETRY_DELAY_SECS)?;

        Ok(Self {
            region,
            ftp_host,
            ftp_user,
            ftp_password,
            ftp_target_dir,
            sns_topic_arn,
            source_path,
            retry: RetryPolicy {
                max_attempts,
                delay: Duration::from_secs(delay_secs),
            },
        })
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("region", &self.region)
            .field("ftp_host", &self.ftp_host)
            .field("ftp_user", &self.ftp_user)
            .field("ftp_password", &"<redacted>")
            .field("ftp_target_dir", &self.ftp_target_dir)
            .field("sns_topic_arn", &self.sns_topic_arn)
            .field("source_path", &self.source_path)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Read a required variable, recording its name when unset or empty.
///
/// Returns an empty placeholder on failure; the caller bails before any
/// placeholder can be observed.
fn require(name: &'static str, missing: &mut Vec<String>) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => {
            missing.push(name.to_string());
            String::new()
        }
    }
}

/// Parse an optional numeric override, falling back to `default` when the
/// variable is unset.
fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().context(InvalidVarSnafu {
            name,
            value: raw.trim(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // Save original values
        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        // Set test values
        // SAFETY: the environment-dependent assertions all live in the one
        // test below, so no concurrent test observes these mutations
        for (key, value) in vars {
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        let result = f();

        // Restore original values
        // SAFETY: Restoring original environment state
        for (key, original) in originals {
            match original {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }

        result
    }

    const ALL_REQUIRED: &[(&str, Option<&str>)] = &[
        ("REGION", Some("eu-west-1")),
        ("FTP_HOST", Some("sftp.example.com")),
        ("FTP_USER", Some("agent")),
        ("FTP_PASSWORD", Some("hunter2")),
        ("FTP_TARGET_DIR", Some("/upload")),
        ("SNS_TOPIC_ARN", Some("arn:aws:sns:eu-west-1:123456789012:alerts")),
    ];

    /// All `from_env` assertions live in a single test because they mutate
    /// shared process environment variables.
    #[test]
    fn test_from_env() {
        // Every required variable missing: all of them reported at once.
        let unset: Vec<_> = ALL_REQUIRED.iter().map(|(k, _)| (*k, None)).collect();
        with_env_vars(&unset, || {
            let err = AgentConfig::from_env().unwrap_err();
            match err {
                ConfigError::MissingVars { missing } => {
                    assert_eq!(missing.len(), 6);
                    assert!(missing.contains(&"REGION".to_string()));
                    assert!(missing.contains(&"SNS_TOPIC_ARN".to_string()));
                }
                other => panic!("Expected MissingVars, got {other:?}"),
            }
        });

        // Empty values count as missing.
        let mut one_empty = ALL_REQUIRED.to_vec();
        one_empty[1] = ("FTP_HOST", Some("  "));
        with_env_vars(&one_empty, || {
            let err = AgentConfig::from_env().unwrap_err();
            match err {
                ConfigError::MissingVars { missing } => {
                    assert_eq!(missing, vec!["FTP_HOST".to_string()]);
                }
                other => panic!("Expected MissingVars, got {other:?}"),
            }
        });

        // Complete environment with defaults for the optional knobs.
        let mut complete = ALL_REQUIRED.to_vec();
        complete.push(("SOURCE_FILE", None));
        complete.push(("UPLOAD_MAX_ATTEMPTS", None));
        complete.push(("UPLOAD_RETRY_DELAY_SECS", None));
        with_env_vars(&complete, || {
            let config = AgentConfig::from_env().unwrap();
            assert_eq!(config.region, "eu-west-1");
            assert_eq!(config.ftp_host, "sftp.example.com");
            assert_eq!(config.source_path, PathBuf::from(DEFAULT_SOURCE_FILE));
            assert_eq!(config.retry.max_attempts, 5);
            assert_eq!(config.retry.delay, Duration::from_secs(3));
        });

        // Optional overrides are honored.
        let mut overridden = ALL_REQUIRED.to_vec();
        overridden.push(("SOURCE_FILE", Some("/data/report.csv")));
        overridden.push(("UPLOAD_MAX_ATTEMPTS", Some("7")));
        overridden.push(("UPLOAD_RETRY_DELAY_SECS", Some("1")));
        with_env_vars(&overridden, || {
            let config = AgentConfig::from_env().unwrap();
            assert_eq!(config.source_path, PathBuf::from("/data/report.csv"));
            assert_eq!(config.retry.max_attempts, 7);
            assert_eq!(config.retry.delay, Duration::from_secs(1));
        });

        // Garbage override is rejected with the variable named.
        let mut garbage = ALL_REQUIRED.to_vec();
        garbage.push(("UPLOAD_MAX_ATTEMPTS", Some("many")));
        with_env_vars(&garbage, || {
            let err = AgentConfig::from_env().unwrap_err();
            match err {
                ConfigError::InvalidVar { name, value, .. } => {
                    assert_eq!(name, "UPLOAD_MAX_ATTEMPTS");
                    assert_eq!(value, "many");
                }
                other => panic!("Expected InvalidVar, got {other:?}"),
            }
        });

        // A zero attempt budget is rejected.
        let mut zero = ALL_REQUIRED.to_vec();
        zero.push(("UPLOAD_MAX_ATTEMPTS", Some("0")));
        with_env_vars(&zero, || {
            let err = AgentConfig::from_env().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidAttemptBudget { .. }));
        });
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = AgentConfig {
            region: "eu-west-1".to_string(),
            ftp_host: "sftp.example.com".to_string(),
            ftp_user: "agent".to_string(),
            ftp_password: "hunter2".to_string(),
            ftp_target_dir: "/upload".to_string(),
            sns_topic_arn: "arn:aws:sns:eu-west-1:123456789012:alerts".to_string(),
            source_path: PathBuf::from("/mnt/sample.csv"),
            retry: RetryPolicy::default(),
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
