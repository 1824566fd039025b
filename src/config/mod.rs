//! Configuration management for demoscan
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. embedded `default-config.toml`
//! 2. `--config <file>` (TOML, JSON or YAML by extension), or else
//!    `demoscan.toml` / `demoscan.yaml` / `demoscan.yml` in the working directory
//! 3. `DEMOSCAN_*` environment variables
//! 4. command-line flags
//!
//! The result is a plain [`ScanConfig`] value handed to the pipeline.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::error::SetupError;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Environment variable prefix, e.g. `DEMOSCAN_SUBJECT`.
pub const ENV_PREFIX: &str = "DEMOSCAN_";

/// Everything one batch run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory scanned recursively for recordings
    pub root_directory: PathBuf,

    /// File name suffix of recordings, e.g. `.dem` (case-sensitive)
    pub suffix: String,

    /// Only recordings modified on or after this date (00:00 UTC) are processed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,

    /// Identity of the player whose events are extracted
    #[serde(default, deserialize_with = "string_or_number")]
    pub subject: String,

    /// Maximum number of recordings processed at the same time
    pub concurrency_limit: usize,

    /// Report file, created or truncated at the start of a run
    pub report_path: PathBuf,
}

/// Values supplied on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

/// Player ids are long numbers; env vars and YAML hand them over as integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Unsigned(number) => number.to_string(),
        Raw::Signed(number) => number.to_string(),
    })
}

impl ScanConfig {
    /// Load the layered configuration and validate it.
    pub fn load(
        config_file: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, SetupError> {
        let config: ScanConfig = Self::figment(config_file, overrides)?
            .extract()
            .map_err(|e| SetupError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn figment(
        config_file: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Figment, SetupError> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(SetupError::InvalidConfig(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
                _ => figment.merge(Toml::file(path)),
            };
        } else {
            figment = figment
                .merge(Toml::file("demoscan.toml"))
                .merge(Yaml::file("demoscan.yaml"))
                .merge(Yaml::file("demoscan.yml"));
        }

        // Environment variables and flags always win
        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides)))
    }

    /// Reject settings a run cannot start with.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.concurrency_limit == 0 {
            return Err(SetupError::InvalidConfig(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }
        if self.subject.trim().is_empty() {
            return Err(SetupError::InvalidConfig(
                "subject must be set (--subject or DEMOSCAN_SUBJECT)".to_string(),
            ));
        }
        if self.suffix.trim().is_empty() {
            return Err(SetupError::InvalidConfig("suffix must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn concurrency(&self) -> Result<NonZeroUsize, SetupError> {
        NonZeroUsize::new(self.concurrency_limit).ok_or_else(|| {
            SetupError::InvalidConfig("concurrency_limit must be at least 1".to_string())
        })
    }

    /// Start of the `since` day in UTC.
    pub fn since_timestamp(&self) -> Option<DateTime<Utc>> {
        self.since
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Render as TOML, as shown by `demoscan config show`.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Parse a `YYYY-MM-DD` date given on the command line.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}
