//! Engine configuration.
//!
//! Purpose
//! -------
//! Collect every tunable of the assessment engine in one serde-friendly
//! struct that can be built in code or read from TOML, and validate it once
//! before the engine is constructed.
//!
//! Key behaviors
//! -------------
//! - Missing keys fall back to the defaults below, so a partial TOML file is
//!   enough.
//! - [`EngineConfig::validate`] checks every field, including the nested
//!   estimator options and exposure policy.
//!
//! Defaults
//! --------
//! - `se_convergence_threshold = 0.3`
//! - `max_questions = 30`
//! - `estimator`: bounds `(-4, 4)`, tolerance `1e-6`, 500 iterations
//! - `exposure = randomesque { top_k = 3 }`, `seed` unset (OS entropy)
//! - `max_commit_retries = 8`
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    estimation::{EstimationError, EstimatorOptions},
    selection::ExposureControl,
};

/// Default standard-error threshold below which a session converges.
pub const DEFAULT_SE_CONVERGENCE_THRESHOLD: f64 = 0.3;

/// Default hard cap on questions per session.
pub const DEFAULT_MAX_QUESTIONS: u32 = 30;

/// Default number of optimistic-commit retries before giving up.
pub const DEFAULT_MAX_COMMIT_RETRIES: u32 = 8;

/// Result alias for configuration handling.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    // ---- Termination ----
    /// SE threshold must be finite and strictly positive.
    #[error("Invalid SE convergence threshold {value}: {reason}")]
    InvalidSeThreshold { value: f64, reason: &'static str },

    /// At least one question must be allowed.
    #[error("Invalid max questions {value}: {reason}")]
    InvalidMaxQuestions { value: u32, reason: &'static str },

    // ---- Concurrency ----
    #[error("Invalid max commit retries {value}: {reason}")]
    InvalidMaxCommitRetries { value: u32, reason: &'static str },

    // ---- Selection ----
    #[error("Invalid exposure control {policy:?}: {reason}")]
    InvalidExposureControl { policy: ExposureControl, reason: &'static str },

    // ---- Estimation ----
    #[error("Invalid estimator options: {0}")]
    Estimator(#[from] EstimationError),

    // ---- Loading ----
    #[error("Failed to read config file: {text}")]
    Io { text: String },

    #[error("Failed to parse config: {text}")]
    Parse { text: String },
}

fn default_se_convergence_threshold() -> f64 {
    DEFAULT_SE_CONVERGENCE_THRESHOLD
}

fn default_max_questions() -> u32 {
    DEFAULT_MAX_QUESTIONS
}

fn default_max_commit_retries() -> u32 {
    DEFAULT_MAX_COMMIT_RETRIES
}

/// Tunables of the assessment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stop once the standard error drops below this value.
    #[serde(default = "default_se_convergence_threshold")]
    pub se_convergence_threshold: f64,

    /// Stop once this many questions were answered.
    #[serde(default = "default_max_questions")]
    pub max_questions: u32,

    /// θ search settings.
    #[serde(default)]
    pub estimator: EstimatorOptions,

    /// Exposure-control policy for item selection.
    #[serde(default)]
    pub exposure: ExposureControl,

    /// Seed for randomesque selection; `None` seeds from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Reload-and-retry attempts on a session version conflict.
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            se_convergence_threshold: default_se_convergence_threshold(),
            max_questions: default_max_questions(),
            estimator: EstimatorOptions::default(),
            exposure: ExposureControl::default(),
            seed: None,
            max_commit_retries: default_max_commit_retries(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse { text: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Io { text: e.to_string() })?;
        Self::from_toml_str(&contents)
    }

    /// Check every field.
    ///
    /// # Errors
    /// The first violated constraint, as the matching [`ConfigError`].
    pub fn validate(&self) -> ConfigResult<()> {
        let threshold = self.se_convergence_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidSeThreshold {
                value: threshold,
                reason: "SE threshold must be finite and strictly positive.",
            });
        }
        if self.max_questions == 0 {
            return Err(ConfigError::InvalidMaxQuestions {
                value: self.max_questions,
                reason: "At least one question must be allowed.",
            });
        }
        if self.max_commit_retries == 0 {
            return Err(ConfigError::InvalidMaxCommitRetries {
                value: self.max_commit_retries,
                reason: "At least one commit attempt must be allowed.",
            });
        }
        self.estimator.validate()?;
        self.exposure.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = EngineConfig::default();
        assert_eq!(config.se_convergence_threshold, 0.3);
        assert_eq!(config.max_questions, 30);
        assert_eq!(config.exposure, ExposureControl::Randomesque { top_k: 3 });
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
            max_questions = 20
            seed = 7

            [exposure]
            policy = "max_information"

            [estimator]
            bounds = [-3.0, 3.0]
        "#;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.max_questions, 20);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.exposure, ExposureControl::MaxInformation);
        assert_eq!(config.estimator.bounds, (-3.0, 3.0));
        assert_eq!(config.estimator.max_iters, 500);
        assert_eq!(config.se_convergence_threshold, 0.3);
    }

    #[test]
    fn validate_rejects_out_of_domain_values() {
        let bad_threshold = EngineConfig { se_convergence_threshold: 0.0, ..Default::default() };
        assert!(matches!(bad_threshold.validate(), Err(ConfigError::InvalidSeThreshold { .. })));

        let bad_max = EngineConfig { max_questions: 0, ..Default::default() };
        assert!(matches!(bad_max.validate(), Err(ConfigError::InvalidMaxQuestions { .. })));

        let bad_retries = EngineConfig { max_commit_retries: 0, ..Default::default() };
        assert!(matches!(
            bad_retries.validate(),
            Err(ConfigError::InvalidMaxCommitRetries { .. })
        ));

        let bad_exposure = EngineConfig {
            exposure: ExposureControl::Randomesque { top_k: 0 },
            ..Default::default()
        };
        assert!(matches!(
            bad_exposure.validate(),
            Err(ConfigError::InvalidExposureControl { .. })
        ));
    }

    #[test]
    fn from_toml_str_rejects_invalid_estimator_and_syntax() {
        let toml = "[estimator]\nbounds = [2.0, -2.0]\n";
        assert!(matches!(
            EngineConfig::from_toml_str(toml),
            Err(ConfigError::Estimator(EstimationError::InvalidBounds { .. }))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("max_questions = \"many\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/adaptive_irt.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
