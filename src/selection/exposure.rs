//! Exposure-control policies for item selection.
//!
//! Pure maximum-information selection always serves the same few
//! high-discrimination items to test takers near the same θ, so the selector
//! supports two hardening policies on top of the baseline:
//!
//! - `Randomesque { top_k }`: draw uniformly among the `top_k` most
//!   informative candidates.
//! - `MaxExposureRate { max_rate }`: skip candidates administered in at least
//!   `max_rate` of started sessions, falling back to the whole set when none
//!   remain.
//!
//! Serialized as a tagged table, e.g. `{ policy = "randomesque", top_k = 3 }`.
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigResult};

/// Default candidate-pool size for randomesque selection.
pub const DEFAULT_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ExposureControl {
    MaxInformation,
    Randomesque { top_k: usize },
    MaxExposureRate { max_rate: f64 },
}

impl ExposureControl {
    /// Check the policy parameters.
    ///
    /// # Errors
    /// [`ConfigError::InvalidExposureControl`] if `top_k == 0` or `max_rate`
    /// is not in `(0, 1]`.
    pub fn validate(&self) -> ConfigResult<()> {
        match *self {
            ExposureControl::MaxInformation => Ok(()),
            ExposureControl::Randomesque { top_k } if top_k == 0 => {
                Err(ConfigError::InvalidExposureControl {
                    policy: *self,
                    reason: "Randomesque top_k must be at least 1.",
                })
            }
            ExposureControl::Randomesque { .. } => Ok(()),
            ExposureControl::MaxExposureRate { max_rate } => {
                if max_rate.is_finite() && max_rate > 0.0 && max_rate <= 1.0 {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidExposureControl {
                        policy: *self,
                        reason: "Maximum exposure rate must lie in (0, 1].",
                    })
                }
            }
        }
    }
}

impl Default for ExposureControl {
    fn default() -> Self {
        ExposureControl::Randomesque { top_k: DEFAULT_TOP_K }
    }
}
