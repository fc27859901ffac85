use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Reconciliation policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconConfig {
    pub timestamp_policy: TimestampPolicy,
}

/// What to do when a tap-off is timestamped before the tap-on it closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Abort the pass with [`ReconError::OutOfOrderTaps`].
    #[default]
    Reject,
    /// Record a zero-second duration.
    Clamp,
    /// Record the negative duration as-is.
    PassThrough,
}

impl std::fmt::Display for TimestampPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Clamp => write!(f, "clamp"),
            Self::PassThrough => write!(f, "pass_through"),
        }
    }
}

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Apply the policy to a raw `end - start` duration in seconds.
    pub(crate) fn resolve_duration(
        &self,
        raw_secs: i64,
        start_id: i64,
        end_id: i64,
        pan: &str,
    ) -> Result<i64, ReconError> {
        if raw_secs >= 0 {
            return Ok(raw_secs);
        }
        match self.timestamp_policy {
            TimestampPolicy::Reject => Err(ReconError::OutOfOrderTaps {
                start_id,
                end_id,
                pan: pan.to_string(),
            }),
            TimestampPolicy::Clamp => Ok(0),
            TimestampPolicy::PassThrough => Ok(raw_secs),
        }
    }
}
