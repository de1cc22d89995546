//! Pipeline behavior configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Upper bound for the claim lease: one day.
const MAX_CLAIM_LEASE_SECS: i64 = 24 * 60 * 60;

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Open a new pipeline group as soon as a group completes its final step
    #[serde(default = "default_auto_restart")]
    pub auto_restart: bool,

    /// Seconds after which an unfinished claim on the factory build step is
    /// considered abandoned and may be taken over by a retry
    #[serde(default = "default_claim_lease_secs")]
    pub claim_lease_secs: i64,
}

impl PipelineConfig {
    /// # Errors
    ///
    /// `InvalidClaimLease` unless the lease is between one second and one day.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_CLAIM_LEASE_SECS).contains(&self.claim_lease_secs) {
            return Err(ValidationError::InvalidClaimLease(self.claim_lease_secs));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_restart: default_auto_restart(),
            claim_lease_secs: default_claim_lease_secs(),
        }
    }
}

fn default_auto_restart() -> bool {
    true
}

fn default_claim_lease_secs() -> i64 {
    15 * 60
}
