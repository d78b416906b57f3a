use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Upper bound on reconciliation rounds after a thread-by-thread suspend pass
const MAX_RECONCILE_ROUNDS: u32 = 8;

/// Windows refuses to suspend a thread more than 127 times
const MAX_RESUME_PASSES: u32 = 128;

/// Configuration shared by all suspension drivers
///
/// The Unix driver has no tunables; the values only affect drivers that
/// suspend a process one thread at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), build_fn(validate = "Self::validate_builder"))]
pub struct DriverConfig {
    /// Number of re-enumeration rounds after the first suspend pass.
    /// Threads created after the last round are not covered.
    #[serde(default = "default_reconcile_rounds")]
    #[builder(default = "default_reconcile_rounds()")]
    pub reconcile_rounds: u32,

    /// Maximum resume calls per thread when bringing it back to running
    #[serde(default = "default_max_resume_passes")]
    #[builder(default = "default_max_resume_passes()")]
    pub max_resume_passes: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            reconcile_rounds: default_reconcile_rounds(),
            max_resume_passes: default_max_resume_passes(),
        }
    }
}

impl DriverConfig {
    /// Create a new DriverConfig with sensible defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::default()
    }

    /// Config for targets that spawn threads aggressively
    pub fn strict() -> Self {
        Self {
            reconcile_rounds: 5,
            ..Self::default()
        }
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.reconcile_rounds > MAX_RECONCILE_ROUNDS {
            return Err(anyhow::anyhow!(
                "reconcile_rounds should not exceed {MAX_RECONCILE_ROUNDS}"
            ));
        }

        if self.max_resume_passes == 0 {
            return Err(anyhow::anyhow!("max_resume_passes must be at least 1"));
        }

        if self.max_resume_passes > MAX_RESUME_PASSES {
            return Err(anyhow::anyhow!(
                "max_resume_passes should not exceed {MAX_RESUME_PASSES}"
            ));
        }

        Ok(())
    }
}

impl DriverConfigBuilder {
    fn validate_builder(&self) -> Result<(), String> {
        let config = DriverConfig {
            reconcile_rounds: self.reconcile_rounds.unwrap_or_else(default_reconcile_rounds),
            max_resume_passes: self
                .max_resume_passes
                .unwrap_or_else(default_max_resume_passes),
        };
        config.validate().map_err(|e| e.to_string())
    }
}

// Default value functions for serde
fn default_reconcile_rounds() -> u32 {
    2
}
fn default_max_resume_passes() -> u32 {
    MAX_RESUME_PASSES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconcile_rounds, 2);
        assert_eq!(config.max_resume_passes, 128);
    }

    #[test]
    fn test_strict_config() {
        let config = DriverConfig::strict();
        assert!(config.validate().is_ok());
        assert_eq!(config.reconcile_rounds, 5);
    }

    #[test]
    fn test_invalid_config() {
        let mut config = DriverConfig {
            reconcile_rounds: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.reconcile_rounds = 0;
        assert!(config.validate().is_ok());

        config.max_resume_passes = 0;
        assert!(config.validate().is_err());

        config.max_resume_passes = 129;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder() {
        let config = DriverConfig::builder().reconcile_rounds(3u32).build().unwrap();
        assert_eq!(config.reconcile_rounds, 3);
        assert_eq!(config.max_resume_passes, 128);

        let err = DriverConfig::builder().max_resume_passes(0u32).build();
        assert!(err.is_err());
    }

    #[test]
    fn test_serialization() {
        let config = DriverConfig::strict();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("reconcileRounds"));
        let deserialized: DriverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: DriverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DriverConfig::default());
    }
}
