//! Engine manager configuration.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Tier};
use crate::error::ConfigError;

/// What the evaluator does when a deactivated engine's trigger fires again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetriggerPolicy {
    /// A dismissed engine stays dormant until `reactivate_engine` is called.
    #[default]
    RequireExplicitReactivation,
    /// The evaluator creates a fresh activation whenever the trigger holds
    /// and the engine is not live.
    Automatic,
}

/// Configuration for an [`EngineManager`](crate::EngineManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// What happens when a deactivated engine's trigger holds again.
    pub retrigger_policy: RetriggerPolicy,
    /// Catalog tiers the evaluator considers.
    pub enabled_tiers: Vec<Tier>,
    /// Engines the evaluator never triggers. `reactivate_engine` still
    /// works for them.
    pub disabled_engines: Vec<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            retrigger_policy: RetriggerPolicy::default(),
            enabled_tiers: vec![Tier::Minutes, Tier::Hours],
            disabled_engines: Vec::new(),
        }
    }
}

impl ManagerConfig {
    /// Parses a JSON configuration and validates it against `catalog`.
    /// Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed JSON, or a validation error.
    pub fn from_json(json: &str, catalog: &Catalog) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate(catalog)?;
        Ok(config)
    }

    /// Checks the configuration against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoTiersEnabled` if no tier is enabled, or
    /// `ConfigError::UnknownEngine` for a disabled id the catalog lacks.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ConfigError> {
        if self.enabled_tiers.is_empty() {
            return Err(ConfigError::NoTiersEnabled);
        }
        if let Some(unknown) = self.disabled_engines.iter().find(|id| !catalog.contains(id)) {
            return Err(ConfigError::UnknownEngine {
                engine_id: unknown.clone(),
            });
        }
        Ok(())
    }

    /// Returns true if the evaluator considers `tier`.
    #[must_use]
    pub fn is_tier_enabled(&self, tier: Tier) -> bool {
        self.enabled_tiers.contains(&tier)
    }

    /// Returns true if `engine_id` is excluded from evaluation.
    #[must_use]
    pub fn is_engine_disabled(&self, engine_id: &str) -> bool {
        self.disabled_engines.iter().any(|id| id == engine_id)
    }
}
