//! Engine manager state and the manager that transitions it.
//!
//! [`EngineManagerState`] is a plain value: the caller owns it, threads it
//! through every operation, and may serialize it to share with other
//! devices in a session. [`EngineManager`] holds the catalog and
//! configuration; every operation borrows a state and returns a new one.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::ManagerConfig;
use crate::error::{ConfigError, StateError};
use crate::findings::FindingSnapshot;
use crate::patient::PatientAge;

mod evaluator;
mod lifecycle;
mod sequencer;

/// Namespace for deriving activation ids.
const ACTIVATION_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a7e_93d4_4b0e_8a51_c3e2_07f9_d416);

static DEFAULT_MANAGER: OnceLock<EngineManager<'static>> = OnceLock::new();

/// Identifier of a single activation.
///
/// Derived from the engine id and the state's activation counter, so
/// replaying the same operations yields the same ids, and two activations of
/// one engine across a deactivate/reactivate cycle remain distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivationId(Uuid);

impl ActivationId {
    fn derive(engine_id: &str, ordinal: u64) -> Self {
        let name = format!("{engine_id}#{ordinal}");
        Self(Uuid::new_v5(&ACTIVATION_NAMESPACE, name.as_bytes()))
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A live or historical instance of an engine having fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineActivation {
    /// Deterministic id, unique per state.
    pub id: ActivationId,
    /// Engine that fired.
    pub engine_id: String,
    /// The snapshot that caused the activation.
    pub findings: FindingSnapshot,
    /// When the activation was created.
    pub activated_at: DateTime<Utc>,
    /// Completed action ids in completion order, each at most once.
    pub completed_actions: Vec<String>,
}

impl EngineActivation {
    /// Returns true if `action_id` has been completed.
    #[must_use]
    pub fn is_completed(&self, action_id: &str) -> bool {
        self.completed_actions.iter().any(|a| a == action_id)
    }

    /// Number of completed actions.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_actions.len()
    }
}

/// One evaluated snapshot, tagged with when it was evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    /// The evaluated snapshot.
    pub findings: FindingSnapshot,
    /// Weight passed to the evaluation, unvalidated.
    #[serde(with = "crate::value::lossless_f64")]
    pub weight_kg: f64,
    /// Age passed to the evaluation.
    pub age: PatientAge,
    /// When the snapshot was evaluated.
    pub evaluated_at: DateTime<Utc>,
}

/// Aggregate state of all protocols during one encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineManagerState {
    /// Fingerprint of the catalog this state was created against.
    pub catalog_fingerprint: String,
    /// At most one activation per engine id, in activation order.
    pub active_engines: Vec<EngineActivation>,
    /// Deactivated activations, kept for audit.
    pub completed_engines: Vec<EngineActivation>,
    /// Every evaluated snapshot, append-only.
    pub assessment_history: Vec<AssessmentRecord>,
    /// Number of activations ever created in this state's lineage.
    #[serde(default)]
    pub activations_created: u64,
}

impl EngineManagerState {
    /// Empty state: nothing active, nothing completed, no history.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            catalog_fingerprint: catalog.fingerprint().to_string(),
            active_engines: Vec::new(),
            completed_engines: Vec::new(),
            assessment_history: Vec::new(),
            activations_created: 0,
        }
    }

    /// Live activation of `engine_id`.
    #[must_use]
    pub fn find_active(&self, engine_id: &str) -> Option<&EngineActivation> {
        self.active_engines.iter().find(|a| a.engine_id == engine_id)
    }

    /// Returns true if `engine_id` has a live activation.
    #[must_use]
    pub fn is_engine_active(&self, engine_id: &str) -> bool {
        self.find_active(engine_id).is_some()
    }

    /// True when a deactivated record for `engine_id` is held for audit.
    #[must_use]
    pub fn was_deactivated(&self, engine_id: &str) -> bool {
        self.completed_engines.iter().any(|a| a.engine_id == engine_id)
    }

    /// Engine ids of live activations, in activation order.
    pub fn active_engine_ids(&self) -> impl Iterator<Item = &str> {
        self.active_engines.iter().map(|a| a.engine_id.as_str())
    }

    /// The most recently evaluated snapshot, if any.
    #[must_use]
    pub fn latest_assessment(&self) -> Option<&AssessmentRecord> {
        self.assessment_history.last()
    }

    /// Serializes the state for transfer.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a transferred state and checks it against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `StateError::Json` on malformed input, or a consistency error
    /// from [`validate`](Self::validate).
    pub fn from_json(json: &str, catalog: &Catalog) -> Result<Self, StateError> {
        let state: Self = serde_json::from_str(json)?;
        state.validate(catalog)?;
        Ok(state)
    }

    /// Checks that the state was produced against `catalog`, that every
    /// engine and action id resolves in it, that no engine has two live
    /// activations, and that no action is completed twice.
    ///
    /// # Errors
    ///
    /// Returns `StateError::CatalogMismatch` when the recorded fingerprint
    /// differs from `catalog`'s, otherwise the first inconsistency found.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), StateError> {
        if self.catalog_fingerprint != catalog.fingerprint() {
            return Err(StateError::CatalogMismatch {
                expected: catalog.fingerprint().to_string(),
                found: self.catalog_fingerprint.clone(),
            });
        }

        for activation in self.active_engines.iter().chain(&self.completed_engines) {
            let Some(def) = catalog.lookup(&activation.engine_id) else {
                return Err(StateError::UnknownEngine {
                    engine_id: activation.engine_id.clone(),
                });
            };
            for (i, action_id) in activation.completed_actions.iter().enumerate() {
                if !def.has_action(action_id) {
                    return Err(StateError::UnknownAction {
                        engine_id: activation.engine_id.clone(),
                        action_id: action_id.clone(),
                    });
                }
                if activation.completed_actions[..i].contains(action_id) {
                    return Err(StateError::DuplicateCompletion {
                        engine_id: activation.engine_id.clone(),
                        action_id: action_id.clone(),
                    });
                }
            }
        }

        for activation in &self.active_engines {
            let count = self
                .active_engines
                .iter()
                .filter(|a| a.engine_id == activation.engine_id)
                .count();
            if count > 1 {
                return Err(StateError::DuplicateActivation {
                    engine_id: activation.engine_id.clone(),
                    count,
                });
            }
        }
        Ok(())
    }

    /// Appends a fresh activation with an empty completed set.
    fn push_activation(
        &mut self,
        engine_id: &str,
        findings: FindingSnapshot,
        at: DateTime<Utc>,
    ) -> ActivationId {
        self.activations_created += 1;
        let id = ActivationId::derive(engine_id, self.activations_created);
        self.active_engines.push(EngineActivation {
            id,
            engine_id: engine_id.to_string(),
            findings,
            activated_at: at,
            completed_actions: Vec::new(),
        });
        id
    }
}

/// Applies protocol operations to manager states using one catalog and one
/// configuration.
#[derive(Debug, Clone)]
pub struct EngineManager<'c> {
    catalog: &'c Catalog,
    config: ManagerConfig,
}

impl<'c> EngineManager<'c> {
    /// Creates a manager after validating `config` against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configuration is invalid.
    pub fn new(catalog: &'c Catalog, config: ManagerConfig) -> Result<Self, ConfigError> {
        config.validate(catalog)?;
        Ok(Self { catalog, config })
    }

    /// Catalog this manager resolves engines against.
    #[must_use]
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Empty state bound to this manager's catalog.
    #[must_use]
    pub fn create_state(&self) -> EngineManagerState {
        EngineManagerState::new(self.catalog)
    }
}

impl EngineManager<'static> {
    /// The built-in catalog with default configuration.
    #[must_use]
    pub fn builtin() -> &'static Self {
        DEFAULT_MANAGER.get_or_init(|| Self {
            catalog: Catalog::builtin(),
            config: ManagerConfig::default(),
        })
    }
}
