//! Error types for the protocol engine core.
//!
//! The state transitions themselves are total and never fail: stale engine
//! ids, unknown actions and duplicate completions are no-ops. Errors exist
//! only at the edges the crate owns: building the catalog, decoding a
//! transferred manager state, and validating configuration.

use thiserror::Error;

/// Integrity violations detected while building the engine catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// An engine was declared with an empty id.
    #[error("Engine id cannot be empty")]
    EmptyEngineId,

    /// Two engines share an id.
    #[error("Engine '{engine_id}' is defined more than once")]
    DuplicateEngine {
        /// The repeated engine id.
        engine_id: String,
    },

    /// An action is missing its id or title.
    #[error("Engine '{engine_id}' has an action with an empty {field}")]
    EmptyActionField {
        /// The engine owning the action.
        engine_id: String,
        /// Name of the empty field.
        field: &'static str,
    },

    /// Two actions of one engine share an id.
    #[error("Engine '{engine_id}' defines action '{action_id}' more than once")]
    DuplicateAction {
        /// The engine owning the actions.
        engine_id: String,
        /// The repeated action id.
        action_id: String,
    },

    /// Action sequence numbers are not strictly increasing.
    #[error(
        "Engine '{engine_id}' action '{action_id}' has sequence {sequence}, \
         expected greater than {previous}"
    )]
    SequenceNotIncreasing {
        /// The engine owning the action.
        engine_id: String,
        /// The out-of-order action.
        action_id: String,
        /// Sequence number of the out-of-order action.
        sequence: u32,
        /// Sequence number of the action before it.
        previous: u32,
    },

    /// A text criterion pattern failed to compile.
    #[error("Invalid text pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },
}

/// Errors decoding or checking a manager state received from elsewhere.
#[derive(Debug, Error)]
pub enum StateError {
    /// The payload is not a well-formed manager state.
    #[error("Manager state JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The state was produced against a different catalog.
    #[error("Manager state was built against catalog {found}, local catalog is {expected}")]
    CatalogMismatch {
        /// Fingerprint of the local catalog.
        expected: String,
        /// Fingerprint recorded in the state.
        found: String,
    },

    /// An activation names an engine the catalog lacks.
    #[error("Manager state references unknown engine '{engine_id}'")]
    UnknownEngine {
        /// The unknown engine id.
        engine_id: String,
    },

    /// More than one live activation of the same engine.
    #[error("Engine '{engine_id}' has {count} live activations, at most one is allowed")]
    DuplicateActivation {
        /// The engine with several live activations.
        engine_id: String,
        /// Number of live activations found.
        count: usize,
    },

    /// A completed action id is not part of the engine.
    #[error(
        "Activation of '{engine_id}' lists action '{action_id}' which the engine does not define"
    )]
    UnknownAction {
        /// The engine of the activation.
        engine_id: String,
        /// The unknown action id.
        action_id: String,
    },

    /// An action appears twice in the completed list.
    #[error(
        "Activation of '{engine_id}' lists action '{action_id}' as completed more than once"
    )]
    DuplicateCompletion {
        /// The engine of the activation.
        engine_id: String,
        /// The repeated action id.
        action_id: String,
    },
}

/// Invalid manager configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Every tier was switched off.
    #[error("At least one catalog tier must be enabled")]
    NoTiersEnabled,

    /// The disabled list names an engine the catalog lacks.
    #[error("Disabled engine '{engine_id}' is not in the catalog")]
    UnknownEngine {
        /// The unknown engine id.
        engine_id: String,
    },

    /// The configuration document is malformed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum ResusError {
    /// Catalog integrity failure.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Transferred state failure.
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Configuration failure.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ResusError {
    /// Returns true if this is a catalog integrity error.
    #[must_use]
    pub const fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog(_))
    }

    /// Returns true if this is a state decoding error.
    #[must_use]
    pub const fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Result type alias for fallible boundary operations.
pub type ResusResult<T> = Result<T, ResusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_sequence() {
        let err = CatalogError::SequenceNotIncreasing {
            engine_id: "septic-shock".to_string(),
            action_id: "fluids".to_string(),
            sequence: 2,
            previous: 3,
        };
        let msg = format!("{err}");
        assert!(msg.contains("septic-shock"));
        assert!(msg.contains("fluids"));
        assert!(msg.contains("greater than 3"));
    }

    #[test]
    fn test_state_error_unknown_engine() {
        let err = StateError::UnknownEngine {
            engine_id: "not-a-protocol".to_string(),
        };
        assert!(format!("{err}").contains("not-a-protocol"));
    }

    #[test]
    fn test_state_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StateError = json_err.into();
        assert!(format!("{err}").starts_with("Manager state JSON error"));
    }

    #[test]
    fn test_resus_error_classification() {
        let err: ResusError = CatalogError::EmptyEngineId.into();
        assert!(err.is_catalog());
        assert!(!err.is_state());

        let err: ResusError = ConfigError::NoTiersEnabled.into();
        assert!(err.is_config());
        assert!(format!("{err}").contains("At least one catalog tier"));

        let err: ResusError = StateError::DuplicateActivation {
            engine_id: "anaphylaxis".to_string(),
            count: 2,
        }
        .into();
        assert!(err.is_state());
    }
}
