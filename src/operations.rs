//! Free-function surface over the built-in catalog and default configuration.
//!
//! Each function delegates to [`EngineManager::builtin`]. Callers needing a
//! custom catalog or configuration use an [`EngineManager`] directly.

use crate::catalog::ActionDefinition;
use crate::findings::FindingSnapshot;
use crate::manager::{EngineActivation, EngineManager, EngineManagerState};
use crate::patient::PatientAge;
use crate::report::EngineStatus;

/// Empty state: no active or completed engines, no history.
#[must_use]
pub fn create_engine_manager() -> EngineManagerState {
    EngineManager::builtin().create_state()
}

/// See [`EngineManager::evaluate`].
#[must_use]
pub fn evaluate_and_trigger_engines(
    findings: &FindingSnapshot,
    weight_kg: f64,
    age: PatientAge,
    state: &EngineManagerState,
) -> EngineManagerState {
    EngineManager::builtin().evaluate(findings, weight_kg, age, state)
}

/// See [`EngineManager::complete_action`].
#[must_use]
pub fn complete_action(
    state: &EngineManagerState,
    engine_id: &str,
    action_id: &str,
) -> EngineManagerState {
    EngineManager::builtin().complete_action(state, engine_id, action_id)
}

/// Lowest-sequence action not yet completed.
#[must_use]
pub fn get_current_action(activation: &EngineActivation) -> Option<&'static ActionDefinition> {
    EngineManager::builtin().current_action(activation)
}

/// `None` when the activation's engine is not in the built-in catalog.
#[must_use]
pub fn get_engine_status(activation: &EngineActivation) -> Option<EngineStatus> {
    EngineManager::builtin().engine_status(activation)
}

/// Status of every live activation, in activation order.
#[must_use]
pub fn get_all_engine_statuses(state: &EngineManagerState) -> Vec<EngineStatus> {
    EngineManager::builtin().all_engine_statuses(state)
}

/// See [`EngineManager::deactivate`].
#[must_use]
pub fn deactivate_engine(state: &EngineManagerState, engine_id: &str) -> EngineManagerState {
    EngineManager::builtin().deactivate(state, engine_id)
}

/// See [`EngineManager::reactivate`].
#[must_use]
pub fn reactivate_engine(
    state: &EngineManagerState,
    engine_id: &str,
    findings: &FindingSnapshot,
) -> EngineManagerState {
    EngineManager::builtin().reactivate(state, engine_id, findings)
}

/// Live activations, most severe first.
#[must_use]
pub fn get_engine_priority_queue(state: &EngineManagerState) -> Vec<EngineActivation> {
    EngineManager::builtin().priority_queue(state)
}

/// Returns true if any live engine is critical.
#[must_use]
pub fn has_critical_engines(state: &EngineManagerState) -> bool {
    EngineManager::builtin().has_critical_engines(state)
}

/// Live activations of critical engines.
#[must_use]
pub fn get_critical_engines(state: &EngineManagerState) -> Vec<EngineActivation> {
    EngineManager::builtin().critical_engines(state)
}

/// Returns true if `engine_id` has a live activation.
#[must_use]
pub fn is_engine_active(state: &EngineManagerState, engine_id: &str) -> bool {
    state.is_engine_active(engine_id)
}
