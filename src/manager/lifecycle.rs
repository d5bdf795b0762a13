//! Explicit deactivate and reactivate transitions.

use chrono::{DateTime, Utc};

use super::{EngineManager, EngineManagerState};
use crate::findings::FindingSnapshot;

impl EngineManager<'_> {
    /// Moves the live activation of `engine_id` to the completed list,
    /// however many of its actions are done. No-op when it is not active.
    #[must_use]
    pub fn deactivate(&self, state: &EngineManagerState, engine_id: &str) -> EngineManagerState {
        let mut next = state.clone();
        let Some(pos) = next.active_engines.iter().position(|a| a.engine_id == engine_id) else {
            tracing::debug!(engine_id, "deactivate ignored, engine not active");
            return next;
        };
        let activation = next.active_engines.remove(pos);
        tracing::info!(
            engine_id,
            activation_id = %activation.id,
            completed = activation.completed_actions.len(),
            "engine deactivated"
        );
        next.completed_engines.push(activation);
        next
    }

    /// Returns `engine_id` to active with a fresh activation triggered by
    /// `findings`. Stamped with the current time.
    #[must_use]
    pub fn reactivate(
        &self,
        state: &EngineManagerState,
        engine_id: &str,
        findings: &FindingSnapshot,
    ) -> EngineManagerState {
        self.reactivate_at(state, engine_id, findings, Utc::now())
    }

    /// Drops any completed record of `engine_id` and appends a new activation
    /// with an empty completed set.
    ///
    /// No-op when the engine is already live or not in the catalog. The
    /// evaluator's tier and disabled-engine filters do not apply here.
    #[must_use]
    pub fn reactivate_at(
        &self,
        state: &EngineManagerState,
        engine_id: &str,
        findings: &FindingSnapshot,
        at: DateTime<Utc>,
    ) -> EngineManagerState {
        let mut next = state.clone();
        if !self.catalog.contains(engine_id) {
            tracing::debug!(engine_id, "reactivate ignored, unknown engine");
            return next;
        }
        if next.is_engine_active(engine_id) {
            tracing::debug!(engine_id, "reactivate ignored, engine already active");
            return next;
        }
        next.completed_engines.retain(|a| a.engine_id != engine_id);
        let id = next.push_activation(engine_id, findings.clone(), at);
        tracing::info!(engine_id, activation_id = %id, "engine reactivated");
        next
    }

    /// Returns true if `engine_id` has a live activation in `state`.
    #[must_use]
    pub fn is_engine_active(&self, state: &EngineManagerState, engine_id: &str) -> bool {
        state.is_engine_active(engine_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::keys;
    use crate::patient::PatientAge;

    fn seizing() -> FindingSnapshot {
        FindingSnapshot::builder().finding(keys::SEIZURES, true).build()
    }

    fn started() -> EngineManagerState {
        let manager = EngineManager::builtin();
        let state = manager.evaluate(
            &seizing(),
            12.0,
            PatientAge::from_years(3),
            &manager.create_state(),
        );
        manager.complete_action(&state, "status-epilepticus", "airway-oxygen")
    }

    #[test]
    fn test_deactivate_moves_to_completed() {
        let manager = EngineManager::builtin();
        let state = manager.deactivate(&started(), "status-epilepticus");
        assert!(!manager.is_engine_active(&state, "status-epilepticus"));
        assert_eq!(state.completed_engines.len(), 1);
        assert_eq!(state.completed_engines[0].completed_count(), 1);
    }

    #[test]
    fn test_deactivate_inactive_is_no_op() {
        let manager = EngineManager::builtin();
        let state = started();
        assert_eq!(manager.deactivate(&state, "croup"), state);
        assert_eq!(manager.deactivate(&state, "not-a-protocol"), state);
    }

    #[test]
    fn test_reactivate_starts_fresh() {
        let manager = EngineManager::builtin();
        let before = started();
        let old_id = before.find_active("status-epilepticus").unwrap().id;
        let state = manager.deactivate(&before, "status-epilepticus");

        let followup = FindingSnapshot::builder()
            .finding(keys::SEIZURES, true)
            .finding(keys::SEIZURE_DURATION, 12)
            .build();
        let state = manager.reactivate(&state, "status-epilepticus", &followup);
        let activation = state.find_active("status-epilepticus").unwrap();
        assert!(activation.completed_actions.is_empty());
        assert_eq!(activation.findings, followup);
        assert_ne!(activation.id, old_id);
        assert!(!state.was_deactivated("status-epilepticus"));
    }

    #[test]
    fn test_reactivate_live_or_unknown_is_no_op() {
        let manager = EngineManager::builtin();
        let state = started();
        assert_eq!(manager.reactivate(&state, "status-epilepticus", &seizing()), state);
        assert_eq!(manager.reactivate(&state, "not-a-protocol", &seizing()), state);
    }

    #[test]
    fn test_reactivate_never_triggered_engine() {
        let manager = EngineManager::builtin();
        let state = manager.reactivate(&started(), "croup", &FindingSnapshot::new());
        assert!(state.is_engine_active("croup"));
        assert_eq!(state.active_engines.len(), 2);
    }
}
