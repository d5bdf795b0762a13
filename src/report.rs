//! Read-only status and priority projections over a manager state.

use serde::{Deserialize, Serialize};

use crate::catalog::{ActionDefinition, Severity};
use crate::manager::{EngineActivation, EngineManager, EngineManagerState};

/// Progress summary of one activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Engine id.
    pub engine_id: String,
    /// Display name.
    pub engine_name: String,
    /// Engine severity.
    pub severity: Severity,
    /// Actions the engine defines.
    pub total_actions: usize,
    /// Actions completed so far.
    pub completed_count: usize,
    /// `round(completed / total * 100)`, 100 for an engine with no actions.
    pub progress_percent: u8,
    /// Next action to perform. `None` once every action is done.
    pub current_action: Option<ActionDefinition>,
}

impl EngineStatus {
    /// Returns true if no action remains.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_action.is_none()
    }
}

/// Rounded completion percentage, half away from zero, clamped to 0..=100.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    // ratio is within [0, 1]
    (ratio * 100.0).round() as u8
}

impl EngineManager<'_> {
    /// Status of `activation`, or `None` if its engine is not in the catalog.
    #[must_use]
    pub fn engine_status(&self, activation: &EngineActivation) -> Option<EngineStatus> {
        let def = self.catalog().lookup(&activation.engine_id)?;
        let total_actions = def.total_actions();
        let completed_count = activation
            .completed_actions
            .iter()
            .filter(|id| def.has_action(id))
            .count();
        Some(EngineStatus {
            engine_id: def.id.clone(),
            engine_name: def.name.clone(),
            severity: def.severity,
            total_actions,
            completed_count,
            progress_percent: progress_percent(completed_count, total_actions),
            current_action: self.current_action(activation).cloned(),
        })
    }

    /// Statuses of every live activation, in activation order.
    #[must_use]
    pub fn all_engine_statuses(&self, state: &EngineManagerState) -> Vec<EngineStatus> {
        state
            .active_engines
            .iter()
            .filter_map(|a| self.engine_status(a))
            .collect()
    }

    /// Live activations ordered critical, urgent, info. Equal severities
    /// keep activation order; engines missing from the catalog sort last.
    #[must_use]
    pub fn priority_queue(&self, state: &EngineManagerState) -> Vec<EngineActivation> {
        let mut queue = state.active_engines.clone();
        queue.sort_by_key(|a| self.severity_rank(a));
        queue
    }

    /// Returns true if any live activation belongs to a critical engine.
    #[must_use]
    pub fn has_critical_engines(&self, state: &EngineManagerState) -> bool {
        state.active_engines.iter().any(|a| self.is_critical(a))
    }

    /// Live critical activations in activation order.
    #[must_use]
    pub fn critical_engines(&self, state: &EngineManagerState) -> Vec<EngineActivation> {
        state
            .active_engines
            .iter()
            .filter(|a| self.is_critical(a))
            .cloned()
            .collect()
    }

    fn severity_rank(&self, activation: &EngineActivation) -> u8 {
        self.catalog()
            .lookup(&activation.engine_id)
            .map_or(u8::MAX, |def| def.severity.rank())
    }

    fn is_critical(&self, activation: &EngineActivation) -> bool {
        self.catalog()
            .lookup(&activation.engine_id)
            .is_some_and(|def| def.severity == Severity::Critical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{keys, FindingSnapshot};
    use crate::patient::PatientAge;

    fn croup_then_seizure() -> EngineManagerState {
        let manager = EngineManager::builtin();
        let age = PatientAge::from_years(2);
        let croup = FindingSnapshot::builder()
            .finding(keys::BARKING_COUGH, true)
            .finding(keys::STRIDOR, true)
            .build();
        let seizing = FindingSnapshot::builder().finding(keys::SEIZURES, true).build();
        let state = manager.evaluate(&croup, 12.0, age, &manager.create_state());
        manager.evaluate(&seizing, 12.0, age, &state)
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 6), 0);
        assert_eq!(progress_percent(1, 6), 17);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(6, 6), 100);
        assert_eq!(progress_percent(0, 0), 100);
        assert_eq!(progress_percent(9, 3), 100);
    }

    #[test]
    fn test_engine_status() {
        let manager = EngineManager::builtin();
        let state = croup_then_seizure();
        let state = manager.complete_action(&state, "croup", "dexamethasone");
        let status = manager
            .engine_status(state.find_active("croup").unwrap())
            .unwrap();
        assert_eq!(status.engine_name, "Croup");
        assert_eq!(status.severity, Severity::Urgent);
        assert_eq!(status.total_actions, 3);
        assert_eq!(status.completed_count, 1);
        assert_eq!(status.progress_percent, 33);
        assert_eq!(status.current_action.unwrap().id, "nebulised-epinephrine");
    }

    #[test]
    fn test_all_statuses_in_activation_order() {
        let manager = EngineManager::builtin();
        let ids: Vec<_> = manager
            .all_engine_statuses(&croup_then_seizure())
            .into_iter()
            .map(|s| s.engine_id)
            .collect();
        assert_eq!(ids, vec!["croup", "status-epilepticus"]);
    }

    #[test]
    fn test_priority_queue_puts_critical_first() {
        let manager = EngineManager::builtin();
        let state = croup_then_seizure();
        let queue: Vec<_> = manager
            .priority_queue(&state)
            .into_iter()
            .map(|a| a.engine_id)
            .collect();
        assert_eq!(queue, vec!["status-epilepticus", "croup"]);
        assert_eq!(state.active_engines[0].engine_id, "croup");
    }

    #[test]
    fn test_critical_filters() {
        let manager = EngineManager::builtin();
        let state = croup_then_seizure();
        assert!(manager.has_critical_engines(&state));
        let critical = manager.critical_engines(&state);
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].engine_id, "status-epilepticus");

        let state = manager.deactivate(&state, "status-epilepticus");
        assert!(!manager.has_critical_engines(&state));
        assert!(manager.critical_engines(&state).is_empty());
    }

    #[test]
    fn test_empty_state_reports_nothing() {
        let manager = EngineManager::builtin();
        let state = manager.create_state();
        assert!(manager.all_engine_statuses(&state).is_empty());
        assert!(manager.priority_queue(&state).is_empty());
        assert!(!manager.has_critical_engines(&state));
    }
}
