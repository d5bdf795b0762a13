//! Action sequencing within a live activation.

use super::{EngineActivation, EngineManager, EngineManagerState};
use crate::catalog::ActionDefinition;

impl<'c> EngineManager<'c> {
    /// The lowest-sequence action of `activation`'s engine not yet completed.
    ///
    /// `None` when every action is done or the engine is not in the catalog.
    #[must_use]
    pub fn current_action(&self, activation: &EngineActivation) -> Option<&'c ActionDefinition> {
        self.pending_actions(activation).next()
    }

    /// Uncompleted actions in ascending sequence order.
    pub fn pending_actions<'a>(
        &self,
        activation: &'a EngineActivation,
    ) -> impl Iterator<Item = &'c ActionDefinition> + 'a
    where
        'c: 'a,
    {
        self.catalog
            .lookup(&activation.engine_id)
            .into_iter()
            .flat_map(|def| def.actions.iter())
            .filter(move |action| !activation.is_completed(&action.id))
    }

    /// Marks `action_id` done on the live activation of `engine_id`.
    ///
    /// Returns the state unchanged when the engine is not active, the action
    /// is not one of the engine's, or it is already completed.
    #[must_use]
    pub fn complete_action(
        &self,
        state: &EngineManagerState,
        engine_id: &str,
        action_id: &str,
    ) -> EngineManagerState {
        let mut next = state.clone();
        let Some(activation) = next
            .active_engines
            .iter_mut()
            .find(|a| a.engine_id == engine_id)
        else {
            tracing::debug!(engine_id, action_id, "complete ignored, engine not active");
            return next;
        };

        let known = self
            .catalog
            .lookup(engine_id)
            .is_some_and(|def| def.has_action(action_id));
        if !known {
            tracing::debug!(engine_id, action_id, "complete ignored, unknown action");
            return next;
        }
        if activation.is_completed(action_id) {
            tracing::debug!(engine_id, action_id, "complete ignored, already done");
            return next;
        }

        activation.completed_actions.push(action_id.to_string());
        tracing::info!(
            engine_id,
            action_id,
            completed = activation.completed_actions.len(),
            "action completed"
        );
        next
    }
}
