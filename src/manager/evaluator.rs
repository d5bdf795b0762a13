//! Trigger evaluation: snapshot in, newly satisfied engines activated.

use chrono::{DateTime, Utc};

use super::{AssessmentRecord, EngineManager, EngineManagerState};
use crate::catalog::TriggerContext;
use crate::config::RetriggerPolicy;
use crate::findings::FindingSnapshot;
use crate::patient::PatientAge;

impl EngineManager<'_> {
    /// Records `findings` in the assessment history and activates every
    /// catalog engine whose trigger now holds and which is not already live.
    ///
    /// Stamped with the current time; see [`evaluate_at`](Self::evaluate_at).
    #[must_use]
    pub fn evaluate(
        &self,
        findings: &FindingSnapshot,
        weight_kg: f64,
        age: PatientAge,
        state: &EngineManagerState,
    ) -> EngineManagerState {
        self.evaluate_at(findings, weight_kg, age, state, Utc::now())
    }

    /// [`evaluate`](Self::evaluate) with an explicit evaluation time. Equal
    /// inputs produce equal states.
    #[must_use]
    pub fn evaluate_at(
        &self,
        findings: &FindingSnapshot,
        weight_kg: f64,
        age: PatientAge,
        state: &EngineManagerState,
        at: DateTime<Utc>,
    ) -> EngineManagerState {
        let mut next = state.clone();
        next.assessment_history.push(AssessmentRecord {
            findings: findings.clone(),
            weight_kg,
            age,
            evaluated_at: at,
        });

        let ctx = TriggerContext::new(findings, weight_kg, age);
        let mut triggered = 0usize;
        for engine in self.catalog.iter() {
            if !self.config.is_tier_enabled(engine.tier)
                || self.config.is_engine_disabled(&engine.id)
                || next.is_engine_active(&engine.id)
            {
                continue;
            }
            if self.config.retrigger_policy == RetriggerPolicy::RequireExplicitReactivation
                && next.was_deactivated(&engine.id)
            {
                if engine.triggers(&ctx) {
                    tracing::debug!(
                        engine_id = %engine.id,
                        "trigger holds for dismissed engine, awaiting explicit reactivation"
                    );
                }
                continue;
            }
            if engine.triggers(&ctx) {
                let id = next.push_activation(&engine.id, findings.clone(), at);
                triggered += 1;
                tracing::info!(
                    engine_id = %engine.id,
                    activation_id = %id,
                    severity = %engine.severity,
                    "engine activated"
                );
            }
        }

        tracing::debug!(
            findings = findings.len(),
            triggered,
            active = next.active_engines.len(),
            history = next.assessment_history.len(),
            "assessment evaluated"
        );
        next
    }
}
