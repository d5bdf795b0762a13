//! Engine and action definitions.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::criterion::{Criterion, TriggerContext};
use crate::error::CatalogError;

/// Protocol severity. Drives priority ordering, independent of tier.
///
/// The derived ordering puts `Critical` first, so sorting by severity sorts
/// most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Immediately life-threatening.
    Critical,
    /// Needs treatment soon.
    Urgent,
    /// Advisory only.
    Info,
}

impl Severity {
    /// Priority rank, 0 = highest.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Urgent => 1,
            Self::Info => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Urgent => write!(f, "urgent"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// How soon a single action should happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Do now.
    Immediate,
    /// Do within minutes.
    Urgent,
    /// Do when the critical steps are covered.
    Routine,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::Urgent => write!(f, "urgent"),
            Self::Routine => write!(f, "routine"),
        }
    }
}

/// Informal time-to-harm classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Untreated harm within minutes. Action-rich protocols.
    Minutes,
    /// Untreated harm within hours. The long tail, stored as flatter records.
    Hours,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes => write!(f, "minutes"),
            Self::Hours => write!(f, "hours"),
        }
    }
}

/// Clinical category of a protocol.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Resuscitation,
    Respiratory,
    Cardiovascular,
    Neurological,
    Infectious,
    Allergic,
    Metabolic,
    Trauma,
    Toxicology,
    Gastrointestinal,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resuscitation => "resuscitation",
            Self::Respiratory => "respiratory",
            Self::Cardiovascular => "cardiovascular",
            Self::Neurological => "neurological",
            Self::Infectious => "infectious",
            Self::Allergic => "allergic",
            Self::Metabolic => "metabolic",
            Self::Trauma => "trauma",
            Self::Toxicology => "toxicology",
            Self::Gastrointestinal => "gastrointestinal",
        };
        write!(f, "{s}")
    }
}

/// One step of a protocol checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Unique within its engine.
    pub id: String,
    /// 1-based ordinal. Strictly increasing within an engine; gaps allowed.
    pub sequence: u32,
    /// Short imperative shown to the clinician.
    pub title: String,
    /// How soon the step should happen.
    pub urgency: Urgency,
    /// Dosing or technique note shown under the title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// An immutable protocol definition.
#[derive(Debug, Clone)]
pub struct EngineDefinition {
    /// Stable identifier, unique within a catalog.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Clinical category.
    pub category: Category,
    /// Priority severity.
    pub severity: Severity,
    /// Time-to-harm tier.
    pub tier: Tier,
    /// Predicate over an assessment that activates the engine.
    pub trigger: Criterion,
    /// Ordered by ascending `sequence`.
    pub actions: Vec<ActionDefinition>,
}

impl EngineDefinition {
    /// Starts a definition with the given id and display name.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> EngineDefinitionBuilder {
        EngineDefinitionBuilder::new(id.into(), name.into())
    }

    /// Evaluates the trigger predicate.
    #[must_use]
    pub fn triggers(&self, ctx: &TriggerContext<'_>) -> bool {
        self.trigger.matches(ctx)
    }

    /// Looks up an action by id.
    #[must_use]
    pub fn action(&self, action_id: &str) -> Option<&ActionDefinition> {
        self.actions.iter().find(|a| a.id == action_id)
    }

    /// Returns true if the engine defines `action_id`.
    #[must_use]
    pub fn has_action(&self, action_id: &str) -> bool {
        self.action(action_id).is_some()
    }

    /// Number of checklist steps.
    #[must_use]
    pub fn total_actions(&self) -> usize {
        self.actions.len()
    }
}

/// Builder for [`EngineDefinition`]. `build` checks the action list.
#[derive(Debug)]
pub struct EngineDefinitionBuilder {
    id: String,
    name: String,
    category: Category,
    severity: Severity,
    tier: Tier,
    trigger: Criterion,
    actions: Vec<ActionDefinition>,
}

impl EngineDefinitionBuilder {
    fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            category: Category::Resuscitation,
            severity: Severity::Info,
            tier: Tier::Hours,
            trigger: Criterion::Any(Vec::new()),
            actions: Vec::new(),
        }
    }

    /// Sets the clinical category.
    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Sets the severity. Defaults to `Info`.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the tier. Defaults to `Hours`.
    #[must_use]
    pub fn tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Sets the trigger. Defaults to a predicate that never holds.
    #[must_use]
    pub fn trigger(mut self, trigger: Criterion) -> Self {
        self.trigger = trigger;
        self
    }

    /// Adds an action with an explicit sequence number.
    #[must_use]
    pub fn action(
        mut self,
        sequence: u32,
        id: impl Into<String>,
        title: impl Into<String>,
        urgency: Urgency,
    ) -> Self {
        self.actions.push(ActionDefinition {
            id: id.into(),
            sequence,
            title: title.into(),
            urgency,
            detail: None,
        });
        self
    }

    /// Attaches a detail note to the most recently added action.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        if let Some(last) = self.actions.last_mut() {
            last.detail = Some(detail.into());
        }
        self
    }

    /// Appends actions numbered after the last one, in the given order.
    #[must_use]
    pub fn steps(mut self, steps: &[(&str, &str, Urgency)]) -> Self {
        let mut next = self.actions.last().map_or(1, |a| a.sequence + 1);
        for (id, title, urgency) in steps {
            self = self.action(next, *id, *title, *urgency);
            next += 1;
        }
        self
    }

    /// Validates and builds the definition.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the id is empty, an action id or title is
    /// empty, an action id repeats, or sequences are zero or not strictly
    /// increasing.
    pub fn build(self) -> Result<EngineDefinition, CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::EmptyEngineId);
        }

        let mut seen = HashSet::new();
        let mut previous = 0u32;
        for action in &self.actions {
            if action.id.trim().is_empty() {
                return Err(CatalogError::EmptyActionField {
                    engine_id: self.id,
                    field: "id",
                });
            }
            if action.title.trim().is_empty() {
                return Err(CatalogError::EmptyActionField {
                    engine_id: self.id,
                    field: "title",
                });
            }
            if !seen.insert(action.id.as_str()) {
                return Err(CatalogError::DuplicateAction {
                    engine_id: self.id.clone(),
                    action_id: action.id.clone(),
                });
            }
            if action.sequence <= previous {
                return Err(CatalogError::SequenceNotIncreasing {
                    engine_id: self.id.clone(),
                    action_id: action.id.clone(),
                    sequence: action.sequence,
                    previous,
                });
            }
            previous = action.sequence;
        }

        Ok(EngineDefinition {
            id: self.id,
            name: self.name,
            category: self.category,
            severity: self.severity,
            tier: self.tier,
            trigger: self.trigger,
            actions: self.actions,
        })
    }
}
