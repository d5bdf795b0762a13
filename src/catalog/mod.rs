//! The engine catalog: every supported protocol, fixed at build time.
//!
//! The catalog is an explicit registry mapping engine id to a declarative
//! trigger and an ordered action list. There is no runtime registration;
//! a [`Catalog`] is built once, validated, and then only read.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::CatalogError;
use crate::findings::keys;

/// Trigger criteria and evaluation context.
pub mod criterion;
/// Engine and action definitions.
pub mod definition;
mod hours;
mod minutes;

pub use criterion::{Criterion, Deviation, TextPattern, TriggerContext};
pub use definition::{
    ActionDefinition, Category, EngineDefinition, EngineDefinitionBuilder, Severity, Tier,
    Urgency,
};

/// Version of the built-in protocol table.
pub const BUILTIN_CATALOG_VERSION: &str = "2024.1";

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

/// Fever by report or by measured temperature of at least 38 °C.
pub(crate) fn febrile() -> Criterion {
    Criterion::any([
        Criterion::flag(keys::FEVER),
        Criterion::at_least(keys::TEMPERATURE, 38.0),
    ])
}

/// Responds only to voice or pain, unresponsive, or GCS below 15.
pub(crate) fn altered_mental_status() -> Result<Criterion, CatalogError> {
    Ok(Criterion::any([
        Criterion::text_is(keys::AVPU, &["V", "P", "U"])?,
        Criterion::below(keys::GCS, 15.0),
    ]))
}

/// An immutable, validated set of engine definitions.
#[derive(Debug)]
pub struct Catalog {
    version: String,
    engines: Vec<EngineDefinition>,
    index: HashMap<String, usize>,
    fingerprint: String,
}

impl Catalog {
    /// Builds a catalog from definitions, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateEngine` if two definitions share an id.
    pub fn new(
        version: impl Into<String>,
        engines: Vec<EngineDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(engines.len());
        for (i, engine) in engines.iter().enumerate() {
            if index.insert(engine.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateEngine {
                    engine_id: engine.id.clone(),
                });
            }
        }
        let version = version.into();
        let fingerprint = compute_fingerprint(&version, &engines);
        Ok(Self {
            version,
            engines,
            index,
            fingerprint,
        })
    }

    /// Builds the built-in protocol table: minutes tier first, then hours.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if any definition fails validation.
    pub fn build_builtin() -> Result<Self, CatalogError> {
        let mut engines = minutes::engines()?;
        engines.extend(hours::engines()?);
        Self::new(BUILTIN_CATALOG_VERSION, engines)
    }

    /// The process-wide built-in catalog.
    ///
    /// # Panics
    ///
    /// Panics on first use if the built-in table fails validation. The table
    /// is static data and is covered by tests.
    #[must_use]
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(|| {
            Self::build_builtin().unwrap_or_else(|e| panic!("built-in catalog is invalid: {e}"))
        })
    }

    /// Definition for `engine_id`, if present.
    #[must_use]
    pub fn lookup(&self, engine_id: &str) -> Option<&EngineDefinition> {
        self.index.get(engine_id).map(|&i| &self.engines[i])
    }

    /// Returns true if the catalog defines `engine_id`.
    #[must_use]
    pub fn contains(&self, engine_id: &str) -> bool {
        self.index.contains_key(engine_id)
    }

    /// All definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &EngineDefinition> {
        self.engines.iter()
    }

    /// Definitions in one tier, in catalog order.
    pub fn by_tier(&self, tier: Tier) -> impl Iterator<Item = &EngineDefinition> {
        self.engines.iter().filter(move |e| e.tier == tier)
    }

    /// Definitions in one category, in catalog order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &EngineDefinition> {
        self.engines.iter().filter(move |e| e.category == category)
    }

    /// Number of engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Returns true if no engine is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Catalog version label.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// BLAKE3 digest (hex) over the version and every engine's identity,
    /// severity, tier, trigger and actions. Two catalogs with the same
    /// fingerprint resolve engine and action ids identically.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn compute_fingerprint(version: &str, engines: &[EngineDefinition]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(version.as_bytes());
    for engine in engines {
        hasher.update(b"\x1eengine\x1f");
        hasher.update(engine.id.as_bytes());
        hasher.update(b"\x1f");
        hasher.update(engine.severity.to_string().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(engine.tier.to_string().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(engine.trigger.to_string().as_bytes());
        for action in &engine.actions {
            hasher.update(b"\x1eaction\x1f");
            hasher.update(action.id.as_bytes());
            hasher.update(b"\x1f");
            hasher.update(&action.sequence.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}
