//! # Resus Core - Pediatric Emergency Protocol Engines
//!
//! Watches assessment snapshots during a pediatric emergency encounter,
//! decides which emergency protocols ("engines") apply, sequences each
//! protocol's action checklist, and reports progress and priority across
//! every protocol running at once.
//!
//! ## Core Concepts
//!
//! - **Engine**: a named protocol with a declarative trigger and ordered actions
//! - **Activation**: a live or historical instance of an engine having fired
//! - **Finding Snapshot**: sparse point-in-time clinical observations
//! - **Manager State**: the plain value every operation takes and returns
//!
//! ## Usage
//!
//! ```rust
//! use resus_core::{
//!     complete_action, create_engine_manager, evaluate_and_trigger_engines,
//!     get_engine_status, has_critical_engines, keys, FindingSnapshot, PatientAge,
//! };
//!
//! let findings = FindingSnapshot::builder()
//!     .finding(keys::SEIZURES, true)
//!     .build();
//! let state = evaluate_and_trigger_engines(
//!     &findings,
//!     14.0,
//!     PatientAge::new(3, 0),
//!     &create_engine_manager(),
//! );
//! assert!(has_critical_engines(&state));
//!
//! let state = complete_action(&state, "status-epilepticus", "airway-oxygen");
//! let status = get_engine_status(state.find_active("status-epilepticus").unwrap()).unwrap();
//! assert_eq!(status.completed_count, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod findings;
pub mod manager;
pub mod operations;
pub mod patient;
pub mod report;
pub mod value;
pub mod vitals;

pub use catalog::{
    ActionDefinition, Catalog, Category, Criterion, EngineDefinition, Severity, Tier,
    TriggerContext, Urgency,
};
pub use config::{ManagerConfig, RetriggerPolicy};
pub use error::{CatalogError, ConfigError, ResusError, ResusResult, StateError};
pub use findings::{keys, FindingSnapshot};
pub use manager::{
    ActivationId, AssessmentRecord, EngineActivation, EngineManager, EngineManagerState,
};
pub use operations::{
    complete_action, create_engine_manager, deactivate_engine, evaluate_and_trigger_engines,
    get_all_engine_statuses, get_critical_engines, get_current_action, get_engine_priority_queue,
    get_engine_status, has_critical_engines, is_engine_active, reactivate_engine,
};
pub use patient::{AgeBand, PatientAge};
pub use report::EngineStatus;
pub use value::FindingValue;
pub use vitals::{ReferenceRange, VitalSign};
