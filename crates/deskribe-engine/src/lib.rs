//! The Deskribe manifest orchestration engine.
//!
//! The engine drives the four commands every driver builds on: **validate**,
//! **plan**, **apply**, and **destroy**. All four share the same loading
//! prefix (manifest, platform base, environment overlay) and then diverge:
//!
//! - Validate runs the policy validator, the reference validator, and each
//!   registered resource provider, aggregating findings into a single
//!   report.
//! - Plan merges the layered workload configuration and projects every
//!   declared resource into a [`ResourcePlanResult`], producing a
//!   [`DeskribePlan`]. Planning is pure: it never contacts external
//!   systems.
//! - Apply provisions resources through backend adapters in declared
//!   order, resolves reference expressions against the aggregated backend
//!   outputs, and hands the resolved workload to the runtime adapter. A
//!   backend failure aborts before the runtime ever observes a
//!   partially-resolved environment.
//! - Destroy reverses the deploy order: runtime teardown first, then each
//!   configured backend, best-effort.
//!
//! [`ResourcePlanResult`]: deskribe_adapters::ResourcePlanResult

pub mod engine;
pub mod error;
pub mod merge;
pub mod plan;
pub mod policy;

pub use self::engine::{CommandTarget, Engine};
pub use self::error::EngineError;
pub use self::merge::{expand_namespace, merge_workload, MergeOutcome};
pub use self::plan::{ApplyOutcome, DeskribePlan, DestroyOutcome};
pub use self::policy::validate_policies;
