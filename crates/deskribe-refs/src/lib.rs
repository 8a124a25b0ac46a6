//! The `@resource(<type>).<property>` reference language.
//!
//! Environment-variable values in a manifest may embed forward references to
//! backend outputs: `@resource(postgres).connectionString` names the
//! `connectionString` output of whichever backend provisions the `postgres`
//! resource. References are opaque during planning and are substituted only
//! after the infrastructure phase has produced real outputs.
//!
//! The crate offers the three operations the engine needs:
//!
//! - [`extract_references`] scans an environment map and returns every match
//!   in deterministic order.
//! - [`validate_references`] checks each match against the manifest's
//!   declared resource types, collecting every failure rather than stopping
//!   at the first.
//! - [`resolve_references`] substitutes backend outputs into the values,
//!   leaving unresolved references verbatim and recording a warning for each.
//!
//! Resolved values routinely contain credentials, so resolution logs them
//! redacted.

pub mod expr;
pub mod resolve;

pub use self::expr::{extract_references, validate_references, ReferenceIssue, ResourceReference};
pub use self::resolve::{resolve_references, ResolvedEnvironment};
