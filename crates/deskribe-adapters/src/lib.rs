//! Adapter contracts and shared records for the Deskribe engine.
//!
//! The engine consumes four adapter capabilities: **resource providers**
//! (validate and plan a declared resource), **backend adapters** (turn a
//! resource plan into provisioned infrastructure), **runtime adapters**
//! (turn a resolved workload plan into a deployed workload), and
//! **messaging providers** (specialised validation and planning for
//! messaging resources). Concrete drivers live outside the core; this crate
//! defines the traits they implement, the value records exchanged across
//! the boundary, and the [`AdapterRegistry`] the engine resolves them from.
//!
//! All records are immutable values: phases produce new records instead of
//! mutating inputs. Every I/O-capable operation takes a [`CancelToken`] and
//! is expected to honour it at its next suspension point.

pub mod cancel;
pub mod contract;
pub mod error;
pub mod records;
pub mod registry;

pub use self::cancel::CancelToken;
pub use self::contract::{
    BackendAdapter, MessagingProvider, PlanContext, ProviderContext, ResourceProvider,
    RuntimeAdapter,
};
pub use self::error::AdapterError;
pub use self::records::{
    BackendApplyResult, PlanAction, ResourcePlanResult, ValidationReport, WorkloadManifest,
    WorkloadPlan,
};
pub use self::registry::AdapterRegistry;
