//! Backend-agnostic workload definition and its deterministic expansion into
//! operations.

mod generator;
mod operation;
mod record;
mod spec;

pub use generator::Operations;
pub use operation::{Operation, OperationKind};
pub use record::{Island, Penguin, PenguinPatch, Predicate, Sex, Species};
pub use spec::{MAX_OPERATIONS, Phase, WorkloadSpec};
