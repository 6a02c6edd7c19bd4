use serde::{Deserialize, Serialize};

use crate::core::BenchError;

use super::generator::Operations;
use super::operation::OperationKind;

/// Upper bound on the operations of one workload.
pub const MAX_OPERATIONS: usize = 10_000_000;

/// A run of `count` operations of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Phase {
    pub kind: OperationKind,
    pub count: usize,
}

impl Phase {
    pub fn new(kind: OperationKind, count: usize) -> Self {
        Self { kind, count }
    }
}

/// Declarative description of the operations executed against every backend.
///
/// Phases execute in order. The same spec always expands to the same
/// operation sequence, so every backend under test sees operations of equal
/// cost profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSpec {
    #[serde(default = "WorkloadSpec::default_seed")]
    pub seed: u64,
    /// First key assigned to inserted records; keeps benchmark records clear
    /// of the preloaded dataset.
    #[serde(default = "WorkloadSpec::default_key_offset")]
    pub key_offset: u32,
    #[serde(default = "WorkloadSpec::default_phases")]
    pub phases: Vec<Phase>,
}

impl WorkloadSpec {
    fn default_seed() -> u64 {
        42
    }

    fn default_key_offset() -> u32 {
        1_000_000
    }

    fn default_phases() -> Vec<Phase> {
        vec![
            Phase::new(OperationKind::Scan, 10),
            Phase::new(OperationKind::FilterQuery, 15),
        ]
    }

    pub fn new(phases: Vec<Phase>, seed: u64) -> Self {
        Self {
            seed,
            key_offset: Self::default_key_offset(),
            phases,
        }
    }

    /// Sum of all phase counts, saturating at `usize::MAX`.
    pub fn total_operations(&self) -> usize {
        self.phases
            .iter()
            .fold(0usize, |acc, p| acc.saturating_add(p.count))
    }

    pub fn count_of(&self, kind: OperationKind) -> usize {
        self.phases
            .iter()
            .filter(|p| p.kind == kind)
            .fold(0usize, |acc, p| acc.saturating_add(p.count))
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        let total = self
            .phases
            .iter()
            .try_fold(0usize, |acc, p| acc.checked_add(p.count));
        match total {
            Some(0) => {
                return Err(BenchError::WorkloadError(
                    "workload must contain at least one operation".to_string(),
                ));
            }
            Some(n) if n <= MAX_OPERATIONS => {}
            _ => {
                return Err(BenchError::WorkloadError(format!(
                    "workload exceeds {MAX_OPERATIONS} operations"
                )));
            }
        }
        let inserts = self.count_of(OperationKind::Insert);
        if u32::try_from(inserts)
            .ok()
            .and_then(|n| self.key_offset.checked_add(n))
            .is_none()
        {
            return Err(BenchError::WorkloadError(format!(
                "{} inserts starting at key {} overflow the key space",
                inserts, self.key_offset
            )));
        }
        Ok(())
    }

    /// Expand the spec using its own seed.
    pub fn operations(&self) -> Result<Operations<'_>, BenchError> {
        self.generate(self.seed)
    }

    /// Expand the spec with an explicit seed. Each call starts a fresh
    /// sequence; generation has no side effects.
    pub fn generate(&self, seed: u64) -> Result<Operations<'_>, BenchError> {
        self.validate()?;
        Ok(Operations::new(self, seed))
    }
}

impl Default for WorkloadSpec {
    fn default() -> Self {
        Self {
            seed: Self::default_seed(),
            key_offset: Self::default_key_offset(),
            phases: Self::default_phases(),
        }
    }
}
