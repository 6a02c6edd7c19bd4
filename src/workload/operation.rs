use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{Penguin, PenguinPatch, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Insert,
    PointQuery,
    FilterQuery,
    Update,
    Delete,
    Scan,
}

impl OperationKind {
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Insert => "insert",
            OperationKind::PointQuery => "point_query",
            OperationKind::FilterQuery => "filter_query",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
            OperationKind::Scan => "scan",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single backend-agnostic operation of a workload.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Insert(Penguin),
    PointQuery(u32),
    FilterQuery(Predicate),
    Update(u32, PenguinPatch),
    Delete(u32),
    /// Read every record in the collection.
    Scan,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Insert(_) => OperationKind::Insert,
            Operation::PointQuery(_) => OperationKind::PointQuery,
            Operation::FilterQuery(_) => OperationKind::FilterQuery,
            Operation::Update(..) => OperationKind::Update,
            Operation::Delete(_) => OperationKind::Delete,
            Operation::Scan => OperationKind::Scan,
        }
    }
}
