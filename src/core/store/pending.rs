//! Ledger of optimistic writes awaiting server confirmation
//!
//! Each optimistic create, update or delete is tracked as a
//! [`PendingOperation`] moving through `Pending -> Confirmed | RolledBack`.
//! Resolving an operation twice, or resolving an unknown one, is a state error.

use crate::domain::{PatientId, Result, RoundsError, VisitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to one optimistic write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// What the optimistic write did to the local cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Create {
        patient_id: PatientId,
        visit_id: VisitId,
    },
    Update {
        visit_id: VisitId,
    },
    Delete {
        visit_id: VisitId,
    },
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Create { .. } => "create_visit",
            OperationKind::Update { .. } => "update_visit",
            OperationKind::Delete { .. } => "delete_visit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    Confirmed,
    RolledBack,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationStatus::Pending => "pending",
            OperationStatus::Confirmed => "confirmed",
            OperationStatus::RolledBack => "rolled_back",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub id: OperationId,
    pub kind: OperationKind,
    pub status: OperationStatus,
}

impl PendingOperation {
    pub fn is_pending(&self) -> bool {
        self.status == OperationStatus::Pending
    }

    fn transition(&mut self, to: OperationStatus) -> Result<()> {
        if !self.is_pending() {
            return Err(RoundsError::State(format!(
                "Operation {} is already {}, cannot mark it {}",
                self.id, self.status, to
            )));
        }
        self.status = to;
        Ok(())
    }

    pub fn mark_confirmed(&mut self) -> Result<()> {
        self.transition(OperationStatus::Confirmed)
    }

    pub fn mark_rolled_back(&mut self) -> Result<()> {
        self.transition(OperationStatus::RolledBack)
    }
}

/// All optimistic writes since the store was initialised
#[derive(Debug, Default)]
pub struct PendingLedger {
    next_id: u64,
    operations: Vec<PendingOperation>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending operation
    pub fn begin(&mut self, kind: OperationKind) -> OperationId {
        self.next_id += 1;
        let id = OperationId(self.next_id);
        self.operations.push(PendingOperation {
            id,
            kind,
            status: OperationStatus::Pending,
        });
        id
    }

    pub fn get(&self, id: OperationId) -> Option<&PendingOperation> {
        self.operations.iter().find(|op| op.id == id)
    }

    fn get_mut(&mut self, id: OperationId) -> Result<&mut PendingOperation> {
        self.operations
            .iter_mut()
            .find(|op| op.id == id)
            .ok_or_else(|| RoundsError::State(format!("Unknown operation {id}")))
    }

    pub fn confirm(&mut self, id: OperationId) -> Result<&PendingOperation> {
        let op = self.get_mut(id)?;
        op.mark_confirmed()?;
        Ok(&*op)
    }

    pub fn roll_back(&mut self, id: OperationId) -> Result<&PendingOperation> {
        let op = self.get_mut(id)?;
        op.mark_rolled_back()?;
        Ok(&*op)
    }

    /// Operations still awaiting a server answer
    pub fn pending(&self) -> impl Iterator<Item = &PendingOperation> {
        self.operations.iter().filter(|op| op.is_pending())
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Forget resolved operations
    pub fn prune_resolved(&mut self) {
        self.operations.retain(PendingOperation::is_pending);
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }
}
