//! Snapshot Binding Validator
//!
//! Confirms that a request is pinned to the exact snapshot it claims, and
//! that its work order (when it names one) is bound to that same snapshot.
//! Nothing is ever repaired: a mismatch is terminal for the attempt.

use std::collections::HashMap;

use crate::model::{ErrorType, RequestBody};
use crate::policy::{RejectReason, Rejection, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSnapshot {
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkOrder {
    pub bound_snapshot_hash: String,
}

/// Maps a snapshot artifact id to its content hash
pub trait SnapshotResolver: Send + Sync {
    fn resolve(&self, snapshot_artifact_id: &str) -> Option<ResolvedSnapshot>;
}

/// Maps a work order id to the snapshot hash it was issued against
pub trait WorkOrderResolver: Send + Sync {
    fn resolve(&self, work_order_id: &str) -> Option<ResolvedWorkOrder>;
}

/// In-memory resolver for tests and offline verification
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshotResolver {
    snapshots: HashMap<String, String>,
}

impl StaticSnapshotResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, id: impl Into<String>, content_hash: impl Into<String>) -> Self {
        self.snapshots.insert(id.into(), content_hash.into());
        self
    }
}

impl SnapshotResolver for StaticSnapshotResolver {
    fn resolve(&self, snapshot_artifact_id: &str) -> Option<ResolvedSnapshot> {
        self.snapshots
            .get(snapshot_artifact_id)
            .map(|h| ResolvedSnapshot {
                content_hash: h.clone(),
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticWorkOrderResolver {
    work_orders: HashMap<String, String>,
}

impl StaticWorkOrderResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work_order(
        mut self,
        id: impl Into<String>,
        bound_snapshot_hash: impl Into<String>,
    ) -> Self {
        self.work_orders.insert(id.into(), bound_snapshot_hash.into());
        self
    }
}

impl WorkOrderResolver for StaticWorkOrderResolver {
    fn resolve(&self, work_order_id: &str) -> Option<ResolvedWorkOrder> {
        self.work_orders
            .get(work_order_id)
            .map(|h| ResolvedWorkOrder {
                bound_snapshot_hash: h.clone(),
            })
    }
}

/// Proof that a request passed binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBinding {
    pub snapshot_artifact_id: String,
    pub snapshot_hash: String,
    pub work_order_id: Option<String>,
}

pub struct SnapshotBindingValidator<'a> {
    snapshots: &'a dyn SnapshotResolver,
    work_orders: &'a dyn WorkOrderResolver,
}

impl<'a> SnapshotBindingValidator<'a> {
    pub fn new(snapshots: &'a dyn SnapshotResolver, work_orders: &'a dyn WorkOrderResolver) -> Self {
        Self {
            snapshots,
            work_orders,
        }
    }

    /// Check snapshot first, then the work order
    pub fn validate(&self, request: &RequestBody) -> Verdict<SnapshotBinding> {
        let Some(snapshot) = self.snapshots.resolve(&request.snapshot_artifact_id) else {
            return reject(
                ErrorType::SnapshotArtifactMissing,
                RejectReason::SnapshotArtifactMissing,
                "snapshot_artifact_id",
            );
        };
        if snapshot.content_hash != request.snapshot_hash {
            return reject(
                ErrorType::SnapshotMismatch,
                RejectReason::SnapshotMismatch,
                "snapshot_hash",
            );
        }

        if let Some(work_order_id) = &request.work_order_id {
            let Some(work_order) = self.work_orders.resolve(work_order_id) else {
                return reject(
                    ErrorType::WorkOrderMissing,
                    RejectReason::WorkOrderMissing,
                    "work_order_id",
                );
            };
            if work_order.bound_snapshot_hash != request.snapshot_hash {
                return reject(
                    ErrorType::WorkOrderMismatch,
                    RejectReason::WorkOrderMismatch,
                    "work_order_id",
                );
            }
        }

        Verdict::Accept(SnapshotBinding {
            snapshot_artifact_id: request.snapshot_artifact_id.clone(),
            snapshot_hash: request.snapshot_hash.clone(),
            work_order_id: request.work_order_id.clone(),
        })
    }
}

fn reject(error_type: ErrorType, reason: RejectReason, field: &str) -> Verdict<SnapshotBinding> {
    Verdict::Reject(Rejection::new(error_type, reason).on_field(field))
}
