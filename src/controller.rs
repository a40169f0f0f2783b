//! Reconciliation controller: the three entry points the event dispatcher
//! invokes per resource lifecycle event.
//!
//! Each call is independent and runs end-to-end on the dispatcher's task:
//! validate, compute operations (trivial for create/delete, diff-based for
//! update), translate, execute. Every call reports its outcome to the
//! status sink exactly once before returning, so the resource status
//! reflects the last attempt even while retries are pending.

use crate::ddl::ToSql;
use crate::diff::diff;
use crate::error::{ReconcileError, ReconcileResult};
use crate::executor::{Executor, StatusSink};
use crate::ops::SchemaOperation;
use crate::spec::{self, TableSpec};

/// Status label persisted onto the resource after each reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationLabel {
    Created,
    Updated,
    Deleted,
    CreateFailed,
    UpdateFailed,
    DeletionFailed,
}

impl std::fmt::Display for OperationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
            Self::CreateFailed => "CREATE_FAILED",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::DeletionFailed => "DELETION_FAILED",
        };
        f.write_str(label)
    }
}

/// What a reconciliation call produced: a status label plus the error
/// message when the label is a `*_FAILED` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub operation: OperationLabel,
    pub error: Option<String>,
}

impl ReconciliationOutcome {
    fn ok(operation: OperationLabel) -> Self {
        Self {
            operation,
            error: None,
        }
    }

    fn failed(operation: OperationLabel, error: &ReconcileError) -> Self {
        Self {
            operation,
            error: Some(error.to_string()),
        }
    }
}

/// Reconciles desired table declarations against the database.
///
/// Holds no per-resource state: calls for different resources may run
/// concurrently; calls for the same resource are assumed single-writer.
pub struct Reconciler<E: Executor> {
    executor: E,
    sink: Box<dyn StatusSink>,
}

impl<E: Executor> Reconciler<E> {
    pub fn new(executor: E, sink: Box<dyn StatusSink>) -> Self {
        Self { executor, sink }
    }

    /// Handle resource creation: create the declared table.
    pub async fn handle_create(
        &self,
        resource: &str,
        raw: &TableSpec,
    ) -> ReconcileResult<ReconciliationOutcome> {
        tracing::info!(resource, "create event");
        let run = async {
            let decl = spec::validate(raw)?;
            self.apply(&[SchemaOperation::CreateTable(decl)]).await
        };
        self.conclude(resource, OperationLabel::Created, OperationLabel::CreateFailed, run.await)
    }

    /// Handle resource modification: diff the prior declaration against the
    /// new one and apply the resulting operations in order, each committed
    /// individually. A mid-sequence failure leaves earlier operations
    /// applied; the dispatcher's retry converges the rest.
    pub async fn handle_update(
        &self,
        resource: &str,
        old_raw: &TableSpec,
        new_raw: &TableSpec,
    ) -> ReconcileResult<ReconciliationOutcome> {
        tracing::info!(resource, "update event");
        let run = async {
            let old = spec::validate(old_raw)?;
            let new = spec::validate(new_raw)?;
            let ops = diff(&old, &new)?;
            if ops.is_empty() {
                tracing::debug!(resource, "no schema changes");
            }
            self.apply(&ops).await
        };
        self.conclude(resource, OperationLabel::Updated, OperationLabel::UpdateFailed, run.await)
    }

    /// Handle resource deletion: drop the table. Only the table name is
    /// validated; the rest of the spec is irrelevant to a drop.
    pub async fn handle_delete(
        &self,
        resource: &str,
        raw: &TableSpec,
    ) -> ReconcileResult<ReconciliationOutcome> {
        tracing::info!(resource, "delete event");
        let run = async {
            let table = spec::validate_name(raw)?;
            self.apply(&[SchemaOperation::DropTable(table)]).await
        };
        self.conclude(resource, OperationLabel::Deleted, OperationLabel::DeletionFailed, run.await)
    }

    /// Translate and execute a sequence of operations strictly in order.
    async fn apply(&self, ops: &[SchemaOperation]) -> ReconcileResult<()> {
        for op in ops {
            let statement = op.to_sql();
            tracing::debug!(op = %op.describe(), statement = %statement, "executing");
            self.executor.execute(&statement).await?;
        }
        Ok(())
    }

    /// Report the outcome to the status sink, then hand the result back to
    /// the dispatcher (errors keep their classification for retry decisions).
    fn conclude(
        &self,
        resource: &str,
        success: OperationLabel,
        failure: OperationLabel,
        result: ReconcileResult<()>,
    ) -> ReconcileResult<ReconciliationOutcome> {
        match result {
            Ok(()) => {
                let outcome = ReconciliationOutcome::ok(success);
                self.sink.report(resource, &outcome);
                Ok(outcome)
            }
            Err(err) => {
                let outcome = ReconciliationOutcome::failed(failure, &err);
                self.sink.report(resource, &outcome);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_display() {
        assert_eq!(OperationLabel::Created.to_string(), "CREATED");
        assert_eq!(OperationLabel::UpdateFailed.to_string(), "UPDATE_FAILED");
        assert_eq!(OperationLabel::DeletionFailed.to_string(), "DELETION_FAILED");
    }
}
