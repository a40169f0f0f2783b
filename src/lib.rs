//! tablekeeper — declarative table schema reconciliation for PostgreSQL.
//!
//! Given a desired-state table declaration (name, columns, primary key),
//! tablekeeper validates it, diffs it against the previously-applied
//! declaration, translates the difference into DDL, and executes it with
//! per-statement commit semantics. Failures are classified Permanent
//! (bad declaration, never retry) or Transient (database-side, retry).
//!
//! The event watch loop, credential retrieval, and status persistence are
//! the caller's concern; they plug in through [`controller::Reconciler`],
//! [`executor::Executor`], and [`executor::StatusSink`].

pub mod controller;
pub mod ddl;
pub mod diff;
pub mod error;
pub mod executor;
pub mod ops;
pub mod spec;

pub use controller::{OperationLabel, ReconciliationOutcome, Reconciler};
pub use error::{Classification, ReconcileError, ReconcileResult};

pub mod prelude {
    pub use crate::controller::{OperationLabel, ReconciliationOutcome, Reconciler};
    pub use crate::ddl::ToSql;
    pub use crate::diff::diff;
    pub use crate::error::{Classification, ReconcileError, ReconcileResult};
    pub use crate::executor::{Executor, PgExecutor, StatusSink, TracingSink};
    pub use crate::ops::SchemaOperation;
    pub use crate::spec::{validate, ColumnDef, TableDeclaration, TableSpec};
}
