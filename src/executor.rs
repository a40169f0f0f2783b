//! Statement execution against the database, plus the status sink.
//!
//! The controller only sees the [`Executor`] trait; [`PgExecutor`] is the
//! provided PostgreSQL implementation on top of a sqlx pool. Each call to
//! `execute` commits before returning — that per-statement commit is the
//! contract the controller's sequencing relies on.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::controller::ReconciliationOutcome;
use crate::error::{ReconcileError, ReconcileResult};

/// Executes one DDL statement at a time, committing each before returning.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a single statement. Any failure is Transient by definition:
    /// the statement text was already vetted by validation and diffing.
    async fn execute(&self, statement: &str) -> ReconcileResult<()>;

    /// Release underlying connections.
    async fn close(&self);
}

/// Receives the outcome of every reconciliation call, success or failure,
/// for persistence onto the resource's status field. Injected into the
/// controller rather than reached through global state.
pub trait StatusSink: Send + Sync {
    fn report(&self, resource: &str, outcome: &ReconciliationOutcome);
}

/// Status sink that emits a structured tracing event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn report(&self, resource: &str, outcome: &ReconciliationOutcome) {
        match &outcome.error {
            Some(error) => tracing::warn!(
                resource,
                operation = %outcome.operation,
                error = %error,
                "reconciliation failed"
            ),
            None => tracing::info!(
                resource,
                operation = %outcome.operation,
                "reconciliation succeeded"
            ),
        }
    }
}

/// PostgreSQL executor backed by a sqlx connection pool.
#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    /// Connect to a database using a connection URL.
    ///
    /// Connection failures are Transient: the credential or the database
    /// may simply not be reachable yet.
    pub async fn connect(url: &str) -> ReconcileResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| ReconcileError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Executor for PgExecutor {
    async fn execute(&self, statement: &str) -> ReconcileResult<()> {
        // The checkout is scoped to this statement: the connection returns
        // to the pool on every exit path, error included. Statements run in
        // autocommit mode, which gives the per-statement commit semantics.
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| ReconcileError::Connection(e.to_string()))?;
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(|e| ReconcileError::Execution(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
