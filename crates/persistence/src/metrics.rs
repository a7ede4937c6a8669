//! Datastore metrics.
//!
//! Query timings and failures are labelled by table and operation so a slow
//! device upsert is told apart from a slow stats insert. Written rows are
//! counted per table.

use metrics::{counter, gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Tables touched by the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Apps,
    AppVersions,
    Devices,
    Stats,
    StoreApps,
    Notifications,
    /// Connectivity checks not bound to a table.
    None,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Apps => "apps",
            Table::AppVersions => "app_versions",
            Table::Devices => "devices",
            Table::Stats => "stats",
            Table::StoreApps => "store_apps",
            Table::Notifications => "notifications",
            Table::None => "none",
        }
    }
}

/// Coarse failure class of a query error.
fn error_kind(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => "pool",
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) => "connection",
        sqlx::Error::Database(db) if db.is_unique_violation() => "unique_violation",
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => "foreign_key_violation",
        sqlx::Error::Database(_) => "database",
        sqlx::Error::RowNotFound => "row_not_found",
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => "decode",
        _ => "other",
    }
}

/// Times one repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new(Table::Devices, "upsert");
/// let result = sqlx::query_as::<_, DeviceEntity>(...).fetch_one(&pool).await;
/// timer.finish(result)
/// ```
pub struct QueryTimer {
    table: Table,
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(table: Table, operation: &'static str) -> Self {
        Self {
            table,
            operation,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, counts a failure, and hands the result back.
    pub fn finish<T>(self, result: Result<T, sqlx::Error>) -> Result<T, sqlx::Error> {
        let outcome = if result.is_ok() { "ok" } else { "error" };
        histogram!(
            "datastore_query_duration_seconds",
            "table" => self.table.as_str(),
            "operation" => self.operation,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            counter!(
                "datastore_query_errors_total",
                "table" => self.table.as_str(),
                "operation" => self.operation,
                "kind" => error_kind(e)
            )
            .increment(1);
            tracing::debug!(
                table = self.table.as_str(),
                operation = self.operation,
                error = %e,
                "Query failed"
            );
        }

        result
    }
}

/// Count rows inserted or updated in `table`.
pub fn record_rows_written(table: Table, rows: u64) {
    counter!("datastore_rows_written_total", "table" => table.as_str()).increment(rows);
}

/// Connection pool gauges, sampled by the readiness probe.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("datastore_pool_connections", "state" => "active")
        .set(size.saturating_sub(idle) as f64);
    gauge!("datastore_pool_connections", "state" => "idle").set(idle as f64);
}
