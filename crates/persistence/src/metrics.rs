//! Database metrics collection.

use std::future::Future;
use std::time::Instant;

use domain::services::StoreError;
use metrics::{gauge, histogram};
use sqlx::PgPool;

use crate::repositories::store_error;

/// Awaits a query, records its duration under `query`, and maps the error.
pub(crate) async fn timed<T, F>(query: &'static str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    let start = Instant::now();
    let result = fut.await;
    histogram!("database_query_duration_seconds", "query" => query)
        .record(start.elapsed().as_secs_f64());
    result.map_err(|e| store_error(query, e))
}

/// Record database connection pool metrics.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}
