//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Records one query duration under the `query` label.
pub fn record_query_duration(query_name: &'static str, duration_secs: f64) {
    histogram!("db_query_duration_seconds", "query" => query_name).record(duration_secs);
}

/// Publishes connection pool gauges. Called on every metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("db_pool_connections_active").set(size.saturating_sub(idle) as f64);
    gauge!("db_pool_connections_idle").set(idle as f64);
    gauge!("db_pool_connections_total").set(size as f64);
}

/// Times a repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new("find_item_by_id");
/// let result = sqlx::query_as::<_, ItemEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        record_query_duration(self.query_name, self.start.elapsed().as_secs_f64());
    }
}
