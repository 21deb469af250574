//! Activity log repository.

use domain::models::{ActivityLogFilter, CreateActivityLogInput};
use shared::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::entities::ActivityLogEntity;
use crate::metrics::QueryTimer;

const ACTIVITY_SELECT: &str = r#"
    SELECT al.id, al.user_id, u.username, u.full_name, al.action, al.entity_type,
           al.entity_id, al.old_values, al.new_values, al.ip_address::text AS ip_address,
           al.user_agent, al.request_id, al.created_at
    FROM activity_logs al
    LEFT JOIN users u ON u.id = al.user_id
"#;

/// Append-only store of activity entries.
#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: PgPool,
}

impl ActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, input: &CreateActivityLogInput) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("insert_activity_log");
        let result = sqlx::query_scalar(
            r#"
            INSERT INTO activity_logs (
                user_id, action, entity_type, entity_id, old_values, new_values,
                ip_address, user_agent, request_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7::inet, $8, $9)
            RETURNING id
            "#,
        )
        .bind(input.user_id)
        .bind(input.action.as_str())
        .bind(input.entity_type.as_str())
        .bind(input.entity_id)
        .bind(&input.old_values)
        .bind(&input.new_values)
        .bind(input.ip_address.map(|ip| ip.to_string()))
        .bind(&input.user_agent)
        .bind(&input.request_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Newest entries first, optionally narrowed to one user and/or action.
    pub async fn list(
        &self,
        filter: &ActivityLogFilter,
        page: PageRequest,
    ) -> Result<(Vec<ActivityLogEntity>, i64), sqlx::Error> {
        let timer = QueryTimer::new("list_activity_logs");

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM activity_logs al");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut list_query = QueryBuilder::<Postgres>::new(ACTIVITY_SELECT);
        push_filter(&mut list_query, filter);
        list_query
            .push(" ORDER BY al.created_at DESC, al.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let logs = list_query
            .build_query_as::<ActivityLogEntity>()
            .fetch_all(&self.pool)
            .await?;

        timer.record();
        Ok((logs, total))
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ActivityLogFilter) {
    let mut separated = builder.separated(" AND ");
    if filter.user_id.is_some() || filter.action.is_some() {
        separated.push_unseparated(" WHERE ");
    }
    if let Some(user_id) = filter.user_id {
        separated.push("al.user_id = ").push_bind_unseparated(user_id);
    }
    if let Some(action) = filter.action {
        separated
            .push("al.action = ")
            .push_bind_unseparated(action.as_str());
    }
}
