//! Reporting routes: dashboard summary, activity log and CSV export.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use domain::models::{
    ActivityLog, DashboardSummary, Item, ListActivityLogsQuery, Role, ACTIVITY_DEFAULT_LIMIT,
};
use persistence::repositories::{ActivityLogRepository, DashboardRepository, ItemRepository};
use serde::Serialize;
use shared::pagination::PageRequest;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthContext;
use crate::routes::inventory::PaginatedResponse;

const CSV_HEADER: &str =
    "Item ID,Item Name,Category,Quantity,Unit Price,Total Value,Location,Created Date";
const CSV_FILENAME: &str = "inventory-report.csv";
const UTF8_BOM: &str = "\u{feff}";

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub success: bool,
    pub data: DashboardSummary,
}

/// GET /api/v1/reports/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<DashboardResponse>, ApiError> {
    let summary = DashboardRepository::new(state.pool.clone())
        .get_summary()
        .await?;

    Ok(Json(DashboardResponse {
        success: true,
        data: summary,
    }))
}

/// GET /api/v1/reports/activity (admin only)
pub async fn activity(
    State(state): State<AppState>,
    auth: AuthContext,
    WithRejection(Query(query), _): WithRejection<Query<ListActivityLogsQuery>, ApiError>,
) -> Result<Json<PaginatedResponse<ActivityLog>>, ApiError> {
    auth.authorize(&[Role::Admin])?;

    let filter = query.filter().map_err(ApiError::Validation)?;
    let page = PageRequest::with_default_limit(query.page, query.limit, ACTIVITY_DEFAULT_LIMIT);

    let (entries, total) = ActivityLogRepository::new(state.pool.clone())
        .list(&filter, page)
        .await?;

    let entries = entries.into_iter().map(ActivityLog::from).collect();
    Ok(Json(PaginatedResponse::new(entries, page.meta(total))))
}

/// GET /api/v1/reports/export/csv
pub async fn export_csv(
    State(state): State<AppState>,
    auth: AuthContext,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<Item> = ItemRepository::new(state.pool.clone())
        .list_active()
        .await?
        .into_iter()
        .map(Item::from)
        .collect();

    tracing::info!(user_id = auth.user_id, rows = items.len(), "Exporting inventory CSV");

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", CSV_FILENAME),
        ),
    ];

    Ok((headers, render_csv(&items)))
}

fn render_csv(items: &[Item]) -> String {
    let mut csv = String::from(UTF8_BOM);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for item in items {
        let row = [
            item.id.to_string(),
            escape_csv(&item.item_name),
            escape_csv(item.category_name.as_deref().unwrap_or("")),
            item.quantity.to_string(),
            item.unit_price.to_string(),
            item.total_value.to_string(),
            escape_csv(item.location.as_deref().unwrap_or("")),
            item.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

/// Quotes a field when it contains a delimiter, quote or line break.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn item(id: i64, name: &str, location: Option<&str>) -> Item {
        Item {
            id,
            item_name: name.to_string(),
            category_id: 1,
            category_name: Some("Hardware".to_string()),
            description: None,
            quantity: 4,
            unit_price: Decimal::new(250, 2),
            total_value: Decimal::new(1000, 2),
            reorder_level: 10,
            location: location.map(str::to_string),
            barcode: None,
            created_by: Some(1),
            updated_by: Some(1),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn test_render_csv_header_and_bom() {
        let csv = render_csv(&[]);
        assert!(csv.starts_with(UTF8_BOM));
        assert_eq!(csv.trim_start_matches(UTF8_BOM), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_render_csv_rows() {
        let csv = render_csv(&[item(7, "Bolt, M6", Some("Shelf A")), item(8, "Nut", None)]);
        let lines: Vec<&str> = csv.trim_start_matches(UTF8_BOM).lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "7,\"Bolt, M6\",Hardware,4,2.50,10.00,Shelf A,2024-03-05 14:30:00"
        );
        assert_eq!(lines[2], "8,Nut,Hardware,4,2.50,10.00,,2024-03-05 14:30:00");
    }
}
