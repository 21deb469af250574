//! Inventory item routes.
//!
//! Listing and reads are open to any authenticated user. Create and update
//! require `admin` or `staff`; delete requires `admin`. Every quantity change
//! is written as a stock transaction in the same database transaction as the
//! item itself.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use domain::models::{
    CreateItemRequest, Item, ItemListQuery, Role, StockTransaction, UpdateItemRequest,
};
use domain::services::activity_helpers;
use persistence::repositories::{ItemRepository, StockTransactionRepository};
use serde::{Deserialize, Serialize};
use shared::pagination::{PageRequest, PaginationMeta};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthContext, ClientContext};
use crate::middleware::metrics::{record_item_mutation, record_stock_movement};
use crate::routes::MessageResponse;

const ITEM_EDITORS: &[Role] = &[Role::Admin, Role::Staff];
const ITEM_ADMINS: &[Role] = &[Role::Admin];

/// Paginated list body: `{ success, data, pagination }`.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: PaginationMeta) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub success: bool,
    pub data: Item,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemResponse {
    pub success: bool,
    pub message: String,
    pub item_id: i64,
}

/// `?page=&limit=` for nested listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/inventory
pub async fn list_items(
    State(state): State<AppState>,
    _auth: AuthContext,
    WithRejection(Query(query), _): WithRejection<Query<ItemListQuery>, ApiError>,
) -> Result<Json<PaginatedResponse<Item>>, ApiError> {
    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.limit);

    let (items, total) = ItemRepository::new(state.pool.clone())
        .list(&filter.clauses(), query.sort(), page)
        .await?;

    let items = items.into_iter().map(Item::from).collect();
    Ok(Json(PaginatedResponse::new(items, page.meta(total))))
}

/// GET /api/v1/inventory/:id
pub async fn get_item(
    State(state): State<AppState>,
    _auth: AuthContext,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = ItemRepository::new(state.pool.clone())
        .find_active(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    Ok(Json(ItemResponse {
        success: true,
        data: item.into(),
    }))
}

/// GET /api/v1/inventory/:id/transactions
pub async fn list_item_transactions(
    State(state): State<AppState>,
    _auth: AuthContext,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, ApiError>,
) -> Result<Json<PaginatedResponse<StockTransaction>>, ApiError> {
    // History of soft-deleted items stays hidden along with the item.
    ItemRepository::new(state.pool.clone())
        .find_active(item_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Item not found".to_string()))?;

    let page = PageRequest::new(query.page, query.limit);
    let (transactions, total) = StockTransactionRepository::new(state.pool.clone())
        .list_for_item(item_id, page)
        .await?;

    let transactions = transactions.into_iter().map(StockTransaction::from).collect();
    Ok(Json(PaginatedResponse::new(transactions, page.meta(total))))
}

/// POST /api/v1/inventory
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthContext,
    ClientContext(client): ClientContext,
    WithRejection(Json(request), _): WithRejection<Json<CreateItemRequest>, ApiError>,
) -> Result<(StatusCode, Json<CreateItemResponse>), ApiError> {
    auth.authorize(ITEM_EDITORS)?;
    request.validate_all()?;

    let values = request.into_values();
    let created: Item = ItemRepository::new(state.pool.clone())
        .create(&values, auth.user_id)
        .await?
        .into();

    record_item_mutation("create");
    if created.quantity > 0 {
        record_stock_movement("add", created.quantity);
    }

    state
        .activity
        .record(
            activity_helpers::item_created(auth.user_id, created.id, created.snapshot())
                .with_context(client),
        )
        .await;

    tracing::info!(
        item_id = created.id,
        user_id = auth.user_id,
        quantity = created.quantity,
        "Inventory item created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateItemResponse {
            success: true,
            message: "Inventory item created".to_string(),
            item_id: created.id,
        }),
    ))
}

/// PUT /api/v1/inventory/:id
pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthContext,
    ClientContext(client): ClientContext,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateItemRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.authorize(ITEM_EDITORS)?;
    request.validate_all()?;

    let outcome = ItemRepository::new(state.pool.clone())
        .update(item_id, &request, auth.user_id)
        .await?;

    record_item_mutation("update");
    if let Some(delta) = outcome.delta {
        record_stock_movement(delta.transaction_type.as_str(), delta.quantity_change);
    }

    let before = Item::from(outcome.before);
    let after = Item::from(outcome.after);

    state
        .activity
        .record(
            activity_helpers::item_updated(
                auth.user_id,
                item_id,
                before.snapshot(),
                after.snapshot(),
            )
            .with_context(client),
        )
        .await;

    tracing::info!(
        item_id,
        user_id = auth.user_id,
        old_quantity = before.quantity,
        new_quantity = after.quantity,
        "Inventory item updated"
    );

    Ok(Json(MessageResponse::ok("Item updated successfully")))
}

/// DELETE /api/v1/inventory/:id
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthContext,
    ClientContext(client): ClientContext,
    WithRejection(Path(item_id), _): WithRejection<Path<i64>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    auth.authorize(ITEM_ADMINS)?;

    let deleted = Item::from(
        ItemRepository::new(state.pool.clone())
            .soft_delete(item_id, auth.user_id)
            .await?,
    );

    record_item_mutation("delete");

    state
        .activity
        .record(
            activity_helpers::item_deleted(auth.user_id, item_id, deleted.snapshot())
                .with_context(client),
        )
        .await;

    tracing::info!(item_id, user_id = auth.user_id, "Inventory item deleted");

    Ok(Json(MessageResponse::ok("Item deleted successfully")))
}
