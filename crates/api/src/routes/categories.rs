//! Category routes.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use domain::models::{Category, CreateCategoryRequest, Role};
use domain::services::activity_helpers;
use persistence::repositories::CategoryRepository;
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AuthContext, ClientContext};

/// Roles allowed to create categories.
const CATEGORY_EDITORS: &[Role] = &[Role::Admin, Role::Staff];

#[derive(Debug, Serialize)]
pub struct ListCategoriesResponse {
    pub success: bool,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryResponse {
    pub success: bool,
    pub message: String,
    pub category_id: i64,
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<ListCategoriesResponse>, ApiError> {
    let categories = CategoryRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(Json(ListCategoriesResponse {
        success: true,
        categories,
    }))
}

/// POST /api/v1/categories
pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthContext,
    ClientContext(client): ClientContext,
    WithRejection(Json(request), _): WithRejection<Json<CreateCategoryRequest>, ApiError>,
) -> Result<(StatusCode, Json<CreateCategoryResponse>), ApiError> {
    auth.authorize(CATEGORY_EDITORS)?;
    request.validate()?;

    let (name, description) = request.normalized();
    let category = CategoryRepository::new(state.pool.clone())
        .create(&name, description.as_deref())
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Conflict(_) => {
                ApiError::Conflict(format!("Category '{}' already exists", name))
            }
            other => other,
        })?;

    state
        .activity
        .record(
            activity_helpers::category_created(
                auth.user_id,
                category.id,
                &category.name,
                category.description.as_deref(),
            )
            .with_context(client),
        )
        .await;

    tracing::info!(category_id = category.id, user_id = auth.user_id, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(CreateCategoryResponse {
            success: true,
            message: "Category created".to_string(),
            category_id: category.id,
        }),
    ))
}
