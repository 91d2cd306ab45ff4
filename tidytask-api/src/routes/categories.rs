/// Category endpoints
///
/// - `GET    /api/categories` - List categories by name
/// - `POST   /api/categories` - Create a category (`{"name": "...", "color": "#hex"}`)
/// - `DELETE /api/categories/:id` - Delete a category; its tasks keep existing without one

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{parse_id, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tidytask_shared::{auth::AuthContext, models::TaskCategory};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: String,
}

impl From<&TaskCategory> for CategoryResponse {
    fn from(category: &TaskCategory) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
            created_at: category.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteCategoryResponse {
    #[serde(flatten)]
    pub message: MessageResponse,
    /// Tasks that lost their category
    pub detached_tasks: u64,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    let categories = state.tasks.list_categories(&ctx).await?;
    Ok(Json(categories.iter().map(CategoryResponse::from).collect()))
}

/// Create a category
///
/// # Errors
///
/// - `400 Bad Request`: missing or overlong name
/// - `409 Conflict`: the caller already has a category with this name
pub async fn create_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    let Json(req) = payload?;

    let category = state
        .tasks
        .create_category(&ctx, req.name.as_deref(), req.color.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(&category))))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteCategoryResponse>> {
    let detached_tasks = state
        .tasks
        .delete_category(&ctx, parse_id(&id, "Category")?)
        .await?;

    Ok(Json(DeleteCategoryResponse {
        message: MessageResponse::new("Category deleted successfully"),
        detached_tasks,
    }))
}
