/// `GET /api/stats`
///
/// ```json
/// {
///   "total_tasks": 4,
///   "pending_tasks": 1,
///   "in_progress_tasks": 1,
///   "completed_tasks": 2,
///   "overdue_tasks": 1,
///   "priority_distribution": { "low": 0, "medium": 3, "high": 1 },
///   "completion_rate": 50
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use tidytask_shared::{auth::AuthContext, domain::TaskStats};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: TaskStats,
    /// Percent of tasks completed
    pub completion_rate: u32,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<StatsResponse>> {
    let stats = state.tasks.stats(&ctx).await?;

    Ok(Json(StatsResponse {
        completion_rate: stats.completion_rate(),
        stats,
    }))
}
