/// Dashboard and task/category form handlers
///
/// All handlers sit behind [`session_auth`](crate::middleware::auth::session_auth).
/// Forms use the lenient priority policy: an unknown priority falls back to
/// `medium` on creation and keeps the current value on edit.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Form,
};
use chrono::Utc;
use serde::Deserialize;
use tera::Context;
use tidytask_shared::{
    auth::AuthContext,
    domain::{PriorityPolicy, TaskFilter, TaskInput, TaskPatch},
    error::TaskError,
    service::Page,
};

use super::{
    error_page, failure_flash,
    flash::{Flash, Redirect},
    render_page,
    views::{category_index, priority_options, status_options, CategoryView, FilterView, TaskView},
};
use crate::{app::AppState, routes::parse_id};

const DASHBOARD_PATH: &str = "/tasks/";

/// `GET /`
pub async fn index() -> Response {
    axum::response::Redirect::to(DASHBOARD_PATH).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<String>,
    pub page: Option<String>,
}

/// `GET /tasks/` and `GET /tasks/dashboard`
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let secure = state.secure_cookies();

    let filter = match TaskFilter::parse(
        query.status.as_deref(),
        query.priority.as_deref(),
        query.category_id.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(e) => return Redirect::to(DASHBOARD_PATH, secure).with_flash(failure_flash(e)).into_response(),
    };
    let page_number = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let page = Page::new(page_number, state.config.ui.tasks_per_page);

    let dashboard = match state.tasks.dashboard(&ctx, filter, page).await {
        Ok(dashboard) => dashboard,
        Err(e) => return error_page(&state, &headers, &ctx.username, e.into()),
    };

    let now = dashboard.generated_at.naive_utc();
    let index = category_index(&dashboard.categories);
    let view = |tasks: &[tidytask_shared::models::Task]| -> Vec<TaskView> {
        tasks.iter().map(|t| TaskView::new(t, &index, now)).collect()
    };
    let categories: Vec<CategoryView> = dashboard.categories.iter().map(CategoryView::from).collect();
    let filter_view = FilterView::from(&dashboard.filter);

    let mut context = Context::new();
    context.insert("tasks", &view(&dashboard.tasks));
    context.insert("overdue", &view(&dashboard.overdue));
    context.insert("categories", &categories);
    context.insert("stats", &dashboard.stats);
    context.insert("completion_rate", &dashboard.stats.completion_rate());
    context.insert("statuses", &status_options());
    context.insert("priorities", &priority_options());
    context.insert("page", &dashboard.page);
    context.insert("total_pages", &dashboard.total_pages);
    context.insert("matching", &dashboard.matching);
    context.insert(
        "prev_url",
        &if dashboard.page > 1 {
            filter_view.page_url(dashboard.page - 1)
        } else {
            String::new()
        },
    );
    context.insert(
        "next_url",
        &if dashboard.page < dashboard.total_pages {
            filter_view.page_url(dashboard.page + 1)
        } else {
            String::new()
        },
    );
    context.insert("filter", &filter_view);
    context.insert(
        "generated_at",
        &dashboard.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );

    render_page(&state, &headers, &ctx.username, "dashboard.html", context)
}

/// `POST /tasks/add`
pub async fn add_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Form(input): Form<TaskInput>,
) -> Redirect {
    let flash = match state.tasks.create_task(&ctx, input, PriorityPolicy::Lenient).await {
        Ok(_) => Flash::success("Task added successfully!"),
        Err(e) => failure_flash(e),
    };
    Redirect::to(DASHBOARD_PATH, state.secure_cookies()).with_flash(flash)
}

/// `GET /tasks/edit/:id`
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let loaded = async {
        let id = parse_id(&id, "Task")?;
        let task = state.tasks.get_task(&ctx, id).await?;
        let categories = state.tasks.list_categories(&ctx).await?;
        Ok::<_, crate::error::ApiError>((task, categories))
    }
    .await;

    let (task, categories) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => return error_page(&state, &headers, &ctx.username, e),
    };

    let index = category_index(&categories);
    let categories: Vec<CategoryView> = categories.iter().map(CategoryView::from).collect();

    let mut context = Context::new();
    context.insert("task", &TaskView::new(&task, &index, Utc::now().naive_utc()));
    context.insert("categories", &categories);
    context.insert("statuses", &status_options());
    context.insert("priorities", &priority_options());

    render_page(&state, &headers, &ctx.username, "edit_task.html", context)
}

/// `POST /tasks/edit/:id`
///
/// A rejected field sends the user back to the form; nothing is saved.
pub async fn edit_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    Form(patch): Form<TaskPatch>,
) -> Redirect {
    let secure = state.secure_cookies();

    let id = match parse_id(&id, "Task") {
        Ok(id) => id,
        Err(e) => return Redirect::to(DASHBOARD_PATH, secure).with_flash(failure_flash(e)),
    };

    match state.tasks.update_task(&ctx, id, patch, PriorityPolicy::Lenient).await {
        Ok(_) => Redirect::to(DASHBOARD_PATH, secure).with_flash(Flash::success("Task updated successfully!")),
        Err(e @ TaskError::Validation(_)) => {
            Redirect::to(format!("/tasks/edit/{id}"), secure).with_flash(failure_flash(e))
        }
        Err(e) => Redirect::to(DASHBOARD_PATH, secure).with_flash(failure_flash(e)),
    }
}

/// `POST /tasks/delete/:id`
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Redirect {
    let result = match parse_id(&id, "Task") {
        Ok(id) => state.tasks.delete_task(&ctx, id).await.map_err(Into::into),
        Err(e) => Err(e),
    };

    let flash = match result {
        Ok(()) => Flash::success("Task deleted successfully!"),
        Err(e) => failure_flash(e),
    };
    Redirect::to(DASHBOARD_PATH, state.secure_cookies()).with_flash(flash)
}

/// `POST /tasks/toggle/:id`
pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Redirect {
    let result = match parse_id(&id, "Task") {
        Ok(id) => state.tasks.toggle_task(&ctx, id).await.map_err(Into::into),
        Err(e) => Err(e),
    };

    let flash = match result {
        Ok(task) => Flash::success(format!("Task marked as {}", task.status.label().to_lowercase())),
        Err(e) => failure_flash(e),
    };
    Redirect::to(DASHBOARD_PATH, state.secure_cookies()).with_flash(flash)
}

/// `POST /tasks/clear-completed`
pub async fn clear_completed(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Redirect {
    let flash = match state.tasks.clear_completed(&ctx).await {
        Ok(0) => Flash::info("No completed tasks to clear"),
        Ok(n) => Flash::success(format!("Cleared {n} completed task{}", if n == 1 { "" } else { "s" })),
        Err(e) => failure_flash(e),
    };
    Redirect::to(DASHBOARD_PATH, state.secure_cookies()).with_flash(flash)
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// `POST /tasks/category/add`
pub async fn add_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let color = form.color.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let flash = match state.tasks.create_category(&ctx, form.name.as_deref(), color).await {
        Ok(category) => Flash::success(format!("Category '{}' added successfully!", category.name)),
        Err(e) => failure_flash(e),
    };
    Redirect::to(DASHBOARD_PATH, state.secure_cookies()).with_flash(flash)
}

/// `POST /tasks/category/delete/:id`
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Redirect {
    let result = match parse_id(&id, "Category") {
        Ok(id) => state.tasks.delete_category(&ctx, id).await.map_err(Into::into),
        Err(e) => Err(e),
    };

    let flash = match result {
        Ok(_) => Flash::success("Category deleted successfully!"),
        Err(e) => failure_flash(e),
    };
    Redirect::to(DASHBOARD_PATH, state.secure_cookies()).with_flash(flash)
}
