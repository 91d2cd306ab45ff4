/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tidytask_api::{app::{build_router, AppState}, config::Config};
/// use tidytask_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = sqlx::PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        auth::{bearer_auth, session_auth},
        security::SecurityHeadersLayer,
    },
    ui,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tera::Tera;
use tidytask_shared::{
    service::{AccountService, TaskService},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub accounts: AccountService,
    pub templates: Arc<Tera>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Builds the services over `store`
    ///
    /// # Errors
    ///
    /// Fails when an embedded template does not parse.
    pub fn new(store: Arc<dyn Store>, config: Config) -> anyhow::Result<Self> {
        let templates = ui::templates::load()
            .map_err(|e| anyhow::anyhow!("Failed to load templates: {e}"))?;

        Ok(Self {
            tasks: TaskService::new(store.clone()),
            accounts: AccountService::new(store, config.jwt.secret.as_str()),
            templates: Arc::new(templates),
            config: Arc::new(config),
        })
    }

    /// Whether cookies carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.config.api.production
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET  /health                       # public
/// ├── /api/auth/                         # public
/// │   ├── POST /register
/// │   ├── POST /login
/// │   └── POST /refresh
/// ├── /api/                              # Bearer token
/// │   ├── GET|POST        /tasks
/// │   ├── POST            /tasks/clear-completed
/// │   ├── GET|PUT|DELETE  /tasks/:id
/// │   ├── POST            /tasks/:id/toggle
/// │   ├── GET|POST        /categories
/// │   ├── DELETE          /categories/:id
/// │   └── GET             /stats
/// ├── GET  /                             # redirect to /tasks/
/// ├── /auth/                             # public pages
/// │   ├── GET|POST /login
/// │   ├── GET|POST /register
/// │   └── POST     /logout
/// └── /tasks/                            # session cookie
///     ├── GET  / and /dashboard
///     ├── POST /add
///     ├── GET|POST /edit/:id
///     ├── POST /delete/:id
///     ├── POST /toggle/:id
///     ├── POST /clear-completed
///     ├── POST /category/add
///     └── POST /category/delete/:id
/// ```
///
/// Layers, outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let protected_api = Router::new()
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/clear-completed", post(routes::tasks::clear_completed))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/toggle", post(routes::tasks::toggle_task))
        .route(
            "/categories",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/categories/:id",
            axum::routing::delete(routes::categories::delete_category),
        )
        .route("/stats", get(routes::stats::get_stats))
        .layer(axum::middleware::from_fn_with_state(state.clone(), bearer_auth));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_api)
        .layer(cors_layer(&state.config));

    let account_pages = Router::new()
        .route(
            "/login",
            get(ui::account::login_page).post(ui::account::login),
        )
        .route(
            "/register",
            get(ui::account::register_page).post(ui::account::register),
        )
        .route("/logout", post(ui::account::logout));

    let task_pages = Router::new()
        .route("/tasks", get(ui::pages::dashboard))
        .route("/tasks/", get(ui::pages::dashboard))
        .route("/tasks/dashboard", get(ui::pages::dashboard))
        .route("/tasks/add", post(ui::pages::add_task))
        .route(
            "/tasks/edit/:id",
            get(ui::pages::edit_form).post(ui::pages::edit_task),
        )
        .route("/tasks/delete/:id", post(ui::pages::delete_task))
        .route("/tasks/toggle/:id", post(ui::pages::toggle_task))
        .route("/tasks/clear-completed", post(ui::pages::clear_completed))
        .route("/tasks/category/add", post(ui::pages::add_category))
        .route(
            "/tasks/category/delete/:id",
            post(ui::pages::delete_category),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), session_auth));

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .route("/", get(ui::pages::index))
        .nest("/auth", account_pages)
        .merge(task_pages)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS for `/api`: permissive with `*`, explicit origins otherwise
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
