/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::with_postgres(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::auth::require_auth, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::{
    repository::{
        postgres::{PgTaskRepository, PgUserRepository},
        TaskRepository, UserRepository,
    },
    services::{auth::AuthService, task::TaskService},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; everything inside
/// is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Credential service
    pub auth: Arc<AuthService>,

    /// Task service
    pub tasks: Arc<TaskService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the services over the given repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        config: Config,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(users, config.jwt.secret.clone())),
            tasks: Arc::new(TaskService::new(tasks)),
            config: Arc::new(config),
        }
    }

    /// Wires the services over PostgreSQL repositories sharing one pool
    pub fn with_postgres(pool: PgPool, config: Config) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool)),
            config,
        )
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                      # public
/// └── /api/v1/
///     ├── /auth/
///     │   ├── POST /register           # public
///     │   ├── POST /login              # public
///     │   └── GET  /profile            # bearer
///     └── /tasks/                      # bearer
///         ├── GET    /                 # list (?status=)
///         ├── POST   /                 # create
///         ├── GET    /stats
///         ├── GET    /:id
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    let auth_layer = axum::middleware::from_fn_with_state(state.clone(), require_auth);

    let public_auth_routes = Router::new()
        .route("/register", axum::routing::post(routes::auth::register))
        .route("/login", axum::routing::post(routes::auth::login));

    let protected_auth_routes = Router::new()
        .route("/profile", get(routes::auth::profile))
        .route_layer(auth_layer.clone());

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/stats", get(routes::tasks::task_statistics))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(auth_layer);

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/tasks", task_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

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
        .max_age(std::time::Duration::from_secs(3600))
}
