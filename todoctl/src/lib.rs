//! # todoctl: Todo API with bearer-token authentication
//!
//! `todoctl` is an HTTP service where users register, log in, and manage their
//! own todo items. Every todo route is protected by a short pipeline of axum
//! middleware that authenticates the caller, loads the todo named in the path,
//! and checks that the caller owns it before the handler ever runs.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the
//! HTTP layer. Storage sits behind the repository traits in [`db::handlers`] and
//! is either PostgreSQL (migrated on startup) or a process-local in-memory store
//! selected with `database.type: memory`.
//!
//! ### Request Flow
//!
//! 1. Payloads are decoded and validated by [`validation::ValidatedJson`]; a
//!    handler only sees a payload that passed every rule.
//! 2. Protected routes run [`auth::middleware::authenticate`], which verifies
//!    the bearer token and re-reads the user from the store.
//! 3. Routes with a todo `{id}` then run
//!    [`auth::middleware::load_resource`] and [`auth::middleware::require_owner`].
//!
//! Each stage answers with an error response and stops as soon as a check fails.
//!
//! ### Core Components
//!
//! - [`api`]: handlers and request/response models
//! - [`auth`]: password hashing, token issue/verify, route protection
//! - [`db`]: repository traits with PostgreSQL and in-memory implementations
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: logging and optional OTLP trace export
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use todoctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = todoctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     todoctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! With an external database, migrations run automatically on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! todoctl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::{
    api::{
        handlers::{auth as auth_handlers, todos, users},
        models::todos::TodoResponse,
    },
    auth::{
        middleware::{authenticate, load_resource, require_owner},
        session::SessionKeys,
    },
    config::{DatabaseConfig, PoolSettings},
    db::{
        embedded::EmbeddedDatabase,
        handlers::{TodoRepository, Todos, UserRepository, Users},
    },
    openapi::ApiDoc,
};

pub use config::Config;
pub use types::{TodoId, UserId};

/// Application state shared across all request handlers.
///
/// Cloned per request; everything inside is either immutable or an `Arc` to a
/// store that handles its own concurrency.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .session_keys(Arc::new(keys))
///     .users(users)
///     .todos(todos)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub session_keys: Arc<SessionKeys>,
    pub users: Arc<dyn UserRepository>,
    pub todos: Arc<dyn TodoRepository>,
}

/// Get the todoctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

struct Storage {
    users: Arc<dyn UserRepository>,
    todos: Arc<dyn TodoRepository>,
    /// Present for an external database, so it can be closed on shutdown
    pool: Option<PgPool>,
}

async fn connect_pool(url: &str, settings: &PoolSettings) -> anyhow::Result<PgPool> {
    let secs = |s: u64| (s > 0).then(|| Duration::from_secs(s));

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(secs(settings.idle_timeout_secs))
        .max_lifetime(secs(settings.max_lifetime_secs))
        .connect(url)
        .await?;

    Ok(pool)
}

async fn setup_storage(config: &Config) -> anyhow::Result<Storage> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory database; data will be lost on shutdown");
            let db = EmbeddedDatabase::new();
            Ok(Storage {
                users: Arc::new(db.users()),
                todos: Arc::new(db.todos()),
                pool: None,
            })
        }
        DatabaseConfig::External { url, pool: settings } => {
            info!("Using external database");
            let pool = connect_pool(url, settings).await?;
            migrator().run(&pool).await?;
            Ok(Storage {
                users: Arc::new(Users::new(pool.clone())),
                todos: Arc::new(Todos::new(pool.clone())),
                pool: Some(pool),
            })
        }
    }
}

/// Assemble every route and layer over `state`.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let public_routes = Router::new()
        .route("/users/register", post(auth_handlers::register))
        .route("/users/login", post(auth_handlers::login));

    let authenticated_routes = Router::new()
        .route("/users/me", get(users::get_current_user))
        .route("/todos", get(todos::list_todos))
        .route("/todos/create", post(todos::create_todo))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    // Layers run bottom-up: authenticate, then load, then the owner check
    let owned_todo_routes = Router::new()
        .route(
            "/todos/{id}",
            get(todos::get_todo).patch(todos::update_todo).delete(todos::delete_todo),
        )
        .route_layer(from_fn(require_owner::<TodoResponse>))
        .route_layer(from_fn_with_state(state.clone(), load_resource::<TodoResponse>))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let api_routes = public_routes.merge(authenticated_routes).merge(owned_todo_routes);

    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .with_state(state.clone())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"));

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// Main application struct that owns the router and storage.
///
/// 1. **Create**: [`Application::new`] builds the signing keys, connects (and
///    migrates) storage, and assembles the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting todoctl with configuration: {:#?}", config);

        // Fail before touching storage if the token secret is unusable
        let session_keys = Arc::new(SessionKeys::from_config(&config)?);
        let storage = setup_storage(&config).await?;

        let app_state = AppState::builder()
            .config(config.clone())
            .session_keys(session_keys)
            .users(storage.users)
            .todos(storage.todos)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool: storage.pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "todoctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        db::{
            errors::Result as DbResult,
            handlers::Repository,
            models::todos::{TodoCreateDBRequest, TodoDBResponse, TodoUpdateDBRequest},
        },
        test_utils::{
            create_test_app_state, create_test_app_state_with_config, create_test_config, create_test_server, create_test_user,
            token_for,
        },
    };
    use axum::http::StatusCode;
    use serde_json::Value;

    /// Todo store whose lookups take far longer than any test deadline
    struct SlowTodos(Arc<dyn TodoRepository>);

    #[async_trait::async_trait]
    impl Repository for SlowTodos {
        type CreateRequest = TodoCreateDBRequest;
        type UpdateRequest = TodoUpdateDBRequest;
        type Response = TodoDBResponse;
        type Id = TodoId;

        async fn create(&self, request: &Self::CreateRequest) -> DbResult<Self::Response> {
            self.0.create(request).await
        }

        async fn get_by_id(&self, id: Self::Id) -> DbResult<Option<Self::Response>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.0.get_by_id(id).await
        }

        async fn delete(&self, id: Self::Id) -> DbResult<bool> {
            self.0.delete(id).await
        }

        async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> DbResult<Self::Response> {
            self.0.update(id, request).await
        }
    }

    #[async_trait::async_trait]
    impl TodoRepository for SlowTodos {
        async fn list_for_user(&self, user_id: UserId) -> DbResult<Vec<TodoDBResponse>> {
            self.0.list_for_user(user_id).await
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_application_starts_with_memory_database() {
        let app = Application::new(create_test_config()).await.expect("Failed to create application");
        let server = app.into_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_application_refuses_empty_secret() {
        let mut config = create_test_config();
        config.secret_key = Some(String::new());

        let err = Application::new(config).await.err().expect("empty secret must be rejected");
        assert!(err.to_string().contains("Invalid configuration"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let server = create_test_server(create_test_app_state());

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();

        let doc: Value = response.json();
        let paths = doc["paths"].as_object().expect("paths object");
        for path in [
            "/api/v1/users/register",
            "/api/v1/users/login",
            "/api/v1/users/me",
            "/api/v1/todos",
            "/api/v1/todos/create",
            "/api/v1/todos/{id}",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(doc["components"]["securitySchemes"]["BearerAuth"].is_object());
    }

    #[tokio::test]
    async fn test_metrics_route_only_when_enabled() {
        let server = create_test_server(create_test_app_state());
        server.get("/internal/metrics").await.assert_status_not_found();

        let mut config = create_test_config();
        config.enable_metrics = true;
        let server = create_test_server(create_test_app_state_with_config(config));

        server.get("/healthz").await.assert_status_ok();
        server.get("/internal/metrics").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_request_past_deadline_gets_408() {
        let mut config = create_test_config();
        config.request_timeout = Duration::from_millis(50);
        let state = create_test_app_state_with_config(config);
        let user = create_test_user(&state, "alice").await;
        let token = token_for(&state, &user);

        let state = AppState {
            todos: Arc::new(SlowTodos(state.todos.clone())),
            ..state
        };
        let server = create_test_server(state);

        let started = std::time::Instant::now();
        let response = server.get("/api/v1/todos/1").authorization_bearer(token.clone()).await;
        response.assert_status(StatusCode::REQUEST_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(5));

        // Routes that never touch the slow lookup are unaffected
        server.get("/api/v1/todos").authorization_bearer(token).await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let server = create_test_server(create_test_app_state());
        server.get("/api/v1/nothing-here").await.assert_status_not_found();
    }
}
