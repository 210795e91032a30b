// Taskmill API server
// Decision: recovery runs after migrations and before workers start, so a
// restart never strands persisted pending/running tasks in an empty queue

mod config;
mod tasks;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde::Serialize;
use taskmill_core::{
    Heartbeater, LeaderElector, RandomDraw, SimulatedExecutor, TaskCache, TaskQueue,
    TaskScheduler, TaskStore, WorkerPool,
};
use taskmill_storage::PgTaskStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    node_id: String,
    is_leader: bool,
}

#[derive(Clone)]
struct HealthState {
    node_id: String,
    elector: Arc<LeaderElector>,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.node_id.clone(),
        is_leader: state.elector.is_current_leader(),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(tasks::submit_task, tasks::get_task, tasks::list_tasks),
    components(schemas(
        taskmill_contracts::Task,
        taskmill_contracts::TaskPriority,
        taskmill_contracts::TaskStatus,
        taskmill_contracts::SubmitTaskRequest,
        tasks::ErrorResponse,
    )),
    tags((name = "tasks", description = "Task submission and status endpoints")),
    info(
        title = "Taskmill API",
        description = "API for submitting prioritized tasks and tracking their execution"
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmill_api=debug,taskmill_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let cfg = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(node_id = %cfg.node_id, workers = cfg.worker_count, "taskmill-api starting...");

    // Metrics recorder; rendered at GET /metrics
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    // Persistence; unreachable storage at startup is fatal
    let store = PgTaskStore::connect(&cfg.database_url)
        .await
        .context("Failed to connect to database")?;
    store.migrate().await.context("Failed to run migrations")?;
    tracing::info!("Connected to database and ran migrations");

    // Core wiring: queue and cache are shared handles, not ambient state
    let queue = Arc::new(TaskQueue::new());
    let cache = Arc::new(TaskCache::new());
    let store: Arc<dyn TaskStore> = Arc::new(store);
    let scheduler = Arc::new(TaskScheduler::new(
        queue.clone(),
        cache.clone(),
        store.clone(),
    ));
    let worker_pool = Arc::new(WorkerPool::new(
        queue,
        cache,
        store,
        Arc::new(SimulatedExecutor::new(cfg.task_duration)),
        cfg.worker_count,
    ));

    // Recovery must finish before any worker starts pulling
    scheduler.recover_unfinished_tasks().await;
    worker_pool.start();

    // Cluster loops
    let elector = Arc::new(LeaderElector::new(
        cfg.node_id.clone(),
        cfg.election_interval,
        Arc::new(RandomDraw),
        Box::new(|| tracing::info!("leadership gained; this node may assign tasks")),
    ));
    elector.start();
    let heartbeater = Heartbeater::new(cfg.node_id.clone(), cfg.heartbeat_interval);
    heartbeater.start();

    let health_state = HealthState {
        node_id: cfg.node_id.clone(),
        elector: elector.clone(),
    };

    let app = Router::new()
        .merge(tasks::routes(tasks::AppState { scheduler }))
        .route("/healthz", get(health).with_state(health_state))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", cfg.bind_addr))?;
    tracing::info!(addr = %cfg.bind_addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Shutdown order is free-form; every stop is idempotent
    worker_pool.stop().await;
    elector.stop().await;
    heartbeater.stop().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    tracing::info!("Shutdown signal received");
}
