//! Nexus pipeline server.
//!
//! Loads configuration, wires the stores (PostgreSQL or in-memory), and serves
//! the pipeline HTTP API.

use std::sync::Arc;

use http::{HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use nexus_pipeline::adapters::http::{pipeline_router, PipelineAppState};
use nexus_pipeline::adapters::memory::{
    InMemoryProgressRepository, InMemoryStepCatalog, InMemorySurveyResponseReader,
    InMemoryWorkflowStore,
};
use nexus_pipeline::adapters::postgres::{
    PostgresProgressRepository, PostgresStepCatalogReader, PostgresSurveyResponseReader,
    PostgresWorkflowStore,
};
use nexus_pipeline::adapters::survey::NormalizingSurveyAnalyzer;
use nexus_pipeline::application::{HookRegistry, PipelineSettings, WorkflowGenerationHook};
use nexus_pipeline::config::{AppConfig, DatabaseConfig, ServerConfig};
use nexus_pipeline::domain::pipeline::StepKind;
use nexus_pipeline::ports::{
    ProgressRepository, StepCatalogReader, SurveyResponseReader, WorkflowStore,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server);

    let state = build_state(&config).await?;
    let app = pipeline_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Nexus pipeline listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

struct Stores {
    catalog: Arc<dyn StepCatalogReader>,
    progress: Arc<dyn ProgressRepository>,
    surveys: Arc<dyn SurveyResponseReader>,
    workflows: Arc<dyn WorkflowStore>,
}

async fn build_state(config: &AppConfig) -> Result<PipelineAppState, BoxError> {
    let stores = if config.database.in_memory {
        tracing::warn!("Using in-memory storage; all pipeline data is lost on shutdown");
        Stores {
            catalog: Arc::new(InMemoryStepCatalog::default()),
            progress: Arc::new(InMemoryProgressRepository::new()),
            surveys: Arc::new(InMemorySurveyResponseReader::new()),
            workflows: Arc::new(InMemoryWorkflowStore::new()),
        }
    } else {
        postgres_stores(&config.database).await?
    };

    let hooks = HookRegistry::new().register(
        StepKind::SurveyAnalysis,
        Arc::new(WorkflowGenerationHook::new(
            stores.surveys,
            Arc::new(NormalizingSurveyAnalyzer::new()),
            stores.workflows,
        )),
    );

    Ok(PipelineAppState {
        catalog: stores.catalog,
        progress: stores.progress,
        hooks,
        settings: PipelineSettings {
            auto_restart: config.pipeline.auto_restart,
            claim_lease_secs: config.pipeline.claim_lease_secs,
        },
    })
}

async fn postgres_stores(database: &DatabaseConfig) -> Result<Stores, BoxError> {
    let pool = PgPoolOptions::new()
        .min_connections(database.pool.min_connections)
        .max_connections(database.pool.max_connections)
        .acquire_timeout(database.pool.acquire_timeout())
        .idle_timeout(database.pool.idle_timeout())
        .max_lifetime(database.pool.max_lifetime())
        .connect(&database.url)
        .await?;

    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(Stores {
        catalog: Arc::new(PostgresStepCatalogReader::new(pool.clone())),
        progress: Arc::new(PostgresProgressRepository::new(pool.clone())),
        surveys: Arc::new(PostgresSurveyResponseReader::new(pool.clone())),
        workflows: Arc::new(PostgresWorkflowStore::new(pool)),
    })
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(tower_http::cors::Any)
    }
}
