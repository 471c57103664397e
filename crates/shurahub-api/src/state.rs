//! Application state wiring the debate pipeline together.
//!
//! AppState pins the generic core types to the concrete infra
//! implementations and is shared by the websocket server, the REST handlers
//! and the `ask` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shurahub_core::debate::orchestrator::DebateOrchestrator;
use shurahub_core::debate::persistence::PersistenceSink;
use shurahub_core::debate::selection::ModelPool;
use shurahub_core::llm::gateway::{GatewayOptions, ModelGateway};
use shurahub_infra::auth::jwt::JwtIdentityResolver;
use shurahub_infra::config::{self, resolve_data_dir};
use shurahub_infra::llm::create_provider;
use shurahub_infra::sqlite::debate::SqliteDebateRepository;
use shurahub_infra::sqlite::engagement::SqliteEngagementRepository;
use shurahub_infra::sqlite::pool::DatabasePool;
use shurahub_types::config::ShurahubConfig;

pub type ConcreteOrchestrator = DebateOrchestrator<SqliteDebateRepository>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub debates: Arc<SqliteDebateRepository>,
    pub engagement: Arc<SqliteEngagementRepository>,
    /// `None` when no session-token secret is configured.
    pub resolver: Option<Arc<JwtIdentityResolver>>,
    pub config: Arc<ShurahubConfig>,
    pub data_dir: PathBuf,
}

/// Configuration plus the repositories, without any provider wiring.
///
/// Enough for commands that only read history.
pub struct Storage {
    pub config: ShurahubConfig,
    pub debates: Arc<SqliteDebateRepository>,
    pub engagement: Arc<SqliteEngagementRepository>,
    pub data_dir: PathBuf,
}

impl Storage {
    pub async fn open() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = config::load(&data_dir).await?;
        let pool = open_pool(&config, &data_dir).await?;

        Ok(Self {
            config,
            debates: Arc::new(SqliteDebateRepository::new(pool.clone())),
            engagement: Arc::new(SqliteEngagementRepository::new(pool)),
            data_dir,
        })
    }
}

async fn open_pool(config: &ShurahubConfig, data_dir: &Path) -> anyhow::Result<DatabasePool> {
    let mut db_url = config::database_url(config, data_dir);
    if config.database.url.is_none() {
        db_url.push_str("?mode=rwc");
    }
    Ok(DatabasePool::new(&db_url).await?)
}

impl AppState {
    /// Load config, open the database and build the orchestrator.
    ///
    /// Fails when the provider API key is missing or the model pool is empty.
    pub async fn init() -> anyhow::Result<Self> {
        let storage = Storage::open().await?;
        Self::from_storage(storage)
    }

    pub fn from_storage(storage: Storage) -> anyhow::Result<Self> {
        let Storage {
            config,
            debates,
            engagement,
            data_dir,
        } = storage;
        let lookup = |key: &str| std::env::var(key).ok();

        let api_key = config::api_key(&config.provider, lookup)?;
        let provider = create_provider(&config.provider, api_key);
        let gateway = ModelGateway::new(
            Arc::new(provider),
            GatewayOptions::from_config(&config.gateway, &config.provider),
        );
        let pool = ModelPool::new(config.models.pool.clone())?;

        let resolver = JwtIdentityResolver::from_settings(&config.auth, lookup).map(Arc::new);
        if resolver.is_none() {
            tracing::info!(
                env = %config.auth.jwt_secret_env,
                "session token secret not set, all connections are guests"
            );
        }

        let orchestrator = DebateOrchestrator::new(
            gateway,
            pool,
            PersistenceSink::new(debates.clone()),
            config.debate.clone(),
            config.context.clone(),
        );

        Ok(Self {
            orchestrator: Arc::new(orchestrator),
            debates,
            engagement,
            resolver,
            config: Arc::new(config),
            data_dir,
        })
    }
}
