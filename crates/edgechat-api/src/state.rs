//! Application state wiring the resolver to its concrete backends.
//!
//! The resolver is generic over its stores and provider; AppState pins it to
//! the SQLite key-value store and the boxed completion provider.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use edgechat_core::chat::resolver::ChatResolver;
use edgechat_core::clock::{Clock, SystemClock};
use edgechat_core::llm::box_provider::BoxCompletionProvider;
use edgechat_infra::config::load_config_with_env;
use edgechat_infra::filesystem::{config_path, ensure_data_dir, resolve_data_dir};
use edgechat_infra::llm::create_provider;
use edgechat_infra::sqlite::kv::{RATE_LIMITS_NAMESPACE, SESSIONS_NAMESPACE, SqliteKvStore};
use edgechat_infra::sqlite::pool::{DatabasePool, database_url};
use edgechat_types::config::ChatConfig;

/// The resolver pinned to the infra implementations.
pub type ConcreteResolver = ChatResolver<SqliteKvStore, SqliteKvStore, BoxCompletionProvider>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ConcreteResolver>,
    pub config: Arc<ChatConfig>,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
    /// Handles onto the two namespaces, used for expiry purges.
    pub session_store: SqliteKvStore,
    pub rate_store: SqliteKvStore,
}

impl AppState {
    /// Initialize the application state: load config, open the database,
    /// build the provider and the resolver.
    pub async fn init(config_override: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config_file = config_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config_path(&data_dir));
        let config = load_config_with_env(&config_file).await;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let provider = create_provider(&config.ai)?;

        Self::from_parts(config, data_dir, db_pool, provider, Arc::new(SystemClock))
    }

    /// Wire state from already-built parts.
    pub fn from_parts(
        config: ChatConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        provider: BoxCompletionProvider,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let session_store =
            SqliteKvStore::with_clock(db_pool.clone(), SESSIONS_NAMESPACE, clock.clone());
        let rate_store =
            SqliteKvStore::with_clock(db_pool.clone(), RATE_LIMITS_NAMESPACE, clock.clone());

        let resolver = ChatResolver::from_config(
            &config,
            session_store.clone(),
            rate_store.clone(),
            provider,
            clock,
        )?;

        Ok(Self {
            resolver: Arc::new(resolver),
            config: Arc::new(config),
            data_dir,
            db_pool,
            session_store,
            rate_store,
        })
    }
}
