use std::sync::Arc;
use crate::config::{Config, StorageBackend};
use crate::errors::AppResult;
use crate::pipeline::{PlottersRasterizer, Rasterizer};
use crate::services::{
    AccountRepository, AccountStore, Exporter, FileAccountRepository, IdentityGate,
    RedisAccountRepository, WorkspaceService,
};

/// Everything the handlers need, built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountStore,
    pub identity: IdentityGate,
    pub workspaces: WorkspaceService,
    pub exporter: Exporter,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn build(config: Config) -> AppResult<Self> {
        let repository: Arc<dyn AccountRepository> = match config.storage.backend {
            StorageBackend::File => {
                tracing::info!("Storing accounts in {}", config.storage.accounts_path);
                Arc::new(FileAccountRepository::new(&config.storage.accounts_path))
            }
            StorageBackend::Redis => {
                tracing::info!("Storing accounts in Redis key {}", config.storage.redis_key);
                let client = Arc::new(redis::Client::open(config.storage.redis_url.as_str())?);
                Arc::new(RedisAccountRepository::new(client, config.storage.redis_key.clone()))
            }
        };

        let rasterizer = Arc::new(PlottersRasterizer::new(
            config.export.scale,
            config.export.font_family.clone(),
        ));
        Self::assemble(config, repository, rasterizer).await
    }

    pub async fn assemble(
        config: Config,
        repository: Arc<dyn AccountRepository>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> AppResult<Self> {
        let accounts = AccountStore::open(repository, config.auth.bcrypt_cost).await?;
        let workspaces = WorkspaceService::new();
        let identity = IdentityGate::new(accounts.clone(), workspaces.clone());
        let exporter = Exporter::new(rasterizer, &config.export);

        Ok(Self {
            accounts,
            identity,
            workspaces,
            exporter,
            config: Arc::new(config),
        })
    }
}
