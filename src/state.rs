use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, StoreBackend};
use crate::identity::services::IdentityService;
use crate::issues::services::LifecycleEngine;
use crate::notify::{NotificationSink, TracingSink};
use crate::projections::services::Projections;
use crate::storage::{S3Storage, StorageClient};
use crate::store::{FileStore, MemoryStore, PgStore, RecordStore, Repository};

#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub config: Arc<AppConfig>,
    pub storage: Option<Arc<dyn StorageClient>>,
    pub identity: IdentityService,
    pub lifecycle: LifecycleEngine,
    pub projections: Projections,
}

async fn open_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn RecordStore>> {
    Ok(match backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::File { dir } => Arc::new(
            FileStore::open(dir)
                .await
                .with_context(|| format!("open data dir {}", dir.display()))?,
        ),
        StoreBackend::Postgres { database_url } => Arc::new(PgStore::connect(database_url).await?),
    })
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let repo = Repository::new(open_store(&config.store).await?);

        // Real S3/MinIO when configured
        let storage = match &config.photos {
            Some(cfg) => {
                Some(Arc::new(S3Storage::connect(cfg, "us-east-1").await?) as Arc<dyn StorageClient>)
            }
            None => {
                tracing::warn!("MINIO_* not set; photo upload disabled");
                None
            }
        };

        Ok(Self::from_parts(repo, config, storage, Arc::new(TracingSink)))
    }

    pub fn from_parts(
        repo: Repository,
        config: Arc<AppConfig>,
        storage: Option<Arc<dyn StorageClient>>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            identity: IdentityService::new(repo.clone(), notifier.clone()),
            lifecycle: LifecycleEngine::new(repo.clone(), notifier),
            projections: Projections::new(repo.clone()),
            repo,
            config,
            storage,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_sink(Arc::new(TracingSink))
    }

    #[cfg(test)]
    pub fn fake_with_sink(notifier: Arc<dyn NotificationSink>) -> Self {
        use axum::async_trait;
        use bytes::Bytes;

        #[derive(Clone)]
        struct FakeStorage;
        #[async_trait]
        impl StorageClient for FakeStorage {
            async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
                Ok(())
            }
            async fn presign_get(&self, k: &str, _s: u64) -> anyhow::Result<String> {
                Ok(format!("https://fake.local/{}", k))
            }
        }

        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            photos: None,
            seed_demo_data: false,
        });

        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let storage = Arc::new(FakeStorage) as Arc<dyn StorageClient>;
        Self::from_parts(repo, config, Some(storage), notifier)
    }
}
