//! Application state - shared across all handlers.

use std::sync::Arc;

use anyhow::bail;
use gallery_core::ports::{ArtPostRepository, ReviewRepository};
use gallery_core::{ArtPostService, ReviewService, ServicePolicy};
use gallery_infra::InMemoryArtPostStore;

use crate::config::{AppConfig, StorageBackend};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub art_posts: ArtPostService,
    pub reviews: ReviewService,
}

/// Hand one store to both services.
fn split<R>(store: Arc<R>) -> (Arc<dyn ArtPostRepository>, Arc<dyn ReviewRepository>)
where
    R: ArtPostRepository + ReviewRepository + 'static,
{
    (store.clone(), store)
}

impl AppState {
    pub fn with_stores(
        posts: Arc<dyn ArtPostRepository>,
        reviews: Arc<dyn ReviewRepository>,
        policy: ServicePolicy,
    ) -> Self {
        Self {
            art_posts: ArtPostService::new(posts, policy.clone()),
            reviews: ReviewService::new(reviews, policy),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(policy: ServicePolicy) -> Self {
        let (posts, reviews) = split(Arc::new(InMemoryArtPostStore::new()));
        Self::with_stores(posts, reviews, policy)
    }

    /// Build the application state for the configured backend.
    ///
    /// A backend that was selected but cannot be reached is an error; the
    /// caller treats it as fatal.
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let policy = config.policy.clone();

        let state = match config.resolved_backend() {
            StorageBackend::Memory | StorageBackend::Auto => {
                tracing::warn!("No database configured. Running with in-memory storage.");
                Self::in_memory(policy)
            }
            StorageBackend::Postgres => Self::postgres(config, policy).await?,
            StorageBackend::Mongo => Self::mongo(config, policy).await?,
        };

        tracing::info!(
            backend = state.art_posts.backend(),
            "Application state initialized"
        );
        Ok(state)
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &AppConfig, policy: ServicePolicy) -> anyhow::Result<Self> {
        use gallery_infra::PostgresArtPostRepository;

        let Some(db) = config.database.as_ref() else {
            bail!("STORAGE_BACKEND=postgres requires DATABASE_URL");
        };
        let conn = gallery_infra::database::connect(db).await?;
        let (posts, reviews) = split(Arc::new(PostgresArtPostRepository::new(conn)));
        Ok(Self::with_stores(posts, reviews, policy))
    }

    #[cfg(not(feature = "postgres"))]
    async fn postgres(_config: &AppConfig, _policy: ServicePolicy) -> anyhow::Result<Self> {
        bail!("PostgreSQL storage requested but the `postgres` feature is disabled")
    }

    #[cfg(feature = "mongo")]
    async fn mongo(config: &AppConfig, policy: ServicePolicy) -> anyhow::Result<Self> {
        use gallery_infra::MongoArtPostRepository;

        let Some(mongo) = config.mongo() else {
            bail!("STORAGE_BACKEND=mongo requires MONGO_URL");
        };
        let repo = MongoArtPostRepository::connect(&mongo).await?;
        let (posts, reviews) = split(Arc::new(repo));
        Ok(Self::with_stores(posts, reviews, policy))
    }

    #[cfg(not(feature = "mongo"))]
    async fn mongo(_config: &AppConfig, _policy: ServicePolicy) -> anyhow::Result<Self> {
        bail!("MongoDB storage requested but the `mongo` feature is disabled")
    }
}
