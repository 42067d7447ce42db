//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{
    CategoryRepository, LikeRepository, MaintenanceRepository, PasswordService, PostRepository,
    TokenService, UserRepository,
};
use quill_core::services::{
    AuthService, CategoryService, LikeService, PostService, ReconciliationService,
};
use quill_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub likes: Arc<LikeService>,
    pub reconciliation: Arc<ReconciliationService>,
}

/// Repository implementations the services are wired against.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub maintenance: Arc<dyn MaintenanceRepository>,
}

impl Repositories {
    /// Every repository backed by the same in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            posts: store.clone(),
            categories: store.clone(),
            likes: store.clone(),
            maintenance: store,
        }
    }

    #[cfg(feature = "postgres")]
    pub fn postgres(db: quill_infra::DbConn) -> Self {
        use quill_infra::database::{
            PostgresCategoryRepository, PostgresLikeRepository, PostgresMaintenanceRepository,
            PostgresPostRepository, PostgresUserRepository,
        };

        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            likes: Arc::new(PostgresLikeRepository::new(db.clone())),
            maintenance: Arc::new(PostgresMaintenanceRepository::new(db)),
        }
    }
}

impl AppState {
    /// Wire the services over the given repositories.
    pub fn from_parts(
        repos: Repositories,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(repos.users, tokens, passwords)),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.categories.clone(),
            )),
            categories: Arc::new(CategoryService::new(repos.categories)),
            likes: Arc::new(LikeService::new(repos.likes, repos.posts)),
            reconciliation: Arc::new(ReconciliationService::new(repos.maintenance)),
        }
    }

    /// Build the application state with appropriate implementations.
    ///
    /// With `DATABASE_URL` set the database must be reachable; without it the
    /// server runs on the in-memory store and loses its data on restart.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let repos = Self::repositories(config).await?;

        tracing::info!("Application state initialized");
        Ok(Self::from_parts(repos, tokens, passwords))
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        use migration::{Migrator, MigratorTrait};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Repositories::in_memory());
        };

        let db = quill_infra::connect(db_config).await?;

        if config.run_migrations {
            tracing::info!("Applying pending migrations");
            Migrator::up(&db, None).await?;
        }

        Ok(Repositories::postgres(db))
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
        if config.run_migrations {
            tracing::warn!("RUN_MIGRATIONS ignored: built without the postgres feature");
        }
        tracing::info!("Running without postgres feature - using in-memory repository");
        Ok(Repositories::in_memory())
    }
}
