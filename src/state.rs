use std::sync::Arc;

use projex_config::{CorsConfig, EmailConfig, JwtConfig, RateLimitConfig, StorageConfig};
use projex_core::{FileStorage, LocalFileStorage};
use projex_db::{PgPool, init_db_pool, run_migrations};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub storage_config: StorageConfig,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Builds state around an existing pool, reading everything else from the environment.
    pub fn from_pool(db: PgPool) -> Self {
        let storage_config = StorageConfig::from_env();
        let storage = Arc::new(LocalFileStorage::new(
            storage_config.upload_dir.clone(),
            storage_config.base_url.clone(),
            storage_config.max_file_size,
        ));

        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            email_config: EmailConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            rate_limit_config: RateLimitConfig::from_env(),
            storage_config,
            storage,
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let db = init_db_pool().await?;
    run_migrations(&db).await?;
    Ok(AppState::from_pool(db))
}
