use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db;
use crate::users::repo::{MongoUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let database = db::connect(&config.mongo).await?;
        let store = MongoUserStore::new(&database);
        store.ensure_indexes().await?;

        Ok(Self::from_parts(config, Arc::new(store)))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> Self {
        let keys = JwtKeys::from(&config.jwt);
        Self {
            config,
            store,
            keys,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, MongoConfig};
        use crate::users::repo::InMemoryUserStore;

        let config = Arc::new(AppConfig {
            mongo: MongoConfig {
                uri: "mongodb://localhost:27017".into(),
                database: "accounts_test".into(),
            },
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_days: 30,
            },
            host: "127.0.0.1".into(),
            port: 0,
            env: "test".into(),
        });

        Self::from_parts(config, Arc::new(InMemoryUserStore::new()))
    }
}
