//! Process-scoped backend handles shared by every request.

use crate::{
    config::AppConfig,
    services::{
        object_service::{ObjectGateway, S3ObjectGateway},
        product_service::{MySqlProductGateway, ProductGateway},
        unconfigured::Unconfigured,
        user_service::{MongoUserGateway, UserGateway},
    },
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// One gateway per backend. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserGateway>,
    pub products: Arc<dyn ProductGateway>,
    pub objects: Arc<dyn ObjectGateway>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserGateway>,
        products: Arc<dyn ProductGateway>,
        objects: Arc<dyn ObjectGateway>,
    ) -> Self {
        Self {
            users,
            products,
            objects,
        }
    }

    /// Build every gateway from configuration.
    ///
    /// No network round-trip happens here: clients connect on first use. A
    /// backend missing required settings is replaced by `Unconfigured`.
    pub async fn from_config(cfg: &AppConfig) -> Result<Self> {
        let users: Arc<dyn UserGateway> = match &cfg.mongo {
            Ok(settings) => {
                info!(database = %settings.database, "document store client ready");
                Arc::new(MongoUserGateway::connect(settings).await?)
            }
            Err(missing) => {
                warn!(missing = ?missing.0, "document store not configured");
                Arc::new(Unconfigured::new("document store", missing.0.clone()))
            }
        };

        let products: Arc<dyn ProductGateway> = match &cfg.mysql {
            Ok(settings) => {
                info!(
                    host = %settings.host,
                    database = %settings.database,
                    max_connections = settings.max_connections,
                    "relational store pool ready"
                );
                Arc::new(MySqlProductGateway::connect_lazy(settings))
            }
            Err(missing) => {
                warn!(missing = ?missing.0, "relational store not configured");
                Arc::new(Unconfigured::new("relational store", missing.0.clone()))
            }
        };

        let objects: Arc<dyn ObjectGateway> = match &cfg.s3 {
            Ok(settings) => {
                info!(region = %settings.region, "object store client ready");
                Arc::new(S3ObjectGateway::connect(settings).await)
            }
            Err(missing) => {
                warn!(missing = ?missing.0, "object store not configured");
                Arc::new(Unconfigured::new("object store", missing.0.clone()))
            }
        };

        Ok(Self::new(users, products, objects))
    }
}
