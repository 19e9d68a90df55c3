use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{Settings, Store};
use anyhow::{Context, anyhow};
use std::sync::Arc;

/// Composition root. Owns the single store handle and every service built on
/// it; lives for the whole process.
pub struct Server {
    pub credential_service: Arc<dyn CredentialService>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let store = connect_store(&settings.store).await?;

        let credential_hasher = build_hasher(&settings.hashing.scheme, settings.hashing.cost)
            .map_err(|e| anyhow!(e))?;

        let diagnostics: Diagnostics = settings
            .auth
            .diagnostics
            .parse()
            .map_err(|e: String| anyhow!(e))?;

        let users = UserCollection {
            collection: settings.store.collection.clone(),
            username_field: settings.store.username_field.clone(),
            credential_field: settings.store.credential_field.clone(),
        };

        let credential_service: Arc<dyn CredentialService> = Arc::new(
            RealCredentialService::new(store, credential_hasher, users, diagnostics),
        );

        info!("server started");

        Ok(Self { credential_service })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        self.credential_service.settle().await;
        info!("pending credential migrations settled");
    }
}

pub async fn connect_store(settings: &Store) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match settings.backend.as_str() {
        "memory" => Arc::new(MemoryDocumentStore::new()),
        "redis" => {
            let url = settings
                .url
                .as_deref()
                .context("store.url is required for the redis backend")?;
            Arc::new(
                RedisDocumentStore::connect(url, settings.prefix.clone())
                    .await
                    .map_err(|e| anyhow!(e))?,
            )
        }
        other => return Err(anyhow!("Unknown store backend: {}", other)),
    };
    debug!(backend = %settings.backend, "document store ready");
    Ok(store)
}
