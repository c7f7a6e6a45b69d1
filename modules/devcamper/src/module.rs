use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use docstore::MemoryStore;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::DevcamperConfig;
use crate::domain::ports::{Geocoder, PasswordHasher, TokenIssuer};
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::repositories;

/// Outbound adapters the module runs with.
#[derive(Clone)]
pub struct Ports {
    pub geocoder: Arc<dyn Geocoder>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
}

/// The devcamper module: repositories over a shared store, the domain
/// service and its REST surface.
#[derive(Clone)]
pub struct Devcamper {
    config: DevcamperConfig,
    store: MemoryStore,
    service: Arc<Service>,
}

impl Devcamper {
    pub fn new(config: DevcamperConfig, store: MemoryStore, ports: Ports) -> anyhow::Result<Self> {
        info!("Initializing devcamper module");
        debug!(
            "Loaded devcamper config: default_page_size={}, max_page_size={}, default_sort={}",
            config.default_page_size, config.max_page_size, config.default_sort
        );

        // Wire repositories (infra) to the domain service (ports)
        let repos = repositories(&store).context("failed to declare devcamper collections")?;
        let service = Service::new(
            repos,
            ports.geocoder,
            ports.hasher,
            ports.tokens,
            ServiceConfig {
                translator: config.translator(),
            },
        );

        Ok(Self {
            config,
            store,
            service: Arc::new(service),
        })
    }

    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn config(&self) -> &DevcamperConfig {
        &self.config
    }

    /// Add the REST routes to `router` under the configured prefix.
    pub fn register_rest(&self, router: Router) -> anyhow::Result<Router> {
        info!("Registering devcamper REST routes");
        let router = routes::register_routes(router, self.service(), &self.config.api_prefix)?;
        info!("Devcamper REST routes registered under {}", self.config.api_prefix);
        Ok(router)
    }
}
