use std::sync::Arc;
use std::time::Duration;

use ca::CertificateService;
use core::{ClientCertificateRepository, FileStore, InMemoryTokenCache, LocalFileStore, NodeRepository};
use daemon_client::ConfigMaker;
use enroll::{CreateService, SetupService};
use net::PoolRegistry;

use crate::repo::{InMemoryClientCertificateRepository, InMemoryNodeRepository};
use crate::settings::Settings;

const TOKEN_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Everything the route handlers share, assembled once in `main`.
pub struct AppState {
    pub settings: Arc<Settings>,
    pub files: Arc<dyn FileStore>,
    pub nodes: Arc<dyn NodeRepository>,
    pub certs: Arc<dyn ClientCertificateRepository>,
    pub cert_service: Arc<CertificateService>,
    pub config_maker: Arc<ConfigMaker>,
    pub pools: Arc<PoolRegistry>,
    pub setup_service: Arc<SetupService>,
    pub create_service: Arc<CreateService>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(settings.data_dir.clone()));
        let nodes: Arc<dyn NodeRepository> = Arc::new(InMemoryNodeRepository::default());
        let certs: Arc<dyn ClientCertificateRepository> =
            Arc::new(InMemoryClientCertificateRepository::default());
        let cert_service = Arc::new(CertificateService::new(Arc::clone(&files)));
        let config_maker = Arc::new(ConfigMaker::new(Arc::clone(&files), Arc::clone(&certs)));
        let pools = Arc::new(PoolRegistry::new());

        let token_cache: Arc<InMemoryTokenCache> = Arc::new(InMemoryTokenCache::new());
        token_cache.spawn_sweeper(TOKEN_SWEEP_INTERVAL);

        let setup_service = Arc::new(SetupService::new(
            Arc::clone(&token_cache) as Arc<dyn core::TokenCache>,
            settings.setup_token.clone(),
        ));
        let create_service = Arc::new(CreateService::new(
            Arc::clone(&token_cache) as Arc<dyn core::TokenCache>,
            Arc::clone(&certs),
            Arc::clone(&nodes),
            Arc::clone(&cert_service),
            Arc::clone(&files),
        ));

        Self {
            settings,
            files,
            nodes,
            certs,
            cert_service,
            config_maker,
            pools,
            setup_service,
            create_service,
        }
    }
}
