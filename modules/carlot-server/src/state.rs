use std::sync::Arc;

use carlot_core::FileConfig;
use carlot_domains::catalog::{CatalogService, CatalogStore};
use carlot_domains::chatbot::IntentResolver;
use carlot_domains::payments::{CheckoutService, PaymentGateway};
use carlot_domains::uploads::ImageStore;

/// Everything a handler needs, built once at startup.
pub struct AppState {
    pub catalog: CatalogService,
    pub chatbot: IntentResolver,
    pub checkout: CheckoutService,
    /// Upper bound on images accepted by one create-car request.
    pub max_files: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        images: ImageStore,
        gateway: Option<Arc<dyn PaymentGateway>>,
        file_config: &FileConfig,
    ) -> Self {
        Self {
            catalog: CatalogService::new(store.clone(), images),
            chatbot: IntentResolver::new(store.clone())
                .with_max_keywords(file_config.chatbot.max_keywords),
            checkout: CheckoutService::new(store, gateway),
            max_files: file_config.uploads.max_files,
        }
    }

    pub fn images(&self) -> &ImageStore {
        self.catalog.images()
    }
}
