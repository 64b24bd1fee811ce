use std::{sync::Arc, sync::Once, time::Duration};

use golf_rating::{
    config::EngineConfig,
    messaging::LiveUpdatePublisher,
    providers::{Dataset, InMemoryProvider},
    service::{Providers, RatingService}
};

static INIT: Once = Once::new();

/// Initialize test environment with RUST_LOG=WARN
pub fn init_test_env() {
    INIT.call_once(|| {
        std::env::set_var("RUST_LOG", "warn");
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A service over an in-memory copy of `dataset`. The provider is returned so tests can
/// add data or simulate outages.
pub fn service_with(dataset: Dataset) -> (Arc<InMemoryProvider>, RatingService) {
    service_with_config(dataset, EngineConfig::default())
}

pub fn service_with_config(dataset: Dataset, config: EngineConfig) -> (Arc<InMemoryProvider>, RatingService) {
    init_test_env();

    let provider = Arc::new(InMemoryProvider::from_dataset(dataset));
    let publisher = Arc::new(LiveUpdatePublisher::new(64, true));
    let service = RatingService::new(Providers::from_single(provider.clone()), config, publisher);

    (provider, service)
}

pub fn short_timeout_config() -> EngineConfig {
    EngineConfig {
        fetch_timeout: Duration::from_millis(20),
        ..EngineConfig::default()
    }
}
