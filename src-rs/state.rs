use std::sync::Arc;

use crate::{config::Config, pollen::PollenClient, rate_limit::InMemoryRateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pollen: PollenClient,
    pub pollen_limiter: Arc<InMemoryRateLimiter>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let pollen = PollenClient::new(&config.pollen_api_base, config.upstream_timeout)?;
        Ok(Self {
            pollen_limiter: Arc::new(InMemoryRateLimiter::new(config.rate_limit)),
            pollen,
            config: Arc::new(config),
        })
    }
}
