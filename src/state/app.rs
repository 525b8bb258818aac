use std::sync::Arc;

use reqwest::Client;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::services::broadcast_service::Broadcaster;
use crate::services::geocode_service::Geocoder;
use crate::store::PinStore;

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: PinStore,
    pub broadcaster: Broadcaster,
    pub geocoder: Arc<Geocoder>,
    pub http: Client,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, ApiError> {
        let store = PinStore::open(config.pins_dir.clone()).await?;
        let broadcaster = Broadcaster::new(config.history_capacity);
        let http = Client::new();
        let geocoder = Arc::new(Geocoder::new(http.clone(), config.geocode_url.clone()));

        Ok(Self {
            config,
            store,
            broadcaster,
            geocoder,
            http,
        })
    }
}
