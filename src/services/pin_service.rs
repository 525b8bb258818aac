use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::services::geocode_service::Geocoder;
use crate::state::pin::{Pin, SCHEMA_VERSION};
use crate::store::PinStore;

/// Body of POST /pins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinRequest {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Validate, geocode (best-effort) and persist a new pin.
pub async fn create(
    store: &PinStore,
    geocoder: &Geocoder,
    req: CreatePinRequest,
) -> Result<Pin, ApiError> {
    if !req.lat.is_finite() || !(-90.0..=90.0).contains(&req.lat) {
        return Err(ApiError::Validation(
            "lat must be a finite number between -90 and 90".to_string(),
        ));
    }
    if !req.lng.is_finite() || !(-180.0..=180.0).contains(&req.lng) {
        return Err(ApiError::Validation(
            "lng must be a finite number between -180 and 180".to_string(),
        ));
    }
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name must not be empty".to_string()));
    }

    let location = geocoder.lookup(req.lat, req.lng).await;

    let pin = Pin {
        schema: SCHEMA_VERSION,
        id: Uuid::new_v4().to_string(),
        lat: req.lat,
        lng: req.lng,
        name: name.to_string(),
        image_url: req.image_url.filter(|url| !url.is_empty()),
        location: Some(location),
        timestamp: Some(Utc::now()),
        connections: Vec::new(),
    };

    let _guard = store.lock_record(&pin.id).await;
    store.write(&pin).await?;
    tracing::info!("Created pin {} ({})", pin.id, pin.name);

    Ok(pin)
}

/// All pins, newest first. A record without a timestamp sorts last.
/// Fresh directory scan on every call.
pub async fn list(store: &PinStore) -> Result<Vec<Pin>, ApiError> {
    let mut pins = store.scan().await?;
    pins.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(pins)
}

/// Delete a pin and strip its connections from every peer record.
///
/// NotFound every time the id is absent; the mirror cleanup tolerates peers
/// that have disappeared in the meantime.
pub async fn delete(store: &PinStore, id: &str) -> Result<(), ApiError> {
    let pin = {
        let _guard = store.lock_record(id).await;
        let pin = store.read(id).await?;
        store.remove(id).await?;
        pin
    };
    tracing::info!("Deleted pin {id}");

    for conn in &pin.connections {
        let peer = if conn.source_id == id {
            &conn.target_id
        } else {
            &conn.source_id
        };
        if peer == id {
            continue;
        }

        let _guard = store.lock_record(peer).await;
        let mut peer_pin = match store.read(peer).await {
            Ok(p) => p,
            Err(ApiError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };

        let before = peer_pin.connections.len();
        peer_pin
            .connections
            .retain(|c| c.source_id != id && c.target_id != id);
        if peer_pin.connections.len() != before {
            store.write(&peer_pin).await?;
        }
    }

    Ok(())
}
