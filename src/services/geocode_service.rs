use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

/// Placeholder used whenever reverse geocoding is disabled or fails. Pin
/// creation never fails on a geocoding problem.
pub const FALLBACK_LOCATION: &str = "Unknown location";

const USER_AGENT: &str = "pinboard/0.1 (collaborative map board)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// Nominatim usage policy: at most one request per second.
const COURTESY_DELAY: Duration = Duration::from_secs(1);

// Address components in order of preference.
const ADDRESS_KEYS: [&str; 6] = ["city", "town", "village", "suburb", "county", "state"];

/// Best-effort reverse geocoder against a Nominatim `reverse` endpoint.
///
/// Results are cached per coordinate pair for the process lifetime. With no
/// endpoint configured every lookup yields [`FALLBACK_LOCATION`] without
/// touching the network.
pub struct Geocoder {
    client: Client,
    endpoint: Option<String>,
    cache: Mutex<HashMap<String, String>>,
}

impl Geocoder {
    pub fn new(client: Client, endpoint: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the nearest named place for a coordinate pair.
    pub async fn lookup(&self, lat: f64, lng: f64) -> String {
        let endpoint = match &self.endpoint {
            Some(url) => url,
            None => return FALLBACK_LOCATION.to_string(),
        };

        let cache_key = format!("{lat},{lng}");
        if let Some(hit) = self.cache.lock().unwrap().get(&cache_key) {
            return hit.clone();
        }

        tokio::time::sleep(COURTESY_DELAY).await;

        let request = self
            .client
            .get(endpoint)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("format", "json".to_string()),
                ("zoom", "10".to_string()),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(REQUEST_TIMEOUT);

        let data: Value = match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => match response.json().await {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!("Geocoding response for {cache_key} unreadable: {e}");
                    return FALLBACK_LOCATION.to_string();
                }
            },
            Err(e) => {
                tracing::warn!("Geocoding request for {cache_key} failed: {e}");
                return FALLBACK_LOCATION.to_string();
            }
        };

        let location =
            location_from_response(&data).unwrap_or_else(|| FALLBACK_LOCATION.to_string());
        tracing::info!("Geocoded {cache_key} as {location}");

        self.cache
            .lock()
            .unwrap()
            .insert(cache_key, location.clone());
        location
    }
}

/// Pick the best place name out of a Nominatim reverse response: the first
/// preferred address component, else the first segment of `display_name`.
fn location_from_response(data: &Value) -> Option<String> {
    if let Some(address) = data.get("address") {
        for key in ADDRESS_KEYS {
            if let Some(name) = address.get(key).and_then(Value::as_str) {
                return Some(name.to_string());
            }
        }
    }

    data.get("display_name")
        .and_then(Value::as_str)
        .and_then(|name| name.split(',').next())
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn disabled_geocoder_returns_fallback() {
        let geocoder = Geocoder::new(Client::new(), None);
        assert_eq!(geocoder.lookup(52.5, 13.4).await, FALLBACK_LOCATION);
    }

    #[test]
    fn prefers_city_over_coarser_components() {
        let data = json!({
            "address": {"state": "Berlin", "city": "Berlin-Mitte"},
            "display_name": "Mitte, Berlin, Germany"
        });
        assert_eq!(
            location_from_response(&data).as_deref(),
            Some("Berlin-Mitte")
        );
    }

    #[test]
    fn falls_back_to_display_name_prefix() {
        let data = json!({
            "address": {"country": "Germany"},
            "display_name": "Mitte, Berlin, Germany"
        });
        assert_eq!(location_from_response(&data).as_deref(), Some("Mitte"));
    }

    #[test]
    fn empty_response_yields_none() {
        assert_eq!(location_from_response(&json!({})), None);
    }
}
