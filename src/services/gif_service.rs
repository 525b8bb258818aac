use reqwest::Client;
use serde_json::Value;

use crate::errors::ApiError;

const GIPHY_RANDOM_URL: &str = "https://api.giphy.com/v1/gifs/random";

/// Fetch a random GIF url from Giphy. Unlike geocoding this collaborator does
/// not degrade: any failure is surfaced to the caller as an upstream error.
pub async fn random_gif(client: &Client, api_key: Option<&str>) -> Result<String, ApiError> {
    let api_key =
        api_key.ok_or_else(|| ApiError::Upstream("Giphy API key is not configured".to_string()))?;

    let response = client
        .get(GIPHY_RANDOM_URL)
        .query(&[("api_key", api_key), ("rating", "g")])
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ApiError::Upstream(format!("Giphy request failed: {e}")))?;

    let data: Value = response
        .json()
        .await
        .map_err(|e| ApiError::Upstream(format!("Giphy response unreadable: {e}")))?;

    data.pointer("/data/images/original/url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Upstream("Giphy response contained no GIF url".to_string()))
}
