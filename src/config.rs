use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    pub server_version: String,

    /// Directory holding the pin records, one JSON file per pin.
    pub pins_dir: String,

    /// How many recent events the broadcaster keeps for replay to
    /// late-joining stream clients.
    pub history_capacity: usize,

    /// Reverse-geocoding endpoint (Nominatim `reverse`).
    ///
    /// If `None`, geocoding is disabled and every pin gets the
    /// "Unknown location" placeholder. Useful for tests and offline runs.
    pub geocode_url: Option<String>,

    /// Giphy API key for /api/random-gif. If `None`, that endpoint
    /// reports an upstream error.
    pub giphy_api_key: Option<String>,
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Self {
        let file = fs::read_to_string(Path::new(path))
            .expect("Failed to read config.json");

        serde_json::from_str::<AppConfig>(&file)
            .expect("Invalid config.json")
    }
}
