use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current on-disk record schema. Bumped when the record layout changes;
/// records written before the field existed deserialize as version 1.
pub const SCHEMA_VERSION: u32 = 1;

fn schema_default() -> u32 {
    SCHEMA_VERSION
}

/// A geotagged marker. One record per pin on disk, keyed by `id`.
///
/// `id` is a server-generated UUID v4 and never changes; the storage file
/// name equals the id. Wire and disk field names are camelCase to match the
/// records the frontend already holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    #[serde(default = "schema_default")]
    pub schema: u32,
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// A labeled link between two pins.
///
/// Canonical model is bidirectional: the same record (same `id`) is stored on
/// both endpoint pins, and at most one connection may exist per unordered
/// {source_id, target_id} pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Connection {
    /// Whether this connection links `a` and `b` in either direction.
    pub fn links(&self, a: &str, b: &str) -> bool {
        (self.source_id == a && self.target_id == b)
            || (self.source_id == b && self.target_id == a)
    }
}
