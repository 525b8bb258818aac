use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::state::pin::Connection;
use crate::store::PinStore;

fn read_endpoint_err(err: ApiError, role: &str) -> ApiError {
    match err {
        ApiError::NotFound(_) => ApiError::NotFound(format!("{role} pin not found")),
        other => other,
    }
}

/// Create a connection between two pins.
///
/// The record is written to both endpoint pins under the same id; at most one
/// connection may exist per unordered pair, checked in both directions.
pub async fn add(
    store: &PinStore,
    source_id: &str,
    target_id: &str,
    label: Option<String>,
) -> Result<Connection, ApiError> {
    if source_id == target_id {
        return Err(ApiError::Validation(
            "A pin cannot be connected to itself".to_string(),
        ));
    }

    let _guards = store.lock_pair(source_id, target_id).await;

    let mut source = store
        .read(source_id)
        .await
        .map_err(|e| read_endpoint_err(e, "Source"))?;
    let mut target = store
        .read(target_id)
        .await
        .map_err(|e| read_endpoint_err(e, "Target"))?;

    // Both endpoints carry every connection that touches them, so checking
    // one side covers the unordered pair.
    if source
        .connections
        .iter()
        .any(|c| c.links(source_id, target_id))
    {
        return Err(ApiError::Conflict("Connection already exists".to_string()));
    }

    let connection = Connection {
        id: Uuid::new_v4().to_string(),
        source_id: source_id.to_string(),
        target_id: target_id.to_string(),
        label: label.filter(|l| !l.is_empty()),
        timestamp: Some(Utc::now()),
    };

    source.connections.push(connection.clone());
    target.connections.push(connection.clone());
    store.write(&source).await?;
    store.write(&target).await?;

    tracing::info!("Connected {source_id} <-> {target_id} ({})", connection.id);
    Ok(connection)
}

/// Every connection across all pins, de-duplicated by connection id (each
/// record appears on both endpoints). Sorted by timestamp for a stable order.
pub async fn list_all(store: &PinStore) -> Result<Vec<Connection>, ApiError> {
    let mut by_id: HashMap<String, Connection> = HashMap::new();
    for pin in store.scan().await? {
        for conn in pin.connections {
            by_id.entry(conn.id.clone()).or_insert(conn);
        }
    }

    let mut connections: Vec<Connection> = by_id.into_values().collect();
    connections.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(connections)
}

/// The connections attached to one pin.
pub async fn for_pin(store: &PinStore, id: &str) -> Result<Vec<Connection>, ApiError> {
    Ok(store.read(id).await?.connections)
}

/// Remove every connection matching the unordered pair from both endpoint
/// records. Succeeds when zero entries matched; both pins must exist.
pub async fn delete(store: &PinStore, source_id: &str, target_id: &str) -> Result<(), ApiError> {
    if source_id == target_id {
        return Err(ApiError::Validation(
            "Source and target must be different pins".to_string(),
        ));
    }

    let _guards = store.lock_pair(source_id, target_id).await;

    let mut source = store
        .read(source_id)
        .await
        .map_err(|e| read_endpoint_err(e, "Source"))?;
    let mut target = store
        .read(target_id)
        .await
        .map_err(|e| read_endpoint_err(e, "Target"))?;

    source.connections.retain(|c| !c.links(source_id, target_id));
    target.connections.retain(|c| !c.links(source_id, target_id));
    store.write(&source).await?;
    store.write(&target).await?;

    tracing::info!("Disconnected {source_id} <-> {target_id}");
    Ok(())
}
