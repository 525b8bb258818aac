use crate::errors::ApiError;
use crate::state::pin::Pin;

/// Render a standalone Leaflet page embedding the current pin list, suitable
/// for downloading and opening without the server running.
pub fn render_light_map(pins: &[Pin]) -> Result<String, ApiError> {
    let pins_json = serde_json::to_string(pins)?;
    Ok(TEMPLATE.replace("__PINS__", &pins_json))
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pinboard Snapshot</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
    <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
    <style>
        body { margin: 0; padding: 0; font-family: Arial, sans-serif; height: 100vh; display: flex; flex-direction: column; }
        .header { background: white; padding: 10px 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .header h1 { margin: 0; font-size: 24px; color: #333; }
        #map { flex: 1; position: relative; }
        .popup-image { max-width: 200px; max-height: 200px; margin: 10px auto; border-radius: 8px; display: block; }
        .leaflet-popup-content { text-align: center; min-width: 200px; }
        .connection-line { pointer-events: none; }
        .marker-label { background: rgba(255,255,255,0.9); border: 1px solid #ccc; border-radius: 4px;
                        padding: 2px 6px; font-size: 12px; white-space: nowrap; cursor: pointer;
                        transform: translate(-50%, -10px); box-shadow: 0 1px 3px rgba(0,0,0,0.2); }
    </style>
</head>
<body>
    <div class="header"><h1>Pinboard Snapshot</h1></div>
    <div id="map"></div>

    <script>
        const map = L.map('map').setView([50.0, 15.0], 4);
        L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
            maxZoom: 19,
            attribution: 'OpenStreetMap contributors'
        }).addTo(map);

        const redIcon = L.icon({
            iconUrl: 'https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img/marker-icon-2x-red.png',
            shadowUrl: 'https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/images/marker-shadow.png',
            iconSize: [25, 41], iconAnchor: [12, 41], popupAnchor: [1, -34], shadowSize: [41, 41]
        });

        const pins = __PINS__;
        const byId = {};
        const markers = [];

        pins.forEach(pin => {
            const marker = L.marker([pin.lat, pin.lng], { icon: redIcon, riseOnHover: true });
            const popup = `
                <div>
                    <strong>${pin.name}</strong>
                    ${pin.location ? `<br><em>${pin.location}</em>` : ''}
                    ${pin.imageUrl ? `<br><img src="${pin.imageUrl}" class="popup-image" alt="${pin.name}">` : ''}
                </div>
            `;
            marker.bindPopup(popup, { minWidth: 220, maxWidth: 300 });

            const label = L.marker([pin.lat, pin.lng], {
                icon: L.divIcon({ className: 'marker-label', html: pin.name, iconSize: null }),
                zIndexOffset: 1000
            });
            label.on('click', () => marker.openPopup());
            label.addTo(map);

            marker.addTo(map);
            byId[pin.id] = pin;
            markers.push(marker);
        });

        const drawn = {};
        pins.forEach(pin => {
            (pin.connections || []).forEach(conn => {
                if (drawn[conn.id]) return;
                const a = byId[conn.sourceId];
                const b = byId[conn.targetId];
                if (!a || !b) return;
                L.polyline([[a.lat, a.lng], [b.lat, b.lng]], {
                    color: '#666', weight: 1, dashArray: '5, 10', opacity: 0.6,
                    className: 'connection-line'
                }).addTo(map);
                drawn[conn.id] = true;
            });
        });
    </script>
</body>
</html>"#;
