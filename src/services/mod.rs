pub mod broadcast_service;
pub mod connection_service;
pub mod geocode_service;
pub mod gif_service;
pub mod pin_service;
pub mod snapshot_service;
