pub mod connection_routes;
pub mod misc_routes;
pub mod pin_routes;
pub mod stream_routes;
pub mod system_routes;
