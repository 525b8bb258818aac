/*****************************************************************************************
 *
 *  Pinboard – Collaborative Map-Pin Board Backend in Rust
 *  ------------------------------------------------------
 *
 *  File-backed pin records, bidirectional connections, and a live SSE
 *  event stream with bounded history replay.
 *
 *****************************************************************************************/

pub mod app;
pub mod config;
pub mod errors;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
