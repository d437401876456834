// WebSocket module - organized into focused submodules
//
// - handler: WebSocket upgrade handler (entry point)
// - connection: per-connection read loop and write task
// - parsing: inbound frame decoding and rejection reasons
// - sending: message serialization and sending functions
// - routes: HTTP route setup (health, metrics, sockets)
// - metrics: metrics endpoint and authentication

mod connection;
mod handler;
mod metrics;
mod parsing;
mod routes;
mod sending;

pub use handler::websocket_handler;
pub use metrics::metrics_handler;
pub use routes::{create_router, run_server};
