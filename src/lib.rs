//! rawhttp - HTTP/1.1 from raw bytes
//!
//! Incremental request parsing, order-enforcing response writing and a small
//! TCP server that runs one request/response exchange per connection.

pub mod config;
pub mod dump;
pub mod http;
pub mod proxy;
pub mod routes;
pub mod server;
