//! Upstream relaying
//!
//! Fetches resources from a plain-HTTP upstream so routes can stream them back
//! to clients.

pub mod upstream;

pub use upstream::{UpstreamBody, UpstreamRelay};
