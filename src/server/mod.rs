//! Accept loop and per-connection dispatch.

pub mod dispatch;
pub mod listener;

pub use dispatch::Dispatch;
pub use listener::Server;
