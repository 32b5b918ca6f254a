//! Server module - Unix socket listener, client connections and request dispatch

mod connection;
mod dispatch;
mod listener;

pub use dispatch::RoleGate;
pub use listener::ServerListener;
