//! farming - coordinate group farming sessions
//!
//! This crate provides:
//! - The session model, durable JSON store and lifecycle service
//! - A client-server protocol for issuing session commands
//! - Configuration management
//!
//! # Architecture
//!
//! A moderator creates a session and receives a 10-digit code. Participants
//! join with a nickname until the session is closed, and anyone can view the
//! roster or ask for a randomized turn order.
//!
//! - [`session::SessionService`] implements the operations and serializes
//!   every load -> mutate -> save cycle on the backing file
//! - The server (`farming-server`) hosts one service behind a Unix socket
//!   and checks the privileged role for create and close
//! - The client (`farming`) sends one command per invocation

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;

pub use error::{FarmingError, Result};
