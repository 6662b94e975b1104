//! Transport plumbing.
//!
//! - **server**: TCP listener, one thread per connected client
//! - **telnet**: character-mode negotiation and command filtering

pub mod server;
pub mod telnet;

pub use server::Server;
