//! IPC module for remote control over a Unix socket

mod protocol;
mod server;

pub use server::Server;
