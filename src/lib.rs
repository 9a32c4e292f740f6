pub mod common;
pub mod config;
pub mod server;
pub mod soundcloud;
pub mod transport;
