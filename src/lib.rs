pub mod config;
pub mod engine;
pub mod hook;
pub mod layout;
pub mod transport;
