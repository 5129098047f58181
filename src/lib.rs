pub mod addressing;
pub mod backend;
pub mod builders;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod resolve;
pub mod server;
pub mod state;
pub mod tools;
