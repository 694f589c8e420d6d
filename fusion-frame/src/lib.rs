pub mod config;
pub mod pipeline;
pub mod prompt;
pub mod server;
