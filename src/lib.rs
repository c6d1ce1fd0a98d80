pub mod aggregator;
pub mod config;
pub mod errors;
pub mod media_server;
pub mod models;
pub mod orchestrator;
pub mod reconciler;
pub mod rules;
pub mod sources;
pub mod utils;
