pub mod assembly;
pub mod config;
pub mod core;
pub mod engine;
pub mod geo;
pub mod observability;
pub mod resilience;
pub mod source;
