pub mod annotation;
pub mod composite;
pub mod config;
pub mod data_sources;
pub mod errors;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod protein;
