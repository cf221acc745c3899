//! # Collectors Module
//!
//! This module contains the gather logic.
//!
//! ## Architecture
//!
//! - **`Collector` trait**: Defines the interface for all metric collectors
//! - **`GraylogCollector`**: Fetches, parses and flattens the metrics of one Graylog endpoint
//! - **`Orchestrator`**: Gathers every configured endpoint concurrently and aggregates their failures

pub mod collector;
pub mod graylog_collector;
pub mod orchestrator;

// Re-export the main types for easy access
pub use collector::Collector;
pub use graylog_collector::GraylogCollector;
pub use orchestrator::Orchestrator;
