//! Sweepd Engine Library
//!
//! This library provides the core functionality of the sweepd coordination
//! daemon. It is used by both the main binary and integration tests.

/// Configuration management module
pub mod config;

/// Zone registry module
pub mod registry;

/// Command aggregation module
pub mod aggregator;

/// Request coordination module
pub mod coordinator;

/// Plan dispatch module
pub mod dispatcher;

/// Vacuum device adapters
pub mod device;

/// HTTP intake listener
pub mod intake;

/// Telemetry and Observability
pub mod telemetry;

/// CLI interface module
pub mod cli;

/// Command handlers module
pub mod handlers;
