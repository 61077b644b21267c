//! # insightboard-core
//!
//! Core library for insightboard - metrics for a customer-interaction dashboard.
//!
//! This library provides:
//! - The interaction record type stored by the hosted backend
//! - Record sources (REST API, JSON snapshot, in-memory)
//! - The metrics engine: summary, daily series, stage distribution, funnel
//! - A dashboard service computing each view from one fetch
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Data flows through three layers:
//! - **Source:** rows owned and mutated by the hosted backend (read-only here)
//! - **Engine:** pure aggregation over a snapshot of rows
//! - **Views:** the derived shapes handed to presentation, recomputed on demand
//!
//! ## Example
//!
//! ```rust,no_run
//! use insightboard_core::{Config, Dashboard, SyncDashboard};
//!
//! let config = Config::load().expect("failed to load config");
//! let dashboard = Dashboard::from_config(&config).expect("invalid source config");
//! let dashboard = SyncDashboard::new(dashboard).expect("failed to start runtime");
//!
//! let summary = dashboard.summary().expect("fetch failed");
//! println!("{} users, {:.1}% converted", summary.total_users, summary.conversion_rate);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use dashboard::{DailyMetric, Dashboard, DashboardSnapshot, SyncDashboard};
pub use error::{Error, Result, SourceError};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod logging;
pub mod source;
pub mod types;
