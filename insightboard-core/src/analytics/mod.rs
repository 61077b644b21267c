//! Metrics engine
//!
//! Pure functions turning a snapshot of interaction records into the
//! dashboard's derived views:
//! - [`summarize`]: KPI summary statistics
//! - [`daily_series`]: interactions, conversions or revenue per day
//! - [`stage_distribution`]: most common stages
//! - [`funnel`]: five-stage funnel with drop-off rates
//!
//! Every function is deterministic and owns no state: identical input
//! always yields identical output. None of them can fail; divisions by
//! zero are defined as `0` or `None` by each view.

pub mod daily;
pub mod funnel;
pub mod stages;
pub mod summary;

pub use daily::{daily_series, DailyPoint, DayBoundary, SeriesKind, DEFAULT_SERIES_DAYS};
pub use funnel::{funnel, FunnelStage};
pub use stages::{
    display_label, stage_distribution, stage_index, stage_label, StageCount, DEFAULT_TOP_STAGES,
    STAGES, UNKNOWN_STAGE,
};
pub use summary::{summarize, SummaryStats};
