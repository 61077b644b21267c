//! Dashboard service
//!
//! Couples one [`RecordSource`] with the metrics engine. Each view performs
//! exactly one fetch, with the columns and order it needs, followed by one
//! pure computation. Views share nothing, so they can be requested
//! concurrently; a failed fetch fails that view alone and never produces a
//! zero-filled result.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::analytics::{
    daily_series, funnel, stage_distribution, summarize, DailyPoint, FunnelStage, SeriesKind,
    StageCount, SummaryStats,
};
use crate::config::{Config, MetricsConfig};
use crate::error::{Error, Result};
use crate::source::{Column, FetchRequest, RecordSource, RestSource, SortOrder};
use crate::types::InteractionRecord;

const SUMMARY_COLUMNS: &[Column] = &[Column::IsFinished, Column::IsTalking, Column::MessageCount];
const INTERACTION_COLUMNS: &[Column] = &[Column::CreatedAt];
const CONVERSION_COLUMNS: &[Column] = &[Column::CreatedAt, Column::IsFinished];
const STAGE_COLUMNS: &[Column] = &[Column::Stage];

/// Which daily series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyMetric {
    Interactions,
    Conversions,
    Revenue,
}

impl DailyMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyMetric::Interactions => "interactions",
            DailyMetric::Conversions => "conversions",
            DailyMetric::Revenue => "revenue",
        }
    }

    fn series_kind(&self, metrics: &MetricsConfig) -> SeriesKind {
        match self {
            DailyMetric::Interactions => SeriesKind::Interactions,
            DailyMetric::Conversions => SeriesKind::Conversions,
            DailyMetric::Revenue => SeriesKind::Revenue {
                per_conversion: metrics.revenue_per_conversion,
            },
        }
    }

    fn request(&self) -> FetchRequest {
        let columns = match self {
            DailyMetric::Interactions => INTERACTION_COLUMNS,
            DailyMetric::Conversions | DailyMetric::Revenue => CONVERSION_COLUMNS,
        };
        FetchRequest::columns(columns).ordered(SortOrder::Ascending)
    }
}

impl FromStr for DailyMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interactions" => Ok(DailyMetric::Interactions),
            "conversions" => Ok(DailyMetric::Conversions),
            "revenue" => Ok(DailyMetric::Revenue),
            other => Err(format!(
                "unknown daily metric '{}': use interactions, conversions or revenue",
                other
            )),
        }
    }
}

impl fmt::Display for DailyMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every view from one refresh, each with its own outcome.
#[derive(Debug)]
pub struct DashboardSnapshot {
    pub summary: Result<SummaryStats>,
    pub interactions: Result<Vec<DailyPoint>>,
    pub conversions: Result<Vec<DailyPoint>>,
    pub revenue: Result<Vec<DailyPoint>>,
    pub stages: Result<Vec<StageCount>>,
    pub funnel: Result<Vec<FunnelStage>>,
}

impl DashboardSnapshot {
    /// Number of views whose fetch failed.
    pub fn failed_views(&self) -> usize {
        [
            self.summary.is_err(),
            self.interactions.is_err(),
            self.conversions.is_err(),
            self.revenue.is_err(),
            self.stages.is_err(),
            self.funnel.is_err(),
        ]
        .iter()
        .filter(|failed| **failed)
        .count()
    }
}

/// Derived views over one record source.
#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn RecordSource>,
    metrics: MetricsConfig,
}

impl Dashboard {
    pub fn new(source: Arc<dyn RecordSource>, metrics: MetricsConfig) -> Self {
        Self { source, metrics }
    }

    /// Dashboard over the hosted backend described by `config.source`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = RestSource::new(&config.source)?;
        Ok(Self::new(Arc::new(source), config.metrics.clone()))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    async fn load(&self, view: &str, request: FetchRequest) -> Result<Vec<InteractionRecord>> {
        match self.source.fetch(&request).await {
            Ok(records) => {
                tracing::debug!(
                    view,
                    source = self.source.name(),
                    rows = records.len(),
                    "Fetched records"
                );
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(view, source = self.source.name(), error = %e, "Fetch failed");
                Err(Error::Source(e))
            }
        }
    }

    /// KPI summary statistics.
    pub async fn summary(&self) -> Result<SummaryStats> {
        let records = self
            .load("summary", FetchRequest::columns(SUMMARY_COLUMNS))
            .await?;
        let stats = summarize(&records);
        tracing::info!(
            total_users = stats.total_users,
            conversions = stats.conversions,
            "Computed summary"
        );
        Ok(stats)
    }

    /// Daily series of `metric`, most recent `series_days` days.
    pub async fn daily(&self, metric: DailyMetric) -> Result<Vec<DailyPoint>> {
        let records = self.load(metric.as_str(), metric.request()).await?;
        let series = daily_series(
            &records,
            metric.series_kind(&self.metrics),
            self.metrics.day_boundary,
            self.metrics.series_days,
        );
        tracing::info!(metric = metric.as_str(), days = series.len(), "Computed daily series");
        Ok(series)
    }

    /// Most common stages, `top_stages` at most.
    pub async fn stage_distribution(&self) -> Result<Vec<StageCount>> {
        let records = self
            .load("stages", FetchRequest::columns(STAGE_COLUMNS))
            .await?;
        let distribution = stage_distribution(&records, self.metrics.top_stages);
        tracing::info!(labels = distribution.len(), "Computed stage distribution");
        Ok(distribution)
    }

    /// Five-stage funnel.
    pub async fn funnel(&self) -> Result<Vec<FunnelStage>> {
        let records = self
            .load("funnel", FetchRequest::columns(STAGE_COLUMNS))
            .await?;
        let stages = funnel(&records);
        tracing::info!(entered = stages[0].count, "Computed funnel");
        Ok(stages)
    }

    /// Raw interactions, newest first.
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<InteractionRecord>> {
        let mut request = FetchRequest::all().ordered(SortOrder::Descending);
        if let Some(limit) = limit {
            request = request.limit(limit);
        }
        self.load("records", request).await
    }

    /// Compute every view concurrently.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let (summary, interactions, conversions, revenue, stages, funnel) = tokio::join!(
            self.summary(),
            self.daily(DailyMetric::Interactions),
            self.daily(DailyMetric::Conversions),
            self.daily(DailyMetric::Revenue),
            self.stage_distribution(),
            self.funnel()
        );

        let snapshot = DashboardSnapshot {
            summary,
            interactions,
            conversions,
            revenue,
            stages,
            funnel,
        };
        if snapshot.failed_views() > 0 {
            tracing::warn!(failed = snapshot.failed_views(), "Refresh incomplete");
        }
        snapshot
    }
}

/// Synchronous wrapper for Dashboard
///
/// Provides blocking methods for use in synchronous code.
pub struct SyncDashboard {
    inner: Dashboard,
    runtime: tokio::runtime::Runtime,
}

impl SyncDashboard {
    pub fn new(dashboard: Dashboard) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            inner: dashboard,
            runtime,
        })
    }

    pub fn summary(&self) -> Result<SummaryStats> {
        self.runtime.block_on(self.inner.summary())
    }

    pub fn daily(&self, metric: DailyMetric) -> Result<Vec<DailyPoint>> {
        self.runtime.block_on(self.inner.daily(metric))
    }

    pub fn stage_distribution(&self) -> Result<Vec<StageCount>> {
        self.runtime.block_on(self.inner.stage_distribution())
    }

    pub fn funnel(&self) -> Result<Vec<FunnelStage>> {
        self.runtime.block_on(self.inner.funnel())
    }

    pub fn recent(&self, limit: Option<usize>) -> Result<Vec<InteractionRecord>> {
        self.runtime.block_on(self.inner.recent(limit))
    }

    pub fn refresh(&self) -> DashboardSnapshot {
        self.runtime.block_on(self.inner.refresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::DayBoundary;
    use crate::error::SourceError;
    use crate::source::{MemorySource, Projection};
    use chrono::{TimeZone, Utc};

    fn metrics() -> MetricsConfig {
        MetricsConfig {
            day_boundary: DayBoundary::Utc,
            ..Default::default()
        }
    }

    fn sample() -> Vec<InteractionRecord> {
        let mut records = Vec::new();
        for (id, (day, stage, finished)) in [
            (2, "rapport_inicial", Some(true)),
            (1, "rapport_inicial", None),
            (1, "pitch_direto", Some(false)),
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = InteractionRecord::new(
                id as i64 + 1,
                Utc.with_ymd_and_hms(2024, 4, day, 10, 0, 0).unwrap(),
            );
            r.stage = Some(stage.to_string());
            r.is_finished = finished;
            r.message_count = Some(4);
            records.push(r);
        }
        records
    }

    #[test]
    fn test_daily_metric_parse() {
        assert_eq!("Revenue".parse::<DailyMetric>(), Ok(DailyMetric::Revenue));
        assert!("profit".parse::<DailyMetric>().is_err());
        assert_eq!(DailyMetric::Conversions.to_string(), "conversions");
    }

    #[tokio::test]
    async fn test_views_request_projection_and_order() {
        let source = MemorySource::new(sample());
        let dashboard = Dashboard::new(Arc::new(source.clone()), metrics());

        dashboard.daily(DailyMetric::Revenue).await.unwrap();
        dashboard.funnel().await.unwrap();
        dashboard.recent(Some(2)).await.unwrap();

        let requests = source.requests();
        assert_eq!(
            requests[0],
            FetchRequest::columns(CONVERSION_COLUMNS).ordered(SortOrder::Ascending)
        );
        assert_eq!(requests[1].projection, Projection::Columns(STAGE_COLUMNS));
        assert_eq!(requests[2].order, Some(SortOrder::Descending));
        assert_eq!(requests[2].limit, Some(2));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let dashboard = Dashboard::new(Arc::new(MemorySource::new(sample())), metrics());
        let rows = dashboard.recent(None).await.unwrap();
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_revenue_uses_configured_constant() {
        let config = MetricsConfig {
            revenue_per_conversion: 80.0,
            ..metrics()
        };
        let dashboard = Dashboard::new(Arc::new(MemorySource::new(sample())), config);
        let revenue = dashboard.daily(DailyMetric::Revenue).await.unwrap();
        assert_eq!(revenue.len(), 1);
        assert_eq!(revenue[0].value, 80.0);
    }

    #[tokio::test]
    async fn test_failed_fetch_yields_no_view() {
        let source = MemorySource::new(sample());
        source.set_failure(Some(SourceError::Api {
            status: 401,
            message: "JWT expired".to_string(),
        }));
        let dashboard = Dashboard::new(Arc::new(source), metrics());

        match dashboard.summary().await {
            Err(Error::Source(SourceError::Api { status, .. })) => assert_eq!(status, 401),
            other => panic!("expected source error, got {:?}", other),
        }

        let snapshot = dashboard.refresh().await;
        assert_eq!(snapshot.failed_views(), 6);
    }

    #[test]
    fn test_sync_dashboard() {
        let dashboard = Dashboard::new(Arc::new(MemorySource::new(sample())), metrics());
        let sync = SyncDashboard::new(dashboard).unwrap();

        let summary = sync.summary().unwrap();
        assert_eq!(summary.total_users, 3);
        assert_eq!(summary.conversions, 1);
        assert_eq!(summary.avg_messages, 4.0);

        let snapshot = sync.refresh();
        assert_eq!(snapshot.failed_views(), 0);
        assert_eq!(snapshot.funnel.unwrap()[0].count, 2);
    }
}
