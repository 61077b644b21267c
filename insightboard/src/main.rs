//! insightboard - customer interaction dashboard metrics
//!
//! Prints the dashboard's derived views (summary, daily series, stage
//! distribution, funnel) computed from the hosted backend or from an
//! exported JSON snapshot.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/insightboard/config.toml (~/.config/insightboard/config.toml)
//! - Logs: $XDG_STATE_HOME/insightboard/insightboard.log

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use insightboard_core::analytics::{
    display_label, DailyPoint, FunnelStage, StageCount, SummaryStats,
};
use insightboard_core::format::{format_one_decimal, format_opt, format_relative_time};
use insightboard_core::source::SnapshotSource;
use insightboard_core::{
    Config, DailyMetric, Dashboard, DashboardSnapshot, InteractionRecord, SyncDashboard,
};

#[derive(Parser)]
#[command(name = "insightboard")]
#[command(about = "Customer interaction dashboard metrics")]
#[command(version)]
struct Args {
    /// Read rows from an exported JSON snapshot instead of the hosted backend
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Config file (default: ~/.config/insightboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// KPI summary: users, conversions, conversion rate, active, avg messages
    Summary,

    /// Daily series for the most recent days
    Daily {
        /// interactions, conversions or revenue
        #[arg(short, long, default_value = "interactions")]
        metric: DailyMetric,
    },

    /// Most common funnel stages
    Stages,

    /// Five-stage funnel with drop-off rates
    Funnel,

    /// Latest interactions, newest first
    Records {
        /// Maximum number of rows to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Every view, each reported independently
    Overview,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let format = match args.format.as_str() {
        "text" => OutputFormat::Text,
        "json" => OutputFormat::Json,
        other => anyhow::bail!("Unknown format: {}. Use 'text' or 'json'", other),
    };

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    // Initialize logging
    let _log_guard = insightboard_core::logging::init(&config.logging).ok();

    let dashboard = match &args.snapshot {
        Some(path) => Dashboard::new(
            Arc::new(SnapshotSource::new(path)),
            config.metrics.clone(),
        ),
        None => Dashboard::from_config(&config).context("failed to configure record source")?,
    };
    tracing::info!(
        source = dashboard.source_name(),
        log_file = %insightboard_core::logging::log_file_path().display(),
        "Starting insightboard"
    );

    let dashboard = SyncDashboard::new(dashboard).context("failed to start runtime")?;

    match args.command {
        Command::Summary => {
            let stats = dashboard.summary().context("failed to compute summary")?;
            emit(format, &stats, print_summary)?;
        }
        Command::Daily { metric } => {
            let series = dashboard
                .daily(metric)
                .with_context(|| format!("failed to compute daily {}", metric))?;
            emit(format, &series, |s| print_series(metric, s))?;
        }
        Command::Stages => {
            let stages = dashboard
                .stage_distribution()
                .context("failed to compute stage distribution")?;
            emit(format, &stages, |s| print_stages(s))?;
        }
        Command::Funnel => {
            let stages = dashboard.funnel().context("failed to compute funnel")?;
            emit(format, &stages, |s| print_funnel(s))?;
        }
        Command::Records { limit } => {
            let rows = dashboard.recent(limit).context("failed to fetch records")?;
            emit(format, &rows, |r| print_records(r))?;
        }
        Command::Overview => {
            let snapshot = dashboard.refresh();
            let failed = snapshot.failed_views();
            match format {
                OutputFormat::Json => print_overview_json(snapshot)?,
                OutputFormat::Text => print_overview_text(snapshot),
            }
            if failed > 0 {
                anyhow::bail!("{} view(s) could not be computed", failed);
            }
        }
    }

    Ok(())
}

/// Print a view as pretty JSON or through its text printer.
fn emit<T, F>(format: OutputFormat, value: &T, print_text: F) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => print_text(value),
    }
    Ok(())
}

fn print_summary(stats: &SummaryStats) {
    println!("Total users:        {}", stats.total_users);
    println!("Conversions:        {}", stats.conversions);
    println!(
        "Conversion rate:    {}%",
        format_one_decimal(stats.conversion_rate)
    );
    println!("Currently talking:  {}", stats.currently_talking);
    println!("Avg messages:       {}", format_one_decimal(stats.avg_messages));
}

fn print_series(metric: DailyMetric, series: &[DailyPoint]) {
    if series.is_empty() {
        println!("No {} recorded.", metric);
        return;
    }

    let peak = series.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    for point in series {
        let bar_len = if peak > 0.0 {
            ((point.value / peak) * 40.0).round() as usize
        } else {
            0
        };
        let value = match metric {
            DailyMetric::Revenue => format!("{:.2}", point.value),
            _ => format!("{}", point.value as i64),
        };
        println!(
            "{}  {:>10}  {}",
            point.date.format("%Y-%m-%d"),
            value,
            "#".repeat(bar_len)
        );
    }
}

fn print_stages(stages: &[StageCount]) {
    if stages.is_empty() {
        println!("No stages recorded.");
        return;
    }
    for stage in stages {
        println!("{:<32} {:>6}", stage.label, stage.count);
    }
}

fn print_funnel(stages: &[FunnelStage]) {
    println!("{:<32} {:>6} {:>8} {:>8}", "Stage", "Count", "%", "Drop %");
    for stage in stages {
        println!(
            "{:<32} {:>6} {:>8} {:>8}",
            stage.label,
            stage.count,
            format_one_decimal(stage.percentage),
            format_opt(stage.drop_rate.map(format_one_decimal))
        );
    }
}

fn print_records(rows: &[InteractionRecord]) {
    if rows.is_empty() {
        println!("No interactions found.");
        return;
    }
    for row in rows {
        let status = match (row.is_conversion(), row.is_active()) {
            (true, _) => "converted",
            (false, true) => "talking",
            _ => "idle",
        };
        println!(
            "#{:<6} {:<20} {:<32} {:>4} msgs  {:<9} {}",
            row.id,
            row.name.as_deref().unwrap_or("(no name)"),
            display_label(row.stage.as_deref()),
            format_opt(row.message_count),
            status,
            format_relative_time(row.created_at)
        );
    }
}

fn print_overview_text(snapshot: DashboardSnapshot) {
    section("Summary", snapshot.summary, |s| print_summary(&s));
    section("Interactions per day", snapshot.interactions, |s| {
        print_series(DailyMetric::Interactions, &s)
    });
    section("Conversions per day", snapshot.conversions, |s| {
        print_series(DailyMetric::Conversions, &s)
    });
    section("Revenue per day", snapshot.revenue, |s| {
        print_series(DailyMetric::Revenue, &s)
    });
    section("Stages", snapshot.stages, |s| print_stages(&s));
    section("Funnel", snapshot.funnel, |s| print_funnel(&s));
}

fn section<T>(title: &str, view: insightboard_core::Result<T>, print: impl FnOnce(T)) {
    println!("== {} ==", title);
    match view {
        Ok(value) => print(value),
        Err(e) => println!("unavailable: {}", e),
    }
    println!();
}

fn print_overview_json(snapshot: DashboardSnapshot) -> Result<()> {
    let output = serde_json::json!({
        "summary": view_json(snapshot.summary)?,
        "interactions": view_json(snapshot.interactions)?,
        "conversions": view_json(snapshot.conversions)?,
        "revenue": view_json(snapshot.revenue)?,
        "stages": view_json(snapshot.stages)?,
        "funnel": view_json(snapshot.funnel)?,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// A view's value, or `{"error": ...}` when its fetch failed.
fn view_json<T: serde::Serialize>(
    view: insightboard_core::Result<T>,
) -> Result<serde_json::Value> {
    Ok(match view {
        Ok(value) => serde_json::to_value(value)?,
        Err(e) => serde_json::json!({ "error": e.to_string() }),
    })
}
