//! Cycle and spike command handlers.

use std::sync::Arc;

use chrono::Utc;
use mentionwatch_core::{AppConfig, TrackedBrand};
use mentionwatch_db::MonitorRunCounts;
use mentionwatch_monitor::{
    CycleReport, EventPublisher, LogPublisher, MemoryStore, MentionStore, Monitor,
    MonitorSettings, PgMentionStore, SpikeDetector,
};

/// Pick the brands for a one-off cycle: every enabled brand, or the single
/// tracked brand matching `filter`.
///
/// # Errors
///
/// Returns an error if `filter` names a brand the brands file does not track.
pub(crate) fn select_brands(
    tracked: Vec<TrackedBrand>,
    filter: Option<&str>,
) -> anyhow::Result<Vec<TrackedBrand>> {
    let Some(name) = filter else {
        return Ok(tracked);
    };

    let wanted = TrackedBrand::new(name);
    tracked
        .into_iter()
        .find(|b| *b == wanted)
        .map(|b| vec![b])
        .ok_or_else(|| anyhow::anyhow!("brand '{name}' is not tracked or not enabled"))
}

/// Run one monitoring cycle and print a per-brand summary.
///
/// With `dry_run`, mentions go to an in-memory store and events to the log;
/// nothing touches the database. Otherwise the cycle is recorded as a
/// `cli` monitor run.
///
/// # Errors
///
/// Returns an error if the brands file is invalid, the adapters cannot be
/// built, or the database is unreachable. Per-source and per-item failures
/// are logged and counted, not returned.
pub(crate) async fn run_cycle(
    config: &AppConfig,
    brand_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let tracked = mentionwatch_core::load_brands(&config.brands_path)?.tracked();
    let brands = select_brands(tracked, brand_filter)?;
    let adapters = mentionwatch_monitor::build_adapters(config)?;
    let settings = MonitorSettings::from_app_config(config);
    let publisher: Arc<dyn EventPublisher> = Arc::new(LogPublisher);

    if adapters.is_empty() {
        println!("warning: every source is disabled; the cycle will fetch nothing");
    }

    if dry_run {
        let store = Arc::new(MemoryStore::new());
        let monitor = Monitor::new(adapters, store.clone(), publisher, settings);
        let report = monitor.run_cycle(&brands).await;
        print_report(&report);
        println!(
            "dry-run: {} mention(s) kept in memory, {} alert(s); nothing written",
            store.mentions().len(),
            store.alerts().len()
        );
        return Ok(());
    }

    let pool = crate::connect(config).await?;
    let store: Arc<dyn MentionStore> = Arc::new(PgMentionStore::new(pool.clone()));
    let monitor = Monitor::new(adapters, store, publisher, settings);

    let run = mentionwatch_db::create_monitor_run(&pool, "cli").await?;
    if let Err(e) = mentionwatch_db::start_monitor_run(&pool, run.id).await {
        fail_run_best_effort(&pool, run.id, format!("{e:#}")).await;
        return Err(e.into());
    }

    let report = monitor.run_cycle(&brands).await;
    print_report(&report);

    let counts = MonitorRunCounts {
        brands_processed: clamp_i32(report.brands.len()),
        mentions_persisted: clamp_i32(report.admitted()),
        alerts_raised: clamp_i32(report.spikes()),
    };
    mentionwatch_db::complete_monitor_run(&pool, run.id, counts).await?;
    println!("recorded monitor run {}", run.public_id);

    Ok(())
}

/// Print current and previous hour mention counts for `brand` and whether
/// they amount to a spike under the configured policy.
///
/// # Errors
///
/// Returns an error if the window counts cannot be read.
pub(crate) async fn run_spike(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    brand: &str,
) -> anyhow::Result<()> {
    let brand = TrackedBrand::new(brand);
    let detector = SpikeDetector::new(
        Arc::new(PgMentionStore::new(pool.clone())),
        config.spike_policy,
    );

    let stat = detector.window_stat(&brand, Utc::now()).await?;
    let policy = detector.policy();

    println!("Brand: {brand}");
    println!("Last hour:      {}", stat.current_hour_count);
    println!("Previous hour:  {}", stat.previous_hour_count);
    println!(
        "Rule:           current >= {} x previous and current > {}",
        policy.multiplier, policy.floor
    );
    println!(
        "Spike:          {}",
        if stat.is_spike(policy) { "yes" } else { "no" }
    );

    Ok(())
}

fn print_report(report: &CycleReport) {
    let header = format!(
        "{:<20}{:>9}{:>10}{:>12}{:>8}{:>7}  FAILED SOURCES",
        "BRAND", "FETCHED", "ADMITTED", "DUPLICATES", "ERRORS", "SPIKE"
    );
    println!("{header}");
    for brand in &report.brands {
        let failed: Vec<&str> = brand.failed_sources.iter().map(|s| s.as_str()).collect();
        println!(
            "{:<20}{:>9}{:>10}{:>12}{:>8}{:>7}  {}",
            brand.brand,
            brand.fetched,
            brand.admitted,
            brand.duplicates,
            brand.failed_items,
            if brand.spike { "yes" } else { "-" },
            if failed.is_empty() {
                "-".to_string()
            } else {
                failed.join(", ")
            }
        );
    }
    println!(
        "total: {} admitted, {} duplicate(s), {} spike(s)",
        report.admitted(),
        report.duplicates(),
        report.spikes()
    );
}

fn clamp_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Attempt to mark a monitor run as failed, logging any secondary error.
async fn fail_run_best_effort(pool: &sqlx::PgPool, run_id: i64, message: String) {
    if let Err(mark_err) = mentionwatch_db::fail_monitor_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark monitor run as failed"
        );
    }
}
