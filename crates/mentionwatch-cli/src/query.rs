//! Read-only command handlers.

use mentionwatch_core::{SentimentThresholds, TrackedBrand};
use mentionwatch_monitor::{EnrichmentConfig, Enricher};

/// Print the enrichment result for `text` as pretty JSON.
///
/// # Errors
///
/// Returns an error only if the result cannot be serialized.
pub(crate) fn run_analyze(text: &str, thresholds: SentimentThresholds) -> anyhow::Result<()> {
    let enricher = Enricher::with_lexicon(EnrichmentConfig {
        thresholds,
        ..EnrichmentConfig::default()
    });
    let analysis = enricher.analyze(text);
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

/// Print recent alerts, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_alerts(
    pool: &sqlx::PgPool,
    brand_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let brand = brand_filter.map(TrackedBrand::new);
    let alerts = mentionwatch_db::list_alerts(pool, brand.as_ref(), limit).await?;

    if alerts.is_empty() {
        println!(
            "no alerts found{}",
            brand_filter
                .map(|b| format!(" for brand {b}"))
                .unwrap_or_default()
        );
        return Ok(());
    }

    let header = format!(
        "{:<22}{:<16}{:<8}{:<10}MESSAGE",
        "TRIGGERED", "BRAND", "KIND", "SEVERITY"
    );
    println!("{header}");
    for alert in &alerts {
        println!(
            "{:<22}{:<16}{:<8}{:<10}{}",
            alert.triggered_at.format("%Y-%m-%d %H:%M:%S"),
            alert.brand,
            alert.kind,
            alert.severity,
            truncate(&alert.message, 80)
        );
    }

    Ok(())
}

/// Print recent monitor runs, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_monitor_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = mentionwatch_db::list_monitor_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no monitor runs recorded yet");
        return Ok(());
    }

    let header = format!(
        "{:<22}{:<11}{:<11}{:>8}{:>10}{:>8}  ERROR",
        "CREATED", "TRIGGER", "STATUS", "BRANDS", "MENTIONS", "ALERTS"
    );
    println!("{header}");
    for run in &runs {
        println!(
            "{:<22}{:<11}{:<11}{:>8}{:>10}{:>8}  {}",
            run.created_at.format("%Y-%m-%d %H:%M:%S"),
            run.trigger_source,
            run.status,
            run.brands_processed,
            run.mentions_persisted,
            run.alerts_raised,
            run.error_message.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Cut `text` to at most `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}
