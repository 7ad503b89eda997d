use super::*;
use mentionwatch_core::TrackedBrand;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["mentionwatch-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_run_defaults() {
    let cli = Cli::try_parse_from(["mentionwatch-cli", "run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run {
            brand: None,
            dry_run: false
        })
    ));
}

#[test]
fn parses_run_with_brand_and_dry_run() {
    let cli =
        Cli::try_parse_from(["mentionwatch-cli", "run", "--brand", "Tesla", "--dry-run"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run {
            brand: Some(ref b),
            dry_run: true
        }) if b == "Tesla"
    ));
}

#[test]
fn parses_analyze_text() {
    let cli = Cli::try_parse_from([
        "mentionwatch-cli",
        "analyze",
        "Brand X has amazing support!",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze { ref text }) if text == "Brand X has amazing support!"
    ));
}

#[test]
fn analyze_requires_text() {
    assert!(Cli::try_parse_from(["mentionwatch-cli", "analyze"]).is_err());
}

#[test]
fn spike_requires_brand() {
    assert!(Cli::try_parse_from(["mentionwatch-cli", "spike"]).is_err());
    let cli = Cli::try_parse_from(["mentionwatch-cli", "spike", "--brand", "Apple"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Spike { ref brand }) if brand == "Apple"
    ));
}

#[test]
fn alerts_default_limit() {
    let cli = Cli::try_parse_from(["mentionwatch-cli", "alerts"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Alerts {
            brand: None,
            limit: 20
        })
    ));
}

#[test]
fn alerts_rejects_non_numeric_limit() {
    assert!(Cli::try_parse_from(["mentionwatch-cli", "alerts", "--limit", "many"]).is_err());
}

#[test]
fn parses_runs_and_migrate() {
    let cli = Cli::try_parse_from(["mentionwatch-cli", "runs", "--limit", "3"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 3 })));

    let cli = Cli::try_parse_from(["mentionwatch-cli", "migrate"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

fn tracked() -> Vec<TrackedBrand> {
    ["Tesla", "Apple", "Google"]
        .into_iter()
        .map(TrackedBrand::new)
        .collect()
}

#[test]
fn select_brands_without_filter_keeps_all() {
    let brands = monitor::select_brands(tracked(), None).unwrap();
    assert_eq!(brands.len(), 3);
}

#[test]
fn select_brands_matches_case_insensitively() {
    let brands = monitor::select_brands(tracked(), Some("apple")).unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name(), "Apple");
}

#[test]
fn select_brands_rejects_untracked_brand() {
    let err = monitor::select_brands(tracked(), Some("Nokia")).unwrap_err();
    assert!(err.to_string().contains("Nokia"));
}

#[test]
fn truncate_marks_long_text() {
    assert_eq!(query::truncate("short", 10), "short");
    assert_eq!(query::truncate("abcdefghij", 4), "abcd...");
}

#[test]
fn analyze_runs_without_database() {
    query::run_analyze("", mentionwatch_core::SentimentThresholds::default()).unwrap();
}
