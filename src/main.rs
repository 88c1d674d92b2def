mod config;
mod issues;
mod redaction;
mod report;
mod scan;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::issues::IssueState;
use crate::scan::ScanError;

/// User-Agent sent to both APIs; GitHub rejects requests without one.
const USER_AGENT: &str = concat!("issue-pii-scan/", env!("CARGO_PKG_VERSION"));

/// issue-pii-scan scans the bodies of a GitHub repository's issues for
/// personal and health information with Azure AI Language, and prints every
/// redacted issue with entities at or above the confidence threshold as JSON.
///
/// Settings come from .issue-pii-scan.toml (or --config), then the
/// AZ_AI_ENDPOINT, AZ_AI_KEY, GITHUB_OWNER, GITHUB_REPO,
/// CONFIDENCE_SCORE_THRESHOLD and GITHUB_PAT environment variables.
#[derive(Parser, Debug)]
#[command(name = "issue-pii-scan", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository owner (overrides config and GITHUB_OWNER)
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (overrides config and GITHUB_REPO)
    #[arg(long)]
    repo: Option<String>,

    /// Minimum confidence score for an entity to be reported, e.g. 0.8
    #[arg(short, long)]
    threshold: Option<String>,

    /// Which issues to scan
    #[arg(long, value_enum)]
    state: Option<IssueState>,

    /// Issues per page and documents per analysis request (1-5)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Do not print the summary line to stderr
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(kind = ?err.kind(), "scan failed");
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ScanError> {
    info!("loading configuration");
    let mut config = config::Config::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, &cli);
    let settings = config.resolve()?;

    let _main_span = info_span!(
        "issue_scan",
        owner = %settings.github.owner,
        repo = %settings.github.repo
    )
    .entered();
    debug!(
        threshold = settings.scan.threshold,
        batch_size = settings.scan.batch_size,
        state = %settings.scan.state,
        authenticated = settings.github.token.is_some(),
        "resolved settings"
    );

    let source = issues::GitHubIssues::new(
        &settings.github,
        settings.scan.state,
        settings.scan.batch_size,
    )?;
    let recognizer = redaction::LanguageClient::new(&settings.language);

    info!("scanning issues");
    let mut stdout = std::io::stdout().lock();
    let summary = scan::run(&source, &recognizer, &settings.scan, &mut stdout).await?;

    if !cli.quiet {
        report::print_summary(&summary);
    }
    Ok(())
}

/// Command-line flags take precedence over the config file and environment.
fn apply_cli_overrides(config: &mut config::Config, cli: &Cli) {
    if let Some(owner) = &cli.owner {
        config.github.owner = Some(owner.clone());
    }
    if let Some(repo) = &cli.repo {
        config.github.repo = Some(repo.clone());
    }
    if let Some(threshold) = &cli.threshold {
        config.scan.confidence_threshold = Some(config::Threshold::Text(threshold.clone()));
    }
    if let Some(state) = cli.state {
        config.scan.state = Some(state);
    }
    if let Some(batch_size) = cli.batch_size {
        config.scan.batch_size = Some(batch_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "issue-pii-scan",
            "--owner",
            "octo",
            "--threshold",
            "0.6",
            "--state",
            "closed",
            "--batch-size",
            "2",
        ]);
        let mut config: config::Config =
            toml::from_str("[github]\nowner = \"file-owner\"\nrepo = \"file-repo\"\n").unwrap();
        apply_cli_overrides(&mut config, &cli);

        assert_eq!(config.github.owner.as_deref(), Some("octo"));
        assert_eq!(config.github.repo.as_deref(), Some("file-repo"));
        assert_eq!(
            config.scan.confidence_threshold,
            Some(config::Threshold::Text("0.6".to_string()))
        );
        assert_eq!(config.scan.state, Some(IssueState::Closed));
        assert_eq!(config.scan.batch_size, Some(2));
    }

    #[test]
    fn test_cli_defaults_leave_config_alone() {
        let cli = Cli::parse_from(["issue-pii-scan"]);
        let mut config = config::Config::default();
        apply_cli_overrides(&mut config, &cli);
        assert!(config.github.owner.is_none());
        assert!(config.scan.confidence_threshold.is_none());
        assert!(!cli.quiet);
    }
}
