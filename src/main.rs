use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use busfactor_core::{BusFactorConfig, BusFactorError, OutputFormat, SortKey};
use busfactor_gitpulse::contributors::ContributionAccumulator;
use busfactor_gitpulse::metrics::{sort_rows, ContributorsCount, FileMetrics};
use busfactor_gitpulse::mining::{mine_history, MiningOptions};
use chrono::{NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

const CONFIG_FILE: &str = ".busfactor.toml";

#[derive(Parser)]
#[command(
    name = "busfactor",
    version,
    about = "Per-file contributor counts and bus factor from git history",
    long_about = "Busfactor walks git history, credits every added or deleted line to its author\n\
                   under the file's current name (following renames), and reports per file:\n\n  \
                     contributors  distinct authors who touched the file\n  \
                     minor         authors with less than 5% of the file's lines\n  \
                     bus factor    fewest authors covering at least half of the lines\n\n\
                   Examples:\n  \
                     busfactor analyze                        Analyze full history of HEAD\n  \
                     busfactor analyze --since-days 365       Only the last year\n  \
                     busfactor analyze --format json          Machine-readable output\n  \
                     busfactor init                           Create a .busfactor.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .busfactor.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Aligned table (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown table"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compute contributor counts and bus factor per file
    #[command(long_about = "Compute contributor counts and bus factor per file.\n\n\
        Mines commit history with git2, following renames so a file's whole history is\n\
        credited to its newest name. Merge commits are ignored.\n\n\
        Examples:\n  busfactor analyze --path .\n  busfactor analyze --since 2024-01-01 --until 2024-12-31\n  \
        busfactor analyze --from-commit v1.0 --to-commit v2.0 --sort minor")]
    Analyze {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Only include commits from the last N days
        #[arg(long, conflicts_with = "since")]
        since_days: Option<u64>,

        /// Only include commits on or after this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Only include commits on or before this date (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,

        /// Oldest commit to include (inclusive)
        #[arg(long)]
        from_commit: Option<String>,

        /// Newest commit to include (inclusive)
        #[arg(long)]
        to_commit: Option<String>,

        /// Branch to walk (default: HEAD)
        #[arg(long)]
        branch: Option<String>,

        /// Maximum rows to show (default: 20)
        #[arg(long)]
        limit: Option<usize>,

        /// Row ordering: bus-factor, contributors, minor, path
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Create a default .busfactor.toml in the current directory
    #[command(long_about = "Create a default .busfactor.toml in the current directory.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .busfactor.toml already exists.")]
    Init,
}

const DEFAULT_CONFIG: &str = r#"# Busfactor Configuration

[history]
# since_days = 365
# branch = "main"
# from_commit = "v1.0.0"
# to_commit = "HEAD"

[report]
# limit = 20
# sort = "bus-factor"   # bus-factor | contributors | minor | path
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))?;
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    if cli.verbose {
        eprintln!("format: {}", cli.format);
    }

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Analyze {
            ref path,
            since_days,
            ref since,
            ref until,
            ref from_commit,
            ref to_commit,
            ref branch,
            limit,
            sort,
        }) => {
            if git2::Repository::open(path).is_err() {
                miette::bail!(miette::miette!(
                    help = "Run busfactor from the root of a git repository, or specify --path to one",
                    "Not a git repository: {}",
                    path.display()
                ));
            }

            let since = match (since, since_days.or(config.history.since_days)) {
                (Some(date), _) => Some(parse_date(date, false)?),
                (None, Some(days)) => Some(days_ago(Utc::now().timestamp(), days)?),
                (None, None) => None,
            };
            let until = until
                .as_deref()
                .map(|date| parse_date(date, true))
                .transpose()?;

            let options = MiningOptions {
                since,
                until,
                from_commit: from_commit.clone().or(config.history.from_commit.clone()),
                to_commit: to_commit.clone().or(config.history.to_commit.clone()),
                branch: branch.clone().or(config.history.branch.clone()),
            };
            let limit = limit.unwrap_or(config.report.limit);
            let sort = sort.unwrap_or(config.report.sort);

            if cli.verbose {
                eprintln!("mining options: {options:?}");
                eprintln!("sort: {sort}, limit: {limit}");
            }

            let pb = indicatif::ProgressBar::new_spinner();
            pb.set_style(
                indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                    .into_diagnostic()?,
            );
            pb.set_message(format!("Mining git history at {}...", path.display()));
            if std::io::stderr().is_terminal() {
                pb.enable_steady_tick(Duration::from_millis(100));
            }
            let mined = mine_history(path, &options);
            pb.finish_and_clear();
            let commits = mined?;

            let accumulator = ContributionAccumulator::from_records(&commits);
            eprintln!("Analyzed {} commits.", accumulator.commits_seen());
            if cli.verbose {
                if !accumulator.aliases().is_empty() {
                    eprintln!("{} renames followed", accumulator.aliases().len());
                }
                eprintln!(
                    "{} lines on deleted paths not reported",
                    accumulator.unattributed_lines()
                );
            }
            let metrics = ContributorsCount::finalize(accumulator.table());

            let mut rows = metrics.rows();
            sort_rows(&mut rows, sort);
            let total_files = rows.len();
            rows.truncate(limit);

            match cli.format {
                OutputFormat::Json => print_json(commits.len(), total_files, &rows)?,
                OutputFormat::Markdown => print_markdown(commits.len(), total_files, &rows),
                OutputFormat::Text => print_text(total_files, &rows, sort),
            }
        }
        Some(Command::Init) => {
            let path = Path::new(CONFIG_FILE);
            if path.exists() {
                miette::bail!("{CONFIG_FILE} already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created {CONFIG_FILE} with default configuration");
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<BusFactorConfig> {
    match explicit {
        Some(path) => Ok(BusFactorConfig::from_file(path)?),
        None => {
            let default_path = Path::new(CONFIG_FILE);
            if default_path.exists() {
                Ok(BusFactorConfig::from_file(default_path)?)
            } else {
                Ok(BusFactorConfig::default())
            }
        }
    }
}

/// Unix timestamp `days` days before `now`.
fn days_ago(now: i64, days: u64) -> Result<i64> {
    i64::try_from(days)
        .ok()
        .and_then(|days| days.checked_mul(86_400))
        .and_then(|secs| now.checked_sub(secs))
        .ok_or_else(|| {
            miette::miette!(
                help = "Use --since YYYY-MM-DD for an absolute date, or a smaller day count",
                "a window of {days} days is too large"
            )
        })
}

/// Parse `YYYY-MM-DD` as a UTC timestamp at the start or end of that day.
fn parse_date(value: &str, end_of_day: bool) -> Result<i64> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        miette::miette!(
            help = "Use the YYYY-MM-DD format, e.g. 2024-01-31",
            "invalid date '{value}': {e}"
        )
    })?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    let time = time.ok_or_else(|| miette::miette!("invalid time for date '{value}'"))?;
    Ok(time.and_utc().timestamp())
}

fn print_json(commits: usize, total_files: usize, rows: &[FileMetrics]) -> Result<()> {
    let mut json = serde_json::Map::new();
    json.insert("commitsAnalyzed".into(), serde_json::Value::from(commits));
    json.insert("totalFiles".into(), serde_json::Value::from(total_files));
    json.insert(
        "files".into(),
        serde_json::to_value(rows).map_err(BusFactorError::from)?,
    );
    let rendered = serde_json::to_string_pretty(&serde_json::Value::Object(json))
        .map_err(BusFactorError::from)?;
    println!("{rendered}");
    Ok(())
}

fn print_markdown(commits: usize, total_files: usize, rows: &[FileMetrics]) {
    println!("# Bus Factor Report\n");
    println!("**Commits analyzed:** {commits}  ");
    println!("**Files with contributions:** {total_files}\n");

    if rows.is_empty() {
        println!("No files with recorded contributions.");
        return;
    }

    println!("| File | Contributors | Minor | Bus factor | Lines |");
    println!("|------|--------------|-------|------------|-------|");
    for row in rows {
        println!(
            "| `{}` | {} | {} | {} | {} |",
            row.path, row.contributors, row.minor_contributors, row.bus_factor, row.total_lines,
        );
    }
}

fn print_text(total_files: usize, rows: &[FileMetrics], sort: SortKey) {
    println!(
        "Bus factor ({} of {total_files} files, sorted by {sort}):",
        rows.len()
    );
    println!("{:-<72}", "");
    if rows.is_empty() {
        println!("  No files with recorded contributions.");
        return;
    }

    let width = rows
        .iter()
        .map(|r| r.path.len())
        .max()
        .unwrap_or(0)
        .clamp(4, 48);
    println!(
        "  {:<width$}  {:>7}  {:>5}  {:>3}  {:>8}",
        "FILE", "AUTHORS", "MINOR", "BUS", "LINES"
    );
    for row in rows {
        println!(
            "  {:<width$}  {:>7}  {:>5}  {:>3}  {:>8}",
            row.path, row.contributors, row.minor_contributors, row.bus_factor, row.total_lines,
        );
    }
}
