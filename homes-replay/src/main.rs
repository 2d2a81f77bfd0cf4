mod replay;
mod reports;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use homes_engine::{HelperConfig, MemoryMarkerStore};
use replay::{ReplayInput, ReplayReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured summary for a terminal
    Console,
    /// Full replay report as JSON
    Json,
    /// Summary as a Markdown document
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "homes-replay", version)]
#[command(about = "Replay recorded Mahogany Homes events through the helper engine")]
struct Args {
    /// Recorded host events (JSON array or one event per line)
    #[arg(long)]
    events: PathBuf,

    /// Marker storage documents, keyed by `markers` / `markerGroups`
    #[arg(long)]
    markers: Option<PathBuf>,

    /// Helper configuration as JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stored sack estimate at start (-1 for unknown)
    #[arg(long, allow_negative_numbers = true)]
    estimate: Option<i32>,

    /// Hide every helper marker after the last event
    #[arg(long)]
    shutdown: bool,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Include events that changed nothing
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let input = load_input(&args)?;
    if args.report == ReportFormat::Console {
        announce_banner(input.events.len());
    }

    let start_time = Instant::now();
    let report = replay::run(input).await?;
    write_report(&args, &report, start_time)
}

fn announce_banner(events: usize) {
    println!("{}", "🏠 Mahogany Homes Replay".bright_cyan().bold());
    println!("{}", "========================".cyan());
    println!("Replaying {events} events");
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_input(args: &Args) -> Result<ReplayInput> {
    let events = replay::parse_events(&read_file(&args.events)?)
        .with_context(|| format!("failed to parse {}", args.events.display()))?;
    let config = match &args.config {
        Some(path) => HelperConfig::from_json(&read_file(path)?)
            .with_context(|| format!("invalid helper config in {}", path.display()))?,
        None => HelperConfig::default(),
    };
    let markers = match &args.markers {
        Some(path) => replay::parse_marker_documents(&read_file(path)?)
            .with_context(|| format!("failed to load markers from {}", path.display()))?,
        None => MemoryMarkerStore::new(),
    };
    log::debug!(
        "loaded {} events, estimate {:?}, grade {}",
        events.len(),
        args.estimate,
        config.plank_grade
    );
    Ok(ReplayInput {
        config,
        estimate: args.estimate,
        markers,
        events,
        shutdown: args.shutdown,
    })
}

fn write_report(args: &Args, report: &ReplayReport, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    match args.report {
        ReportFormat::Json => reports::generate_json_report(output_target.writer(), report)?,
        ReportFormat::Markdown => {
            reports::generate_markdown_report(output_target.writer(), report, args.verbose)?;
        }
        ReportFormat::Console => reports::generate_console_report(
            output_target.writer(),
            report,
            args.verbose,
            start_time.elapsed(),
        )?,
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        self.writer().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            events: PathBuf::from("events.jsonl"),
            markers: None,
            config: None,
            estimate: None,
            shutdown: false,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn temp_file(label: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "homes-replay-unit-{label}-{}",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn args_parse_negative_estimate_and_format() {
        let args = Args::parse_from([
            "homes-replay",
            "--events",
            "e.jsonl",
            "--estimate",
            "-1",
            "--report",
            "markdown",
        ]);
        assert_eq!(args.estimate, Some(-1));
        assert_eq!(args.report, ReportFormat::Markdown);
    }

    #[test]
    fn invalid_config_is_rejected_with_path() {
        let events = temp_file("events", "{\"type\":\"tick\"}\n");
        let config = temp_file("config", "{\"min_planks\": -3}");
        let args = Args {
            events,
            config: Some(config.clone()),
            ..base_args()
        };
        let err = load_input(&args).unwrap_err();
        assert!(format!("{err:#}").contains(&config.display().to_string()));
    }

    #[test]
    fn missing_events_file_names_the_file() {
        let args = Args {
            events: PathBuf::from("/nonexistent/homes-replay/events.jsonl"),
            ..base_args()
        };
        let err = load_input(&args).unwrap_err();
        assert!(err.to_string().contains("events.jsonl"));
    }

    #[test]
    fn report_is_written_to_output_file() {
        let events = temp_file("report-events", "{\"type\":\"tick\"}\n");
        let output = std::env::temp_dir().join(format!("homes-replay-unit-out-{}.json", std::process::id()));
        let args = Args {
            events,
            estimate: Some(6),
            output: Some(output.clone()),
            ..base_args()
        };
        let input = load_input(&args).unwrap();
        let report = tokio_test::block_on(replay::run(input)).unwrap();
        write_report(&args, &report, Instant::now()).unwrap();
        let written = std::fs::read_to_string(output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["final_state"]["estimate"], 6);
    }
}
