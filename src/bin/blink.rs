//! Blink CLI - Command-line interface for the blink corpus pipeline
//!
//! Commands:
//! - extract: Load a corpus root and emit the normalized feature table
//! - check: Walk a corpus root and report per-file health without output

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blink_corpus::corpus::{load_corpus, walk_corpus};
use blink_corpus::error::PipelineError;
use blink_corpus::parser::parse_file_events;
use blink_corpus::repair::read_repaired;
use blink_corpus::types::NormalizedBlinkRecord;
use blink_corpus::VERSION;

/// Blink - eye-blink event extraction and temporal feature pipeline
#[derive(Parser)]
#[command(name = "blink")]
#[command(version = VERSION)]
#[command(about = "Extract normalized blink features from session logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a corpus root and emit the normalized feature table
    Extract {
        /// Corpus root directory (subject subfolders of session JSON files)
        #[arg(short, long)]
        root: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Also write the skipped-record diagnostics as JSON to this path
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },

    /// Walk a corpus root and report per-file health without emitting rows
    Check {
        /// Corpus root directory
        #[arg(short, long)]
        root: PathBuf,

        /// Output report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), BlinkCliError> {
    match cli.command {
        Commands::Extract {
            root,
            output,
            output_format,
            diagnostics,
        } => cmd_extract(&root, &output, output_format, diagnostics.as_deref()),

        Commands::Check { root, json } => cmd_check(&root, json),
    }
}

fn cmd_extract(
    root: &Path,
    output: &Path,
    output_format: OutputFormat,
    diagnostics: Option<&Path>,
) -> Result<(), BlinkCliError> {
    let load = load_corpus(root)?;

    if let Some(diagnostics_path) = diagnostics {
        fs::write(
            diagnostics_path,
            serde_json::to_string_pretty(&load.diagnostics)?,
        )?;
    }

    let output_data = format_output(load.table.records(), &output_format)?;

    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        write!(stdout, "{}", output_data)?;
        stdout.flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct FileReport {
    subject_id: String,
    file: PathBuf,
    parsed: bool,
    events: usize,
    skipped_records: usize,
}

#[derive(serde::Serialize)]
struct CheckReport {
    total_files: usize,
    dropped_files: usize,
    total_events: usize,
    total_skipped_records: usize,
    files: Vec<FileReport>,
}

fn cmd_check(root: &Path, json: bool) -> Result<(), BlinkCliError> {
    let mut files = Vec::new();

    for (subject_id, path) in walk_corpus(root)? {
        let report = match read_repaired(&path)? {
            Some(object) => {
                let (events, diagnostics) = parse_file_events(&path, &object);
                FileReport {
                    subject_id,
                    file: path,
                    parsed: true,
                    events: events.len(),
                    skipped_records: diagnostics.len(),
                }
            }
            None => FileReport {
                subject_id,
                file: path,
                parsed: false,
                events: 0,
                skipped_records: 0,
            },
        };
        files.push(report);
    }

    let report = CheckReport {
        total_files: files.len(),
        dropped_files: files.iter().filter(|f| !f.parsed).count(),
        total_events: files.iter().map(|f| f.events).sum(),
        total_skipped_records: files.iter().map(|f| f.skipped_records).sum(),
        files,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Corpus Check Report");
        println!("===================");
        println!("Files:           {}", report.total_files);
        println!("Dropped files:   {}", report.dropped_files);
        println!("Events:          {}", report.total_events);
        println!("Skipped records: {}", report.total_skipped_records);

        let problems: Vec<&FileReport> = report
            .files
            .iter()
            .filter(|f| !f.parsed || f.skipped_records > 0)
            .collect();

        if !problems.is_empty() {
            println!("\nProblems:");
            for file in problems {
                if file.parsed {
                    println!(
                        "  - {} ({}): {} skipped record(s)",
                        file.file.display(),
                        file.subject_id,
                        file.skipped_records
                    );
                } else {
                    println!(
                        "  - {} ({}): unparsable, dropped",
                        file.file.display(),
                        file.subject_id
                    );
                }
            }
        }
    }

    if report.dropped_files > 0 {
        Err(BlinkCliError::DroppedFiles(report.dropped_files))
    } else {
        Ok(())
    }
}

fn format_output(
    records: &[NormalizedBlinkRecord],
    format: &OutputFormat,
) -> Result<String, BlinkCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

// Error types

#[derive(Debug)]
enum BlinkCliError {
    Io(io::Error),
    Pipeline(PipelineError),
    Json(serde_json::Error),
    DroppedFiles(usize),
}

impl From<io::Error> for BlinkCliError {
    fn from(e: io::Error) -> Self {
        BlinkCliError::Io(e)
    }
}

impl From<PipelineError> for BlinkCliError {
    fn from(e: PipelineError) -> Self {
        BlinkCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for BlinkCliError {
    fn from(e: serde_json::Error) -> Self {
        BlinkCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BlinkCliError> for CliError {
    fn from(e: BlinkCliError) -> Self {
        match e {
            BlinkCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            BlinkCliError::Pipeline(e) => CliError {
                code: "PIPELINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check the corpus root layout".to_string()),
            },
            BlinkCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            BlinkCliError::DroppedFiles(count) => CliError {
                code: "DROPPED_FILES".to_string(),
                message: format!("{} file(s) could not be parsed", count),
                hint: Some("Run 'blink check --json' for per-file detail".to_string()),
            },
        }
    }
}
