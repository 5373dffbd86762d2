//! CLI entrypoint for the blockgate verification harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use blockgate_core::CONSTANTS;
use blockgate_harness::HarnessError;
use blockgate_harness::structured_log::{ArtifactIndex, LogEmitter, validate_log_file};

/// Verification tooling for blockgate.
#[derive(Debug, Parser)]
#[command(name = "blockgate-harness")]
#[command(about = "Verification harness for the blockgate blocking-call boundary")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the constant table.
    Constants {
        /// Output format: `json` (default) or `plain`.
        #[arg(long, default_value = "json")]
        format: String,
        /// Output file path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run every boundary scenario and fail if any does not pass.
    VerifyBoundary {
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Artifact index JSON path (requires --log).
        #[arg(long, requires = "log")]
        artifact_index: Option<PathBuf>,
        /// Run identifier embedded in trace ids.
        #[arg(long, default_value = "local")]
        run_id: String,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        /// Structured JSONL log path.
        #[arg(long)]
        log: PathBuf,
    },
}

fn render_constants(format: &str) -> Result<String, HarnessError> {
    match format {
        "json" => {
            let rows: Vec<_> = CONSTANTS
                .iter()
                .map(|c| json!({ "name": c.name, "value": c.value, "group": c.group.as_str() }))
                .collect();
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        "plain" => {
            let mut out = String::new();
            for c in CONSTANTS {
                out.push_str(&format!("{:<20} {:>4}  {}\n", c.name, c.value, c.group.as_str()));
            }
            Ok(out)
        }
        other => Err(HarnessError::UnknownFormat(other.to_string())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Constants { format, output } => {
            let rendered = render_constants(&format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    eprintln!("Wrote {} constants to {}", CONSTANTS.len(), path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Command::VerifyBoundary {
            log,
            artifact_index,
            run_id,
        } => {
            let mut emitter = match &log {
                Some(path) => LogEmitter::to_file(path, "blockgate", &run_id)?,
                None => LogEmitter::sink("blockgate", &run_id),
            };
            let reports = blockgate_harness::run_all(&mut emitter)?;
            drop(emitter);

            for report in &reports {
                println!(
                    "{:<22} {:<5} {:>5} ms  releases={} reacquires={}",
                    report.name,
                    report.outcome.as_str(),
                    report.duration_ms,
                    report.releases,
                    report.reacquires
                );
            }

            if let (Some(log), Some(index_path)) = (&log, &artifact_index) {
                let mut index = ArtifactIndex::new(&run_id);
                index.add_file(log, "log")?;
                std::fs::write(index_path, index.to_json()?)?;
                eprintln!("Artifact index written to {}", index_path.display());
            }

            let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
            if failed > 0 {
                return Err(HarnessError::ScenariosFailed {
                    failed,
                    total: reports.len(),
                }
                .into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            if !errors.is_empty() {
                return Err(HarnessError::InvalidLog {
                    path: log,
                    lines,
                    errors: errors.len(),
                }
                .into());
            }
            println!("{}: {lines} line(s) valid", log.display());
        }
    }

    Ok(())
}
