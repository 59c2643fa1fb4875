mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use vidmerge::config::{self, Config};
use vidmerge::{MergeOrchestrator, MergeOutcome, MergeRequest};
use vidmerge_av::{ToolPaths, TracingDiagnostics, TranscodeSettings, Transcoder};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    config::normalize_config(&mut config);
    config::validate_config(&config)?;

    init_logging(&config, cli.verbose);

    let tools = ToolPaths::resolve(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );

    if cli.check_tools {
        return Ok(check_tools(&tools));
    }

    let Some(input) = cli.input else {
        anyhow::bail!("No input folder given");
    };

    let request = MergeRequest {
        output_dir: config
            .output
            .folder
            .clone()
            .unwrap_or_else(|| input.join("converted")),
        input_dir: input,
        format: config.output.format.clone(),
        output_filename: config.output.merged_filename(),
        manifest_name: config.output.manifest.clone(),
    };

    let settings = TranscodeSettings {
        fps: config.transcode.fps,
        probe: config.transcode.probe,
        timeout: Duration::from_secs(config.tools.timeout_secs),
    };
    let orchestrator = MergeOrchestrator::new(
        Transcoder::new(tools, settings),
        Arc::new(TracingDiagnostics),
    )
    .with_jobs(config.transcode.jobs);

    tracing::info!(
        "Merging videos from {:?} into {:?}",
        request.input_dir,
        request.artifact_path()
    );

    let rt = tokio::runtime::Runtime::new()?;
    match rt.block_on(orchestrator.merge(&request)) {
        Ok(MergeOutcome::Merged(report)) => {
            println!("Merged {} video(s) into {}", report.segments.len(), report.artifact.display());
            if !report.failures.is_empty() {
                println!("\nSkipped {} file(s):", report.failures.len());
                for failure in &report.failures {
                    println!("  {}", failure);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(MergeOutcome::NoInput) => {
            println!("No video files found in {}; nothing to do", request.input_dir.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if !e.failures().is_empty() {
                eprintln!("\nFailed file(s):");
                for failure in e.failures() {
                    eprintln!("  {}", failure);
                }
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(ref output) = cli.output {
        config.output.folder = Some(output.clone());
    }
    if let Some(ref format) = cli.format {
        config.output.format = format.clone();
    }
    if let Some(ref name) = cli.name {
        config.output.filename = Some(name.clone());
    }
    if let Some(fps) = cli.fps {
        config.transcode.fps = fps;
    }
    if let Some(jobs) = cli.jobs {
        config.transcode.jobs = jobs;
    }
    if cli.no_probe {
        config.transcode.probe = false;
    }
    if let Some(timeout) = cli.timeout {
        config.tools.timeout_secs = timeout;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
}

fn init_logging(config: &Config, verbose: bool) {
    // Respect RUST_LOG env var if set, otherwise use the configured level
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        let level = if verbose {
            "debug".to_string()
        } else {
            config.logging.level.to_lowercase()
        };
        format!("vidmerge={level},vidmerge_av={level}")
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn check_tools(tools: &ToolPaths) -> ExitCode {
    let mut all_available = true;

    println!("External tools:");
    for info in tools.check_all() {
        if info.available {
            let path = info
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(&info.name));
            println!(
                "  {:<8} ok       {} ({})",
                info.name,
                info.version.as_deref().unwrap_or("unknown version"),
                path.display()
            );
        } else {
            all_available = false;
            println!("  {:<8} missing", info.name);
        }
    }

    if all_available {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
