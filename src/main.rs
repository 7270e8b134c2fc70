mod cli;

use pictjoin::pipeline::{self, EncodeJob, JoinExecutor};
use pictjoin::segments::{self, segment_filename, RangeSpec};
use pictjoin_av::{check_tool, locate_encoder, Error, ProcessRunner, Workspace};

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "pictjoin=debug,pictjoin_av=debug".to_string()
        } else {
            "pictjoin=info,pictjoin_av=info".to_string()
        }
    });

    // stdout carries the run summary; logs and ffmpeg's output share stderr
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|rt| rt.block_on(run(cli)));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Exit code for a failed run: the typed error's code, or 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1)
}

async fn run(cli: Cli) -> Result<()> {
    // A malformed or reversed range fails here, before any filesystem access.
    let spec: RangeSpec = cli.range.parse()?;

    if cli.no_overwrite && cli.output.exists() {
        return Err(Error::output_write_failed(&cli.output, "already exists").into());
    }

    let resolved = segments::resolve(&cli.input, &spec)
        .with_context(|| format!("Could not locate video files in {:?}", cli.input))?;

    let encoder = locate_encoder(cli.ffmpeg_path.as_deref())?;
    if cli.verbose {
        let info = check_tool(&encoder).await;
        tracing::debug!(
            "Using {} ({})",
            encoder.display(),
            info.version.as_deref().unwrap_or("unknown version")
        );
    }

    let settings = cli.settings();
    let job = EncodeJob::new(resolved, cli.output.clone(), encoder, settings)?;

    if cli.dry_run {
        return print_dry_run(&job, cli.json, cli.temp_dir.as_deref());
    }

    print_job(&job);

    let cancel = CancellationToken::new();
    watch_for_shutdown(cancel.clone()).context("Failed to install signal handlers")?;

    let workspace = Workspace::new(&job.output, cli.temp_dir.as_deref())?;
    let runner = Arc::new(ProcessRunner::new(cancel));

    let started = Instant::now();
    let output = JoinExecutor::new(workspace, runner)
        .overwrite(!cli.no_overwrite)
        .execute(&job)
        .await
        .with_context(|| format!("Could not produce {:?}", job.output))?;

    println!("Finished processing in {:.1?}", started.elapsed());
    println!("Output: {}", output.display());
    Ok(())
}

fn print_job(job: &EncodeJob) {
    println!("FFmpeg: {}", job.encoder.display());
    println!(
        "Input ({} segments, {} to {}):",
        job.segments.len(),
        segment_filename(job.range.start()),
        segment_filename(job.range.end())
    );
    for segment in &job.segments {
        println!("  {}", segment.path.display());
    }
    println!("Output: {} ({})", job.output.display(), job.container.extension());
}

fn print_dry_run(job: &EncodeJob, json: bool, temp_root: Option<&Path>) -> Result<()> {
    // Stand-in for the workspace a real run would create
    let work_dir = temp_root
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir)
        .join("pictjoin-XXXXXX");
    let plan = pipeline::plan(job, &work_dir, &job.output);

    if json {
        let value = serde_json::json!({ "job": job, "plan": plan });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    print_job(job);
    println!("\n[DRY RUN] Would run {} commands:", plan.steps.len());
    for (i, step) in plan.steps.iter().enumerate() {
        println!("  {}. {}", i + 1, step.stage);
        println!("     {}", step.command);
    }
    Ok(())
}

/// Cancel `token` on SIGINT or SIGTERM.
///
/// Handlers are registered before this returns, so no signal can slip in
/// between here and the first child process.
fn watch_for_shutdown(token: CancellationToken) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = interrupt.recv() => {},
                _ = terminate.recv() => {},
            }
            tracing::warn!("Shutdown signal received");
            token.cancel();
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Shutdown signal received");
                token.cancel();
            }
            Err(e) => tracing::error!("Failed to install Ctrl+C handler: {}", e),
        }
    });

    Ok(())
}
