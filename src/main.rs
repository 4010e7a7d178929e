//! Bandersnatch mirror audit CLI entrypoint.
//!
//! This binary compares a mirror's JSON indexes against an authoritative file
//! list, writes discrepancy reports, and verifies the mirrored files.

use bandersnatch_audit::audit::run_audit;
use bandersnatch_audit::cli::Cli;
use bandersnatch_audit::error::Result;
use clap::Parser;
use log::info;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let config = cli.load_config()?;
    let settings = cli.settings(&config);
    info!(
        "auditing {} against {} ({})",
        settings.web_dir, settings.files_txt, settings.policy
    );

    let summary = run_audit(&settings, stdout)?;
    info!(
        "audit finished: {} reports written to {}, mirror {}",
        summary.reports.len(),
        settings.output_dir,
        if summary.is_clean() { "clean" } else { "has discrepancies" }
    );
    Ok(())
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the
/// verbosity flags.
fn init_logging(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        // A subscriber is already installed; keep it.
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
