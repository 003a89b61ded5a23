use bold_taxa::bio::fasta::{self, InputFormat};
use bold_taxa::bold::batch::{BatchConfig, BatchRunner, ResumeMode};
use bold_taxa::bold::client::BoldClient;
use bold_taxa::bold::retry::RetryPolicy;
use bold_taxa::cli::Cli;
use clap::Parser;
use colored::*;
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // BOLD_TAXA_LOG overrides the default level; -D forces debug.
    let log_level = if cli.debug {
        "debug".to_string()
    } else {
        std::env::var("BOLD_TAXA_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<bold_taxa::BoldError>() {
            Some(bold_taxa::BoldError::Config(_)) => 2,
            Some(bold_taxa::BoldError::Io(_)) => 3,
            Some(bold_taxa::BoldError::Parse(_)) => 4,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    info!(?cli, "args");

    let format: InputFormat = cli.format.parse()?;
    let records = fasta::read_records(&cli.infile, format)?;
    info!(
        records = records.len(),
        infile = %cli.infile.display(),
        "loaded sequence collection"
    );

    let client = BoldClient::new()?;
    let config = BatchConfig {
        out_prefix: cli.outprefix.clone(),
        db: cli.db,
        policy: RetryPolicy {
            max_attempts: cli.retries,
            topnum: cli.topnum,
        },
        resume: ResumeMode::from_count(cli.resume),
        pause: Duration::from_secs(cli.pause),
    };

    let runner = BatchRunner::new(&client, config);
    let summary = if cli.chimera {
        runner.run_chimera(&records, cli.probe_len)?
    } else {
        runner.run(&records)?
    };

    println!(
        "matched: {}  no match: {}  timed out: {}  skipped: {}",
        summary.matched, summary.no_match, summary.timed_out, summary.skipped
    );

    Ok(())
}
