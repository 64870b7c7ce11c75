//! sathdock — wrapper binary around installed docking programs.
//! Completes the docking configuration, runs the selected binary and relays
//! progress to the sath log.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sathdock_core::completer::ConfigCompleter;
use sathdock_core::runner::{DockRunner, RunnerOptions};

#[derive(Debug, Parser)]
#[command(name = "sathdock", version, about = "Run an installed docking program against /data")]
struct Args {
    /// Docking program to execute (vina, qvina02 or smina)
    #[arg(long)]
    program: String,

    /// Directory holding config.txt, molecule files and logs
    #[arg(long, default_value = "/data")]
    data_dir: PathBuf,

    /// Directory holding the installed docking binaries
    #[arg(long, default_value = "/vinadock/bin")]
    install_dir: PathBuf,

    /// Run with the configuration file as-is, skipping completion
    #[arg(long)]
    skip_config: bool,

    /// Forward raw docking output to stdout as well as the run log
    #[arg(long)]
    mirror_output: bool,
}

async fn run(args: &Args) -> Result<()> {
    let config_path = args.data_dir.join("config.txt");

    let sink = tokio::fs::File::create(args.data_dir.join("sath.log"))
        .await
        .context("can't create sath log file")?;

    if args.skip_config {
        info!("Skipping config completion, using {:?} as-is", config_path);
    } else {
        ConfigCompleter::new(&args.data_dir)
            .complete(&config_path)
            .await
            .context("config completion failed")?;
    }

    let runner = DockRunner::new(RunnerOptions {
        install_dir: args.install_dir.clone(),
        config_path,
        run_log_path: args.data_dir.join("output.log"),
        mirror_stdout: args.mirror_output,
    });
    runner.run(&args.program, sink).await?;

    info!("Docking run finished");
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sathdock=debug,info")),
        )
        .init();

    let args = Args::parse();

    // Error log is truncated up front so a stale failure never lingers
    let err_log = args.data_dir.join("sath.err");
    if let Err(e) = std::fs::write(&err_log, "") {
        eprintln!("can't create sath err file: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(&args).await {
        let message = format!("{e:#}\n");
        eprint!("{message}");
        if let Err(log_err) = std::fs::write(&err_log, &message) {
            eprintln!("can't write sath err file: {log_err}");
        }
        std::process::exit(1);
    }
}
