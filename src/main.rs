use clap::Parser;
use equsend::{config::Settings, service::EqusendClient, Result};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "equsend")]
#[command(about = "Send equation files to a netcalc solver server")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Address of the solver server
    #[arg(short = 's', long)]
    host: Option<String>,

    /// Port to connect to
    #[arg(short, long)]
    port: Option<u16>,

    /// Folder to read equation files from
    #[arg(short, long, value_name = "DIR")]
    in_folder: PathBuf,

    /// Number of concurrent transfer workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("equsend={}", log_level))
        .init();

    info!("Starting equsend v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        settings.network.host = host;
    }
    if let Some(port) = cli.port {
        settings.network.port = port;
    }
    if let Some(workers) = cli.workers {
        settings.transfer.workers = workers;
    }
    settings.validate()?;

    let client = EqusendClient::new(settings);
    let report = client.run(&cli.in_folder).await?;

    for outcome in report.outcomes.iter().filter(|o| !o.is_ok()) {
        if let Some(ref e) = outcome.error {
            error!("{}: failed at {:?}: {}", outcome.file_name, outcome.stage, e);
        }
    }
    info!(
        "{} sent, {} failed",
        report.sent_count(),
        report.failed_count()
    );

    Ok(report.is_success())
}
