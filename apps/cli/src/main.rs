use std::{io, path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, read_selected_file, ClientSettings, EndpointResolver, HttpTransport,
    SubmissionController, SubmitDisposition,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

/// Upload a CSV file to the validation service and show the result.
#[derive(Parser, Debug)]
#[command(name = "csv-validate")]
struct Args {
    /// CSV file to validate.
    file: PathBuf,
    /// Validation service host (defaults to this machine).
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    scheme: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    /// Print the decoded outcome as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, mut settings: ClientSettings) -> ClientSettings {
        if let Some(host) = &self.host {
            settings.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(scheme) = &self.scheme {
            settings.scheme = scheme.clone();
        }
        if let Some(secs) = self.timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let settings = args.apply(load_settings());
    let endpoint = EndpointResolver::from_settings(&settings)
        .resolve()
        .context("failed to resolve validation service endpoint")?;
    info!(%endpoint, "using validation service");

    let file = read_selected_file(&args.file)
        .await
        .with_context(|| format!("failed to read '{}'", args.file.display()))?;
    if !file.looks_like_csv() {
        warn!(filename = %file.filename, "file does not have a .csv extension; the service may reject it");
    }

    let controller = SubmissionController::new(
        endpoint,
        Arc::new(HttpTransport::new()),
        settings.request_timeout,
    );
    controller.select_file(file);
    if let SubmitDisposition::Started(submission_id) = controller.submit() {
        info!(%submission_id, "validation request started");
    }
    let state = controller.wait_for_completion().await;

    let verdict = render::render(&state, args.json, &mut io::stdout(), &mut io::stderr())?;
    Ok(verdict.exit_code())
}
