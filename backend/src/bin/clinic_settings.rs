//! Manage appointment statuses and inspect role navigation from the shell.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::process::ExitCode;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use clinic_backend::ClinicSettings;
use clinic_backend::domain::{CatalogueProfile, DomainError, EntityLifecycleService};
use clinic_backend::inbound::cli::{self, Cli, Command};
use clinic_backend::outbound::JsonFileEntityStore;
use serde_json::Value;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(error) => error.exit(),
    };

    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return report(&DomainError::internal(format!(
                "create Tokio runtime: {error}"
            )));
        }
    };

    match runtime.block_on(async_main(args)) {
        Ok(output) => {
            println!("{output:#}");
            ExitCode::SUCCESS
        }
        Err(error) => report(&error),
    }
}

async fn async_main(args: Cli) -> Result<Value, DomainError> {
    if let Command::Nav(nav) = &args.command {
        let sections = cli::render_navigation(nav)?;
        return serde_json::to_value(sections)
            .map_err(|err| DomainError::internal(format!("failed to serialize output: {err}")));
    }

    let settings = ClinicSettings::load_from_environment()?;
    let store_dir = Utf8PathBuf::from_path_buf(settings.store_dir().to_path_buf())
        .map_err(|path| {
            DomainError::invalid_request(format!(
                "store directory must be valid UTF-8: {}",
                path.display()
            ))
        })?;
    let store = JsonFileEntityStore::open(&store_dir, Utf8Path::new(settings.statuses_file()))?;
    let service =
        EntityLifecycleService::new(Arc::new(store), CatalogueProfile::appointment_statuses())
            .with_seeding(settings.seed_defaults());

    cli::run(args.command, &service).await
}

fn report(error: &DomainError) -> ExitCode {
    match serde_json::to_string(error) {
        Ok(envelope) => eprintln!("{envelope}"),
        Err(_) => eprintln!("{error}"),
    }
    ExitCode::FAILURE
}
