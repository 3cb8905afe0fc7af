use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use temperature_predictor::cli::{Cli, Command};
use temperature_predictor::web::{self, AppState};
use temperature_predictor::{City, PredictionService, PredictorConfig, logging};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PredictorConfig::load_from_path(cli.config.clone())?;
    if let Some(model) = &cli.model {
        config.model.path = model.clone();
    }
    logging::init(&config.logging, cli.verbose)?;
    info!(version = temperature_predictor::VERSION, "Starting temperature predictor");

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Cities => {
            for city in City::ALL {
                let meta = city.metadata();
                println!(
                    "{:<10} lat {:>8.4}  lon {:>8.4}  elevation {:>5.0} m",
                    city.name(),
                    meta.latitude,
                    meta.longitude,
                    meta.elevation
                );
            }
        }
        Command::Schema => {
            println!("{}", config.model.schema);
            for feature in config.model.schema.features() {
                println!("  {feature}");
            }
        }
        Command::Predict(args) => {
            let service = load_service(&config)?;
            let outcome = args.to_input(service.schema());
            let flow = match outcome {
                Ok(input) => service.submit(&input),
                Err(e) => service.resolve(Err(e)),
            };
            println!("{}", flow.to_text());
            if flow.is_error() {
                std::process::exit(1);
            }
        }
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let service = load_service(&config)?;
            let state = AppState::new(Arc::new(service))?;
            web::run(state, &config.server).await?;
        }
    }

    Ok(())
}

/// The model must be loaded before any input is accepted.
fn load_service(config: &PredictorConfig) -> Result<PredictionService> {
    PredictionService::load(&config.model.path, config.model.schema).map_err(|e| {
        error!(error = %e, "Startup failed");
        eprintln!("{}", e.user_message());
        anyhow::Error::new(e).context("Failed to load the prediction model")
    })
}
