use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use solarsite::{SiteAnalyzer, SiteSurveyConfig, logging, web};

/// Rooftop solar site survey: obstacles and five-year climate for a UK postcode
#[derive(Parser, Debug)]
#[command(name = "solarsite", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the analysis API (default)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Analyze one postcode and print the report as JSON
    Analyze {
        /// UK postcode, e.g. "SW1A 1AA"
        postcode: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SiteSurveyConfig::load_from_path(cli.config)?;
    logging::init(&config.logging)?;

    let analyzer = Arc::new(SiteAnalyzer::from_config(&config)?);

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            web::run(&config.server, analyzer).await
        }
        Command::Analyze { postcode } => {
            let report = analyzer
                .analyze(&postcode)
                .await
                .map_err(|e| {
                    let hint = e.user_message();
                    anyhow::Error::new(e).context(hint)
                })?;
            let json = serde_json::to_string_pretty(&report).context("Failed to render report")?;
            println!("{json}");
            Ok(())
        }
    }
}
