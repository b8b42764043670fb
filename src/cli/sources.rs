//! CLI command for listing geographic entities known to the API

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use super::Cli;
use crate::client::RequestExecutor;
use crate::fetcher::{DataSource, HudClient};

/// Sources subcommand
#[derive(Debug, Args)]
pub struct SourcesCommand {
    #[command(subcommand)]
    action: SourcesAction,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: OutputFormat,
}

/// Sources actions
#[derive(Debug, clap::Subcommand)]
enum SourcesAction {
    /// List all states
    States,
    /// List all metropolitan areas
    Metros,
    /// List the counties of a state
    Counties {
        /// Two-letter state code
        state: String,
    },
}

/// Output format for sources command
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl SourcesCommand {
    /// Execute the sources command
    pub async fn execute(&self, cli: &Cli) -> Result<()> {
        let settings = cli.settings();
        let token = cli.api_token()?;
        let executor = RequestExecutor::new(token.expose(), &settings)?;
        let source: Arc<dyn DataSource> =
            Arc::new(HudClient::new(executor, settings.base_url.clone()));

        match &self.action {
            SourcesAction::States => {
                let states = source.get_states().await.context("Failed to list states")?;
                let lines = states
                    .iter()
                    .map(|s| format!("{} | {}", s.state_code, s.state_name))
                    .collect();
                self.render(&states, lines)
            }
            SourcesAction::Metros => {
                let metros = source
                    .get_metro_areas()
                    .await
                    .context("Failed to list metro areas")?;
                let lines = metros
                    .iter()
                    .map(|m| format!("{} | {}", m.cbsa_code, m.area_name))
                    .collect();
                self.render(&metros, lines)
            }
            SourcesAction::Counties { state } => {
                let state = state.trim().to_uppercase();
                let counties = source
                    .get_counties(&state)
                    .await
                    .with_context(|| format!("Failed to list counties of {state}"))?;
                let lines = counties
                    .iter()
                    .map(|c| format!("{} | {}", c.fips_code, c.county_name))
                    .collect();
                self.render(&counties, lines)
            }
        }
    }

    fn render<T: Serialize>(&self, items: &[T], lines: Vec<String>) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(items)
                        .context("Failed to serialize results to JSON")?
                );
            }
            OutputFormat::Human => {
                println!("Found {} entries:\n", lines.len());
                for line in lines {
                    println!("{line}");
                }
            }
        }
        Ok(())
    }
}
