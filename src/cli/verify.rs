//! Verify command implementation

use clap::Args;

use super::{Cli, CliError};
use crate::verify::BlobVerifier;

/// Verify subcommand
#[derive(Debug, Args)]
pub struct VerifyCommand {
    #[command(subcommand)]
    action: VerifyAction,
}

#[derive(Debug, clap::Subcommand)]
enum VerifyAction {
    /// List blob keys, optionally filtered by a key prefix
    List {
        /// Key prefix (e.g., fair_market_rents/2024)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Print the first 1000 characters of a JSON blob
    Preview {
        /// Blob key
        key: String,
    },
    /// Check both dataset blobs of a state and year
    State {
        /// Two-letter state code
        state: String,
        /// Publication year
        year: u16,
    },
}

impl VerifyCommand {
    /// Execute the verify command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let verifier = BlobVerifier::new(cli.blob_container()?);

        match &self.action {
            VerifyAction::List { prefix } => {
                let blobs = verifier.list_blobs(prefix.as_deref()).await?;
                for blob in &blobs {
                    println!("{}\t{}", blob.key, blob.size);
                }
                println!("\n{} blob(s)", blobs.len());
            }
            VerifyAction::Preview { key } => {
                println!("{}", verifier.preview_blob(key).await?);
            }
            VerifyAction::State { state, year } => {
                let state = state.trim().to_uppercase();
                let checks = verifier.verify_state_data(&state, *year).await;

                let mut missing = Vec::new();
                for check in &checks {
                    match &check.result {
                        Ok(preview) => println!("== {} ==\n{}\n", check.key, preview),
                        Err(e) => {
                            println!("== {} ==\nERROR: {}\n", check.key, e);
                            missing.push(check.key.clone());
                        }
                    }
                }

                if !missing.is_empty() {
                    return Err(CliError::VerificationFailed(missing.join(", ")));
                }
            }
        }
        Ok(())
    }
}
