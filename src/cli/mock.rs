//! Mock data command implementation

use chrono::Utc;
use clap::Args;

use super::{Cli, CliError};
use crate::mock::{upload_mock_data, MockDataGenerator, DEFAULT_CRM_RECORDS, DEFAULT_ERP_RECORDS};

/// Mock command arguments
#[derive(Args, Debug)]
pub struct MockArgs {
    /// Number of CRM customer records
    #[arg(long, default_value_t = DEFAULT_CRM_RECORDS)]
    pub crm_records: usize,

    /// Number of ERP project records
    #[arg(long, default_value_t = DEFAULT_ERP_RECORDS)]
    pub erp_records: usize,

    /// RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl MockArgs {
    /// Generate both extracts and upload them to the container
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let container = cli.blob_container()?;
        let mut generator = MockDataGenerator::new(self.seed, Utc::now().date_naive());
        upload_mock_data(&container, &mut generator, self.crm_records, self.erp_records).await?;
        Ok(())
    }
}
