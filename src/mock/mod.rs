//! Synthetic CRM and ERP records for demos
//!
//! Generates home-builder customer leads and construction projects, renders
//! them as CSV and uploads them next to the real datasets as `crm_data.csv`
//! and `erp_data.csv`. A fixed seed reproduces the same records for the same
//! reference date.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::output::{BlobContainer, SinkError};

mod words;

/// Blob key of the CRM extract
pub const CRM_BLOB: &str = "crm_data.csv";

/// Blob key of the ERP extract
pub const ERP_BLOB: &str = "erp_data.csv";

/// Default number of CRM records
pub const DEFAULT_CRM_RECORDS: usize = 1000;

/// Default number of ERP records
pub const DEFAULT_ERP_RECORDS: usize = 500;

/// Customers are created up to this many days before the reference date
const CRM_HISTORY_DAYS: i64 = 730;

/// Construction starts up to this many days before the reference date
const ERP_HISTORY_DAYS: i64 = 365;

/// Construction takes between these many days
const CONSTRUCTION_DAYS: std::ops::RangeInclusive<i64> = 120..=180;

/// Spread applied to a model's list price
const PRICE_SPREAD: i64 = 20_000;

/// Actual costs range over 95% to 115% of budget, in basis points
const COST_FACTOR_BPS: std::ops::RangeInclusive<i64> = 9_500..=11_500;

/// Mock data errors
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// CSV rendering failed
    #[error("CSV error: {0}")]
    Csv(String),

    /// Upload failed
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Result type for mock data operations
pub type MockResult<T> = Result<T, MockError>;

/// CRM customer lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Lead identifier
    pub customer_id: Uuid,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact email derived from the name
    pub email: String,
    /// Phone number as `(NXX) NXX-XXXX`
    pub phone: String,
    /// Street address
    pub address: String,
    /// City of residence
    pub city: String,
    /// Two-letter state code
    pub state: String,
    /// Five-digit ZIP code
    pub zip_code: String,
    /// Channel the lead came through
    pub lead_source: String,
    /// Sales funnel stage
    pub lead_status: String,
    /// Day the lead was recorded
    pub created_date: NaiveDate,
}

/// ERP construction project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Project identifier
    pub project_id: Uuid,
    /// Home model being built
    pub home_model: String,
    /// Model list price adjusted by a random spread
    pub base_price: i64,
    /// Living area of the model
    pub square_feet: u32,
    /// Lot within the subdivision
    pub lot_number: String,
    /// Subdivision name
    pub subdivision: String,
    /// Day construction started
    pub construction_start_date: NaiveDate,
    /// Expected completion, 120 to 180 days after the start
    pub estimated_completion_date: NaiveDate,
    /// Construction phase
    pub status: String,
    /// 70% of the model's list price, not of the adjusted base price
    pub budget: Decimal,
    /// Spend so far, 95% to 115% of budget
    pub actual_costs: Decimal,
}

/// Home model offered by the builder
#[derive(Debug, Clone, Copy)]
struct HomeModel {
    name: &'static str,
    base_price: i64,
    square_feet: u32,
}

const HOME_MODELS: [HomeModel; 4] = [
    HomeModel { name: "Oakwood", base_price: 350_000, square_feet: 2200 },
    HomeModel { name: "Maple Grove", base_price: 425_000, square_feet: 2800 },
    HomeModel { name: "Pine Valley", base_price: 550_000, square_feet: 3400 },
    HomeModel { name: "Cedar Ridge", base_price: 650_000, square_feet: 3800 },
];

const LEAD_SOURCES: [&str; 4] = ["Website", "Referral", "Real Estate Agent", "Model Home"];
const LEAD_STATUSES: [&str; 5] = ["New", "Contacted", "Qualified", "Contract", "Closed"];
const SUBDIVISION_SUFFIXES: [&str; 4] = ["Estates", "Heights", "Gardens", "Commons"];
const PROJECT_STATUSES: [&str; 6] = [
    "Planning",
    "Foundation",
    "Framing",
    "Interior",
    "Finishing",
    "Complete",
];

/// Seeded record generator
pub struct MockDataGenerator {
    rng: StdRng,
    today: NaiveDate,
}

impl MockDataGenerator {
    /// Create a generator; dates are generated relative to `today`
    ///
    /// Without a seed the generator is seeded from the thread RNG.
    pub fn new(seed: Option<u64>, today: NaiveDate) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self { rng, today }
    }

    /// Generate `count` customer leads
    pub fn generate_crm(&mut self, count: usize) -> Vec<CustomerRecord> {
        (0..count).map(|_| self.customer()).collect()
    }

    /// Generate `count` construction projects
    pub fn generate_erp(&mut self, count: usize) -> Vec<ProjectRecord> {
        (0..count).map(|_| self.project()).collect()
    }

    fn customer(&mut self) -> CustomerRecord {
        let first_name = self.pick(words::FIRST_NAMES).to_string();
        let last_name = self.pick(words::LAST_NAMES).to_string();
        let email = format!(
            "{}.{}{}@{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            self.rng.random_range(1..100),
            self.pick(words::EMAIL_DOMAINS)
        );

        CustomerRecord {
            customer_id: self.uuid(),
            phone: format!(
                "({}) {:03}-{:04}",
                self.rng.random_range(201..990),
                self.rng.random_range(200..1000),
                self.rng.random_range(0..10_000)
            ),
            address: format!(
                "{} {} {}",
                self.rng.random_range(100..10_000),
                self.pick(words::STREET_NAMES),
                self.pick(words::STREET_SUFFIXES)
            ),
            city: self.pick(words::CITIES).to_string(),
            state: self.pick(words::STATES).to_string(),
            zip_code: format!("{:05}", self.rng.random_range(1_001..100_000)),
            lead_source: self.pick(&LEAD_SOURCES).to_string(),
            lead_status: self.pick(&LEAD_STATUSES).to_string(),
            created_date: self.days_ago(CRM_HISTORY_DAYS),
            first_name,
            last_name,
            email,
        }
    }

    fn project(&mut self) -> ProjectRecord {
        let model = HOME_MODELS[self.rng.random_range(0..HOME_MODELS.len())];
        let start = self.days_ago(ERP_HISTORY_DAYS);
        let construction_days = self.rng.random_range(CONSTRUCTION_DAYS);

        let budget = Decimal::from(model.base_price) * Decimal::new(7, 1);
        let cost_factor = Decimal::new(self.rng.random_range(COST_FACTOR_BPS), 4);

        ProjectRecord {
            project_id: self.uuid(),
            home_model: model.name.to_string(),
            base_price: model.base_price + self.rng.random_range(-PRICE_SPREAD..=PRICE_SPREAD),
            square_feet: model.square_feet,
            lot_number: self.rng.random_range(1..10_000u32).to_string(),
            subdivision: format!(
                "{} {}",
                self.pick(words::CITIES),
                self.pick(&SUBDIVISION_SUFFIXES)
            ),
            construction_start_date: start,
            estimated_completion_date: start + Duration::days(construction_days),
            status: self.pick(&PROJECT_STATUSES).to_string(),
            budget,
            actual_costs: (budget * cost_factor).round_dp(2),
        }
    }

    fn pick(&mut self, options: &[&'static str]) -> &'static str {
        options.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn uuid(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    fn days_ago(&mut self, max_days: i64) -> NaiveDate {
        self.today - Duration::days(self.rng.random_range(0..=max_days))
    }
}

/// Render records as CSV with a header row
pub fn to_csv<T: Serialize>(records: &[T]) -> MockResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| MockError::Csv(format!("Failed to write record: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| MockError::Csv(format!("Failed to flush CSV: {e}")))
}

/// Generate both extracts and upload them, replacing existing blobs
pub async fn upload_mock_data(
    container: &BlobContainer,
    generator: &mut MockDataGenerator,
    crm_records: usize,
    erp_records: usize,
) -> MockResult<()> {
    let crm = to_csv(&generator.generate_crm(crm_records))?;
    let erp = to_csv(&generator.generate_erp(erp_records))?;

    info!(records = crm_records, blob = CRM_BLOB, "Uploading CRM data");
    container.put(CRM_BLOB, crm).await?;

    info!(records = erp_records, blob = ERP_BLOB, "Uploading ERP data");
    container.put(ERP_BLOB, erp).await?;

    info!(container = container.name(), "Upload completed successfully");
    Ok(())
}
