//! Log output of the county aggregator, captured through a shared buffer

use housing_data_pipeline::pipeline::CountyAggregator;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

use crate::common::{county, StaticSource};

/// Writer that appends formatted events to a shared buffer
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn five_counties_third_failing() -> StaticSource {
    let mut source = StaticSource::with_state(
        "TX",
        (1..=5)
            .map(|i| county(&format!("48{i:03}99999"), &format!("County {i}")))
            .collect(),
    );
    source.failing_entities.push("4800399999".to_string());
    source
}

#[tokio::test]
async fn test_failed_county_logs_exactly_one_error() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .finish();
    // Thread-local default; the test runtime polls on this thread
    let _guard = tracing::subscriber::set_default(subscriber);

    let aggregator =
        CountyAggregator::new(Arc::new(five_counties_third_failing()), Duration::ZERO);
    let aggregate = aggregator.collect_county_data("TX", 2024).await.unwrap();
    assert_eq!(aggregate.packages.len(), 4);

    let lines = logs.lines();
    let errors: Vec<_> = lines.iter().filter(|l| l.contains("ERROR")).collect();
    assert_eq!(errors.len(), 1, "unexpected errors: {errors:?}");
    assert!(errors[0].contains("Error fetching data for county"));
    assert!(errors[0].contains("County 3"));
    assert!(errors[0].contains("4800399999"));

    let fetched = lines
        .iter()
        .filter(|l| l.contains("INFO") && l.contains("Fetched county data"))
        .count();
    assert_eq!(fetched, 4);
}

#[tokio::test]
async fn test_json_log_format_carries_county_fields() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_writer(logs.clone())
        .with_max_level(Level::ERROR)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let aggregator =
        CountyAggregator::new(Arc::new(five_counties_third_failing()), Duration::ZERO);
    aggregator.collect_county_data("TX", 2024).await.unwrap();

    let lines = logs.lines();
    assert_eq!(lines.len(), 1);
    let event: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(event["level"], "ERROR");
    assert_eq!(event["fields"]["state"], "TX");
    assert_eq!(event["fields"]["fips"], "4800399999");
    assert_eq!(event["fields"]["county"], "County 3");
}
