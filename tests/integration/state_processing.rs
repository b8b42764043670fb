//! State processing tests: package assembly and sink routing

use housing_data_pipeline::client::{PipelineSettings, RequestExecutor};
use housing_data_pipeline::fetcher::HudClient;
use housing_data_pipeline::output::{
    BlobContainer, LocalJsonSink, PackageLocation, RemoteSinks, SinkError,
};
use housing_data_pipeline::pipeline::{CountyAggregator, PipelineError, StateProcessor};
use housing_data_pipeline::{Dataset, StatePackage, StorageMode};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{county, StaticSource};

fn processor(source: StaticSource, root: &TempDir, remote: RemoteSinks) -> StateProcessor {
    StateProcessor::new(
        Arc::new(source),
        Duration::ZERO,
        LocalJsonSink::new(root.path()),
        remote,
    )
}

#[tokio::test]
async fn test_empty_state_fails_locally_without_writing() {
    let root = TempDir::new().unwrap();
    let processor = processor(StaticSource::default(), &root, RemoteSinks::disconnected());

    let err = processor
        .process_state("ZZ", 2024, StorageMode::Local)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Sink(SinkError::Io(_))));
    assert!(!root.path().join("fair_market_rents").exists());
    assert!(!root.path().join("income_limits").exists());
}

#[tokio::test]
async fn test_local_mode_writes_both_datasets() {
    let root = TempDir::new().unwrap();
    let source = StaticSource::with_state(
        "TX",
        vec![county("4800199999", "Anderson County"), county("4800399999", "Andrews County")],
    );
    let processor = processor(source, &root, RemoteSinks::disconnected());

    processor
        .process_state("TX", 2024, StorageMode::Local)
        .await
        .unwrap();

    let sink = LocalJsonSink::new(root.path());
    let fmr = sink
        .read_package(&PackageLocation::new(Dataset::FairMarketRents, 2024, "TX"))
        .unwrap();
    let il = sink
        .read_package(&PackageLocation::new(Dataset::IncomeLimits, 2024, "TX"))
        .unwrap();

    assert_eq!(fmr.counties.len(), 2);
    assert_eq!(fmr.counties, il.counties);
    assert_eq!(
        fmr.state_level.into_value(),
        json!({"dataset": "fair_market_rents", "state": "TX"})
    );
}

#[tokio::test]
async fn test_both_mode_writes_local_and_remote() {
    let root = TempDir::new().unwrap();
    let container = BlobContainer::in_memory("raw-data");
    let source = StaticSource::with_state("FL", vec![county("1200199999", "Alachua County")]);
    let processor = processor(source, &root, RemoteSinks::connected(container.clone()));

    processor
        .process_state("FL", 2023, StorageMode::Both)
        .await
        .unwrap();

    assert!(root.path().join("fair_market_rents/2023/FL/FL_data.json").exists());
    assert!(root.path().join("income_limits/2023/FL/FL_data.json").exists());

    let keys: Vec<_> = container
        .list(None)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.key)
        .collect();
    assert_eq!(
        keys,
        vec![
            "fair_market_rents/2023/FL/FL_data.json",
            "fair_market_rents_parquet/2023/FL/FL_data.parquet",
            "income_limits/2023/FL/FL_data.json",
            "income_limits_parquet/2023/FL/FL_data.parquet",
        ]
    );

    let parquet = container
        .get("income_limits_parquet/2023/FL/FL_data.parquet")
        .await
        .unwrap();
    let rows: usize = ParquetRecordBatchReaderBuilder::try_new(parquet)
        .unwrap()
        .build()
        .unwrap()
        .map(|batch| batch.unwrap().num_rows())
        .sum();
    assert_eq!(rows, 1);

    let json_blob = container.get("income_limits/2023/FL/FL_data.json").await.unwrap();
    let package: StatePackage = serde_json::from_slice(&json_blob).unwrap();
    assert_eq!(package.counties[0].county_info.county_name, "Alachua County");
}

#[tokio::test]
async fn test_remote_mode_without_connection_is_storage_error() {
    let root = TempDir::new().unwrap();
    let source = StaticSource::with_state("TX", vec![]);
    let processor = processor(source, &root, RemoteSinks::disconnected());

    let err = processor
        .process_state("TX", 2024, StorageMode::Remote)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Sink(SinkError::Storage(_))));
    // Remote mode never touches the local sink
    assert!(!root.path().join("fair_market_rents").exists());
}

#[tokio::test]
async fn test_local_failure_does_not_stop_remote_sinks() {
    let root = TempDir::new().unwrap();
    let container = BlobContainer::in_memory("raw-data");
    // Local root is a regular file, so directory creation under it fails
    let blocker = root.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let source = StaticSource::with_state("TX", vec![county("4800199999", "Anderson County")]);
    let processor = StateProcessor::new(
        Arc::new(source),
        Duration::ZERO,
        LocalJsonSink::new(&blocker),
        RemoteSinks::connected(container.clone()),
    );

    let err = processor
        .process_state("TX", 2024, StorageMode::Both)
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Sink(SinkError::Io(_))));
    assert_eq!(container.list(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_state_level_failure_is_processing_error() {
    let root = TempDir::new().unwrap();
    let mut source = StaticSource::with_state("TX", vec![county("4800199999", "Anderson County")]);
    source.failing_states.push("TX".to_string());
    let processor = processor(source, &root, RemoteSinks::disconnected());

    let err = processor
        .process_state("TX", 2024, StorageMode::Local)
        .await
        .unwrap_err();

    match err {
        PipelineError::Processing { state, .. } => assert_eq!(state, "TX"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_county_is_left_out_of_both_packages() {
    let mut source = StaticSource::with_state(
        "TX",
        (1..=5)
            .map(|i| county(&format!("48{i:03}99999"), &format!("County {i}")))
            .collect(),
    );
    source.failing_entities.push("4800399999".to_string());
    let source = Arc::new(source);

    let aggregator = CountyAggregator::new(source.clone(), Duration::ZERO);
    let aggregate = aggregator.collect_county_data("TX", 2024).await.unwrap();

    assert_eq!(aggregate.packages.len(), 4);
    assert_eq!(aggregate.failures.len(), 1);
    assert_eq!(aggregate.failures[0].fips_code, "4800399999");
    assert!(aggregate
        .packages
        .iter()
        .all(|p| p.county_info.fips_code != "4800399999"));

    // FMR failed first, so IL was never requested for that county
    assert!(!source.requests().contains(&"il:4800399999".to_string()));
}

#[tokio::test]
async fn test_county_delay_spaces_requests() {
    let source = Arc::new(StaticSource::with_state(
        "RI",
        vec![county("4400199999", "Bristol County"), county("4400399999", "Kent County")],
    ));
    let aggregator = CountyAggregator::new(source, Duration::from_millis(20));

    let start = std::time::Instant::now();
    let packages = aggregator.get_county_data("RI", 2024).await.unwrap();

    assert_eq!(packages.len(), 2);
    // Two waits per county
    assert!(start.elapsed() >= Duration::from_millis(80));
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/DE"))
        .and(query_param("year", "2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"area_name": "Delaware"}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/il/statedata/DE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"median_income": 98000}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fmr/listCounties/DE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"fips_code": "1000199999", "county_name": "Kent County"},
            {"fips_code": "1000399999", "county_name": "New Castle County"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fmr/data/1000199999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"Efficiency": 1012}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/il/data/1000199999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"median_income": 87000}})))
        .mount(&server)
        .await;
    // New Castle keeps failing and is dropped
    Mock::given(method("GET"))
        .and(path("/fmr/data/1000399999"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let settings = PipelineSettings::without_delays().with_base_url(server.uri());
    let executor = RequestExecutor::new("token", &settings).unwrap();
    let source = Arc::new(HudClient::new(executor, settings.base_url.clone()));
    let root = TempDir::new().unwrap();
    let processor = StateProcessor::new(
        source,
        settings.county_delay,
        LocalJsonSink::new(root.path()),
        RemoteSinks::disconnected(),
    );

    processor
        .process_state("DE", 2024, StorageMode::Local)
        .await
        .unwrap();

    let package = LocalJsonSink::new(root.path())
        .read_package(&PackageLocation::new(Dataset::IncomeLimits, 2024, "DE"))
        .unwrap();
    assert_eq!(package.state_level.into_value(), json!({"median_income": 98000}));
    assert_eq!(package.counties.len(), 1);
    assert_eq!(package.counties[0].county_info.county_name, "Kent County");
    assert_eq!(
        package.counties[0].income_limits.clone().into_value(),
        json!({"median_income": 87000})
    );
}
