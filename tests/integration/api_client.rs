//! HUD API client tests against a mock HTTP server
//!
//! Retry backoff is zeroed through `PipelineSettings::without_delays`, so the
//! retry paths run without sleeping.

use housing_data_pipeline::client::{
    PipelineSettings, RequestError, RequestExecutor, RequestThrottle, RetryPolicy,
};
use housing_data_pipeline::fetcher::{DataSource, DatasetQuery, FetchError, HudClient};
use housing_data_pipeline::DatasetRecord;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HudClient {
    let settings = PipelineSettings::without_delays().with_base_url(server.uri());
    let executor = RequestExecutor::new("test-token", &settings).unwrap();
    HudClient::new(executor, settings.base_url.clone())
}

#[tokio::test]
async fn test_wrapped_payload_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/TX"))
        .and(query_param("year", "2024"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [1, 2, 3]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .get_fair_market_rents(&DatasetQuery::for_state("TX").with_year(2024))
        .await
        .unwrap();

    assert_eq!(record.into_value(), json!([1, 2, 3]));
}

#[tokio::test]
async fn test_bare_payload_for_entity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/il/data/4800199999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = DatasetQuery {
        state: Some("TX".to_string()),
        entity_id: Some("4800199999".to_string()),
        year: None,
    };
    let record = client.get_income_limits(&query).await.unwrap();

    assert_eq!(record, DatasetRecord::Bare(vec![json!(1), json!(2), json!(3)]));
}

#[tokio::test]
async fn test_recovers_after_two_rate_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/CA"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/CA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"year": "2024"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .get_fair_market_rents(&DatasetQuery::for_state("CA"))
        .await
        .unwrap();

    assert_eq!(record, DatasetRecord::Wrapped(json!({"year": "2024"})));
}

#[tokio::test]
async fn test_recovers_after_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/il/statedata/FL"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/il/statedata/FL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"median": 1}])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let record = client
        .get_income_limits(&DatasetQuery::for_state("FL"))
        .await
        .unwrap();

    assert_eq!(record, DatasetRecord::Bare(vec![json!({"median": 1})]));
}

#[tokio::test]
async fn test_persistent_rate_limit_fails_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/NY"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_fair_market_rents(&DatasetQuery::for_state("NY"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request(RequestError::RateLimited)));
}

#[tokio::test]
async fn test_persistent_server_error_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/NY"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_fair_market_rents(&DatasetQuery::for_state("NY"))
        .await
        .unwrap_err();

    match err {
        FetchError::Request(RequestError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "internal");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_shape_is_retried_then_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/data/METRO10180M10180"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foo": "bar"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_fair_market_rents(&DatasetQuery::for_entity("METRO10180M10180"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Request(RequestError::UnexpectedShape(_))
    ));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/statedata/TX"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_fair_market_rents(&DatasetQuery::for_state("TX"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Request(RequestError::Decode(_))));
}

#[tokio::test]
async fn test_missing_state_and_entity_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .get_fair_market_rents(&DatasetQuery::default().with_year(2024))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_listings_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/listStates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"state_name": "Texas", "state_code": "TX", "state_num": "48", "category": "State"},
            {"state_name": "Florida", "state_code": "FL", "state_num": "12", "category": "State"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fmr/listMetroAreas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"cbsa_code": "METRO10180M10180", "area_name": "Abilene, TX MSA", "category": "HUD Metro FMR Area"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let states = client.get_states().await.unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].state_code, "TX");
    assert_eq!(states[1].attributes.get("state_num"), Some(&json!("12")));

    let metros = client.get_metro_areas().await.unwrap();
    assert_eq!(metros[0].cbsa_code, "METRO10180M10180");
}

#[tokio::test]
async fn test_malformed_county_entry_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/listCounties/TX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"fips_code": "4800199999", "county_name": "Anderson County"},
            {"county_name": "No FIPS County"},
            {"fips_code": "4800399999", "county_name": "Andrews County"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let counties = client.get_counties("TX").await.unwrap();

    let fips: Vec<_> = counties.iter().map(|c| c.fips_code.as_str()).collect();
    assert_eq!(fips, vec!["4800199999", "4800399999"]);
}

#[tokio::test]
async fn test_undecodable_state_listing_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fmr/listStates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"states": 3}})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(matches!(
        client.get_states().await,
        Err(FetchError::Parse(_))
    ));
}

#[tokio::test]
async fn test_request_delay_precedes_every_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/il/statedata/OH"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let executor = RequestExecutor::with_client(
        reqwest::Client::new(),
        "test-token",
        RequestThrottle::new(Duration::from_millis(100)),
        RetryPolicy::immediate(3),
    );
    let client = HudClient::new(executor, server.uri());

    let start = Instant::now();
    let err = client
        .get_income_limits(&DatasetQuery::for_state("OH"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Request(RequestError::Status { status: 500, .. })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    // Backoff is zero, so the whole wait comes from the throttle
    assert!(start.elapsed() >= Duration::from_millis(300));
}
