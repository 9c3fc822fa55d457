//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: settings → paged HTTP requests → exported table

use arrow::array::{Array, Int64Array, StringArray};
use clap::Parser;
use cursor_harvest::cli::{Cli, Runner};
use cursor_harvest::config::HarvestSettings;
use cursor_harvest::engine::{ExportLabels, HarvestReport, Harvester};
use cursor_harvest::http::HttpClient;
use cursor_harvest::output::{Exporter, SHEET_NAME_KEY};
use cursor_harvest::pagination::{HarvestStatus, Pager, SleepPacer};
use cursor_harvest::types::TableFormat;
use cursor_harvest::Error;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::{tempdir, TempDir};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESOURCE: &str = "ekatalog-archive/paket-e-purchasing";
const ENDPOINT: &str = "/api/v1/ekatalog-archive/paket-e-purchasing";

fn settings(server: &MockServer, dir: &TempDir, format: TableFormat) -> HarvestSettings {
    let mut settings = HarvestSettings {
        base_url: format!("{}/api", server.uri()),
        resource_path: RESOURCE.to_string(),
        delay_ms: 0,
        ..Default::default()
    };
    settings.output.directory = dir.path().to_path_buf();
    settings.output.format = format;
    settings
}

async fn harvest(settings: &HarvestSettings) -> HarvestReport {
    let client = HttpClient::with_config(settings.http_config("test-token")).unwrap();
    let harvester = Harvester::new(
        Pager::new(settings.harvest_config().unwrap()),
        Exporter::new(settings.export_config()),
        ExportLabels::new(settings.sheet_name(), settings.filename_prefix()),
    );
    harvester.run(&client, &SleepPacer).await.unwrap()
}

fn records(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|i| json!({"kd_paket": i, "nama_paket": format!("Paket {i}")}))
        .collect()
}

fn read_parquet(path: &Path) -> (Vec<i64>, Option<String>) {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap()).unwrap();
    let sheet = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|kvs| kvs.iter().find(|kv| kv.key == SHEET_NAME_KEY))
        .and_then(|kv| kv.value.clone());

    let mut ids = Vec::new();
    for batch in builder.build().unwrap() {
        let batch = batch.unwrap();
        let col = batch
            .column_by_name("kd_paket")
            .unwrap()
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        ids.extend(col.values().iter().copied());
    }
    (ids, sheet)
}

// ============================================================================
// Request Shape Tests
// ============================================================================

#[tokio::test]
async fn test_first_request_carries_token_and_filters() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Accept", "application/json"))
        .and(query_param("limit", "100"))
        .and(query_param("tahun", "2024"))
        .and(query_param("kode_klpd", "K34"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": records(0, 3)})))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;

    assert_eq!(report.status, HarvestStatus::Completed);
    assert_eq!(report.record_count, 3);
    assert_eq!(report.pages_fetched, 1);

    let export = report.export.unwrap();
    assert!(export.filename.starts_with("hasil_rup_2024_full_"));
    let (ids, sheet) = read_parquet(&export.path);
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(sheet.as_deref(), Some("RUP 2024"));
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_follows_root_and_meta_cursors_in_order() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": records(0, 100), "cursor": "A"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("cursor", "A"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": records(100, 100), "meta": {"cursor": "B"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("cursor", "B"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": records(200, 40), "cursor": "C"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;

    assert_eq!(report.status, HarvestStatus::Completed);
    assert_eq!(report.record_count, 240);
    assert_eq!(report.pages_fetched, 3);
    assert!(!report.anomaly);

    let (ids, _) = read_parquet(&report.export.unwrap().path);
    assert_eq!(ids, (0..240).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_has_more_overrides_short_page() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"data": records(0, 10), "has_more": true, "cursor": "next"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("cursor", "next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"data": records(10, 5), "has_more": false, "cursor": "ignored"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;

    assert_eq!(report.record_count, 15);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_has_more_without_cursor_stops_with_anomaly() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": records(0, 100), "has_more": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;

    assert_eq!(report.status, HarvestStatus::Completed);
    assert!(report.anomaly);
    assert_eq!(report.record_count, 100);
    assert!(report.to_string().contains("has_more without a cursor"));
}

// ============================================================================
// Failure and Emergency Export Tests
// ============================================================================

#[tokio::test]
async fn test_server_error_on_third_page_saves_emergency_file() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param_is_missing("cursor"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": records(0, 100), "cursor": "A"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("cursor", "A"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": records(100, 100), "cursor": "B"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("cursor", "B"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;

    assert_eq!(report.status, HarvestStatus::FailedWithPartial);
    assert_eq!(report.record_count, 200);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.error.as_deref(), Some("HTTP 500: upstream down"));

    let export = report.export.unwrap();
    assert!(export.filename.starts_with("emergency_hasil_rup_2024_"));
    assert!(export.filename.ends_with(".parquet"));

    let (ids, sheet) = read_parquet(&export.path);
    assert_eq!(ids, (0..200).collect::<Vec<i64>>());
    assert_eq!(sheet.as_deref(), Some("Emergency Save"));
}

#[tokio::test]
async fn test_retry_recovers_from_transient_error() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": records(0, 2)})))
        .mount(&server)
        .await;

    let mut settings = settings(&server, &dir, TableFormat::Csv);
    settings.max_retries = 1;
    let report = harvest(&settings).await;

    assert_eq!(report.status, HarvestStatus::Completed);
    assert_eq!(report.record_count, 2);
}

#[tokio::test]
async fn test_rate_limited_page_waits_for_retry_after() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("Too Many Requests"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": records(0, 3)})))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(&server, &dir, TableFormat::Csv);
    settings.max_retries = 2;

    let start = Instant::now();
    let report = harvest(&settings).await;

    assert!(start.elapsed() >= Duration::from_secs(1));
    assert_eq!(report.status, HarvestStatus::Completed);
    assert_eq!(report.record_count, 3);
    assert!(report.error.is_none());
}

#[tokio::test]
async fn test_no_records_writes_no_file() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "cursor": null})))
        .expect(1)
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;

    assert_eq!(report.record_count, 0);
    assert!(report.export.is_none());
    assert!(report.to_string().ends_with("No data found"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ============================================================================
// Export Shape Tests
// ============================================================================

#[tokio::test]
async fn test_heterogeneous_records_share_one_csv_table() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"a": 1, "b": "x"},
                {"a": 2, "b": "y"},
                {"a": 3, "c": {"nested": true}}
            ]
        })))
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Csv)).await;
    let export = report.export.unwrap();
    assert!(export.filename.ends_with(".csv"));

    let text = std::fs::read_to_string(&export.path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "a,b,c");
    assert_eq!(lines[1], "1,x,");
    assert_eq!(lines[2], "2,y,");
    assert_eq!(lines[3], r#"3,,"{""nested"":true}""#);
}

#[tokio::test]
async fn test_nested_values_kept_as_json_text_in_parquet() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"kd_paket": 1, "lokasi": {"kota": "Bandung"}}]
        })))
        .mount(&server)
        .await;

    let report = harvest(&settings(&server, &dir, TableFormat::Parquet)).await;
    let path = report.export.unwrap().path;

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batch = reader.into_iter().next().unwrap().unwrap();
    let lokasi = batch
        .column_by_name("lokasi")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert!(!lokasi.is_null(0));
    assert_eq!(lokasi.value(0), r#"{"kota":"Bandung"}"#);
}

// ============================================================================
// CLI Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_aborts_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    let config_path = dir.path().join("harvest.yaml");
    std::fs::write(
        &config_path,
        format!(
            "base_url: {}/api\ntoken_env: CURSOR_HARVEST_IT_UNSET_TOKEN\ndelay_ms: 0\n",
            server.uri()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "cursor-harvest",
        "--config",
        config_path.to_str().unwrap(),
        "harvest",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let err = Runner::new(cli).run().await.unwrap_err();
    assert!(matches!(err, Error::MissingCredential { .. }));
    assert!(err.is_config());
}
