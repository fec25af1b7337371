use std::path::PathBuf;

use airspace_core::order_type::OrderType;
use airspace_core::pipeline;
use airspace_core::segments::SEGMENT_COLUMNS;
use airspace_core::source::{CsvRowSource, RowSource, SourceError};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[tokio::test]
async fn csv_source_reads_every_column_as_text() {
    let source = CsvRowSource::new(fixture_path("segments.csv"));
    let df = source.fetch_segments().await.expect("read fixture");

    assert_eq!(df.height(), 9);
    for name in SEGMENT_COLUMNS {
        let column = df.column(name).expect("column present");
        assert!(column.dtype().is_string(), "{name} should be text");
    }
}

#[tokio::test]
async fn csv_source_reports_missing_file() {
    let source = CsvRowSource::new(fixture_path("does-not-exist.csv"));
    let err = source.fetch_segments().await.unwrap_err();
    assert!(matches!(err, SourceError::NotFound(_)));
}

#[tokio::test]
async fn fixture_report_matches_expected_orders() {
    let source = CsvRowSource::new(fixture_path("segments.csv"));
    let report = pipeline::run(&source).await.expect("run pipeline");

    let ids: Vec<_> = report.summaries().iter().map(|s| s.order_id.as_str()).collect();
    assert_eq!(ids, ["1004", "1001", "1002", "1003"]);

    let denver = &report.summaries()[0];
    assert_eq!(denver.total_distance, 0.0);
    assert!(denver.pick_up_time_local.is_none());
    assert!(denver.minutes_to_pickup.is_none());
    assert_eq!(
        denver.delivery_time.map(|t| t.to_rfc3339()).as_deref(),
        Some("2021-09-01T12:00:00-06:00")
    );

    let san_diego = &report.summaries()[1];
    assert_eq!(san_diego.order_type, OrderType::Drive);
    assert_eq!(san_diego.company_id.as_deref(), Some("17"));
    assert_eq!(san_diego.total_drive_distance, 121.5);
    assert_eq!(san_diego.minutes_to_pickup, Some(90.0));
    assert_eq!(
        san_diego.delivery_time.map(|t| t.to_rfc3339()).as_deref(),
        Some("2021-06-01T13:00:00-07:00")
    );

    let indiana = &report.summaries()[2];
    assert_eq!(indiana.order_type, OrderType::Hfpu);
    assert_eq!(indiana.origin_city.as_deref(), Some("Chicago"));
    assert_eq!(indiana.destination_city.as_deref(), Some("Indianapolis"));
    assert_eq!(indiana.total_drive_distance, 25.75);
    assert_eq!(indiana.minutes_to_pickup, Some(45.0));
    assert_eq!(
        indiana.pick_up_time_local.map(|t| t.to_rfc3339()).as_deref(),
        Some("2021-07-04T07:00:00-05:00")
    );

    let bay_area = &report.summaries()[3];
    assert_eq!(bay_area.order_type, OrderType::Nfo);
    assert!(bay_area.pick_up_time_local.is_none());
    assert_eq!(bay_area.minutes_to_pickup, Some(60.0));
    assert_eq!(bay_area.destination_city.as_deref(), Some("San Francisco"));
    assert!((bay_area.total_distance - 347.4219).abs() < 1e-3);
}
