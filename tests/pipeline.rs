//! End-to-end runs with canned sources and sinks.

use anyhow::Result;
use postflow::io::cloud::FakeObjectIO;
use postflow::quality::QualityReport;
use postflow::sink::{ParquetSink, SinkConfig};
use postflow::testing::*;
use postflow::{Pipeline, RunOutcome, Transformer};
use serde_json::json;

#[test]
fn empty_source_stops_before_sink_and_report() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let report_path = tmp.file_path("data_quality_report.json");
    let source = StaticSource::new(Vec::new());
    let sink = RecordingSink::new();

    let outcome = Pipeline::new(&source, Transformer::default(), &sink, &report_path).run()?;

    assert_eq!(outcome, RunOutcome::NoRecords);
    assert_eq!(source.fetch_count(), 1);
    assert_eq!(sink.save_count(), 0);
    assert!(!report_path.exists());
    Ok(())
}

#[test]
fn no_valid_rows_stops_before_sink_and_report() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let report_path = tmp.file_path("data_quality_report.json");
    let source = StaticSource::new(vec![
        record(json!({"userId": 1, "id": 1, "title": "  hello world!    ", "body": "a  b   c"})),
        record(json!({"userId": 1, "id": 2, "title": "   ", "body": "no title"})),
        record(json!({"userId": 2, "id": 1, "title": "duplicate", "body": "dup"})),
    ]);
    let sink = RecordingSink::new();

    let outcome = Pipeline::new(&source, Transformer::default(), &sink, &report_path).run()?;

    assert_eq!(outcome, RunOutcome::NoValidRows { fetched: 3 });
    assert_eq!(sink.save_count(), 0);
    assert!(!report_path.exists());
    Ok(())
}

#[test]
fn completed_run_saves_table_and_writes_report() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let report_path = tmp.file_path("out/data_quality_report.json");
    let source = StaticSource::new(sample_posts());
    let sink = RecordingSink::new();

    let RunOutcome::Completed(summary) =
        Pipeline::new(&source, Transformer::default(), &sink, &report_path).run()?
    else {
        panic!("expected a completed run");
    };

    assert_eq!(summary.fetched, 8);
    assert_eq!(summary.valid, 3);
    assert_eq!(summary.rejected, 5);
    assert_eq!(summary.report.duplicate_key_count, 0);

    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].len(), 3);

    let on_disk: QualityReport = read_json_output(&report_path)?;
    assert_eq!(on_disk, summary.report);
    Ok(())
}

#[test]
fn sink_failure_propagates_and_skips_report() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let report_path = tmp.file_path("data_quality_report.json");
    let source = StaticSource::new(sample_posts());
    let sink = RecordingSink::failing("disk full");

    let err = Pipeline::new(&source, Transformer::default(), &sink, &report_path)
        .run()
        .unwrap_err();

    assert!(err.to_string().contains("disk full"));
    assert!(!report_path.exists());
    Ok(())
}

#[test]
fn parquet_sink_with_uploads_end_to_end() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let store = FakeObjectIO::new();
    let sink = ParquetSink::new(SinkConfig {
        output_dir: tmp.path().to_path_buf(),
        partition_cols: vec!["userId".into()],
        use_object_store: true,
        bucket: Some("etl-bucket".into()),
        prefix: "daily".into(),
        ..SinkConfig::default()
    })
    .with_object_store(Box::new(store.clone()));
    let source = StaticSource::new(sample_posts());
    let report_path = tmp.file_path("data_quality_report.json");

    let outcome = Pipeline::new(&source, Transformer::default(), &sink, &report_path).run()?;

    let RunOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(summary.output.uploaded.len(), 2);
    assert_eq!(store.keys("etl-bucket").len(), 2);
    assert_eq!(
        list_files(tmp.path())?,
        vec![
            "data_quality_report.json",
            "partitioned/userId=1/part-00000.parquet",
            "partitioned/userId=3/part-00000.parquet",
        ]
    );
    Ok(())
}

#[test]
fn repeated_runs_are_independent() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let report_path = tmp.file_path("data_quality_report.json");
    let source = StaticSource::new(sample_posts());
    let sink = RecordingSink::new();
    let pipeline = Pipeline::new(&source, Transformer::default(), &sink, &report_path);

    let first = pipeline.run()?;
    let second = pipeline.run()?;

    assert_eq!(first, second);
    let saved = sink.saved();
    assert_eq!(saved[0], saved[1]);
    Ok(())
}
