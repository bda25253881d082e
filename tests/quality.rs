//! Tests for the data-quality report.

use anyhow::Result;
use postflow::quality::*;
use postflow::table::{Record, Table};
use postflow::testing::*;
use postflow::Transformer;
use serde_json::{json, Value};

fn table(rows: Vec<Value>) -> Table {
    let records: Vec<Record> = rows.into_iter().map(record).collect();
    Table::from_records(&records)
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn single_row_summaries_collapse_to_the_value() -> Result<()> {
    let records = vec![record(json!({
        "userId": 1, "id": 1, "title": "  hello world!    ", "body": "a  b   c"
    }))];
    let validated = Transformer::default().transform(&records);
    let report = generate_report(&validated, "id")?;

    assert_eq!(report.record_count, 1);
    assert_eq!(report.duplicate_key_count, 0);

    let title = report.title_length_summary.expect("title summary");
    assert_eq!(title.count, 1);
    assert!(close(title.mean, 12.0));
    assert!(close(title.min, 12.0));
    assert!(close(title.max, 12.0));
    assert_eq!(title.std, None);

    let words = report.body_word_count_summary.expect("body summary");
    assert_eq!(words.count, 1);
    assert!(close(words.mean, 3.0));
    assert!(close(words.min, 3.0));
    assert!(close(words.max, 3.0));
    Ok(())
}

#[test]
fn validated_tables_never_report_duplicates() -> Result<()> {
    let validated = Transformer::default().transform(&sample_posts());
    let report = generate_report(&validated, DEFAULT_KEY_COLUMN)?;
    assert_eq!(report.record_count, 3);
    assert_eq!(report.duplicate_key_count, 0);
    Ok(())
}

#[test]
fn duplicates_count_rows_after_the_first() -> Result<()> {
    let t = table(vec![
        json!({"id": 1}),
        json!({"id": 1}),
        json!({"id": 1}),
        json!({"id": 2}),
        json!({"id": null}),
        json!({"id": null}),
    ]);
    let report = generate_report(&t, "id")?;
    assert_eq!(report.duplicate_key_count, 3);
    Ok(())
}

#[test]
fn integral_float_keys_count_as_duplicates() -> Result<()> {
    let t = table(vec![
        json!({"id": 1}),
        json!({"id": 1.0}),
        json!({"id": "1"}),
        json!({"id": 2.5}),
    ]);
    let report = generate_report(&t, "id")?;
    assert_eq!(report.duplicate_key_count, 1);
    Ok(())
}

#[test]
fn nulls_types_and_ratios_per_column() -> Result<()> {
    let t = table(vec![
        json!({"id": 1, "score": 1.5, "tag": "a", "flag": true}),
        json!({"id": 2, "score": 2, "flag": false}),
        json!({"id": 3, "score": null, "tag": "c", "flag": true, "extra": [1]}),
        json!({"id": 4, "score": 4.0, "tag": 5, "flag": null}),
    ]);
    let report = generate_report(&t, "id")?;

    assert_eq!(report.column_types["id"], "integer");
    assert_eq!(report.column_types["score"], "float");
    assert_eq!(report.column_types["tag"], "mixed");
    assert_eq!(report.column_types["flag"], "boolean");
    assert_eq!(report.column_types["extra"], "json");

    assert_eq!(report.column_nulls["id"], 0);
    assert_eq!(report.column_nulls["score"], 1);
    assert_eq!(report.column_nulls["tag"], 1);
    assert_eq!(report.column_nulls["extra"], 3);
    assert!((report.column_null_ratios["extra"] - 0.75).abs() < 1e-12);
    assert!(report.column_null_ratios["id"].abs() < 1e-12);

    // No derived columns, no summaries.
    assert!(report.title_length_summary.is_none());
    assert!(report.body_word_count_summary.is_none());
    Ok(())
}

#[test]
fn summary_matches_dataframe_describe() -> Result<()> {
    let t = table(vec![
        json!({"id": 1, "title_length": 1}),
        json!({"id": 2, "title_length": 2}),
        json!({"id": 3, "title_length": 3}),
        json!({"id": 4, "title_length": 4}),
    ]);
    let s = generate_report(&t, "id")?
        .title_length_summary
        .expect("summary");

    assert_eq!(s.count, 4);
    assert!(close(s.mean, 2.5));
    assert!(close(s.std, (5.0f64 / 3.0).sqrt()));
    assert!(close(s.p25, 1.75));
    assert!(close(s.p50, 2.5));
    assert!(close(s.p75, 3.25));
    Ok(())
}

#[test]
fn empty_table_report() -> Result<()> {
    let report = generate_report(&Table::default(), "id")?;
    assert_eq!(report.record_count, 0);
    assert_eq!(report.duplicate_key_count, 0);
    assert!(report.column_nulls.is_empty());
    Ok(())
}

#[test]
fn missing_key_column_is_an_error() {
    let t = table(vec![json!({"title": "x"})]);
    let err = generate_report(&t, "id").unwrap_err();
    assert!(err.to_string().contains("id"));
}

// ============================================================================
// save_report
// ============================================================================

#[test]
fn saved_report_is_indented_json_with_describe_keys() -> Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path("nested/out/data_quality_report.json");
    let validated = Transformer::default().transform(&sample_posts());
    let report = generate_report(&validated, "id")?;

    save_report(&report, &path)?;

    let text = std::fs::read_to_string(&path)?;
    assert!(text.contains("\n  \"record_count\": 3"));
    assert!(text.contains("\"25%\""));
    assert!(text.contains("\"50%\""));
    assert!(text.contains("\"75%\""));

    let back: QualityReport = read_json_output(&path)?;
    assert_eq!(back, report);
    Ok(())
}

#[test]
fn saving_overwrites_previous_report() -> Result<()> {
    let dir = TempDirPath::new()?;
    let path = dir.file_path(REPORT_FILENAME);
    std::fs::write(&path, "{\"stale\": true, \"padding\": \"......................................\"}")?;

    let report = generate_report(&Table::default(), "id")?;
    save_report(&report, &path)?;

    let back: Value = read_json_output(&path)?;
    assert!(back.get("stale").is_none());
    assert_eq!(back["record_count"], json!(0));
    Ok(())
}

#[test]
fn unwritable_report_path_fails() -> Result<()> {
    let dir = TempDirPath::new()?;
    // A regular file where a directory is expected.
    let blocker = dir.file_path("blocker");
    std::fs::write(&blocker, "x")?;

    let err = save_report(&QualityReport::default(), blocker.join("report.json")).unwrap_err();
    assert!(format!("{err:#}").contains("blocker"));
    Ok(())
}
