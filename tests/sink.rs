//! Tests for the Parquet sink: single-file, partitioned, and uploads.

use anyhow::Result;
use postflow::io::cloud::*;
use postflow::sink::*;
use postflow::table::{Record, Table};
use postflow::testing::*;
use postflow::Transformer;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

#[derive(Debug, PartialEq, Deserialize)]
struct Leaf {
    id: i64,
    title: String,
}

fn validated() -> Table {
    Transformer::default().transform(&sample_posts())
}

fn config(dir: &Path) -> SinkConfig {
    SinkConfig {
        output_dir: dir.to_path_buf(),
        ..SinkConfig::default()
    }
}

// ============================================================================
// Local output
// ============================================================================

#[test]
fn single_file_lands_in_output_dir() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let sink = ParquetSink::new(config(tmp.path()));

    let out = sink.save(&validated())?;

    assert_eq!(out.location, tmp.file_path(DEFAULT_FILENAME));
    assert!(out.uploaded.is_empty());
    assert_eq!(list_files(tmp.path())?, vec!["posts.parquet"]);
    let rows: Vec<Leaf> = read_parquet_output(&out.location)?;
    assert_eq!(rows.len(), 3);
    Ok(())
}

#[test]
fn partitioned_output_has_one_leaf_per_value() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let sink = ParquetSink::new(SinkConfig {
        partition_cols: vec!["userId".into()],
        ..config(tmp.path())
    });

    let out = sink.save(&validated())?;

    assert_eq!(out.location, tmp.file_path(PARTITIONED_DIR));
    assert_eq!(
        list_files(tmp.path())?,
        vec![
            "partitioned/userId=1/part-00000.parquet",
            "partitioned/userId=3/part-00000.parquet",
        ]
    );

    let user1: Vec<Leaf> = read_parquet_output(tmp.file_path("partitioned/userId=1/part-00000.parquet"))?;
    assert_eq!(user1.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2]);
    Ok(())
}

#[test]
fn partitioned_output_replaces_previous_tree() -> Result<()> {
    let tmp = TempDirPath::new()?;
    std::fs::create_dir_all(tmp.file_path("partitioned/userId=99"))?;
    std::fs::write(tmp.file_path("partitioned/userId=99/part-00000.parquet"), "stale")?;

    let sink = ParquetSink::new(SinkConfig {
        partition_cols: vec!["userId".into()],
        ..config(tmp.path())
    });
    sink.save(&validated())?;

    assert!(!tmp.file_path("partitioned/userId=99").exists());
    Ok(())
}

#[test]
fn unknown_partition_column_fails() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let sink = ParquetSink::new(SinkConfig {
        partition_cols: vec!["region".into()],
        ..config(tmp.path())
    });

    let err = sink.save(&validated()).unwrap_err();
    assert!(format!("{err:#}").contains("region"));
    Ok(())
}

fn tagged(tags: Vec<serde_json::Value>) -> Table {
    let records: Vec<Record> = tags
        .into_iter()
        .enumerate()
        .map(|(i, tag)| record(json!({"id": i, "title": "t", "tag": tag})))
        .collect();
    Table::from_records(&records)
}

fn by_tag(dir: &Path) -> ParquetSink {
    ParquetSink::new(SinkConfig {
        partition_cols: vec!["tag".into()],
        ..config(dir)
    })
}

#[test]
fn number_and_string_with_same_text_are_rejected() -> Result<()> {
    let tmp = TempDirPath::new()?;
    std::fs::create_dir_all(tmp.file_path("partitioned/tag=old"))?;
    std::fs::write(tmp.file_path("partitioned/tag=old/part-00000.parquet"), "keep")?;

    let err = by_tag(tmp.path())
        .save(&tagged(vec![json!(1), json!("1")]))
        .unwrap_err();

    assert!(format!("{err:#}").contains("tag=1"), "{err:#}");
    // Nothing was removed or half-written.
    assert_eq!(list_files(tmp.path())?, vec!["partitioned/tag=old/part-00000.parquet"]);
    Ok(())
}

#[test]
fn integral_float_joins_the_integer_partition() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let out = by_tag(tmp.path()).save(&tagged(vec![json!(1), json!(1.0), json!(2)]))?;

    assert_eq!(out.files.len(), 2);
    let ones: Vec<Leaf> = read_parquet_output(tmp.file_path("partitioned/tag=1/part-00000.parquet"))?;
    assert_eq!(ones.iter().map(|l| l.id).collect::<Vec<_>>(), vec![0, 1]);
    Ok(())
}

#[test]
fn null_and_marker_text_get_separate_partitions() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let out = by_tag(tmp.path()).save(&tagged(vec![
        serde_json::Value::Null,
        json!("__HIVE_DEFAULT_PARTITION__"),
    ]))?;

    assert_eq!(out.files.len(), 2);
    assert_eq!(
        list_files(tmp.path())?,
        vec![
            "partitioned/tag=%5F_HIVE_DEFAULT_PARTITION__/part-00000.parquet",
            "partitioned/tag=__HIVE_DEFAULT_PARTITION__/part-00000.parquet",
        ]
    );
    Ok(())
}

#[test]
fn unwritable_output_dir_fails() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let blocker = tmp.file_path("blocker");
    std::fs::write(&blocker, "x")?;

    let sink = ParquetSink::new(config(&blocker.join("out")));
    assert!(sink.save(&validated()).is_err());
    Ok(())
}

// ============================================================================
// Uploads
// ============================================================================

fn uploading(dir: &Path, store: &FakeObjectIO, partition_cols: Vec<String>) -> ParquetSink {
    ParquetSink::new(SinkConfig {
        partition_cols,
        use_object_store: true,
        bucket: Some("etl-bucket".into()),
        prefix: "/exports/posts/".into(),
        ..config(dir)
    })
    .with_object_store(Box::new(store.clone()))
}

#[test]
fn single_file_is_uploaded_under_prefix() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let store = FakeObjectIO::new();
    let sink = uploading(tmp.path(), &store, Vec::new());

    let out = sink.save(&validated())?;

    assert_eq!(out.uploaded, vec!["exports/posts/posts.parquet"]);
    assert_eq!(store.keys("etl-bucket"), out.uploaded);
    let local = std::fs::read(&out.location)?;
    assert_eq!(store.get_object("etl-bucket", "exports/posts/posts.parquet")?, local);
    Ok(())
}

#[test]
fn partition_tree_is_uploaded_with_relative_paths() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let store = FakeObjectIO::new();
    let sink = uploading(tmp.path(), &store, vec!["userId".into()]);

    sink.save(&validated())?;

    assert_eq!(
        store.keys("etl-bucket"),
        vec![
            "exports/posts/userId=1/part-00000.parquet",
            "exports/posts/userId=3/part-00000.parquet",
        ]
    );
    Ok(())
}

#[test]
fn rejected_upload_propagates() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let store = FakeObjectIO::failing(ErrorKind::Authorization);
    let sink = uploading(tmp.path(), &store, Vec::new());

    let err = sink.save(&validated()).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("s3://etl-bucket/exports/posts/posts.parquet"), "{msg}");
    assert!(msg.contains("Authorization"), "{msg}");
    // The local file was still written first.
    assert!(tmp.file_path(DEFAULT_FILENAME).exists());
    Ok(())
}

#[test]
fn upload_without_store_or_bucket_fails() -> Result<()> {
    let tmp = TempDirPath::new()?;

    let no_store = ParquetSink::new(SinkConfig {
        use_object_store: true,
        bucket: Some("etl-bucket".into()),
        ..config(tmp.path())
    });
    assert!(no_store.save(&validated()).is_err());

    let no_bucket = ParquetSink::new(SinkConfig {
        use_object_store: true,
        ..config(tmp.path())
    })
    .with_object_store(Box::new(FakeObjectIO::new()));
    assert!(no_bucket.save(&validated()).is_err());
    Ok(())
}

#[test]
fn store_is_ignored_when_uploads_are_off() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let store = FakeObjectIO::new();
    let sink = ParquetSink::new(config(tmp.path())).with_object_store(Box::new(store.clone()));

    sink.save(&validated())?;
    assert!(store.keys("etl-bucket").is_empty());
    Ok(())
}
