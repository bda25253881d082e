use anyhow::Result;
use postflow::io::parquet::*;
use postflow::table::{Record, Table};
use postflow::testing::*;
use postflow::Transformer;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, PartialEq, Deserialize)]
struct Post {
    #[serde(rename = "userId")]
    user_id: i64,
    id: i64,
    title: String,
    body: String,
    title_length: i64,
    body_word_count: i64,
}

#[derive(Debug, PartialEq, Deserialize)]
struct Loose {
    id: i64,
    score: Option<f64>,
    note: Option<String>,
    tags: Option<String>,
    flag: Option<bool>,
}

#[test]
fn validated_table_roundtrip_typed() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("posts.parquet");
    let table = Transformer::default().transform(&sample_posts());

    let n = write_table_parquet(&path, &table, ParquetCompression::default())?;
    assert_eq!(n, 3);

    let back: Vec<Post> = read_parquet_vec(&path)?;
    assert_eq!(back.len(), 3);
    assert_eq!(
        back[0],
        Post {
            user_id: 1,
            id: 1,
            title: "Sunt aut facere".into(),
            body: "quia et suscipit suscipit recusandae".into(),
            title_length: 15,
            body_word_count: 5,
        }
    );
    assert_eq!(back.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 7]);
    Ok(())
}

#[test]
fn nulls_and_nested_values_survive() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let path = tmp.file_path("nested/dir/loose.parquet");
    let records: Vec<Record> = vec![
        record(json!({"id": 1, "score": 1, "note": "x", "tags": ["a", "b"], "flag": true})),
        record(json!({"id": 2, "score": 2.5, "note": null, "tags": null})),
    ];
    let table = Table::from_records(&records);

    write_table_parquet(&path, &table, ParquetCompression::Zstd)?;
    let back: Vec<Loose> = read_parquet_vec(&path)?;

    assert_eq!(
        back,
        vec![
            Loose {
                id: 1,
                score: Some(1.0),
                note: Some("x".into()),
                tags: Some("[\"a\",\"b\"]".into()),
                flag: Some(true),
            },
            Loose {
                id: 2,
                score: Some(2.5),
                note: None,
                tags: None,
                flag: None,
            },
        ]
    );
    Ok(())
}

#[test]
fn every_codec_writes_readable_files() -> Result<()> {
    let tmp = TempDirPath::new()?;
    let table = Transformer::default().transform(&sample_posts());

    for codec in ["none", "snappy", "gzip", "zstd"] {
        let compression: ParquetCompression = codec.parse().map_err(anyhow::Error::msg)?;
        assert_eq!(compression.to_string(), codec);
        let path = tmp.file_path(&format!("{codec}.parquet"));
        write_table_parquet(&path, &table, compression)?;
        let back: Vec<Post> = read_parquet_vec(&path)?;
        assert_eq!(back.len(), 3);
    }
    assert!("lz4".parse::<ParquetCompression>().is_err());
    Ok(())
}

#[test]
fn record_batch_keeps_column_order_and_row_count() -> Result<()> {
    let table = Transformer::default().transform(&sample_posts());
    let batch = table_to_record_batch(&table)?;

    assert_eq!(batch.num_rows(), 3);
    let names: Vec<String> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, table.columns());
    Ok(())
}
