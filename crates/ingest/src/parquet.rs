//! Columnar encoding of batch records.

use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, SchemaBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::batch::LiveStreamRecord;
use crate::Result;

/// Encodes records into a single Parquet buffer. Timestamps are written as
/// RFC 3339 strings. An empty slice still produces a valid zero-row file.
pub fn encode_records(records: &[LiveStreamRecord]) -> Result<Vec<u8>> {
    let mut schema = SchemaBuilder::new();
    schema.push(Field::new("content_id", DataType::Utf8, false));
    schema.push(Field::new("title", DataType::Utf8, false));
    schema.push(Field::new("channel_name", DataType::Utf8, false));
    schema.push(Field::new("canonical_url", DataType::Utf8, false));
    schema.push(Field::new("published_at", DataType::Utf8, false));
    schema.push(Field::new("view_count", DataType::UInt64, false));
    schema.push(Field::new("like_count", DataType::UInt64, false));
    schema.push(Field::new("comment_count", DataType::UInt64, false));
    schema.push(Field::new("fetched_at", DataType::Utf8, false));
    let schema = Arc::new(schema.finish());

    let content_ids: Vec<&str> = records.iter().map(|r| r.content_id.as_str()).collect();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    let channel_names: Vec<&str> = records.iter().map(|r| r.channel_name.as_str()).collect();
    let canonical_urls: Vec<&str> = records.iter().map(|r| r.canonical_url.as_str()).collect();
    let published_ats: Vec<String> = records.iter().map(|r| r.published_at.to_rfc3339()).collect();
    let view_counts: Vec<u64> = records.iter().map(|r| r.view_count).collect();
    let like_counts: Vec<u64> = records.iter().map(|r| r.like_count).collect();
    let comment_counts: Vec<u64> = records.iter().map(|r| r.comment_count).collect();
    let fetched_ats: Vec<String> = records.iter().map(|r| r.fetched_at.to_rfc3339()).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(content_ids)),
        Arc::new(StringArray::from(titles)),
        Arc::new(StringArray::from(channel_names)),
        Arc::new(StringArray::from(canonical_urls)),
        Arc::new(StringArray::from(published_ats)),
        Arc::new(UInt64Array::from(view_counts)),
        Arc::new(UInt64Array::from(like_counts)),
        Arc::new(UInt64Array::from(comment_counts)),
        Arc::new(StringArray::from(fetched_ats)),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(buffer)
}
