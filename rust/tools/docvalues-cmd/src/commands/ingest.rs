//! Ingest command implementation
//!
//! Input document:
//!
//! ```json
//! {
//!   "segment": "_0",
//!   "max_doc": 4,
//!   "fields": [
//!     { "id": 0, "type": "numeric", "skip_index": true, "values": [[0, 12], [3, -4]] },
//!     { "id": 1, "type": "sorted_set", "values": [[1, ["red", "blue"]]] }
//!   ]
//! }
//! ```
//!
//! Values are `[doc, value]` pairs. Numeric values are integers, binary and
//! sorted values are strings, sorted numeric and sorted set values are arrays
//! of integers and strings respectively.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use docvalues::{
    DocValuesConfig, DocValuesWriter, FieldInfo, FieldValues, SegmentInfo, ValueType,
    producer::{BinaryColumn, NumericColumn, SortedColumn, SortedNumericColumn, SortedSetColumn},
};

use crate::commands::write_segment_info;

#[derive(Deserialize)]
struct SegmentInput {
    segment: String,
    max_doc: u32,
    #[serde(default)]
    fields: Vec<FieldInput>,
}

#[derive(Deserialize)]
struct FieldInput {
    id: u32,
    #[serde(rename = "type")]
    value_type: ValueType,
    #[serde(default)]
    skip_index: bool,
    multi_valued: Option<bool>,
    #[serde(default)]
    values: Vec<(u32, Value)>,
}

impl FieldInput {
    fn info(&self) -> FieldInfo {
        let info = FieldInfo::new(self.id, self.value_type);
        let info = match self.multi_valued {
            Some(multi_valued) => info.with_multi_valued(multi_valued),
            None => info,
        };
        if self.skip_index {
            info.with_skip_index()
        } else {
            info
        }
    }

    /// Values in increasing doc order.
    fn sorted_values(&self) -> Vec<(u32, &Value)> {
        let mut values: Vec<_> = self.values.iter().map(|(doc, v)| (*doc, v)).collect();
        values.sort_by_key(|(doc, _)| *doc);
        values
    }
}

/// A field's values parsed into the matching in-memory column.
enum Column {
    Numeric(NumericColumn),
    Binary(BinaryColumn),
    Sorted(SortedColumn),
    SortedNumeric(SortedNumericColumn),
    SortedSet(SortedSetColumn),
}

impl Column {
    fn parse(field: &FieldInput) -> Result<Column> {
        let values = field.sorted_values();
        let column = match field.value_type {
            ValueType::Numeric => Column::Numeric(
                values
                    .iter()
                    .map(|&(doc, v)| Ok((doc, as_i64(v)?)))
                    .collect::<Result<_>>()?,
            ),
            ValueType::Binary => Column::Binary(
                values
                    .iter()
                    .map(|&(doc, v)| Ok((doc, as_str(v)?)))
                    .collect::<Result<_>>()?,
            ),
            ValueType::Sorted => {
                let terms = values
                    .iter()
                    .map(|&(doc, v)| Ok((doc, as_str(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Column::Sorted(SortedColumn::from_terms(&terms))
            }
            ValueType::SortedNumeric => Column::SortedNumeric(
                values
                    .iter()
                    .map(|&(doc, v)| {
                        let list = as_array(v)?
                            .iter()
                            .map(as_i64)
                            .collect::<Result<Vec<_>>>()?;
                        Ok((doc, list))
                    })
                    .collect::<Result<_>>()?,
            ),
            ValueType::SortedSet => {
                let terms = values
                    .iter()
                    .map(|&(doc, v)| {
                        let list = as_array(v)?
                            .iter()
                            .map(as_str)
                            .collect::<Result<Vec<_>>>()?;
                        Ok((doc, list))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Column::SortedSet(SortedSetColumn::from_terms(&terms))
            }
        };
        Ok(column)
    }

    fn values(&self) -> FieldValues<'_> {
        match self {
            Column::Numeric(c) => FieldValues::Numeric(c),
            Column::Binary(c) => FieldValues::Binary(c),
            Column::Sorted(c) => FieldValues::Sorted(c),
            Column::SortedNumeric(c) => FieldValues::SortedNumeric(c),
            Column::SortedSet(c) => FieldValues::SortedSet(c),
        }
    }
}

fn as_i64(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .with_context(|| format!("Expected an integer, found {value}"))
}

fn as_str(value: &Value) -> Result<&str> {
    value
        .as_str()
        .with_context(|| format!("Expected a string, found {value}"))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value
        .as_array()
        .with_context(|| format!("Expected an array, found {value}"))
}

fn load_config(path: Option<String>) -> Result<DocValuesConfig> {
    let Some(path) = path else {
        return Ok(DocValuesConfig::default());
    };
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {path}"))?;
    let config: DocValuesConfig =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse config {path}"))?;
    config.validate()?;
    Ok(config)
}

/// Run the ingest command
pub fn run(input_path: String, config_path: Option<String>, dir: String) -> Result<()> {
    let config = load_config(config_path)?;
    let json = std::fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read input file {input_path}"))?;
    let input: SegmentInput = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse input file {input_path}"))?;

    let dir = Path::new(&dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let segment = SegmentInfo::new(input.segment.as_str(), input.max_doc);
    println!(
        "Ingesting {} fields into segment {} ({})",
        input.fields.len(),
        segment.name,
        segment.id_string()
    );

    let columns = input
        .fields
        .iter()
        .map(|field| {
            Column::parse(field).with_context(|| format!("Invalid values of field {}", field.id))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut writer = DocValuesWriter::create(dir, segment.clone(), config)
        .context("Failed to create the segment files")?;
    for (field, column) in input.fields.iter().zip(&columns) {
        let summary = writer
            .add_field(&field.info(), column.values())
            .with_context(|| format!("Failed to write field {}", field.id))?;
        log::info!(
            "field {}: {} docs, {} values, {} data bytes",
            summary.field_id,
            summary.num_docs_with_value,
            summary.num_values,
            summary.data_bytes
        );
    }
    let summary = writer.finish().context("Failed to finish the segment")?;
    write_segment_info(dir, &segment)?;

    println!(
        "Wrote {} ({} bytes) and {} ({} bytes)",
        segment.data_file_name(),
        summary.data_length,
        segment.meta_file_name(),
        summary.meta_length
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_values() {
        let field: FieldInput = serde_json::from_str(
            r#"{ "id": 2, "type": "sorted_set", "values": [[5, ["b", "a"]], [1, ["c"]]] }"#,
        )
        .unwrap();
        assert!(!field.skip_index);
        assert!(field.info().multi_valued);
        let Column::SortedSet(column) = Column::parse(&field).unwrap() else {
            panic!("expected a sorted set column");
        };
        assert_eq!(column.docs(), [1, 5]);
        assert_eq!(column.ords(0), [2]);
        assert_eq!(column.ords(1), [0, 1]);

        let field: FieldInput =
            serde_json::from_str(r#"{ "id": 0, "type": "numeric", "values": [[0, "x"]] }"#)
                .unwrap();
        assert!(Column::parse(&field).is_err());
    }
}
