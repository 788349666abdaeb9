//! Inspect command implementation

use anyhow::{Context, Result};
use std::path::Path;

use docvalues::{DocValuesReader, ValueType, read::FieldEntry};
use docvalues_encodings::presence::Presence;

use crate::commands::read_segment_info;

/// Run the inspect command
pub fn run(verbose: u8, dir: String, segment: String) -> Result<()> {
    let dir = Path::new(&dir);
    let segment = read_segment_info(dir, &segment)?;
    let reader = DocValuesReader::open(dir, &segment)
        .with_context(|| format!("Failed to open segment {}", segment.name))?;
    println!(
        "Segment {} ({}): {} docs, {} fields, format version {}",
        segment.name,
        segment.id_string(),
        segment.max_doc,
        reader.fields().len(),
        reader.version()
    );

    for field in reader.fields() {
        println!("{}", describe_field(&reader, field)?);
        if verbose > 0 {
            print_values(&reader, field)?;
        }
    }
    Ok(())
}

fn describe_field(reader: &DocValuesReader, field: &FieldEntry) -> Result<String> {
    let presence = match field.presence() {
        Presence::NoDocs => "none",
        Presence::AllDocs => "all",
        Presence::Sparse { .. } => "sparse",
    };
    let mut line = format!(
        "field {:>4}  {:<14} docs={:<8} presence={}",
        field.id,
        format!("{:?}", field.value_type),
        docs(reader, field)?.len(),
        presence
    );
    if let Some(numeric) = field.numeric() {
        let encoding = numeric.values.encoding();
        line += &format!(
            " values={} scheme={} bpv={}",
            numeric.values.num_values,
            encoding.name(),
            encoding.bits_per_value()
        );
    }
    if let Some(terms) = field.terms() {
        line += &format!(" terms={}", terms.term_count);
    }
    if let Some(skip) = field.skip_index {
        line += &format!(
            " skip=[{}..={}, {} docs]",
            skip.min_value, skip.max_value, skip.doc_count
        );
    }
    Ok(line)
}

fn docs(reader: &DocValuesReader, field: &FieldEntry) -> Result<Vec<u32>> {
    let docs = match field.value_type {
        ValueType::Numeric => reader.numeric(field.id)?.docs()?,
        ValueType::Binary => reader.binary(field.id)?.docs()?,
        ValueType::Sorted => reader.sorted(field.id)?.docs()?,
        ValueType::SortedNumeric => reader.sorted_numeric(field.id)?.docs()?,
        ValueType::SortedSet => reader.sorted_set(field.id)?.docs()?,
    };
    Ok(docs)
}

fn text(bytes: &[u8]) -> String {
    format!("{:?}", String::from_utf8_lossy(bytes))
}

fn print_values(reader: &DocValuesReader, field: &FieldEntry) -> Result<()> {
    let id = field.id;
    match field.value_type {
        ValueType::Numeric => {
            let values = reader.numeric(id)?;
            for doc in values.docs()? {
                if let Some(value) = values.get(doc)? {
                    println!("    {doc}: {value}");
                }
            }
        }
        ValueType::Binary => {
            let values = reader.binary(id)?;
            for doc in values.docs()? {
                if let Some(value) = values.get(doc)? {
                    println!("    {doc}: {}", text(value));
                }
            }
        }
        ValueType::Sorted => {
            let values = reader.sorted(id)?;
            for doc in values.docs()? {
                if let (Some(ord), Some(term)) = (values.ord(doc)?, values.get(doc)?) {
                    println!("    {doc}: #{ord} {}", text(&term));
                }
            }
        }
        ValueType::SortedNumeric => {
            let values = reader.sorted_numeric(id)?;
            for doc in values.docs()? {
                println!("    {doc}: {:?}", values.values(doc)?);
            }
        }
        ValueType::SortedSet => {
            let values = reader.sorted_set(id)?;
            for doc in values.docs()? {
                let terms: Vec<String> = values.terms(doc)?.iter().map(|t| text(t)).collect();
                println!("    {doc}: [{}]", terms.join(", "));
            }
        }
    }
    Ok(())
}
