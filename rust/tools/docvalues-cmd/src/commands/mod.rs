//! Command implementations for docvalues-cmd

use anyhow::{Context, Result};
use docvalues::SegmentInfo;
use std::path::Path;

pub mod ingest;
pub mod inspect;

/// Extension of the segment descriptor written next to the doc values files.
pub const SEGMENT_INFO_EXTENSION: &str = "si.json";

pub fn segment_info_path(dir: &Path, name: &str) -> std::path::PathBuf {
    dir.join(format!("{name}.{SEGMENT_INFO_EXTENSION}"))
}

pub fn write_segment_info(dir: &Path, segment: &SegmentInfo) -> Result<()> {
    let path = segment_info_path(dir, &segment.name);
    let json = serde_json::to_string_pretty(segment)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write segment info {}", path.display()))
}

pub fn read_segment_info(dir: &Path, name: &str) -> Result<SegmentInfo> {
    let path = segment_info_path(dir, name);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read segment info {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse segment info {}", path.display()))
}
