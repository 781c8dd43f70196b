//! Growth of an existing data set.
//!
//! A data set made by `generate` has files of one common unit size, except possibly one
//! smaller remainder file. Growing it first tops up the smallest file towards the unit size
//! (never past the requested growth), then asks for the rest as new files numbered after the
//! existing ones. Nothing is ever truncated or removed.

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::PathBuf;

use crate::sizing::{mb_to_bytes, BYTES_PER_MB};
use crate::spec::DataSetRequest;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub path: PathBuf,
    pub size: u64,
}

/// Outcome of looking for the smallest and the reference file of a data set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceLookup {
    /// `reference_size` is the unit size of the data set. When every file has the same size
    /// it equals the smallest size.
    Found { smallest: FileStat, reference_size: u64 },
    EmptyDataSet,
    /// A single file: there is no unit size to infer.
    NoReferenceFile,
}

/// Picks the smallest file and the reference file. Ties are broken by path so the result
/// does not depend on the order `files` was gathered in.
pub fn locate(files: &[FileStat]) -> ReferenceLookup {
    let Some(smallest) = files.iter().min_by(|a, b| a.size.cmp(&b.size).then_with(|| a.path.cmp(&b.path)))
    else {
        return ReferenceLookup::EmptyDataSet;
    };
    if files.len() == 1 {
        return ReferenceLookup::NoReferenceFile;
    }
    let reference_size = files
        .iter()
        .filter(|f| f.size > smallest.size)
        .min_by(|a, b| a.path.cmp(&b.path))
        .map(|f| f.size)
        .unwrap_or(smallest.size);
    ReferenceLookup::Found { smallest: smallest.clone(), reference_size }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthInput {
    pub file_count: u64,
    pub smallest_size: u64,
    pub reference_size: u64,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GrowthPlan {
    pub grow_bytes: u64,
    /// Bytes to append to the smallest file.
    pub append_bytes: u64,
    /// Bytes left for new files.
    pub remaining_bytes: u64,
    pub unit_mb: u64,
    /// New files to generate, numbered from the current file count.
    pub continuation: Option<DataSetRequest>,
}

pub fn plan_growth(name: &str, input: GrowthInput, grow_mb: u64) -> Result<GrowthPlan> {
    let grow_bytes = mb_to_bytes(grow_mb)?;
    let gap_bytes = input.reference_size.saturating_sub(input.smallest_size);
    let (append_bytes, remaining_bytes) =
        if gap_bytes >= grow_bytes { (grow_bytes, 0) } else { (gap_bytes, grow_bytes - gap_bytes) };

    assert_eq!(
        append_bytes + remaining_bytes,
        grow_bytes,
        "growth accounting mismatch for data set {}",
        name
    );

    let unit_mb = input.reference_size / BYTES_PER_MB;
    let remaining_mb = remaining_bytes / BYTES_PER_MB;
    let continuation = if remaining_mb > 0 {
        if unit_mb == 0 {
            bail!(
                "data set {} has a unit size below 1MB ({} bytes), cannot add {}MB of new files",
                name,
                input.reference_size,
                remaining_mb
            );
        }
        Some(DataSetRequest::new(name, remaining_mb).with_seed(input.file_count))
    } else {
        None
    };

    Ok(GrowthPlan { grow_bytes, append_bytes, remaining_bytes, unit_mb, continuation })
}
