use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::path_safety::validate_name;
use crate::sizing::mb_to_bytes;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Generate,
    Update,
    Backup,
}

/// One named data set: `target_size_mb` is the size to create (generate) or the size to
/// add (update). `seed` is the first file index to use.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DataSetRequest {
    pub name: String,
    pub target_size_mb: u64,
    pub seed: u64,
}

impl DataSetRequest {
    pub fn new(name: impl Into<String>, target_size_mb: u64) -> Self {
        Self { name: name.into(), target_size_mb, seed: 0 }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MasterDataSetSpec {
    pub mode: Mode,
    pub input_folder: PathBuf,
    pub file_size_mb: u64,
    pub data_sets: Vec<DataSetRequest>,
    pub backup_folder: Option<PathBuf>,
    #[serde(default)]
    pub preserve_attributes: bool,
}

impl MasterDataSetSpec {
    pub fn generate(input_folder: impl Into<PathBuf>, file_size_mb: u64, data_sets: Vec<DataSetRequest>) -> Self {
        Self {
            mode: Mode::Generate,
            input_folder: input_folder.into(),
            file_size_mb,
            data_sets,
            backup_folder: None,
            preserve_attributes: false,
        }
    }

    pub fn update(input_folder: impl Into<PathBuf>, data_sets: Vec<DataSetRequest>) -> Self {
        Self {
            mode: Mode::Update,
            input_folder: input_folder.into(),
            file_size_mb: 0,
            data_sets,
            backup_folder: None,
            preserve_attributes: false,
        }
    }

    pub fn backup(input_folder: impl Into<PathBuf>, backup_folder: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::Backup,
            input_folder: input_folder.into(),
            file_size_mb: 0,
            data_sets: Vec::new(),
            backup_folder: Some(backup_folder.into()),
            preserve_attributes: false,
        }
    }

    /// Checks the cross-field rules that the CLI cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        mb_to_bytes(self.file_size_mb)?;
        let mut seen = HashSet::new();
        for ds in &self.data_sets {
            validate_name(&ds.name)?;
            mb_to_bytes(ds.target_size_mb)?;
            if !seen.insert(ds.name.as_str()) {
                bail!("data set {:?} is listed more than once", ds.name);
            }
        }
        match self.mode {
            Mode::Generate => {
                if self.file_size_mb == 0 && self.data_sets.iter().any(|d| d.target_size_mb > 0) {
                    bail!("file_size must be greater than 0 to generate non-empty data sets");
                }
            }
            Mode::Update => {}
            Mode::Backup => {
                if self.backup_folder.is_none() {
                    bail!("a backup folder is mandatory in backup mode");
                }
            }
        }
        Ok(())
    }
}

/// Parses the flat `name1,size1,name2,size2,...` list.
pub fn parse_data_sets(s: &str) -> Result<Vec<DataSetRequest>> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() % 2 != 0 {
        bail!("unmatched data set structure {:?}, expected <name1>,<size1>,<name2>,<size2>", s);
    }
    let mut out = Vec::with_capacity(parts.len() / 2);
    let mut seen = HashSet::new();
    for pair in parts.chunks(2) {
        let name = pair[0];
        validate_name(name)?;
        if !seen.insert(name) {
            bail!("data set {:?} is listed more than once", name);
        }
        out.push(DataSetRequest::new(name, parse_mb(pair[1])?));
    }
    Ok(out)
}

pub fn parse_mb(s: &str) -> Result<u64> {
    let mb = s.trim().parse::<u64>().map_err(|_| anyhow!("{:?} is not a non-negative number", s))?;
    mb_to_bytes(mb)?;
    Ok(mb)
}

/// Path of the backup copy of `input` under `backup_folder`: the input path with any root or
/// prefix stripped, so absolute inputs nest under the backup folder too.
pub fn backup_destination(backup_folder: &Path, input: &Path) -> Result<PathBuf> {
    let rel: PathBuf = input
        .components()
        .filter(|c| matches!(c, std::path::Component::Normal(_)))
        .collect();
    if rel.as_os_str().is_empty() {
        bail!("cannot derive a backup name from {:?}", input);
    }
    Ok(backup_folder.join(rel))
}
