use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::growth::FileStat;

pub fn create_dir_if_absent(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| format!("cannot create directory {:?}", path))?;
    }
    Ok(())
}

pub fn size_of(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path).with_context(|| format!("cannot determine file size of {:?}", path))?.len())
}

/// Regular files anywhere below `dir`.
pub fn count_files(dir: &Path) -> Result<u64> {
    let mut n = 0u64;
    for ent in WalkDir::new(dir).min_depth(1) {
        let ent = ent.with_context(|| format!("cannot count files in directory {:?}", dir))?;
        if !ent.file_type().is_dir() {
            n += 1;
        }
    }
    Ok(n)
}

/// Files directly inside a data set folder with their sizes, sorted by path.
pub fn scan_data_set(dir: &Path) -> Result<Vec<FileStat>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for ent in fs::read_dir(dir).with_context(|| format!("cannot list data set {:?}", dir))? {
        let ent = ent.with_context(|| format!("cannot list data set {:?}", dir))?;
        let ft = ent.file_type().with_context(|| format!("stat {:?} in data set {:?}", ent.path(), dir))?;
        if ft.is_file() {
            paths.push(ent.path());
        }
    }
    let mut stats = paths
        .into_par_iter()
        .map(|path| -> Result<FileStat> {
            let size = size_of(&path)?;
            Ok(FileStat { path, size })
        })
        .collect::<Result<Vec<_>>>()?;
    stats.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(stats)
}

/// Removes `path` and everything below it. Returns the number of entries removed;
/// a missing path removes nothing.
pub fn deep_delete(path: &Path) -> Result<u64> {
    if fs::symlink_metadata(path).is_err() {
        return Ok(0);
    }
    let mut removed = 0u64;
    for ent in WalkDir::new(path).contents_first(true) {
        let ent = ent.with_context(|| format!("walk {:?}", path))?;
        let p = ent.path();
        if ent.file_type().is_dir() {
            fs::remove_dir(p).with_context(|| format!("remove dir {:?}", p))?;
        } else {
            fs::remove_file(p).with_context(|| format!("remove {:?}", p))?;
        }
        tracing::debug!("deleted {:?}", p);
        removed += 1;
    }
    Ok(removed)
}
