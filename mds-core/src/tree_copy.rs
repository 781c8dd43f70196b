use anyhow::{Context, Result};
use filetime::FileTime;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::report::Reporter;

#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub dirs: u64,
    pub files: u64,
    /// Destination files left untouched because they already existed.
    pub skipped: u64,
    pub errors: u64,
}

/// Recursively copies `source` into `dest`, following symlinks. Existing destination
/// directories are reused and existing destination files are kept. Failures on single
/// entries are reported and counted, not returned; only an unreadable `source` fails.
pub fn copy_tree(
    source: &Path,
    dest: &Path,
    preserve_attributes: bool,
    reporter: &dyn Reporter,
) -> Result<CopyStats> {
    fs::metadata(source).with_context(|| format!("unable to copy {:?} to {:?}", source, dest))?;
    let mut stats = CopyStats::default();
    // (source dir, dest dir) pairs, fixed up once their contents are in place
    let mut dir_times: Vec<(PathBuf, PathBuf)> = Vec::new();

    let mut it = WalkDir::new(source).follow_links(true).into_iter();
    while let Some(ent) = it.next() {
        let ent = match ent {
            Ok(e) => e,
            Err(e) => {
                stats.errors += 1;
                match e.loop_ancestor() {
                    Some(anc) => reporter.warn(&format!(
                        "cycle detected: {:?} links back to {:?}",
                        e.path().unwrap_or(source),
                        anc
                    )),
                    None => reporter.error(&format!("unable to copy: {}", e)),
                }
                continue;
            }
        };
        let rel = pathdiff::diff_paths(ent.path(), source).unwrap_or_default();
        let target = dest.join(&rel);

        if ent.file_type().is_dir() {
            match fs::create_dir(&target) {
                Ok(()) => stats.dirs += 1,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    reporter.error(&format!("unable to create: {:?}: {}", target, e));
                    stats.errors += 1;
                    it.skip_current_dir();
                    continue;
                }
            }
            if preserve_attributes {
                dir_times.push((ent.path().to_path_buf(), target));
            }
            continue;
        }

        if target.exists() {
            stats.skipped += 1;
            continue;
        }
        match copy_file(ent.path(), &target, preserve_attributes) {
            Ok(()) => stats.files += 1,
            Err(e) => {
                reporter.error(&format!("{:#}", e));
                stats.errors += 1;
            }
        }
    }

    // deepest first so setting a child's attributes cannot disturb its parent afterwards
    for (src, dst) in dir_times.iter().rev() {
        if let Err(e) = copy_attributes(src, dst) {
            reporter.warn(&format!("unable to copy all attributes to: {:?}: {:#}", dst, e));
        }
    }
    Ok(stats)
}

fn copy_file(src: &Path, dst: &Path, preserve_attributes: bool) -> Result<()> {
    fs::copy(src, dst).with_context(|| format!("unable to copy: {:?} to {:?}", src, dst))?;
    if preserve_attributes {
        copy_attributes(src, dst)?;
    }
    Ok(())
}

fn copy_attributes(src: &Path, dst: &Path) -> Result<()> {
    let md = fs::metadata(src).with_context(|| format!("stat {:?}", src))?;
    fs::set_permissions(dst, md.permissions()).with_context(|| format!("chmod {:?}", dst))?;
    let atime = FileTime::from_last_access_time(&md);
    let mtime = FileTime::from_last_modification_time(&md);
    filetime::set_file_times(dst, atime, mtime).with_context(|| format!("set times {:?}", dst))?;
    Ok(())
}
