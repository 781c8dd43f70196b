use anyhow::{bail, ensure, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::content::{write_file, WriteMode};
use crate::fsops::{count_files, create_dir_if_absent, deep_delete, scan_data_set};
use crate::growth::{locate, plan_growth, GrowthInput, ReferenceLookup};
use crate::path_safety::data_set_path;
use crate::plan::{file_name, plan, planned_bytes, FilePlan};
use crate::report::{DataSetOutcome, Reporter, RunSummary};
use crate::spec::{backup_destination, DataSetRequest, MasterDataSetSpec, Mode};
use crate::tree_copy::copy_tree;

/// Drives one mode end to end. Each data set is processed on its own: a failure is
/// reported, recorded in the summary and the next data set goes ahead.
pub struct Runner<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> Runner<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    pub fn run(&self, spec: &MasterDataSetSpec) -> Result<RunSummary> {
        spec.validate()?;
        let t0 = Instant::now();
        let mut summary = RunSummary::new(spec.mode);
        match spec.mode {
            Mode::Generate => self.generate(spec, &mut summary)?,
            Mode::Update => self.update(spec, &mut summary)?,
            Mode::Backup => self.backup(spec, &mut summary)?,
        }
        summary.elapsed_ms = t0.elapsed().as_millis() as u64;
        self.reporter.info(&format!("Total execution time in millis: {}", summary.elapsed_ms));
        Ok(summary)
    }

    fn generate(&self, spec: &MasterDataSetSpec, summary: &mut RunSummary) -> Result<()> {
        create_dir_if_absent(&spec.input_folder)?;
        for req in &spec.data_sets {
            self.reporter.info(&format!(
                "Creating data set {} of size {}MB",
                req.name, req.target_size_mb
            ));
            let outcome = self
                .generate_data_set(&spec.input_folder, spec.file_size_mb, req)
                .unwrap_or_else(|e| self.failed(&spec.input_folder, &req.name, e));
            summary.data_sets.push(outcome);
        }
        Ok(())
    }

    /// Creates the files planned for `req` inside its folder, which is created if needed.
    pub fn generate_data_set(
        &self,
        input_folder: &Path,
        unit_mb: u64,
        req: &DataSetRequest,
    ) -> Result<DataSetOutcome> {
        let folder = data_set_path(input_folder, &req.name)?;
        let files = plan(req, unit_mb)?;
        create_dir_if_absent(&folder)?;
        let mut outcome = DataSetOutcome::new(&req.name, folder.clone());
        outcome.files_created = write_planned(&folder, &files, WriteMode::Create)?;
        outcome.bytes_planned = planned_bytes(&files);
        Ok(outcome)
    }

    fn update(&self, spec: &MasterDataSetSpec, summary: &mut RunSummary) -> Result<()> {
        ensure!(
            spec.input_folder.is_dir(),
            "an existing input folder is mandatory in update mode: {:?}",
            spec.input_folder
        );
        for req in &spec.data_sets {
            let folder = data_set_path(&spec.input_folder, &req.name)?;
            if !folder.is_dir() {
                let msg = format!("Unknown data set folder {}", folder.display());
                self.reporter.warn(&msg);
                summary.data_sets.push(DataSetOutcome::skipped(&req.name, folder, msg));
                continue;
            }
            self.reporter.info(&format!(
                "Expanding data set {} of size {}MB",
                req.name, req.target_size_mb
            ));
            let outcome = self
                .grow_data_set(&folder, req)
                .unwrap_or_else(|e| self.failed(&spec.input_folder, &req.name, e));
            summary.data_sets.push(outcome);
        }
        Ok(())
    }

    /// Grows an existing data set by `req.target_size_mb`.
    pub fn grow_data_set(&self, folder: &Path, req: &DataSetRequest) -> Result<DataSetOutcome> {
        let mut outcome = DataSetOutcome::new(&req.name, folder.to_path_buf());
        if req.target_size_mb == 0 {
            return Ok(outcome);
        }
        let file_count = count_files(folder)?;
        let files = scan_data_set(folder)?;
        let (smallest, reference_size) = match locate(&files) {
            ReferenceLookup::Found { smallest, reference_size } => (smallest, reference_size),
            ReferenceLookup::EmptyDataSet => {
                bail!("data set {} is empty, there is no file to grow", req.name)
            }
            ReferenceLookup::NoReferenceFile => bail!(
                "data set {} has a single file, no reference file to infer the unit size from",
                req.name
            ),
        };
        let input = GrowthInput { file_count, smallest_size: smallest.size, reference_size };
        let gp = plan_growth(&req.name, input, req.target_size_mb)?;
        tracing::debug!(?gp, "growth plan for {}", req.name);

        let new_files = match &gp.continuation {
            Some(next) => plan(next, gp.unit_mb)?,
            None => Vec::new(),
        };
        // numbering follows the file count, so a gap in existing names can collide
        if let Some(taken) = new_files
            .iter()
            .map(|fp| folder.join(file_name(fp.index)))
            .find(|p| fs::symlink_metadata(p).is_ok())
        {
            bail!(
                "data set {} cannot grow: new file {:?} already exists (file numbers have gaps)",
                req.name,
                taken
            );
        }

        if gp.append_bytes > 0 {
            outcome.bytes_appended = write_file(&smallest.path, gp.append_bytes, WriteMode::Append)?;
            outcome.appended_file = Some(smallest.path);
        }
        outcome.files_created = write_planned(folder, &new_files, WriteMode::CreateNew)?;
        outcome.bytes_planned = gp.append_bytes + planned_bytes(&new_files);
        Ok(outcome)
    }

    fn backup(&self, spec: &MasterDataSetSpec, summary: &mut RunSummary) -> Result<()> {
        let input = &spec.input_folder;
        ensure!(input.is_dir(), "an existing input folder is mandatory in backup mode: {:?}", input);
        let Some(backup_folder) = spec.backup_folder.as_deref() else {
            bail!("a backup folder is mandatory in backup mode");
        };
        let dest = backup_destination(backup_folder, input)?;
        let input_abs = resolve(input)?;
        let dest_abs = resolve(&dest)?;
        ensure!(
            !dest_abs.starts_with(&input_abs) && !input_abs.starts_with(&dest_abs),
            "backup destination {:?} overlaps input folder {:?}",
            dest,
            input
        );
        create_dir_if_absent(backup_folder)?;

        if fs::symlink_metadata(&dest).is_ok() {
            let rotated = rotated_path(&dest, chrono::Utc::now().timestamp_millis())?;
            self.reporter.info(&format!("Moving existing backup path to {}", rotated.display()));
            fs::rename(&dest, &rotated)
                .with_context(|| format!("cannot backup {:?} to {:?}", input, backup_folder))?;
            summary.rotated_backup = Some(rotated);
        }
        if let Some(parent) = dest.parent() {
            create_dir_if_absent(parent)?;
        }

        let stats = copy_tree(input, &dest, spec.preserve_attributes, self.reporter)?;
        self.reporter.info(&format!(
            "Backed up {} file(s) and {} folder(s) to {} ({} error(s))",
            stats.files,
            stats.dirs,
            dest.display(),
            stats.errors
        ));
        summary.backup_path = Some(dest);
        summary.copy_stats = Some(stats);
        Ok(())
    }

    /// Removes an input folder and everything in it.
    pub fn clean(&self, folder: &Path) -> Result<u64> {
        let removed = deep_delete(folder)?;
        self.reporter.info(&format!("Deleted {} entries under {}", removed, folder.display()));
        Ok(removed)
    }

    fn failed(&self, input_folder: &Path, name: &str, e: anyhow::Error) -> DataSetOutcome {
        let msg = format!("{:#}", e);
        self.reporter.error(&format!("data set {} failed: {}", name, msg));
        DataSetOutcome::failed(name, input_folder.join(name), msg)
    }
}

/// Writes every planned file into `folder`, returning how many were written.
fn write_planned(folder: &Path, files: &[FilePlan], mode: WriteMode) -> Result<u64> {
    for fp in files {
        write_file(&folder.join(file_name(fp.index)), fp.byte_limit, mode)?;
    }
    Ok(files.len() as u64)
}

/// Canonical form of `path`; a missing tail is resolved through its deepest existing
/// ancestor.
fn resolve(path: &Path) -> Result<PathBuf> {
    let mut tail = Vec::new();
    let mut cur = path;
    loop {
        if let Ok(base) = fs::canonicalize(if cur.as_os_str().is_empty() { Path::new(".") } else { cur }) {
            return Ok(tail.iter().rev().fold(base, |acc: PathBuf, c| acc.join(c)));
        }
        match (cur.file_name(), cur.parent()) {
            (Some(name), Some(parent)) => {
                tail.push(name.to_os_string());
                cur = parent;
            }
            _ => bail!("cannot resolve {:?}", path),
        }
    }
}

/// `dest` with `stamp` appended to its last component.
pub fn rotated_path(dest: &Path, stamp: i64) -> Result<PathBuf> {
    let Some(name) = dest.file_name() else {
        bail!("backup path {:?} has no final component", dest);
    };
    let mut rotated = name.to_os_string();
    rotated.push(stamp.to_string());
    Ok(dest.with_file_name(rotated))
}
