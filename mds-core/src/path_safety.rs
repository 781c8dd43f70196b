use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};

/// Ensure a data set name is exactly one plain path component: not empty, not absolute,
/// no `..`/`.` and no separators. Data set folders then always stay directly under the
/// input folder.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("data set name must not be empty");
    }
    if name.contains('/') || name.contains('\\') {
        bail!("data set name must not contain path separators: {:?}", name);
    }
    let p = Path::new(name);
    if p.is_absolute() {
        bail!("absolute paths are not allowed: {:?}", name);
    }
    let mut comps = p.components();
    match (comps.next(), comps.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        (Some(Component::ParentDir), _) => bail!("parent traversal not allowed: {:?}", name),
        _ => bail!("not a plain folder name: {:?}", name),
    }
}

/// Join a validated data set name onto the input folder.
pub fn data_set_path(input_folder: &Path, name: &str) -> Result<PathBuf> {
    validate_name(name)?;
    Ok(input_folder.join(name))
}
