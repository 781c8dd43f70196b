use anyhow::{bail, Result};

/// 1 MB as used throughout the tool (binary megabyte).
pub const BYTES_PER_MB: u64 = 1 << 20;

pub fn mb_to_bytes(mb: u64) -> Result<u64> {
    match mb.checked_mul(BYTES_PER_MB) {
        Some(b) => Ok(b),
        None => bail!("{}MB does not fit in a 64-bit byte count", mb),
    }
}

/// Number of files of at most `unit_mb` needed to hold `target_mb`.
pub fn files_count(target_mb: u64, unit_mb: u64) -> Result<u64> {
    if unit_mb == 0 {
        bail!("file size must be greater than 0MB to split {}MB into files", target_mb);
    }
    Ok(target_mb.div_ceil(unit_mb))
}

/// Byte limit of the last file of a data set: whatever is left of the target once the
/// first `files_count - 1` files took a full unit each.
pub fn last_file_size_bytes(target_mb: u64, unit_mb: u64, files_count: u64) -> Result<u64> {
    if files_count == 0 {
        return Ok(0);
    }
    mb_to_bytes(target_mb - (files_count - 1) * unit_mb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_file_is_smaller() {
        assert_eq!(files_count(10, 4).unwrap(), 3);
        assert_eq!(last_file_size_bytes(10, 4, 3).unwrap(), 2 * BYTES_PER_MB);
    }

    #[test]
    fn even_split_keeps_full_last_file() {
        assert_eq!(files_count(3, 1).unwrap(), 3);
        assert_eq!(last_file_size_bytes(3, 1, 3).unwrap(), BYTES_PER_MB);
    }

    #[test]
    fn zero_unit_is_rejected() {
        assert!(files_count(5, 0).is_err());
        assert_eq!(files_count(0, 7).unwrap(), 0);
        assert_eq!(last_file_size_bytes(0, 7, 0).unwrap(), 0);
    }

    #[test]
    fn oversized_megabytes_are_rejected() {
        assert!(mb_to_bytes(1 << 44).is_err());
        assert_eq!(mb_to_bytes((1 << 44) - 1).unwrap(), u64::MAX - BYTES_PER_MB + 1);
    }
}
