use anyhow::Result;
use serde::Serialize;

use crate::sizing::{files_count, last_file_size_bytes, mb_to_bytes};
use crate::spec::DataSetRequest;

/// One file to create: `file<index>.txt` filled up to `byte_limit` bytes.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilePlan {
    pub index: u64,
    pub byte_limit: u64,
}

/// Standard file name for a data set member.
pub fn file_name(index: u64) -> String {
    format!("file{}.txt", index)
}

/// Lays out the files of `req` with `unit_mb` per file, numbering from `req.seed`.
/// Every file but the last takes a full unit; the last one takes the remainder.
pub fn plan(req: &DataSetRequest, unit_mb: u64) -> Result<Vec<FilePlan>> {
    let n = files_count(req.target_size_mb, unit_mb)?;
    let unit_bytes = mb_to_bytes(unit_mb)?;
    let last_bytes = last_file_size_bytes(req.target_size_mb, unit_mb, n)?;
    let end = req.seed + n;
    Ok((req.seed..end)
        .map(|index| FilePlan {
            index,
            byte_limit: if index + 1 == end { last_bytes } else { unit_bytes },
        })
        .collect())
}

pub fn planned_bytes(plan: &[FilePlan]) -> u64 {
    plan.iter().map(|p| p.byte_limit).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::BYTES_PER_MB;

    #[test]
    fn seeded_plan_continues_numbering() {
        let req = DataSetRequest::new("a", 5).with_seed(3);
        let files = plan(&req, 2).unwrap();
        let got: Vec<(u64, u64)> = files.iter().map(|f| (f.index, f.byte_limit / BYTES_PER_MB)).collect();
        assert_eq!(got, vec![(3, 2), (4, 2), (5, 1)]);
        assert_eq!(file_name(5), "file5.txt");
    }

    #[test]
    fn unit_too_large_for_bytes_is_an_error() {
        let err = plan(&DataSetRequest::new("a", 1), 1 << 44).unwrap_err();
        assert!(format!("{:#}", err).contains("does not fit"));
    }

    #[test]
    fn empty_target_plans_nothing() {
        assert!(plan(&DataSetRequest::new("a", 0), 4).unwrap().is_empty());
    }
}
