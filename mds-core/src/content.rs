use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const MIN_LINE_LEN: usize = 100;
pub const MAX_LINE_LEN: usize = 150;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// Create or truncate.
    Create,
    /// Create, failing if the file already exists.
    CreateNew,
    /// Append to an existing file.
    Append,
}

/// Writes random alphanumeric lines to `path` until at least `byte_limit` bytes went out.
/// Returns the number of bytes written, which stays below `byte_limit` plus one line.
pub fn write_file(path: &Path, byte_limit: u64, mode: WriteMode) -> Result<u64> {
    write_file_with_rng(path, byte_limit, mode, &mut rand::thread_rng())
}

pub fn write_file_with_rng<R: Rng>(
    path: &Path,
    byte_limit: u64,
    mode: WriteMode,
    rng: &mut R,
) -> Result<u64> {
    let mut opts = OpenOptions::new();
    match mode {
        WriteMode::Create => opts.write(true).create(true).truncate(true),
        WriteMode::CreateNew => opts.write(true).create_new(true),
        WriteMode::Append => opts.append(true),
    };
    let f = opts.open(path).with_context(|| format!("cannot create file {:?}", path))?;
    let mut w = BufWriter::new(f);
    let mut line = Vec::with_capacity(MAX_LINE_LEN + 1);
    let mut written = 0u64;
    while written < byte_limit {
        line.clear();
        let len = rng.gen_range(MIN_LINE_LEN..MAX_LINE_LEN);
        line.extend((0..len).map(|_| rng.sample(Alphanumeric)));
        line.push(b'\n');
        w.write_all(&line).with_context(|| format!("write {:?}", path))?;
        written += line.len() as u64;
    }
    w.flush().with_context(|| format!("flush {:?}", path))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn lines_are_alphanumeric_and_bounded() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("f.txt");
        let mut rng = StdRng::seed_from_u64(7);
        let n = write_file_with_rng(&p, 10_000, WriteMode::Create, &mut rng).unwrap();
        let text = std::fs::read_to_string(&p).unwrap();
        assert_eq!(text.len() as u64, n);
        for line in text.lines() {
            assert!((MIN_LINE_LEN..MAX_LINE_LEN).contains(&line.len()));
            assert!(line.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn written_total_stays_within_one_line_of_limit() {
        let td = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for (i, limit) in [1u64, 99, 100, 150, 151, 4096, 10_000, 65_537].into_iter().enumerate() {
            let p = td.path().join(format!("f{}.txt", i));
            let n = write_file_with_rng(&p, limit, WriteMode::Create, &mut rng).unwrap();
            assert!(n >= limit && n < limit + MAX_LINE_LEN as u64 + 1, "limit {} wrote {}", limit, n);
            assert_eq!(std::fs::metadata(&p).unwrap().len(), n);
        }
    }

    #[test]
    fn create_new_refuses_existing_file() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("taken.txt");
        std::fs::write(&p, b"keep me").unwrap();
        assert!(write_file(&p, 10, WriteMode::CreateNew).is_err());
        assert_eq!(std::fs::read(&p).unwrap(), b"keep me");
    }

    #[test]
    fn zero_limit_creates_empty_file() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("empty.txt");
        assert_eq!(write_file(&p, 0, WriteMode::Create).unwrap(), 0);
        assert_eq!(std::fs::metadata(&p).unwrap().len(), 0);
    }
}
