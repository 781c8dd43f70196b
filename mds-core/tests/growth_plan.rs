use mds_core::growth::{locate, plan_growth, FileStat, GrowthInput, ReferenceLookup};
use mds_core::sizing::BYTES_PER_MB;
use std::path::PathBuf;

const MB: u64 = BYTES_PER_MB;

fn stat(p: &str, size: u64) -> FileStat {
    FileStat { path: PathBuf::from(p), size }
}

#[test]
fn no_gap_means_pure_generation_after_existing_files() {
    let input = GrowthInput { file_count: 3, smallest_size: MB, reference_size: MB };
    let gp = plan_growth("a", input, 2).unwrap();
    assert_eq!(gp.append_bytes, 0);
    assert_eq!(gp.remaining_bytes, 2 * MB);
    assert_eq!(gp.unit_mb, 1);
    let next = gp.continuation.unwrap();
    assert_eq!(next.name, "a");
    assert_eq!(next.seed, 3);
    assert_eq!(next.target_size_mb, 2);
}

#[test]
fn large_gap_absorbs_all_growth() {
    let input = GrowthInput { file_count: 4, smallest_size: MB, reference_size: 10 * MB };
    let gp = plan_growth("a", input, 3).unwrap();
    assert_eq!(gp.append_bytes, 3 * MB);
    assert_eq!(gp.remaining_bytes, 0);
    assert!(gp.continuation.is_none());
}

#[test]
fn gap_is_filled_then_rest_becomes_new_files() {
    let input = GrowthInput { file_count: 5, smallest_size: 2 * MB, reference_size: 4 * MB };
    let gp = plan_growth("b", input, 10).unwrap();
    assert_eq!(gp.append_bytes, 2 * MB);
    assert_eq!(gp.remaining_bytes, 8 * MB);
    assert_eq!(gp.unit_mb, 4);
    let next = gp.continuation.unwrap();
    assert_eq!((next.seed, next.target_size_mb), (5, 8));
}

#[test]
fn zero_growth_is_a_no_op() {
    let input = GrowthInput { file_count: 2, smallest_size: 10, reference_size: 3 * MB };
    let gp = plan_growth("a", input, 0).unwrap();
    assert_eq!((gp.append_bytes, gp.remaining_bytes), (0, 0));
    assert!(gp.continuation.is_none());
}

#[test]
fn sub_megabyte_unit_cannot_take_new_files() {
    let input = GrowthInput { file_count: 2, smallest_size: 100, reference_size: 200 };
    let err = plan_growth("tiny", input, 2).unwrap_err();
    assert!(format!("{:#}", err).contains("unit size below 1MB"));
}

#[test]
fn lookup_reports_empty_and_single_file_sets() {
    assert_eq!(locate(&[]), ReferenceLookup::EmptyDataSet);
    assert_eq!(locate(&[stat("d/file0.txt", MB)]), ReferenceLookup::NoReferenceFile);
}

#[test]
fn lookup_with_equal_sizes_uses_common_size() {
    let files = vec![stat("d/file1.txt", MB), stat("d/file0.txt", MB)];
    match locate(&files) {
        ReferenceLookup::Found { smallest, reference_size } => {
            assert_eq!(smallest.path, PathBuf::from("d/file0.txt"));
            assert_eq!(reference_size, MB);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn lookup_is_independent_of_input_order() {
    let mut files = vec![
        stat("d/file0.txt", MB + 120),
        stat("d/file1.txt", MB + 7),
        stat("d/file2.txt", MB + 90),
        stat("d/file3.txt", 300),
    ];
    let first = locate(&files);
    files.reverse();
    assert_eq!(locate(&files), first);
    let ReferenceLookup::Found { smallest, reference_size } = first else { panic!() };
    assert_eq!(smallest.path, PathBuf::from("d/file3.txt"));
    assert_eq!(reference_size, MB + 120);
}
