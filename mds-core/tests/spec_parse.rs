use mds_core::spec::{parse_data_sets, DataSetRequest, MasterDataSetSpec};

#[test]
fn parses_pairs_in_order() {
    let v = parse_data_sets("logs,3,images, 10").unwrap();
    assert_eq!(v, vec![DataSetRequest::new("logs", 3), DataSetRequest::new("images", 10)]);
    assert!(v.iter().all(|d| d.seed == 0));
}

#[test]
fn rejects_odd_token_count() {
    let err = parse_data_sets("a,1,b").unwrap_err();
    assert!(format!("{:#}", err).contains("unmatched data set structure"));
}

#[test]
fn rejects_non_numeric_and_negative_sizes() {
    assert!(parse_data_sets("a,x").is_err());
    assert!(parse_data_sets("a,-1").is_err());
    assert!(parse_data_sets("").is_err());
}

#[test]
fn rejects_unsafe_or_duplicate_names() {
    for bad in ["..,1", "a/b,1", "/abs,1", ".,1", ",1"] {
        assert!(parse_data_sets(bad).is_err(), "{} accepted", bad);
    }
    let err = parse_data_sets("a,1,a,2").unwrap_err();
    assert!(format!("{:#}", err).contains("more than once"));
}

#[test]
fn validate_catches_duplicates_built_by_hand() {
    let spec = MasterDataSetSpec::generate(
        "/tmp/unused",
        1,
        vec![DataSetRequest::new("a", 1), DataSetRequest::new("a", 2)],
    );
    assert!(spec.validate().is_err());
}

#[test]
fn sizes_must_fit_in_bytes() {
    assert!(parse_data_sets("a,17592186044416").is_err());
    assert!(parse_data_sets("a,17592186044415").is_ok());
    let spec = MasterDataSetSpec::generate("/tmp/unused", 1 << 44, vec![DataSetRequest::new("a", 1)]);
    let err = spec.validate().unwrap_err();
    assert!(format!("{:#}", err).contains("does not fit"));
}
