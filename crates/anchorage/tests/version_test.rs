#[test]
fn version_matches_cargo_pkg_version() {
    assert_eq!(anchorage::VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!anchorage::VERSION.is_empty());
}
