use std::fs;

use tabview_config::{ConfigError, MatcherConfig, ViewConfig};
use tabview_engine::{Bucket, ColumnFilterSpec};

fn bay_view() -> ViewConfig {
    ViewConfig {
        page_size: 20,
        search_fields: vec!["bayNumber".into(), "vehicle.registration".into()],
        status_field: Some("status".into()),
        additional_filters: vec![tabview_config::AdditionalFilterConfig {
            key: "capacity".into(),
            field: "capacity".into(),
            matcher: MatcherConfig::Buckets {
                buckets: vec![Bucket::new("large", Some(3.0), None), Bucket::new("small", None, Some(3.0))],
            },
        }],
        column_filters: vec![
            ColumnFilterSpec::text("bayNumber"),
            ColumnFilterSpec::dual("status", ["Available", "Occupied", "Maintenance"]),
        ],
    }
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("views").join("bays.toml");

    let view = bay_view();
    view.save(&path).unwrap();

    let loaded = ViewConfig::load(&path).unwrap();
    assert_eq!(loaded, view);

    let named = ViewConfig::load_from_dir(&dir.path().join("views"), "bays").unwrap();
    assert_eq!(named, view);
}

#[test]
fn load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ViewConfig::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("nope.toml"));
}

#[test]
fn load_rejects_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "page_size = 0\n").unwrap();
    assert!(matches!(ViewConfig::load(&path), Err(ConfigError::Validation(_))));

    fs::write(&path, "page_size = [\n").unwrap();
    assert!(matches!(ViewConfig::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn views_dir_is_namespaced() {
    if let Some(dir) = ViewConfig::views_dir() {
        assert!(dir.ends_with("tabview/views"));
    }
}
