use std::time::Duration;

use assert_matches::assert_matches;

use scivis_fetch::client::DEFAULT_CATALOG_URL;
use scivis_fetch::config::{Config, ConfigLoader};
use scivis_fetch::error::ScivisError;

#[test]
fn explicit_config_file_overrides_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("scivis-fetch.json");
    std::fs::write(
        &path,
        r#"{ "catalog_url": "https://mirror.example.org/datasets.json", "timeout_secs": 45 }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.catalog_url, "https://mirror.example.org/datasets.json");
    assert_eq!(resolved.timeout, Duration::from_secs(45));
    assert_eq!(resolved.output_dir, None);
}

#[test]
fn malformed_config_is_reported() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.json");
    std::fs::write(&path, "{ catalog_url: ").unwrap();

    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(ScivisError::ConfigParse(_))
    );
}

#[test]
fn output_dir_passes_through() {
    let config = Config {
        output_dir: Some("volumes".to_string()),
        ..Config::default()
    };
    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.catalog_url, DEFAULT_CATALOG_URL);
    assert_eq!(resolved.output_dir.unwrap().as_str(), "volumes");
}
