use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use xenia_artwork_scraper::config::{ConfigFile, ConfigLoader};
use xenia_artwork_scraper::error::ArtworkError;

#[test]
fn parse_config_file() {
    let file: ConfigFile = serde_json::from_str(
        r#"{
            "catalog_url": "https://catalog.test/games.json",
            "output_dir": "out/Artwork",
            "box_art_field": "BoxArtUrl",
            "max_retries": 3,
            "retry_delay_secs": 1,
            "accept_invalid_certs": true
        }"#,
    )
    .unwrap();

    let config = ConfigLoader::resolve_config(file, |_| None).unwrap();
    assert_eq!(
        config.catalog_url.as_deref(),
        Some("https://catalog.test/games.json")
    );
    assert_eq!(config.output_root.as_str(), "out/Artwork");
    assert_eq!(config.box_art_field.as_deref(), Some("BoxArtUrl"));
    assert_eq!(config.icon_field, None);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.retry_delay, Duration::from_secs(1));
    assert!(config.accept_invalid_certs);
}

#[test]
fn env_flag_can_disable_insecure_file_setting() {
    let file = ConfigFile {
        accept_invalid_certs: Some(true),
        ..ConfigFile::default()
    };
    let config = ConfigLoader::resolve_config(file, |key| {
        (key == "ARTWORK_ACCEPT_INVALID_CERTS").then(|| "0".to_string())
    })
    .unwrap();
    assert!(!config.accept_invalid_certs);
}

#[test]
fn zero_retries_rejected() {
    let file = ConfigFile {
        max_retries: Some(0),
        ..ConfigFile::default()
    };
    let err = ConfigLoader::resolve_config(file, |_| None).unwrap_err();
    assert_matches!(err, ArtworkError::InvalidSetting { .. });
}

#[test]
fn explicit_missing_file_is_read_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nope.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, ArtworkError::ConfigRead(_));
}

#[test]
fn malformed_file_is_parse_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("artwork-scraper.json");
    fs::write(&path, "{ not json").unwrap();
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, ArtworkError::ConfigParse(_));
}
