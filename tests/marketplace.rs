mod common;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use serde_json::json;

use common::{ScriptedHttp, image_response, png, recording_retry};
use xenia_artwork_scraper::config::ScraperConfig;
use xenia_artwork_scraper::error::ArtworkError;
use xenia_artwork_scraper::marketplace::MarketplaceWalker;

const LIST: &str = "https://gist.test/marketplace.json";

fn config_in(root: &Utf8PathBuf, box_art: Option<&str>, icon: Option<&str>) -> ScraperConfig {
    ScraperConfig {
        marketplace_url: LIST.to_string(),
        output_root: root.join("Artwork"),
        marketplace_root: root.join("Assets/Marketplace"),
        box_art_field: box_art.map(str::to_string),
        icon_field: icon.map(str::to_string),
        ..ScraperConfig::default()
    }
}

fn scratch() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, dir)
}

fn marketplace() -> ScriptedHttp {
    ScriptedHttp::new()
        .route(
            LIST,
            vec![Ok(common::json(json!([
                {"ID": "58410954", "Title": "Braid", "BoxArtUrl": "https://cdn.test/braid/box", "IconUrl": "https://cdn.test/braid/icon"},
                {"ID": "584108A9", "Title": "Limbo", "IconUrl": "https://cdn.test/limbo/icon"}
            ])))],
        )
        .route(
            "https://cdn.test/braid/box",
            vec![Ok(image_response("image/jpeg", b"box".to_vec()))],
        )
        .route("https://cdn.test/braid/icon", vec![Ok(image_response("image/png", png()))])
        .route(
            "https://cdn.test/limbo/icon",
            vec![Ok(image_response("image/jpeg", b"icon".to_vec()))],
        )
}

#[test]
fn requires_at_least_one_field_name() {
    let (_temp, root) = scratch();
    let config = config_in(&root, None, None);
    let http = marketplace();

    let err = MarketplaceWalker::new(&config, &http).run().unwrap_err();

    assert_matches!(err, ArtworkError::MissingAssetFields);
    assert!(err.is_config());
    assert!(http.calls().is_empty());
}

#[test]
fn saves_box_art_and_icons_as_jpg() {
    let (_temp, root) = scratch();
    let config = config_in(&root, Some("BoxArtUrl"), Some("IconUrl"));
    let http = marketplace();
    let (retry, _waits) = recording_retry();

    let report = MarketplaceWalker::new(&config, &http)
        .with_retry(retry)
        .run()
        .unwrap();

    let base = root.join("Assets/Marketplace");
    assert!(base.join("Boxart/58410954.jpg").as_std_path().is_file());
    assert!(base.join("Icons/58410954.jpg").as_std_path().is_file());
    assert!(base.join("Icons/584108A9.jpg").as_std_path().is_file());
    assert!(!base.join("Boxart/584108A9.jpg").as_std_path().exists());
    assert_eq!(report.assets_saved, 3);
    assert_eq!(report.assets_without_url, 1);
}

#[test]
fn only_configured_fields_are_downloaded() {
    let (_temp, root) = scratch();
    let config = config_in(&root, None, Some("IconUrl"));
    let http = marketplace();
    let (retry, _waits) = recording_retry();

    let report = MarketplaceWalker::new(&config, &http)
        .with_retry(retry)
        .run()
        .unwrap();

    assert_eq!(http.calls_to("https://cdn.test/braid/box"), 0);
    assert_eq!(report.assets_saved, 2);
    assert!(!root.join("Assets/Marketplace/Boxart").as_std_path().exists());
}

#[test]
fn existing_files_are_left_alone() {
    let (_temp, root) = scratch();
    let config = config_in(&root, Some("BoxArtUrl"), Some("IconUrl"));
    let http = marketplace();
    let (retry, _waits) = recording_retry();
    let walker = MarketplaceWalker::new(&config, &http).with_retry(retry);

    walker.run().unwrap();
    let second = walker.run().unwrap();

    assert_eq!(second.assets_saved, 0);
    assert_eq!(second.assets_present, 3);
    assert_eq!(http.calls_to("https://cdn.test/braid/box"), 1);
}

#[test]
fn numeric_ids_and_null_titles_are_accepted() {
    let (_temp, root) = scratch();
    let config = config_in(&root, Some("BoxArtUrl"), None);
    let http = ScriptedHttp::new()
        .route(
            LIST,
            vec![Ok(common::json(json!([
                {"ID": 12345678, "Title": null, "BoxArtUrl": "https://cdn.test/n/box"},
                {"ID": {"nested": true}, "Title": "Broken"},
                {"ID": "58410954", "Title": "Braid", "BoxArtUrl": "https://cdn.test/braid/box"}
            ])))],
        )
        .route("https://cdn.test/n/box", vec![Ok(image_response("image/jpeg", b"box".to_vec()))])
        .route(
            "https://cdn.test/braid/box",
            vec![Ok(image_response("image/jpeg", b"box".to_vec()))],
        );
    let (retry, _waits) = recording_retry();

    let report = MarketplaceWalker::new(&config, &http)
        .with_retry(retry)
        .run()
        .unwrap();

    let base = root.join("Assets/Marketplace/Boxart");
    assert!(base.join("12345678.jpg").as_std_path().is_file());
    assert!(base.join("58410954.jpg").as_std_path().is_file());
    assert_eq!(report.games, 3);
    assert_eq!(report.invalid_ids, 1);
    assert_eq!(report.assets_saved, 2);
}
