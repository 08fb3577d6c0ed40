use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, MetadataLookup};
use crate::config::ScraperConfig;
use crate::domain::{AssetKind, GameRecord, TitleId, TitleMetadata};
use crate::error::ArtworkError;
use crate::fetcher::AssetFetcher;
use crate::http::HttpClient;
use crate::retry::RetryPolicy;
use crate::store::Store;

/// Counters for one run. Logged at the end; never affects the exit status.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub games: usize,
    pub titles_processed: usize,
    pub titles_not_found: usize,
    pub titles_failed: usize,
    pub invalid_ids: usize,
    pub assets_saved: usize,
    pub assets_present: usize,
    pub assets_failed: usize,
    pub assets_without_url: usize,
}

impl RunReport {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            games: 0,
            titles_processed: 0,
            titles_not_found: 0,
            titles_failed: 0,
            invalid_ids: 0,
            assets_saved: 0,
            assets_present: 0,
            assets_failed: 0,
            assets_without_url: 0,
        }
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }
}

/// Walks the game list and mirrors each title's artwork into the store.
pub struct CatalogWalker<'a, C: HttpClient> {
    config: &'a ScraperConfig,
    client: &'a C,
    retry: RetryPolicy,
    store: Store,
}

impl<'a, C: HttpClient> CatalogWalker<'a, C> {
    pub fn new(config: &'a ScraperConfig, client: &'a C) -> Self {
        Self {
            config,
            client,
            retry: RetryPolicy::from_config(config),
            store: Store::new(config.output_root.clone(), config.marketplace_root.clone()),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Only a missing catalog URL is an error; everything after that is
    /// logged and skipped.
    pub fn run(&self) -> Result<RunReport, ArtworkError> {
        let catalog_url = self.config.require_catalog_url()?;
        let catalog = CatalogClient::new(self.client, &self.retry);
        let mut report = RunReport::start();

        let fetched = catalog.fetch_entries::<GameRecord>(catalog_url, "games list");
        let (games, skipped) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!("failed to fetch the games list: {err}");
                (Vec::new(), 0)
            }
        };
        report.games = games.len() + skipped;
        report.invalid_ids += skipped;

        for game in &games {
            info!("processing {} ({})", game.title, game.id);
            self.process_id(&catalog, &game.id, &mut report);

            let alternatives = game.alternative_ids();
            if alternatives.is_empty() {
                continue;
            }
            info!("processing alternative ids for {}", game.title);
            for alternative in alternatives {
                info!("processing ({alternative})");
                self.process_id(&catalog, alternative, &mut report);
            }
        }

        let report = report.finish();
        info!(
            titles = report.titles_processed,
            saved = report.assets_saved,
            present = report.assets_present,
            failed = report.assets_failed,
            "artwork run finished"
        );
        Ok(report)
    }

    fn process_id(&self, catalog: &CatalogClient<'_, C>, raw_id: &str, report: &mut RunReport) {
        let id = match raw_id.parse::<TitleId>() {
            Ok(id) => id,
            Err(err) => {
                warn!("skipping catalog entry: {err}");
                report.invalid_ids += 1;
                return;
            }
        };
        report.titles_processed += 1;

        match catalog.fetch_metadata(self.config, &id) {
            MetadataLookup::Found(metadata) => self.save_title_assets(&id, &metadata, report),
            MetadataLookup::NotFound => report.titles_not_found += 1,
            MetadataLookup::Failed => report.titles_failed += 1,
        }
    }

    fn save_title_assets(&self, id: &TitleId, metadata: &TitleMetadata, report: &mut RunReport) {
        if let Err(err) = self.store.ensure_title_dir(id) {
            warn!(%id, "cannot create artwork directory: {err}");
            report.assets_failed += 1;
            return;
        }

        let fetcher = AssetFetcher::new(self.client, &self.retry);
        for kind in AssetKind::ALL {
            let Some(url) = metadata.artwork.url(kind) else {
                report.assets_without_url += 1;
                continue;
            };
            if self.store.asset_exists(id, kind) {
                debug!(%id, %kind, "already present");
                report.assets_present += 1;
                continue;
            }
            let stem = self.store.asset_stem(id, kind);
            if fetcher.download(url, kind.as_str(), &stem).is_saved() {
                report.assets_saved += 1;
            } else {
                report.assets_failed += 1;
            }
        }
    }
}
