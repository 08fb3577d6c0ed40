//! Marketplace flow: image URLs are read straight off the list entries, under
//! field names chosen through `BOX_ART_ENV` / `ICON_ENV`, and saved as
//! `{root}/Boxart/{ID}.jpg` and `{root}/Icons/{ID}.jpg`.

use tracing::{debug, info, warn};

use crate::catalog::CatalogClient;
use crate::config::ScraperConfig;
use crate::domain::{MarketplaceEntry, MarketplaceKind, TitleId};
use crate::error::ArtworkError;
use crate::fetcher::AssetFetcher;
use crate::http::HttpClient;
use crate::retry::RetryPolicy;
use crate::store::Store;
use crate::walker::RunReport;

pub struct MarketplaceWalker<'a, C: HttpClient> {
    config: &'a ScraperConfig,
    client: &'a C,
    retry: RetryPolicy,
    store: Store,
}

impl<'a, C: HttpClient> MarketplaceWalker<'a, C> {
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

    /// Fails only when neither field name is configured.
    pub fn run(&self) -> Result<RunReport, ArtworkError> {
        let (box_art_field, icon_field) = self.config.require_marketplace_fields()?;
        let mut report = RunReport::start();

        let catalog = CatalogClient::new(self.client, &self.retry);
        let (entries, skipped) = match catalog
            .fetch_entries::<MarketplaceEntry>(&self.config.marketplace_url, "marketplace list")
        {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!("failed to fetch JSON data: {err}");
                (Vec::new(), 0)
            }
        };
        report.games = entries.len() + skipped;
        report.invalid_ids += skipped;

        let fetcher = AssetFetcher::new(self.client, &self.retry);
        let targets = [
            (MarketplaceKind::Boxart, box_art_field),
            (MarketplaceKind::Icon, icon_field),
        ];
        for entry in &entries {
            let id = match entry.id.parse::<TitleId>() {
                Ok(id) => id,
                Err(err) => {
                    warn!("skipping marketplace entry: {err}");
                    report.invalid_ids += 1;
                    continue;
                }
            };
            report.titles_processed += 1;

            for (kind, field) in targets {
                let Some(field) = field else { continue };
                let Some(url) = entry.field(field) else {
                    info!("no {} found for {}", kind.label(), entry.title);
                    report.assets_without_url += 1;
                    continue;
                };
                self.save(&fetcher, kind, &id, url, &mut report);
            }
        }

        Ok(report.finish())
    }

    fn save(
        &self,
        fetcher: &AssetFetcher<'_, C>,
        kind: MarketplaceKind,
        id: &TitleId,
        url: &str,
        report: &mut RunReport,
    ) {
        if let Err(err) = Store::ensure_dir(&self.store.marketplace_dir(kind)) {
            warn!("cannot create marketplace directory: {err}");
            report.assets_failed += 1;
            return;
        }
        let path = self.store.marketplace_path(kind, id);
        if path.as_std_path().is_file() {
            debug!(path = %path, "already present");
            report.assets_present += 1;
            return;
        }
        if fetcher.download_to(url, kind.label(), &path).is_saved() {
            info!("downloaded {}: {path}", kind.label());
            report.assets_saved += 1;
        } else {
            report.assets_failed += 1;
        }
    }
}
