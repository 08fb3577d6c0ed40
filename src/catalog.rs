use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::domain::{TitleId, TitleMetadata};
use crate::error::ArtworkError;
use crate::http::{HttpClient, RequestProfile};
use crate::retry::{Attempt, RetryOutcome, RetryPolicy};

#[derive(Debug)]
pub enum MetadataLookup {
    Found(TitleMetadata),
    /// The database has no document for this id.
    NotFound,
    Failed,
}

/// JSON side of the scraper: the game list and per-title documents.
pub struct CatalogClient<'a, C: HttpClient> {
    client: &'a C,
    retry: &'a RetryPolicy,
}

impl<'a, C: HttpClient> CatalogClient<'a, C> {
    pub fn new(client: &'a C, retry: &'a RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetches a JSON array. A 404 is not retried.
    pub fn fetch_list<T: DeserializeOwned>(
        &self,
        url: &str,
        label: &str,
    ) -> Result<Vec<T>, ArtworkError> {
        match self.fetch_json(url, label) {
            RetryOutcome::Success { value, .. } => Ok(value),
            RetryOutcome::Aborted { error, .. } | RetryOutcome::Exhausted { error, .. } => {
                Err(error)
            }
        }
    }

    /// Fetches a JSON array and decodes each element on its own, so one
    /// malformed entry does not sink the rest. Returns the decoded entries and
    /// the number of elements that were skipped.
    pub fn fetch_entries<T: DeserializeOwned>(
        &self,
        url: &str,
        label: &str,
    ) -> Result<(Vec<T>, usize), ArtworkError> {
        let raw = self.fetch_list::<Value>(url, label)?;
        let mut entries = Vec::with_capacity(raw.len());
        let mut skipped = 0;
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(index, "skipping malformed {label} entry: {err}");
                    skipped += 1;
                }
            }
        }
        Ok((entries, skipped))
    }

    pub fn fetch_metadata(&self, config: &ScraperConfig, id: &TitleId) -> MetadataLookup {
        let url = config.metadata_url(id);
        let label = format!("data for titleid: {id}");
        match self.fetch_json::<TitleMetadata>(&url, &label) {
            RetryOutcome::Success { value, .. } => MetadataLookup::Found(value),
            RetryOutcome::Aborted {
                error: ArtworkError::HttpStatus { status: 404, .. },
                ..
            } => {
                debug!(%id, "no metadata document");
                MetadataLookup::NotFound
            }
            RetryOutcome::Aborted { error, .. } | RetryOutcome::Exhausted { error, .. } => {
                warn!(%id, "metadata unavailable: {error}");
                MetadataLookup::Failed
            }
        }
    }

    fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        label: &str,
    ) -> RetryOutcome<T, ArtworkError> {
        self.retry.run(label, |_| {
            let response = match self.client.get(url, RequestProfile::Json) {
                Ok(response) => response,
                Err(err) => return Attempt::Retry(err),
            };
            if response.status == 404 {
                return Attempt::Abort(ArtworkError::HttpStatus {
                    status: 404,
                    url: url.to_string(),
                });
            }
            if !response.is_success() {
                return Attempt::Retry(ArtworkError::HttpStatus {
                    status: response.status,
                    url: url.to_string(),
                });
            }
            match serde_json::from_slice(&response.body) {
                Ok(value) => Attempt::Done(value),
                Err(err) => Attempt::Abort(ArtworkError::Decode {
                    url: url.to_string(),
                    message: err.to_string(),
                }),
            }
        })
    }
}
