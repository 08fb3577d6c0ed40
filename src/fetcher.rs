use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{info, warn};

use crate::format::resolve_extension;
use crate::http::{HttpClient, HttpResponse, RequestProfile, is_retryable_status};
use crate::retry::{Attempt, RetryOutcome, RetryPolicy};
use crate::store::Store;

/// How a single asset download ended. Failures are terminal for that asset
/// only and are already logged when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(Utf8PathBuf),
    NotImage { content_type: String },
    UnknownFormat,
    Rejected { status: u16 },
    Exhausted { attempts: u32 },
    WriteFailed,
}

impl DownloadOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadOutcome::Saved(_))
    }
}

/// Failure worth another attempt.
#[derive(Debug)]
enum Transient {
    Transport(String),
    Status(u16),
}

impl fmt::Display for Transient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transient::Transport(message) => write!(f, "{message}"),
            Transient::Status(status) => write!(f, "status code: {status}"),
        }
    }
}

/// Failure that ends the download on the spot.
#[derive(Debug)]
enum Permanent {
    Status(u16),
    NotImage(String),
}

impl fmt::Display for Permanent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permanent::Status(status) => write!(f, "status code: {status}"),
            Permanent::NotImage(content_type) => {
                write!(f, "not an image (content type {content_type:?})")
            }
        }
    }
}

pub struct AssetFetcher<'a, C: HttpClient> {
    client: &'a C,
    retry: &'a RetryPolicy,
}

impl<'a, C: HttpClient> AssetFetcher<'a, C> {
    pub fn new(client: &'a C, retry: &'a RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Downloads `url` to `{target_stem}{ext}`, picking `ext` from the
    /// response. Never fails; the outcome is informational.
    pub fn download(
        &self,
        url: &str,
        logical_name: &str,
        target_stem: &Utf8Path,
    ) -> DownloadOutcome {
        let response = match self.fetch_image(url, logical_name) {
            Ok(response) => response,
            Err(outcome) => return outcome,
        };

        let Some(ext) = resolve_extension(response.content_type(), &response.body) else {
            info!("skipping saving {logical_name} as no valid image format was detected");
            return DownloadOutcome::UnknownFormat;
        };

        let path = Utf8PathBuf::from(format!("{target_stem}{ext}"));
        self.write(logical_name, &path, &response.body)
    }

    /// Like [`download`](Self::download) but to a fixed path, without format
    /// detection.
    pub fn download_to(
        &self,
        url: &str,
        logical_name: &str,
        path: &Utf8Path,
    ) -> DownloadOutcome {
        match self.fetch_image(url, logical_name) {
            Ok(response) => self.write(logical_name, path, &response.body),
            Err(outcome) => outcome,
        }
    }

    fn fetch_image(
        &self,
        url: &str,
        logical_name: &str,
    ) -> Result<HttpResponse, DownloadOutcome> {
        let outcome = self.retry.run(logical_name, |_| {
            match self.client.get(url, RequestProfile::Asset) {
                Err(err) => Attempt::Retry(Transient::Transport(err.to_string())),
                Ok(response) if is_retryable_status(response.status) => {
                    Attempt::Retry(Transient::Status(response.status))
                }
                Ok(response) if !response.is_success() => {
                    Attempt::Abort(Permanent::Status(response.status))
                }
                Ok(response) if !response.content_type().contains("image") => Attempt::Abort(
                    Permanent::NotImage(response.content_type().to_string()),
                ),
                Ok(response) => Attempt::Done(response),
            }
        });

        match outcome {
            RetryOutcome::Success { value, .. } => Ok(value),
            RetryOutcome::Aborted { error, .. } => {
                warn!(url, "failed to fetch the {logical_name}: {error}");
                Err(match error {
                    Permanent::NotImage(content_type) => DownloadOutcome::NotImage { content_type },
                    Permanent::Status(status) => DownloadOutcome::Rejected { status },
                })
            }
            RetryOutcome::Exhausted { error, attempts } => {
                warn!(url, attempts, "giving up on {logical_name}: {error}");
                Err(DownloadOutcome::Exhausted { attempts })
            }
        }
    }

    fn write(&self, logical_name: &str, path: &Utf8Path, body: &[u8]) -> DownloadOutcome {
        match Store::write_bytes_atomic(path.as_std_path(), body) {
            Ok(()) => {
                info!(path = %path, "saved {logical_name}");
                DownloadOutcome::Saved(path.to_path_buf())
            }
            Err(err) => {
                warn!(path = %path, "failed to save {logical_name}: {err}");
                DownloadOutcome::WriteFailed
            }
        }
    }
}
