use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ArtworkError {
    #[error("invalid title id: {0}")]
    InvalidTitleId(String),

    #[error("missing catalog URL (set GAMES_LIST_URL or pass --catalog-url)")]
    #[diagnostic(help("the artwork command needs a JSON game list to walk"))]
    MissingCatalogUrl,

    #[error("no environment variable for box art or icon specified")]
    #[diagnostic(help("set BOX_ART_ENV and/or ICON_ENV to the catalog field names"))]
    MissingAssetFields,

    #[error("metadata URL template must contain {{id}}: {0}")]
    InvalidUrlTemplate(String),

    #[error("invalid value for {key}: {value}")]
    InvalidSetting { key: String, value: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("server returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("failed to decode JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl ArtworkError {
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ArtworkError::MissingCatalogUrl
                | ArtworkError::MissingAssetFields
                | ArtworkError::InvalidUrlTemplate(_)
                | ArtworkError::InvalidSetting { .. }
                | ArtworkError::ConfigRead(_)
                | ArtworkError::ConfigParse(_)
        )
    }
}
