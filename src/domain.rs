use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ArtworkError;

/// Identifier of a title in the catalog. Doubles as a directory name under the
/// artwork root, so anything that could escape that directory is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleId(String);

impl TitleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TitleId {
    type Err = ArtworkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        if !title_id_pattern().is_match(normalized) {
            return Err(ArtworkError::InvalidTitleId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

fn title_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("title id pattern compiles"))
}

/// Accepts a JSON string or number; `null` reads as empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// One entry of the game list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GameRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default)]
    pub alternative_id: Option<Vec<String>>,
}

impl GameRecord {
    pub fn alternative_ids(&self) -> &[String] {
        self.alternative_id.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Background,
    Banner,
    Boxart,
    Icon,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Background,
        AssetKind::Banner,
        AssetKind::Boxart,
        AssetKind::Icon,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Background => "background",
            AssetKind::Banner => "banner",
            AssetKind::Boxart => "boxart",
            AssetKind::Icon => "icon",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssetSet {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub boxart: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Slideshow images. Decoded but not downloaded.
    #[serde(default)]
    pub gallery: Option<Vec<String>>,
}

impl AssetSet {
    /// URL for `kind`, treating blank strings the same as `null`.
    pub fn url(&self, kind: AssetKind) -> Option<&str> {
        let value = match kind {
            AssetKind::Background => self.background.as_deref(),
            AssetKind::Banner => self.banner.as_deref(),
            AssetKind::Boxart => self.boxart.as_deref(),
            AssetKind::Icon => self.icon.as_deref(),
        };
        value.map(str::trim).filter(|url| !url.is_empty())
    }
}

/// Per-title document served by the metadata database.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TitleMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artwork: AssetSet,
}

/// Which marketplace image a catalog field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketplaceKind {
    Boxart,
    Icon,
}

impl MarketplaceKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            MarketplaceKind::Boxart => "Boxart",
            MarketplaceKind::Icon => "Icons",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarketplaceKind::Boxart => "box art",
            MarketplaceKind::Icon => "icon",
        }
    }
}

/// Marketplace list entry. Image URLs live under field names chosen at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketplaceEntry {
    #[serde(rename = "ID", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "Title", default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl MarketplaceEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
