use std::fs;
use std::io::Write;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::{AssetKind, MarketplaceKind, TitleId};
use crate::error::ArtworkError;

/// Extensions probed before a download. A hit on any of them means the asset
/// is already present.
pub const KNOWN_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".bmp", ".tiff", ".webp"];

/// Local artwork tree.
#[derive(Debug, Clone)]
pub struct Store {
    artwork_root: Utf8PathBuf,
    marketplace_root: Utf8PathBuf,
}

impl Store {
    pub fn new(artwork_root: Utf8PathBuf, marketplace_root: Utf8PathBuf) -> Self {
        Self {
            artwork_root,
            marketplace_root,
        }
    }

    pub fn artwork_root(&self) -> &Utf8Path {
        &self.artwork_root
    }

    pub fn marketplace_root(&self) -> &Utf8Path {
        &self.marketplace_root
    }

    pub fn title_dir(&self, id: &TitleId) -> Utf8PathBuf {
        self.artwork_root.join(id.as_str())
    }

    /// Target path without extension, e.g. `Artwork/4D5307E6/boxart`.
    pub fn asset_stem(&self, id: &TitleId, kind: AssetKind) -> Utf8PathBuf {
        self.title_dir(id).join(kind.as_str())
    }

    pub fn marketplace_dir(&self, kind: MarketplaceKind) -> Utf8PathBuf {
        self.marketplace_root.join(kind.dir_name())
    }

    pub fn marketplace_path(&self, kind: MarketplaceKind, id: &TitleId) -> Utf8PathBuf {
        self.marketplace_dir(kind).join(format!("{id}.jpg"))
    }

    pub fn ensure_dir(path: &Utf8Path) -> Result<(), ArtworkError> {
        fs::create_dir_all(path.as_std_path())
            .map_err(|err| ArtworkError::Filesystem(format!("create {path}: {err}")))
    }

    pub fn ensure_title_dir(&self, id: &TitleId) -> Result<Utf8PathBuf, ArtworkError> {
        let dir = self.title_dir(id);
        Self::ensure_dir(&dir)?;
        Ok(dir)
    }

    pub fn asset_exists(&self, id: &TitleId, kind: AssetKind) -> bool {
        exists(kind.as_str(), self.title_dir(id).as_std_path())
    }

    /// Writes `content` next to `dest` under a temporary name and renames it
    /// into place, so readers never see a partial file.
    pub fn write_bytes_atomic(dest: &Path, content: &[u8]) -> Result<(), ArtworkError> {
        let parent = dest
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|err| ArtworkError::Filesystem(err.to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".artwork-part")
            .tempfile_in(parent)
            .map_err(|err| ArtworkError::Filesystem(err.to_string()))?;
        temp.write_all(content)
            .map_err(|err| ArtworkError::Filesystem(err.to_string()))?;
        temp.persist(dest)
            .map_err(|err| ArtworkError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

/// True if `{directory}/{logical_name}{ext}` is a file for any known extension.
pub fn exists(logical_name: &str, directory: &Path) -> bool {
    KNOWN_EXTENSIONS
        .iter()
        .any(|ext| directory.join(format!("{logical_name}{ext}")).is_file())
}
