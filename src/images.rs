// Local mirrors of the rendered badge images.

use std::path::{Component, Path, PathBuf};

use crate::cache::write_bytes;
use crate::error::Result;
use crate::luogu::PageFetcher;

/// A rendered badge and where it lives in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeImage {
    /// Marker block the image is linked from.
    pub block: &'static str,
    /// Local file name of the mirror.
    pub file_name: &'static str,
    /// Markdown alt text.
    pub alt: &'static str,
    /// Remote URL of the rendered badge.
    pub url: String,
}

impl BadgeImage {
    pub fn local_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name)
    }

    /// Link target written into the document at `document`: the mirror's
    /// path relative to the document's directory, or the remote URL when
    /// images are not mirrored.
    pub fn link_target(&self, dir: &Path, document: &Path, mirrored: bool) -> String {
        if !mirrored {
            return self.url.clone();
        }
        let local = self.local_path(or_current(dir));
        let doc_dir = or_current(document.parent().unwrap_or(Path::new("")));
        relative_to(&local, doc_dir)
            .unwrap_or(local)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

fn or_current(path: &Path) -> &Path {
    if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    }
}

/// `path` expressed relative to the directory `base`.
///
/// Both are resolved against the working directory first. Returns `None`
/// when they share no root (different drives).
fn relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    let path = std::path::absolute(path).ok()?;
    let base = std::path::absolute(base).ok()?;
    let path: Vec<Component> = path.components().collect();
    let base: Vec<Component> = base.components().collect();

    let common = path
        .iter()
        .zip(&base)
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return None;
    }

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component.as_os_str());
    }
    Some(relative)
}

/// Download one image to `path`.
pub async fn download_image<F: PageFetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    path: &Path,
) -> Result<()> {
    let bytes = fetcher.fetch_bytes(url).await?;
    write_bytes(path, &bytes)?;
    Ok(())
}

/// Download every image into `dir`, skipping failures.
///
/// Returns the number of images saved.
pub async fn mirror_all<F: PageFetcher + ?Sized>(
    fetcher: &F,
    dir: &Path,
    images: &[BadgeImage],
) -> usize {
    let mut saved = 0;
    for image in images {
        let path = image.local_path(dir);
        match download_image(fetcher, &image.url, &path).await {
            Ok(()) => {
                tracing::info!(file = %path.display(), "saved badge image");
                saved += 1;
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "badge download failed, keeping previous file");
            }
        }
    }
    saved
}
