/*!
 * Per-item media acquisition with a deterministic fallback chain.
 *
 * Every image position must resolve to some usable local resource before it
 * may enter a track. A failed image acquisition degrades through an ordered
 * chain of alternatives; a failed audio acquisition skips the item instead,
 * since a wrong beat is worse than a missing one.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};

use crate::fetch::Fetcher;
use crate::file_utils::FileManager;
use crate::input_normalizer::{AudioItem, ImageItem};

/// 1x1 white PNG used as the last-resort placeholder resource
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x04, 0x00, 0x00, 0x00, 0xb5,
    0x1c, 0x0c, 0x02, 0x00, 0x00, 0x00, 0x0b, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x60,
    0x60, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x2b, 0x09, 0x4d, 0x84, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Which tier of the fallback chain satisfied an image position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStatus {
    /// Acquired directly from its source URL
    Direct,
    /// Copied from the most recent successfully resolved prior image
    FallbackPrev,
    /// Copied from the document-level background resource
    FallbackBackground,
    /// Copied from the generated placeholder image
    FallbackPlaceholder,
    /// Placeholder bytes written straight into the item slot after every
    /// other tier failed
    ForcedPlaceholder,
}

impl ResolutionStatus {
    /// Short label used in operator-facing log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::FallbackPrev => "prev_image",
            Self::FallbackBackground => "bg_image",
            Self::FallbackPlaceholder => "placeholder",
            Self::ForcedPlaceholder => "placeholder (forced)",
        }
    }
}

/// An image position resolved to a local file
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    /// Position in the input list
    pub index: usize,
    /// The normalized source item
    pub item: ImageItem,
    /// Local resource backing this position; always an existing non-empty file
    pub local_path: PathBuf,
    /// Which tier satisfied this position
    pub status: ResolutionStatus,
}

/// An audio position resolved to a local file
#[derive(Debug, Clone)]
pub struct ResolvedAudio {
    /// Position in the input list
    pub index: usize,
    /// The normalized source item
    pub item: AudioItem,
    /// Local resource backing this position
    pub local_path: PathBuf,
}

// Availability of the lazily fetched document-level background resource
enum BackgroundState {
    Unchecked(String),
    Available(PathBuf),
    Unavailable,
}

/// Ordered fallback providers, evaluated strictly left to right:
/// most recent direct-or-fallback success, then the document background,
/// then the generated placeholder. Availability of the background and the
/// placeholder is checked once and cached for the run.
struct FallbackChain {
    prev_ok: Option<PathBuf>,
    background: BackgroundState,
    placeholder_path: PathBuf,
    placeholder_ready: bool,
}

impl FallbackChain {
    fn new(background_url: Option<String>, materials_dir: &Path) -> Self {
        FallbackChain {
            prev_ok: None,
            background: match background_url {
                Some(url) => BackgroundState::Unchecked(url),
                None => BackgroundState::Unavailable,
            },
            placeholder_path: materials_dir.join("placeholder.png"),
            placeholder_ready: false,
        }
    }

    async fn background_path(&mut self, fetcher: &dyn Fetcher, materials_dir: &Path) -> Option<PathBuf> {
        if let BackgroundState::Unchecked(url) = &self.background {
            let candidate = materials_dir.join("bg_fallback.png");
            self.background = match fetcher.fetch(url, &candidate).await {
                Ok(()) => BackgroundState::Available(candidate),
                Err(e) => {
                    warn!("Background fallback image unavailable: {}", e);
                    BackgroundState::Unavailable
                }
            };
        }
        match &self.background {
            BackgroundState::Available(path) => Some(path.clone()),
            _ => None,
        }
    }

    fn placeholder_path(&mut self) -> Option<PathBuf> {
        if !self.placeholder_ready {
            self.placeholder_ready = materialize_placeholder(&self.placeholder_path);
        }
        if self.placeholder_ready {
            Some(self.placeholder_path.clone())
        } else {
            None
        }
    }
}

// Write the placeholder bytes if the file is not already populated
fn materialize_placeholder(path: &Path) -> bool {
    if FileManager::is_non_empty_file(path) {
        return true;
    }
    if let Some(parent) = path.parent() {
        if FileManager::ensure_dir(parent).is_err() {
            return false;
        }
    }
    std::fs::write(path, PLACEHOLDER_PNG).is_ok() && FileManager::is_non_empty_file(path)
}

// Copy src into dest unless dest is already populated
fn ensure_copy(src: &Path, dest: &Path) -> bool {
    if FileManager::is_non_empty_file(dest) {
        return true;
    }
    if !FileManager::is_non_empty_file(src) {
        return false;
    }
    FileManager::copy_file(src, dest).is_ok() && FileManager::is_non_empty_file(dest)
}

/// Resolves referenced media into the staged materials directory
pub struct MediaResolver<'a> {
    fetcher: &'a dyn Fetcher,
    materials_dir: PathBuf,
}

impl<'a> MediaResolver<'a> {
    /// Create a resolver writing into `materials_dir`
    pub fn new(fetcher: &'a dyn Fetcher, materials_dir: PathBuf) -> Self {
        MediaResolver {
            fetcher,
            materials_dir,
        }
    }

    fn download_progress(len: usize, what: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message(what.to_string());
        progress_bar
    }

    /// Resolve every image position, in input order.
    ///
    /// Invariant: the returned list always has exactly as many entries as the
    /// input list, regardless of how many acquisitions fail - downstream
    /// track assembly never has to special-case gaps.
    pub async fn resolve_images(
        &self,
        images: &[ImageItem],
        background_url: Option<String>,
    ) -> Vec<ResolvedImage> {
        let mut resolved = Vec::with_capacity(images.len());
        if images.is_empty() {
            return resolved;
        }

        let mut chain = FallbackChain::new(background_url, &self.materials_dir);
        let progress = Self::download_progress(images.len(), "downloading images");

        for (index, item) in images.iter().enumerate() {
            let local = self.materials_dir.join(format!("image_{}.png", index));

            let direct_ok = if item.image_url.is_empty() {
                false
            } else {
                match self.fetcher.fetch(&item.image_url, &local).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Image {} acquisition failed: {}", index, e);
                        false
                    }
                }
            };

            let status = if direct_ok {
                chain.prev_ok = Some(local.clone());
                ResolutionStatus::Direct
            } else {
                let reason = if item.image_url.is_empty() {
                    "empty image_url"
                } else {
                    "download failed"
                };
                let status = self.apply_fallback(&mut chain, &local).await;
                info!(
                    "Image {}/{} degraded ({}) -> {}",
                    index + 1,
                    images.len(),
                    reason,
                    status.label()
                );
                status
            };

            resolved.push(ResolvedImage {
                index,
                item: item.clone(),
                local_path: local,
                status,
            });
            progress.inc(1);
        }

        progress.finish_and_clear();
        resolved
    }

    // Left-to-right evaluation of the chain; the forced write at the end is
    // the tier that must not abort the run
    async fn apply_fallback(&self, chain: &mut FallbackChain, local: &Path) -> ResolutionStatus {
        if let Some(prev) = chain.prev_ok.clone() {
            if ensure_copy(&prev, local) {
                return ResolutionStatus::FallbackPrev;
            }
        }

        if let Some(bg) = chain.background_path(self.fetcher, &self.materials_dir).await {
            if ensure_copy(&bg, local) {
                return ResolutionStatus::FallbackBackground;
            }
        }

        if let Some(placeholder) = chain.placeholder_path() {
            if ensure_copy(&placeholder, local) {
                return ResolutionStatus::FallbackPlaceholder;
            }
        }

        if let Err(e) = std::fs::write(local, PLACEHOLDER_PNG) {
            // Nothing left to degrade to; the run carries on with whatever is
            // at the slot and the operator gets told
            warn!("Forced placeholder write failed for {:?}: {}", local, e);
        }
        ResolutionStatus::ForcedPlaceholder
    }

    /// Resolve audio positions, in input order.
    ///
    /// Audio has no fallback chain: an item with no reference or a failed
    /// acquisition is skipped, not substituted.
    pub async fn resolve_audios(&self, audios: &[AudioItem]) -> Vec<ResolvedAudio> {
        let mut resolved = Vec::new();
        if audios.is_empty() {
            return resolved;
        }

        let progress = Self::download_progress(audios.len(), "downloading audio");

        for (index, item) in audios.iter().enumerate() {
            if item.audio_url.is_empty() {
                warn!("Audio {}/{} skipped - empty audio_url", index + 1, audios.len());
                progress.inc(1);
                continue;
            }

            let local = self.materials_dir.join(format!("audio_{}.mp3", index));
            match self.fetcher.fetch(&item.audio_url, &local).await {
                Ok(()) => resolved.push(ResolvedAudio {
                    index,
                    item: item.clone(),
                    local_path: local,
                }),
                Err(e) => {
                    warn!("Audio {}/{} skipped - {}", index + 1, audios.len(), e);
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        resolved
    }
}
