use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::app_config::Config;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::file_utils::FileManager;
use crate::input_normalizer::DraftPayload;
use crate::media_resolver::MediaResolver;
use crate::publish::{self, StagingArea};
use crate::sanitize::build_draft_title;
use crate::subtitle;
use crate::timeline::TimelineBuilder;
use crate::writer::{COMPANION_FILE, CONTENT_FILE, DocumentWriter, JianyingWriter};

// @module: Application controller for one draft assembly run

/// Subtitle artifact file name inside the draft tree
const SRT_FILE: &str = "captions.srt";

/// Main application controller for draft generation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the full pipeline on one raw payload, using the production HTTP
    /// fetcher and document writer. Returns the published draft path.
    pub async fn run(&self, raw_payload: &str) -> Result<PathBuf> {
        let fetcher = HttpFetcher::new(&self.config.fetch)?;
        let mut writer = JianyingWriter::new();
        self.run_with_collaborators(raw_payload, &fetcher, &mut writer)
            .await
    }

    /// Run the pipeline with injected collaborators.
    ///
    /// Fatal preconditions (missing template directory, empty input,
    /// unparsable top-level payload, missing draft root) abort before
    /// anything is linked into the watched root; at worst a staging residue
    /// remains, which the consumer never sees.
    pub async fn run_with_collaborators(
        &self,
        raw_payload: &str,
        fetcher: &dyn Fetcher,
        writer: &mut dyn DocumentWriter,
    ) -> Result<PathBuf> {
        let start_time = std::time::Instant::now();

        let template_dir = self.config.paths.resolved_template_dir();
        if !FileManager::dir_exists(&template_dir) {
            return Err(anyhow!(
                "Template directory does not exist: {:?}",
                template_dir
            ));
        }

        let raw = raw_payload.trim();
        if raw.is_empty() {
            return Err(anyhow!("No input data"));
        }

        let payload = DraftPayload::parse(raw)?;
        info!(
            "Parsed payload: {} images, {} audios, {} captions",
            payload.images.len(),
            payload.audios.len(),
            payload.captions.len()
        );

        let draft_root = self.config.paths.resolved_draft_root()?;
        if !FileManager::dir_exists(&draft_root) {
            return Err(anyhow!("Draft root does not exist: {:?}", draft_root));
        }

        // Everything below builds in the isolated staging area; the watched
        // root is only touched by the final publish
        let title = build_draft_title(
            &payload.topic,
            &payload.hook_type,
            &payload.output_language,
            unix_now_secs(),
        );
        info!("Creating draft: {}", title);

        let staging_root = self.config.paths.resolved_staging_root();
        let staging = StagingArea::prepare(&template_dir, &staging_root, &title)?;

        let resolver = MediaResolver::new(fetcher, staging.materials_dir());
        let images = resolver
            .resolve_images(&payload.images, payload.background_url.clone())
            .await;
        let audios = resolver.resolve_audios(&payload.audios).await;

        let mut builder = TimelineBuilder::new(
            self.config.canvas.width,
            self.config.canvas.height,
            &self.config.canvas.background_color,
        );
        builder.add_image_segments(&images);
        builder.add_audio_segments(&audios);

        writer.merge_platform_config(publish::load_platform_config(&template_dir)?);

        let captions = subtitle::pair_captions(&payload.captions, &payload.timings);
        if !captions.is_empty() {
            let srt_path = staging.path().join(SRT_FILE);
            subtitle::write_srt(&captions, &srt_path)?;
            let imported = writer.import_captions(&srt_path, &self.config.subtitle_style)?;
            info!("Captions: {} entries", imported);

            // Caption end times count toward the union duration bound
            for entry in &captions {
                builder.extend_duration(entry.end_us);
            }
        }

        let document = builder.build();
        let timeline_id = document.id.clone();
        let artifacts = writer.save(&document, staging.path())?;
        debug!("Saved document pair: {:?}", artifacts.content_path);

        staging.write_layout(&timeline_id)?;

        let staged_prefix = staging.path().to_string_lossy().to_string();
        let final_path = staging.publish(&draft_root)?;
        let final_prefix = final_path.to_string_lossy().to_string();

        publish::rewrite_path_prefix(
            &[
                final_path.join(CONTENT_FILE),
                final_path.join(COMPANION_FILE),
            ],
            &staged_prefix,
            &final_prefix,
        )?;

        self.verify(&final_path)?;

        info!(
            "Draft \"{}\" ready in {:.1}s",
            title,
            start_time.elapsed().as_secs_f64()
        );
        Ok(final_path)
    }

    // Re-read the published document and log a summary, mirroring what the
    // operator would otherwise check by hand in the editor
    fn verify(&self, final_path: &Path) -> Result<()> {
        let content = FileManager::read_to_string(final_path.join(CONTENT_FILE))?;
        let document: Value =
            serde_json::from_str(&content).context("Published document is not valid JSON")?;

        let duration = document.get("duration").and_then(Value::as_i64).unwrap_or(0);
        info!("Verification: duration {} us", duration);

        if let Some(tracks) = document.get("tracks").and_then(Value::as_array) {
            for track in tracks {
                let kind = track.get("type").and_then(Value::as_str).unwrap_or("?");
                let segments = track
                    .get("segments")
                    .and_then(Value::as_array)
                    .map(|s| s.len())
                    .unwrap_or(0);
                info!("Verification: {} track with {} segment(s)", kind, segments);
            }
        }

        if let Some(materials) = document.get("materials") {
            for kind in ["videos", "audios", "texts"] {
                let count = materials
                    .get(kind)
                    .and_then(Value::as_array)
                    .map(|m| m.len())
                    .unwrap_or(0);
                info!("Verification: {} {}", count, kind);
            }
        }

        Ok(())
    }
}

fn unix_now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
