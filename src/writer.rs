/*!
 * Document writer collaborator.
 *
 * The pipeline hands its finished timeline to a [`DocumentWriter`], which
 * owns the consumer's serialized document shape. [`JianyingWriter`] emits
 * the editor's `draft_content.json` plus the derived companion document
 * (`draft_info.json`).
 */

use anyhow::Result;
use log::debug;
use serde_json::{Map, Value, json};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::app_config::SubtitleStyleConfig;
use crate::errors::DraftError;
use crate::file_utils::FileManager;
use crate::subtitle::{self, CaptionEntry};
use crate::timeline::{TimelineDocument, Track, TrackKind};

/// Serialized document file names
pub const CONTENT_FILE: &str = "draft_content.json";
pub const COMPANION_FILE: &str = "draft_info.json";

/// Paths of the persisted document pair
#[derive(Debug, Clone)]
pub struct DocumentArtifacts {
    /// The serialized timeline document
    pub content_path: PathBuf,
    /// The derived companion document required by the editor
    pub companion_path: PathBuf,
}

/// Interface to the consumer's document format.
///
/// Callers merge inherited platform fields, import the caption artifact with
/// its single style template, then save the serialized timeline plus its
/// companion document.
pub trait DocumentWriter: Debug {
    /// Merge inherited platform configuration fields verbatim into the
    /// serialized document's top level
    fn merge_platform_config(&mut self, fields: Map<String, Value>);

    /// Import the subtitle artifact; every entry inherits the one style
    /// template. Returns the number of imported captions.
    fn import_captions(&mut self, srt_path: &Path, style: &SubtitleStyleConfig) -> Result<usize>;

    /// Serialize the timeline and its companion document into `project_dir`
    fn save(
        &mut self,
        doc: &TimelineDocument,
        project_dir: &Path,
    ) -> Result<DocumentArtifacts, DraftError>;
}

/// Writer producing the JianYing draft document pair
#[derive(Debug, Default)]
pub struct JianyingWriter {
    platform_fields: Map<String, Value>,
    captions: Vec<CaptionEntry>,
    caption_style: Option<SubtitleStyleConfig>,
}

impl JianyingWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    fn video_material(path: &Path) -> (String, Value) {
        let id = Uuid::new_v4().to_string();
        let material = json!({
            "id": id,
            "type": "photo",
            "path": path.to_string_lossy(),
            "material_name": file_name_of(path),
        });
        (id, material)
    }

    fn audio_material(path: &Path, duration_us: i64) -> (String, Value) {
        let id = Uuid::new_v4().to_string();
        let material = json!({
            "id": id,
            "type": "extract_music",
            "path": path.to_string_lossy(),
            "name": file_name_of(path),
            "duration": duration_us,
        });
        (id, material)
    }

    fn text_material(&self, entry: &CaptionEntry) -> (String, Value) {
        let id = Uuid::new_v4().to_string();
        let style = self.caption_style.clone().unwrap_or_default();

        let mut material = json!({
            "id": id,
            "content": entry.text,
            "font_size": style.font_size,
            "text_color": style.fill_rgb,
            "border_color": style.border_rgb,
            "border_width": style.border_width,
            "alignment": 1,
            "auto_wrapping": true,
        });

        // Zero shadow opacity disables the shadow entirely
        if style.shadow_alpha > 0.0 {
            material["shadow"] = json!({
                "alpha": style.shadow_alpha,
                "color": style.shadow_rgb,
                "diffuse": style.shadow_diffuse,
                "distance": style.shadow_distance,
                "angle": style.shadow_angle,
            });
        }

        (id, material)
    }

    fn media_track(track: &Track, materials: &mut Vec<Value>) -> Value {
        let mut segments = Vec::with_capacity(track.segments.len());

        for segment in &track.segments {
            let (material_id, material) = match track.kind {
                TrackKind::Video => Self::video_material(&segment.material_path),
                TrackKind::Audio => {
                    Self::audio_material(&segment.material_path, segment.duration_us)
                }
                TrackKind::Text => continue,
            };
            materials.push(material);

            let mut rendered = json!({
                "id": Uuid::new_v4().to_string(),
                "material_id": material_id,
                "target_timerange": {
                    "start": segment.start_us,
                    "duration": segment.duration_us,
                },
            });
            if let Some(color) = &segment.background_fill {
                rendered["background_fill"] = json!({
                    "type": "color",
                    "blur": 0.0,
                    "color": color,
                });
            }
            segments.push(rendered);
        }

        json!({
            "id": Uuid::new_v4().to_string(),
            "type": track.kind.as_str(),
            "name": track.name,
            "segments": segments,
        })
    }

    fn text_track(&self, text_materials: &mut Vec<Value>) -> Value {
        let mut segments = Vec::with_capacity(self.captions.len());

        for entry in &self.captions {
            let (material_id, material) = self.text_material(entry);
            text_materials.push(material);
            segments.push(json!({
                "id": Uuid::new_v4().to_string(),
                "material_id": material_id,
                "target_timerange": {
                    "start": entry.start_us,
                    "duration": (entry.end_us - entry.start_us).max(0),
                },
            }));
        }

        json!({
            "id": Uuid::new_v4().to_string(),
            "type": TrackKind::Text.as_str(),
            "name": "subtitles",
            "segments": segments,
        })
    }
}

impl DocumentWriter for JianyingWriter {
    fn merge_platform_config(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.platform_fields.insert(key, value);
        }
    }

    fn import_captions(&mut self, srt_path: &Path, style: &SubtitleStyleConfig) -> Result<usize> {
        let entries = subtitle::parse_srt_file(srt_path)?;
        debug!("Imported {} caption(s) from {:?}", entries.len(), srt_path);
        self.caption_style = Some(style.clone());
        self.captions = entries;
        Ok(self.captions.len())
    }

    fn save(
        &mut self,
        doc: &TimelineDocument,
        project_dir: &Path,
    ) -> Result<DocumentArtifacts, DraftError> {
        // Inherited platform fields form the document base; pipeline-owned
        // fields overwrite on collision
        let mut content = Value::Object(self.platform_fields.clone());

        let mut video_materials = Vec::new();
        let mut audio_materials = Vec::new();
        let mut text_materials = Vec::new();
        let mut tracks = Vec::new();

        for track in &doc.tracks {
            let materials = match track.kind {
                TrackKind::Video => &mut video_materials,
                TrackKind::Audio => &mut audio_materials,
                // Text tracks are emitted from the imported captions below
                TrackKind::Text => continue,
            };
            tracks.push(Self::media_track(track, materials));
        }

        if !self.captions.is_empty() {
            tracks.push(self.text_track(&mut text_materials));
        }

        content["canvas_config"] = json!({
            "width": doc.width,
            "height": doc.height,
            "ratio": "original",
        });
        content["id"] = json!(doc.id);
        content["create_time"] = json!(doc.create_time);
        content["update_time"] = json!(doc.update_time);
        content["duration"] = json!(doc.duration_us);
        content["materials"] = json!({
            "videos": video_materials,
            "audios": audio_materials,
            "texts": text_materials,
        });
        content["tracks"] = Value::Array(tracks);

        let serialized = serde_json::to_string_pretty(&content)
            .map_err(|e| DraftError::SaveFailed(e.to_string()))?;

        let content_path = project_dir.join(CONTENT_FILE);
        let companion_path = project_dir.join(COMPANION_FILE);

        FileManager::write_to_file(&content_path, &serialized)
            .map_err(|e| DraftError::SaveFailed(e.to_string()))?;

        // The companion document is a byte copy of the serialized timeline
        FileManager::copy_file(&content_path, &companion_path)
            .map_err(|e| DraftError::SaveFailed(e.to_string()))?;

        Ok(DocumentArtifacts {
            content_path,
            companion_path,
        })
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
