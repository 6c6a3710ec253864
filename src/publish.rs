/*!
 * Transactional staging and publication of the draft tree.
 *
 * The whole document tree is assembled in an isolated staging location the
 * consumer application never watches. Publication is a single directory
 * relocation into the watched root, so the consumer either sees nothing or
 * a complete draft - never a partial one it might delete.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Static template files copied into every new draft when present
pub const TEMPLATE_FILES: &[&str] = &[
    "draft_meta_info.json",
    "draft_biz_config.json",
    "draft_agency_config.json",
    "draft_virtual_store.json",
    "performance_opt_info.json",
    "attachment_editing.json",
    "attachment_pc_common.json",
    "draft_settings",
];

/// Template directories copied recursively when present
pub const TEMPLATE_DIRS: &[&str] = &["common_attachment"];

/// Directories the editor expects to exist even when empty
pub const EMPTY_DIRS: &[&str] = &[
    "adjust_mask",
    "matting",
    "qr_upload",
    "smart_crop",
    "subdraft",
    "Resources",
];

/// Layout descriptor file name
pub const LAYOUT_FILE: &str = "timeline_layout.json";

/// Platform configuration file expected inside the template directory
pub const PLATFORM_CONFIG_FILE: &str = "platform_config.json";

/// A draft tree under construction in the staging location
#[derive(Debug)]
pub struct StagingArea {
    project_dir: PathBuf,
}

impl StagingArea {
    /// Initialize the staged project from the template directory: copy the
    /// static files and directories, create the required empty directories
    /// and the materials directory.
    pub fn prepare(template_dir: &Path, staging_root: &Path, name: &str) -> Result<Self> {
        if !FileManager::dir_exists(template_dir) {
            return Err(anyhow!(
                "Template directory does not exist: {:?}",
                template_dir
            ));
        }

        let project_dir = staging_root.join(name);
        FileManager::ensure_dir(&project_dir)?;

        for file_name in TEMPLATE_FILES {
            let src = template_dir.join(file_name);
            if src.exists() {
                FileManager::copy_file(&src, project_dir.join(file_name))?;
            } else {
                debug!("Template file absent, skipping: {}", file_name);
            }
        }

        for dir_name in TEMPLATE_DIRS {
            let src = template_dir.join(dir_name);
            if src.is_dir() {
                FileManager::copy_dir_recursive(&src, project_dir.join(dir_name))?;
            } else if src.is_file() {
                FileManager::copy_file(&src, project_dir.join(dir_name))?;
            }
        }

        for dir_name in EMPTY_DIRS {
            FileManager::ensure_dir(project_dir.join(dir_name))?;
        }

        FileManager::ensure_dir(project_dir.join("materials"))?;

        Ok(StagingArea { project_dir })
    }

    /// Root of the staged draft tree
    pub fn path(&self) -> &Path {
        &self.project_dir
    }

    /// The staged materials directory
    pub fn materials_dir(&self) -> PathBuf {
        self.project_dir.join("materials")
    }

    /// Write the layout descriptor referencing the timeline's identifier
    pub fn write_layout(&self, timeline_id: &str) -> Result<()> {
        let layout = json!({
            "dockItems": [{
                "dockIndex": 0,
                "ratio": 1,
                "timelineIds": [timeline_id],
                "timelineNames": ["时间线01"],
            }],
            "layoutOrientation": 1,
        });
        let content = serde_json::to_string_pretty(&layout)?;
        FileManager::write_to_file(self.project_dir.join(LAYOUT_FILE), &content)
    }

    /// Atomically relocate the staged tree into the consumer's watched root.
    ///
    /// An existing destination of the same name is destroyed first
    /// (last-writer-wins). The relocation itself is one rename; if the
    /// staging and destination roots live on different devices, the tree is
    /// first copied fully to a hidden sibling inside the watched root, then
    /// renamed into place - the watched name still appears in one step.
    pub fn publish(self, dest_root: &Path) -> Result<PathBuf> {
        if !FileManager::dir_exists(dest_root) {
            return Err(anyhow!(
                "Destination draft root does not exist: {:?}",
                dest_root
            ));
        }

        let name = self
            .project_dir
            .file_name()
            .ok_or_else(|| anyhow!("Staged project path has no name: {:?}", self.project_dir))?
            .to_os_string();
        let final_path = dest_root.join(&name);

        if final_path.exists() {
            warn!("Replacing existing draft: {:?}", final_path);
            fs::remove_dir_all(&final_path)
                .with_context(|| format!("Failed to remove existing draft: {:?}", final_path))?;
        }

        match fs::rename(&self.project_dir, &final_path) {
            Ok(()) => {}
            Err(rename_err) => {
                debug!(
                    "Rename into draft root failed ({}), copying via hidden sibling",
                    rename_err
                );
                let hidden = dest_root.join(format!(".{}.staging", name.to_string_lossy()));
                if hidden.exists() {
                    fs::remove_dir_all(&hidden)?;
                }
                FileManager::copy_dir_recursive(&self.project_dir, &hidden)?;
                fs::rename(&hidden, &final_path)
                    .with_context(|| format!("Failed to move draft into {:?}", final_path))?;
                fs::remove_dir_all(&self.project_dir)
                    .with_context(|| "Failed to clean up staging directory")?;
            }
        }

        info!("Published draft to {:?}", final_path);
        Ok(final_path)
    }
}

/// Rewrite the staged path prefix to the final one inside persisted text
/// documents. Plain text substitution, not structural re-parsing, so that
/// absolute paths embedded in the serialized documents stay valid after the
/// relocation.
pub fn rewrite_path_prefix(files: &[PathBuf], staged_prefix: &str, final_prefix: &str) -> Result<()> {
    for file in files {
        if !FileManager::file_exists(file) {
            continue;
        }
        let content = FileManager::read_to_string(file)?;
        if content.contains(staged_prefix) {
            let rewritten = content.replace(staged_prefix, final_prefix);
            FileManager::write_to_file(file, &rewritten)?;
            debug!("Rewrote staging paths in {:?}", file);
        }
    }
    Ok(())
}

/// Load the inherited platform configuration fields from the template
/// directory. A missing or malformed file is fatal - the editor rejects
/// documents without these fields.
pub fn load_platform_config(template_dir: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let path = template_dir.join(PLATFORM_CONFIG_FILE);
    let content = FileManager::read_to_string(&path)
        .with_context(|| format!("Missing platform config: {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse platform config: {:?}", path))?;
    value
        .as_object()
        .cloned()
        .ok_or_else(|| anyhow!("Platform config must be a JSON object: {:?}", path))
}
