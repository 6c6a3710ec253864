use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Canvas dimensions of the generated draft
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Media acquisition settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Subtitle style applied to every imported caption
    #[serde(default)]
    pub subtitle_style: SubtitleStyleConfig,

    /// Filesystem locations used by the pipeline
    #[serde(default)]
    pub paths: PathsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Canvas dimensions (phone portrait 9:16 by default)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Canvas width in pixels
    #[serde(default = "default_canvas_width")]
    pub width: u32,

    /// Canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub height: u32,

    /// Whole-canvas background fill color ('#RRGGBBAA')
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_width(),
            height: default_canvas_height(),
            background_color: default_background_color(),
        }
    }
}

/// Settings for the HTTP media fetcher
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with each request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Style template inherited by every imported caption
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubtitleStyleConfig {
    /// Font size
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Fill color as RGB components in 0..=1
    #[serde(default = "default_fill_rgb")]
    pub fill_rgb: [f64; 3],

    /// Outline color as RGB components in 0..=1
    #[serde(default = "default_border_rgb")]
    pub border_rgb: [f64; 3],

    /// Outline width (0..=100)
    #[serde(default = "default_border_width")]
    pub border_width: f64,

    /// Drop shadow opacity; 0 disables the shadow entirely
    #[serde(default = "default_shadow_alpha")]
    pub shadow_alpha: f64,

    /// Shadow color as RGB components in 0..=1
    #[serde(default = "default_shadow_rgb")]
    pub shadow_rgb: [f64; 3],

    /// Shadow diffusion
    #[serde(default = "default_shadow_diffuse")]
    pub shadow_diffuse: f64,

    /// Shadow distance
    #[serde(default = "default_shadow_distance")]
    pub shadow_distance: f64,

    /// Shadow angle in degrees
    #[serde(default = "default_shadow_angle")]
    pub shadow_angle: f64,
}

impl Default for SubtitleStyleConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            fill_rgb: default_fill_rgb(),
            border_rgb: default_border_rgb(),
            border_width: default_border_width(),
            shadow_alpha: default_shadow_alpha(),
            shadow_rgb: default_shadow_rgb(),
            shadow_diffuse: default_shadow_diffuse(),
            shadow_distance: default_shadow_distance(),
            shadow_angle: default_shadow_angle(),
        }
    }
}

/// Filesystem locations used during a run
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PathsConfig {
    /// Root of the editor's watched draft directory.
    /// Defaults to the JianYing draft root under the user's home directory.
    #[serde(default)]
    pub draft_root: Option<PathBuf>,

    /// Directory holding the draft template files
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Isolated staging root where drafts are assembled before publication
    #[serde(default)]
    pub staging_root: Option<PathBuf>,
}

impl PathsConfig {
    /// Resolved draft root: configured value, or the editor's default
    /// location under the invoking user's home directory.
    pub fn resolved_draft_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.draft_root {
            return Ok(root.clone());
        }
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home.join("Movies/JianyingPro/User Data/Projects/com.lveditor.draft"))
    }

    /// Resolved template directory: configured value or ./template
    pub fn resolved_template_dir(&self) -> PathBuf {
        self.template_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("template"))
    }

    /// Resolved staging root: configured value or ./temp
    pub fn resolved_staging_root(&self) -> PathBuf {
        self.staging_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("temp"))
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_canvas_width() -> u32 {
    1080
}

fn default_canvas_height() -> u32 {
    1920
}

fn default_background_color() -> String {
    "#FFFFFFFF".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".to_string()
}

fn default_font_size() -> f64 {
    8.0
}

fn default_fill_rgb() -> [f64; 3] {
    // Light blue fill
    [0.60, 0.87, 1.00]
}

fn default_border_rgb() -> [f64; 3] {
    [1.00, 1.00, 1.00]
}

fn default_border_width() -> f64 {
    55.0
}

fn default_shadow_alpha() -> f64 {
    0.35
}

fn default_shadow_rgb() -> [f64; 3] {
    [0.00, 0.00, 0.00]
}

fn default_shadow_diffuse() -> f64 {
    18.0
}

fn default_shadow_distance() -> f64 {
    6.0
}

fn default_shadow_angle() -> f64 {
    -45.0
}

impl Config {
    /// Load configuration from a JSON file, or create a default one if the
    /// file does not exist yet.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            let config = Config::default();
            config.save_to_file(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(anyhow!(
                "Canvas dimensions must be positive, got {}x{}",
                self.canvas.width,
                self.canvas.height
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(anyhow!("Fetch timeout must be at least 1 second"));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            canvas: CanvasConfig::default(),
            fetch: FetchConfig::default(),
            subtitle_style: SubtitleStyleConfig::default(),
            paths: PathsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
