use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Which files are picked up and how their outputs are named.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Regular expression a file name must match to be converted
    #[serde(default = "default_source_pattern")]
    pub source_pattern: String,

    /// Regular expression whose first match is replaced by the suffixes
    /// (default: the source pattern)
    #[serde(default)]
    pub replace: Option<String>,

    /// Replacement text for the converted video name
    #[serde(default = "default_video_suffix")]
    pub video_suffix: String,

    /// Replacement text for the still image name
    #[serde(default = "default_image_suffix")]
    pub image_suffix: String,

    /// Extra rewrite applied to the still image name
    #[serde(default)]
    pub image_rename: RenameRule,

    /// Leave files that already carry an output suffix alone
    #[serde(default = "default_true")]
    pub skip_outputs: bool,
}

fn default_source_pattern() -> String {
    r"\.avi$".to_string()
}
fn default_video_suffix() -> String {
    " AD.avi".to_string()
}
fn default_image_suffix() -> String {
    ".jpg".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            source_pattern: default_source_pattern(),
            replace: None,
            video_suffix: default_video_suffix(),
            image_suffix: default_image_suffix(),
            image_rename: RenameRule::default(),
            skip_outputs: true,
        }
    }
}

/// A regex rewrite of a derived file name.
///
/// The default turns the leading `c` of camera file names into `p`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenameRule {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_rename_pattern")]
    pub pattern: String,

    #[serde(default = "default_rename_replacement")]
    pub replacement: String,
}

fn default_true() -> bool {
    true
}
fn default_rename_pattern() -> String {
    "^c".to_string()
}
fn default_rename_replacement() -> String {
    "p".to_string()
}

impl Default for RenameRule {
    fn default() -> Self {
        Self {
            enabled: true,
            pattern: default_rename_pattern(),
            replacement: default_rename_replacement(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Frames skipped at the start of every input (marker A)
    #[serde(default = "default_first_frame")]
    pub first_frame: u64,

    /// Output frame rate after resampling
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,

    #[serde(default)]
    pub rotation: RotationConfig,

    #[serde(default)]
    pub codec: CodecConfig,

    /// Output container (avi, mkv, mp4, mov)
    #[serde(default = "default_container")]
    pub container: String,
}

fn default_first_frame() -> u64 {
    3
}
fn default_target_fps() -> f64 {
    7.5
}
fn default_container() -> String {
    "avi".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            first_frame: default_first_frame(),
            target_fps: default_target_fps(),
            rotation: RotationConfig::default(),
            codec: CodecConfig::default(),
            container: default_container(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    /// Degrees, clockwise
    #[serde(default = "default_angle")]
    pub angle: f64,

    /// Frame width after rotation
    #[serde(default = "default_rotated_width")]
    pub width: u32,

    /// Frame height after rotation
    #[serde(default = "default_rotated_height")]
    pub height: u32,
}

fn default_angle() -> f64 {
    90.0
}
fn default_rotated_width() -> u32 {
    480
}
fn default_rotated_height() -> u32 {
    640
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            angle: default_angle(),
            width: default_rotated_width(),
            height: default_rotated_height(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CodecConfig {
    /// Encoder name (passed to ffmpeg as `-c:v`)
    #[serde(default = "default_codec_id")]
    pub id: String,

    #[serde(default)]
    pub mode: BitrateMode,

    /// kbit/s for `cbr`, quantizer for `quantizer`
    #[serde(default = "default_bitrate")]
    pub value: u32,
}

fn default_codec_id() -> String {
    "mjpeg".to_string()
}
fn default_bitrate() -> u32 {
    1000
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            id: default_codec_id(),
            mode: BitrateMode::default(),
            value: default_bitrate(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BitrateMode {
    #[default]
    Cbr,
    Quantizer,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
