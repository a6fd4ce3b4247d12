//! Locating ffmpeg and ffprobe.

use crate::command::ToolCommand;
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// The programs an [`crate::FfmpegSession`] runs.
pub const REQUIRED_TOOLS: [&str; 2] = ["ffmpeg", "ffprobe"];

/// Availability of one external program.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    /// Version number from the banner, e.g. `6.1.1`.
    pub version: Option<String>,
    /// Resolved executable.
    pub path: Option<PathBuf>,
    /// Whether `path` came from configuration rather than `PATH`.
    pub configured: bool,
}

/// Version number from an ffmpeg-style banner line.
///
/// `ffprobe version 6.1.1-3ubuntu5 Copyright ...` gives `6.1.1-3ubuntu5`.
/// Banners without a `version` word are returned whole.
fn parse_version(banner: &str) -> Option<String> {
    let line = banner.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    let mut words = line.split_whitespace();
    match words.position(|w| w == "version") {
        Some(_) => words.next().map(str::to_string),
        None => Some(line.to_string()),
    }
}

/// Run `program -version` and report what was found.
///
/// # Example
///
/// ```no_run
/// use vidbatch_av::check_tool;
///
/// let info = check_tool("ffprobe", None);
/// if info.available {
///     println!("ffprobe {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str, configured: Option<&Path>) -> ToolInfo {
    let resolved = get_tool_path(name, configured).ok();
    let from_config = matches!((resolved.as_deref(), configured), (Some(r), Some(c)) if r == c);

    let version = resolved.as_ref().and_then(|program| {
        ToolCommand::new(program.clone())
            .arg("-version")
            .execute()
            .map_err(|e| tracing::debug!("{} -version failed: {}", name, e))
            .ok()
            .and_then(|output| parse_version(&output.stdout))
    });

    ToolInfo {
        name: name.to_string(),
        available: version.is_some(),
        version,
        path: resolved,
        configured: from_config,
    }
}

/// Check every program the ffmpeg session needs.
pub fn check_tools(ffmpeg_path: Option<&Path>, ffprobe_path: Option<&Path>) -> Vec<ToolInfo> {
    REQUIRED_TOOLS
        .into_iter()
        .zip([ffmpeg_path, ffprobe_path])
        .map(|(name, configured)| check_tool(name, configured))
        .collect()
}

/// Look `name` up on `PATH`.
///
/// # Errors
///
/// [`Error::ToolNotFound`] if it is not there.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Resolve a program, preferring an existing configured path over `PATH`.
pub fn get_tool_path(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(path) => {
            tracing::warn!(
                "Configured {} path {} does not exist; searching PATH",
                name,
                path.display()
            );
            require_tool(name)
        }
        None => require_tool(name),
    }
}
