//! The media session capability.
//!
//! A [`MediaSession`] is the object model of an external media engine: one
//! file is loaded at a time, filters, codec and container are configured on
//! it, and then the processed video and single stills are written out. The
//! batch converter only ever talks to this trait, so the engine can be
//! `ffmpeg` ([`crate::FfmpegSession`]) or a test double.

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Frame-position bookmarks recognized by a session.
///
/// Marker A is the first frame of the region to process. Marker B is a
/// secondary position set by the session on load (the last frame) and used
/// to pick the still-image frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Marker {
    A,
    B,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::A => f.write_str("A"),
            Marker::B => f.write_str("B"),
        }
    }
}

/// A named, parameterized transformation applied to decoded frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Filter {
    /// Resample to a new frame rate by dropping or duplicating frames.
    ResampleFps { fps: f64 },
    /// Keep luma only.
    Grayscale,
    /// Rotate by `angle` degrees into a `width` x `height` frame.
    Rotate { angle: f64, width: u32, height: u32 },
}

impl Filter {
    /// Short filter name.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::ResampleFps { .. } => "resamplefps",
            Filter::Grayscale => "lumaonly",
            Filter::Rotate { .. } => "rotate",
        }
    }

    /// Ordered `key=value` parameters of the filter.
    ///
    /// The frame rate is expressed in thousandths of a frame per second.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Filter::ResampleFps { fps } => vec![
                ("newfps", format!("{}", (fps * 1000.0).round() as u64)),
                ("use_linear", "0".to_string()),
            ],
            Filter::Grayscale => Vec::new(),
            Filter::Rotate {
                angle,
                width,
                height,
            } => vec![
                ("width", width.to_string()),
                ("height", height.to_string()),
                ("angle", format!("{angle}")),
            ],
        }
    }

    /// Whether the filter changes the timing of frames rather than their content.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Filter::ResampleFps { .. })
    }

    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<()> {
        match self {
            Filter::ResampleFps { fps } if !(fps.is_finite() && *fps > 0.0) => Err(
                Error::InvalidInput(format!("frame rate must be positive, got {fps}")),
            ),
            Filter::Rotate { width, height, .. } if *width == 0 || *height == 0 => {
                Err(Error::InvalidInput(format!(
                    "rotation output size must be non-zero, got {width}x{height}"
                )))
            }
            Filter::Rotate { angle, .. } if !angle.is_finite() => Err(Error::InvalidInput(
                format!("rotation angle must be finite, got {angle}"),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        if params.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{}({})", self.name(), params.join(", "))
        }
    }
}

/// How the encoder spends bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Bitrate {
    /// Constant bitrate in kbit/s.
    Cbr { kbps: u32 },
    /// Constant quantizer.
    Quantizer { q: u32 },
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bitrate::Cbr { kbps } => write!(f, "CBR={kbps}"),
            Bitrate::Quantizer { q } => write!(f, "CQ={q}"),
        }
    }
}

/// An identified encoder plus its rate control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodecSelection {
    /// Encoder identifier (an ffmpeg encoder name for [`crate::FfmpegSession`]).
    pub id: String,
    pub bitrate: Bitrate,
}

impl CodecSelection {
    pub fn new(id: impl Into<String>, bitrate: Bitrate) -> Self {
        Self {
            id: id.into(),
            bitrate,
        }
    }
}

impl fmt::Display for CodecSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.bitrate)
    }
}

/// Supported output container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Container {
    /// AVI container
    Avi,
    /// Matroska container
    Mkv,
    /// MPEG-4 Part 14 container
    Mp4,
    /// QuickTime container
    Mov,
}

impl Container {
    /// Get the file extension for this container.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Avi => "avi",
            Container::Mkv => "mkv",
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
        }
    }

    /// Get the FFmpeg muxer name for this container.
    pub fn ffmpeg_format_name(&self) -> &'static str {
        match self {
            Container::Avi => "avi",
            Container::Mkv => "matroska",
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
        }
    }
}

impl std::str::FromStr for Container {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "avi" => Ok(Container::Avi),
            "mkv" | "matroska" => Ok(Container::Mkv),
            "mp4" | "m4v" => Ok(Container::Mp4),
            "mov" | "quicktime" => Ok(Container::Mov),
            _ => Err(format!("Unknown container format: {}", s)),
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

/// Object model of an external media engine.
///
/// Calls are blocking. A session holds one loaded file at a time; `load`
/// discards the filters, codec, container and markers of the previous file.
pub trait MediaSession {
    /// Load a source file, resetting all per-file state.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Place a marker at a frame.
    fn set_marker(&mut self, marker: Marker, frame: u64) -> Result<()>;

    /// Read a marker position.
    fn marker(&self, marker: Marker) -> Result<u64>;

    /// Append a filter to the chain.
    fn add_filter(&mut self, filter: Filter) -> Result<()>;

    /// Select the video encoder.
    fn select_codec(&mut self, codec: CodecSelection) -> Result<()>;

    /// Select the output container.
    fn set_container(&mut self, container: Container) -> Result<()>;

    /// Write the processed video, starting at marker A.
    fn save(&mut self, path: &Path) -> Result<()>;

    fn current_frame(&self) -> Result<u64>;

    fn set_current_frame(&mut self, frame: u64) -> Result<()>;

    /// Write the frame at the current position as a single JPEG image.
    fn export_still(&mut self, path: &Path) -> Result<()>;
}

impl<S: MediaSession + ?Sized> MediaSession for &mut S {
    fn load(&mut self, path: &Path) -> Result<()> {
        (**self).load(path)
    }

    fn set_marker(&mut self, marker: Marker, frame: u64) -> Result<()> {
        (**self).set_marker(marker, frame)
    }

    fn marker(&self, marker: Marker) -> Result<u64> {
        (**self).marker(marker)
    }

    fn add_filter(&mut self, filter: Filter) -> Result<()> {
        (**self).add_filter(filter)
    }

    fn select_codec(&mut self, codec: CodecSelection) -> Result<()> {
        (**self).select_codec(codec)
    }

    fn set_container(&mut self, container: Container) -> Result<()> {
        (**self).set_container(container)
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        (**self).save(path)
    }

    fn current_frame(&self) -> Result<u64> {
        (**self).current_frame()
    }

    fn set_current_frame(&mut self, frame: u64) -> Result<()> {
        (**self).set_current_frame(frame)
    }

    fn export_still(&mut self, path: &Path) -> Result<()> {
        (**self).export_still(path)
    }
}
