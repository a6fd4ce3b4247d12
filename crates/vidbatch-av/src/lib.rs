//! # vidbatch-av
//!
//! The media-processing side of vidbatch.
//!
//! This crate provides:
//!
//! - **Session capability** ([`MediaSession`]) -- the object model of an
//!   external media engine: load, markers, filters, codec, container, save
//!   and still export.
//! - **ffmpeg adapter** ([`FfmpegSession`]) -- implements the session by
//!   running `ffprobe` and `ffmpeg` as child processes.
//! - **Command execution** ([`ToolCommand`]) -- blocking builder for running
//!   external tools with captured output.
//! - **Tool discovery** ([`check_tools`], [`get_tool_path`]).
//! - **Output staging** ([`Staging`]) -- outputs appear atomically or not at
//!   all.
//!
//! ## Example
//!
//! ```no_run
//! use vidbatch_av::{Bitrate, CodecSelection, Container, FfmpegSession, Filter, MediaSession};
//! use std::path::Path;
//!
//! let mut session = FfmpegSession::discover(None, None)?;
//! session.load(Path::new("/videos/clip1.avi"))?;
//! session.add_filter(Filter::Grayscale)?;
//! session.select_codec(CodecSelection::new("mjpeg", Bitrate::Cbr { kbps: 1000 }))?;
//! session.set_container(Container::Avi)?;
//! session.save(Path::new("/videos/clip1 AD.avi"))?;
//! # Ok::<(), vidbatch_av::Error>(())
//! ```

pub mod command;
mod error;
pub mod ffmpeg;
pub mod session;
pub mod staging;
pub mod tools;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use ffmpeg::FfmpegSession;
pub use session::{Bitrate, CodecSelection, Container, Filter, Marker, MediaSession};
pub use staging::Staging;
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo, REQUIRED_TOOLS};
