//! Shared test doubles for integration tests.
//!
//! [`RecordingSession`] stands in for the media engine: it records every
//! call, writes deterministic output files derived from the input bytes and
//! the configured pipeline, and can be told to fail for chosen inputs.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use vidbatch::config::Config;
use vidbatch::error::BatchError;
use vidbatch::listing::{DirectoryListing, Entries};
use vidbatch::notify::Notifier;
use vidbatch::batch::Conversion;
use vidbatch_av::{CodecSelection, Container, Error, Filter, Marker, MediaSession, Result};

/// Frames reported for every loaded file.
pub const FRAME_COUNT: u64 = 120;

/// The default pipeline.
pub fn default_conversion() -> Conversion {
    Conversion::from_config(&Config::default()).expect("default config is valid")
}

/// Create `names` as small files in `dir`, each holding its own name.
pub fn write_inputs(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), format!("source:{name}")).expect("failed to write input");
    }
}

#[derive(Debug, Default)]
struct Loaded {
    path: PathBuf,
    marker_a: u64,
    marker_b: u64,
    current: u64,
    filters: Vec<Filter>,
    codec: Option<CodecSelection>,
    container: Option<Container>,
}

/// A [`MediaSession`] that records calls instead of running an engine.
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub calls: Vec<String>,
    fail_on: HashSet<String>,
    loaded: Option<Loaded>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `save` fail for inputs with this file name.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.fail_on.insert(name.to_string());
        self
    }

    /// Calls made while `name` was loaded, without the `load` itself.
    pub fn calls_for(&self, name: &str) -> Vec<String> {
        let load = format!("load {name}");
        self.calls
            .iter()
            .skip_while(|c| **c != load)
            .skip(1)
            .take_while(|c| !c.starts_with("load "))
            .cloned()
            .collect()
    }

    /// Names of the files loaded, in order.
    pub fn loaded_names(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| c.strip_prefix("load "))
            .map(str::to_string)
            .collect()
    }

    fn loaded(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(Error::NoMediaLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut Loaded> {
        self.loaded.as_mut().ok_or(Error::NoMediaLoaded)
    }

    fn check_frame(frame: u64) -> Result<()> {
        if frame >= FRAME_COUNT {
            return Err(Error::FrameOutOfRange {
                frame,
                frame_count: FRAME_COUNT,
            });
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl MediaSession for RecordingSession {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("load {}", file_name(path)));
        if !path.is_file() {
            return Err(Error::file_not_found(path));
        }
        self.loaded = Some(Loaded {
            path: path.to_path_buf(),
            marker_b: FRAME_COUNT - 1,
            ..Loaded::default()
        });
        Ok(())
    }

    fn set_marker(&mut self, marker: Marker, frame: u64) -> Result<()> {
        self.calls.push(format!("set_marker {marker} {frame}"));
        Self::check_frame(frame)?;
        let loaded = self.loaded_mut()?;
        match marker {
            Marker::A => loaded.marker_a = frame,
            Marker::B => loaded.marker_b = frame,
        }
        Ok(())
    }

    fn marker(&self, marker: Marker) -> Result<u64> {
        let loaded = self.loaded()?;
        Ok(match marker {
            Marker::A => loaded.marker_a,
            Marker::B => loaded.marker_b,
        })
    }

    fn add_filter(&mut self, filter: Filter) -> Result<()> {
        self.calls.push(format!("add_filter {filter}"));
        self.loaded_mut()?.filters.push(filter);
        Ok(())
    }

    fn select_codec(&mut self, codec: CodecSelection) -> Result<()> {
        self.calls.push(format!("select_codec {codec}"));
        self.loaded_mut()?.codec = Some(codec);
        Ok(())
    }

    fn set_container(&mut self, container: Container) -> Result<()> {
        self.calls.push(format!("set_container {container}"));
        self.loaded_mut()?.container = Some(container);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("save {}", file_name(path)));
        let loaded = self.loaded()?;
        let name = file_name(&loaded.path);
        if self.fail_on.contains(&name) {
            return Err(Error::tool_failed("recorder", format!("cannot encode {name}")));
        }

        let source = fs::read(&loaded.path)?;
        let filters: Vec<String> = loaded.filters.iter().map(|f| f.to_string()).collect();
        let mut bytes = source;
        bytes.extend_from_slice(
            format!(
                "|from={}|filters={}|codec={:?}|container={:?}",
                loaded.marker_a,
                filters.join(","),
                loaded.codec.as_ref().map(|c| c.to_string()),
                loaded.container,
            )
            .as_bytes(),
        );
        fs::write(path, bytes)?;
        Ok(())
    }

    fn current_frame(&self) -> Result<u64> {
        Ok(self.loaded()?.current)
    }

    fn set_current_frame(&mut self, frame: u64) -> Result<()> {
        self.calls.push(format!("set_current_frame {frame}"));
        Self::check_frame(frame)?;
        self.loaded_mut()?.current = frame;
        Ok(())
    }

    fn export_still(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("export_still {}", file_name(path)));
        let loaded = self.loaded()?;
        let mut bytes = fs::read(&loaded.path)?;
        bytes.extend_from_slice(format!("|frame={}", loaded.current).as_bytes());
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// A listing over a fixed set of names, in the given order.
#[derive(Debug, Clone, Default)]
pub struct VecListing {
    names: Vec<String>,
}

impl VecListing {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl DirectoryListing for VecListing {
    fn entries(&self, _dir: &Path) -> std::result::Result<Entries, BatchError> {
        Ok(Box::new(self.names.clone().into_iter()))
    }
}

/// A listing whose directory can never be opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenListing;

impl DirectoryListing for BrokenListing {
    fn entries(&self, dir: &Path) -> std::result::Result<Entries, BatchError> {
        Err(BatchError::Enumeration {
            dir: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}

/// A message sent to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Error(String),
}

/// Collects messages; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Rc<RefCell<Vec<Message>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Info(s) => Some(s),
                Message::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| match m {
                Message::Error(s) => Some(s),
                Message::Info(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.messages.borrow_mut().push(Message::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages.borrow_mut().push(Message::Error(message.to_string()));
    }
}
