//! Batch conversion of a directory.
//!
//! A batch resolves a directory, lists it, and runs the fixed conversion
//! pipeline over every entry whose name matches the source pattern:
//!
//! - skip the first frames (marker A)
//! - resample the frame rate, drop chroma, rotate
//! - encode with the configured codec into the configured container
//! - export the frame at marker B as a JPEG still
//!
//! Each input yields two outputs named by [`OutputNaming`]. Files are handled
//! strictly one after another; a file that fails is reported and the batch
//! carries on.

mod conversion;
mod converter;
mod naming;
mod report;

pub use conversion::Conversion;
pub use converter::{convert, plan, BatchConverter};
pub use naming::{derive, matches, Job, OutputNaming, Rename};
pub use report::{BatchReport, ConvertedFile, FailedFile};
