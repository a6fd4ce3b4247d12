//! vidbatch - batch video conversion through an external media engine
//!
//! This library crate exposes the batch converter for the binary and for
//! integration testing.

pub mod batch;
pub mod config;
pub mod error;
pub mod listing;
pub mod notify;
pub mod picker;

pub use error::BatchError;
