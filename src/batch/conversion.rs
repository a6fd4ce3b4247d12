//! The immutable conversion settings a batch runs with.

use super::naming::OutputNaming;
use crate::config::{BitrateMode, Config};
use anyhow::{Context, Result};
use regex::Regex;
use vidbatch_av::{Bitrate, CodecSelection, Container, Filter};

/// Everything a batch needs to know, compiled and checked once at start.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// File names matching this are converted.
    pub source_pattern: Regex,
    pub naming: OutputNaming,
    /// Marker A position.
    pub first_frame: u64,
    pub target_fps: f64,
    pub rotation_angle: f64,
    pub rotated_width: u32,
    pub rotated_height: u32,
    pub codec: CodecSelection,
    pub container: Container,
}

impl Conversion {
    /// Compile and validate the pipeline described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let naming_cfg = &config.naming;
        let pipeline = &config.pipeline;

        let source_pattern = Regex::new(&naming_cfg.source_pattern).with_context(|| {
            format!("Invalid naming.source_pattern: {:?}", naming_cfg.source_pattern)
        })?;
        let naming = OutputNaming::from_config(naming_cfg, &source_pattern)?;

        let bitrate = match pipeline.codec.mode {
            BitrateMode::Cbr => Bitrate::Cbr {
                kbps: pipeline.codec.value,
            },
            BitrateMode::Quantizer => Bitrate::Quantizer {
                q: pipeline.codec.value,
            },
        };
        if pipeline.codec.value == 0 {
            anyhow::bail!("pipeline.codec.value must be greater than 0");
        }
        if pipeline.codec.id.trim().is_empty() {
            anyhow::bail!("pipeline.codec.id cannot be empty");
        }

        let container: Container = pipeline
            .container
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{}", e))?;

        let conversion = Self {
            source_pattern,
            naming,
            first_frame: pipeline.first_frame,
            target_fps: pipeline.target_fps,
            rotation_angle: pipeline.rotation.angle,
            rotated_width: pipeline.rotation.width,
            rotated_height: pipeline.rotation.height,
            codec: CodecSelection::new(pipeline.codec.id.trim(), bitrate),
            container,
        };

        for filter in conversion.filters() {
            filter
                .validate()
                .with_context(|| format!("Invalid pipeline filter {}", filter.name()))?;
        }

        Ok(conversion)
    }

    /// The filter chain, in application order.
    pub fn filters(&self) -> Vec<Filter> {
        vec![
            Filter::ResampleFps {
                fps: self.target_fps,
            },
            Filter::Grayscale,
            Filter::Rotate {
                angle: self.rotation_angle,
                width: self.rotated_width,
                height: self.rotated_height,
            },
        ]
    }

    /// Whether a directory entry is selected for conversion.
    ///
    /// Outputs of earlier runs are not selected even if they match, so a
    /// rerun does not convert its own results again.
    pub fn selects(&self, name: &str) -> bool {
        super::naming::matches(name, &self.source_pattern) && !self.naming.is_output(name)
    }

    /// Whether `name` matches the source pattern but is left alone because it
    /// looks like an earlier output.
    pub fn is_earlier_output(&self, name: &str) -> bool {
        super::naming::matches(name, &self.source_pattern) && self.naming.is_output(name)
    }
}
