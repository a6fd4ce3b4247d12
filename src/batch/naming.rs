//! Output file names derived from input names.

use crate::config::NamingConfig;
use crate::error::BatchError;
use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Whether `name` is selected by `pattern`.
pub fn matches(name: &str, pattern: &Regex) -> bool {
    pattern.is_match(name)
}

/// Replace the first match of `replace` in `name` with `suffix`.
///
/// `suffix` is literal text; `$` has no special meaning in it.
pub fn derive(name: &str, replace: &Regex, suffix: &str) -> String {
    replace.replace(name, NoExpand(suffix)).into_owned()
}

/// A compiled rewrite applied after suffix substitution.
#[derive(Debug, Clone)]
pub struct Rename {
    pub pattern: Regex,
    pub replacement: String,
}

/// Rules for naming the two outputs of a job.
#[derive(Debug, Clone)]
pub struct OutputNaming {
    pub replace: Regex,
    pub video_suffix: String,
    pub image_suffix: String,
    pub image_rename: Option<Rename>,
    pub skip_outputs: bool,
}

impl OutputNaming {
    /// Compile naming rules; `replace` falls back to the source pattern.
    pub fn from_config(config: &NamingConfig, source_pattern: &Regex) -> Result<Self> {
        let replace = match &config.replace {
            Some(pattern) => Regex::new(pattern)
                .with_context(|| format!("Invalid naming.replace: {:?}", pattern))?,
            None => source_pattern.clone(),
        };

        if config.video_suffix.is_empty() {
            anyhow::bail!("naming.video_suffix cannot be empty");
        }
        if config.image_suffix.is_empty() {
            anyhow::bail!("naming.image_suffix cannot be empty");
        }
        if config.video_suffix == config.image_suffix {
            anyhow::bail!("naming.video_suffix and naming.image_suffix must differ");
        }

        let image_rename = if config.image_rename.enabled {
            let pattern = Regex::new(&config.image_rename.pattern).with_context(|| {
                format!(
                    "Invalid naming.image_rename.pattern: {:?}",
                    config.image_rename.pattern
                )
            })?;
            Some(Rename {
                pattern,
                replacement: config.image_rename.replacement.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            replace,
            video_suffix: config.video_suffix.clone(),
            image_suffix: config.image_suffix.clone(),
            image_rename,
            skip_outputs: config.skip_outputs,
        })
    }

    /// Whether `name` looks like an output of an earlier conversion.
    ///
    /// Always false when `skip_outputs` is off.
    pub fn is_output(&self, name: &str) -> bool {
        self.skip_outputs
            && (name.ends_with(&self.video_suffix) || name.ends_with(&self.image_suffix))
    }

    /// Name of the converted video.
    pub fn video_name(&self, name: &str) -> String {
        derive(name, &self.replace, &self.video_suffix)
    }

    /// Name of the exported still.
    pub fn image_name(&self, name: &str) -> String {
        let derived = derive(name, &self.replace, &self.image_suffix);
        match &self.image_rename {
            Some(rule) if rule.pattern.is_match(&derived) => rule
                .pattern
                .replace(&derived, NoExpand(&rule.replacement))
                .into_owned(),
            Some(rule) => {
                tracing::warn!(
                    "Image rename pattern {:?} does not match {:?}; keeping the name",
                    rule.pattern.as_str(),
                    derived
                );
                derived
            }
            None => derived,
        }
    }
}

/// One file to convert and where its outputs go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub dir: PathBuf,
    pub name: String,
    pub video_output: PathBuf,
    pub image_output: PathBuf,
}

impl Job {
    /// Derive both output paths for `name` in `dir`.
    ///
    /// # Errors
    ///
    /// [`BatchError::SelfOverwrite`] if either output would land on the
    /// input, or both outputs on the same file.
    pub fn plan(dir: &Path, name: &str, naming: &OutputNaming) -> Result<Self, BatchError> {
        let video = naming.video_name(name);
        let image = naming.image_name(name);

        for (output, clobbers) in [(&video, name), (&image, name), (&image, video.as_str())] {
            if output == clobbers {
                return Err(BatchError::SelfOverwrite {
                    file: name.to_string(),
                    output: output.clone(),
                    clobbers: clobbers.to_string(),
                });
            }
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            name: name.to_string(),
            video_output: dir.join(video),
            image_output: dir.join(image),
        })
    }

    /// Full path of the input file.
    pub fn source(&self) -> PathBuf {
        self.dir.join(&self.name)
    }
}
