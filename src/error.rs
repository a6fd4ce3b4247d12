//! Errors raised by the batch converter.

use std::path::PathBuf;

/// Failure modes of a batch run.
///
/// `Selection` and `Enumeration` end the run. `Conversion` and
/// `SelfOverwrite` concern one file; the batch reports them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The user cancelled the directory prompt or no directory could be derived.
    #[error("directory selection failed: {0}")]
    Selection(String),

    /// The chosen directory could not be listed.
    #[error("could not list directory {}: {source}", dir.display())]
    Enumeration {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The media session failed while processing a file.
    #[error("failed to convert {file} in {}: {source}", dir.display())]
    Conversion {
        dir: PathBuf,
        file: String,
        #[source]
        source: vidbatch_av::Error,
    },

    /// A derived output name would replace the input or the other output.
    #[error("output name {output} derived from {file} would overwrite {clobbers}")]
    SelfOverwrite {
        file: String,
        output: String,
        clobbers: String,
    },
}

impl BatchError {
    /// Convenience constructor for [`BatchError::Conversion`].
    pub fn conversion(
        dir: impl Into<PathBuf>,
        file: impl Into<String>,
        source: vidbatch_av::Error,
    ) -> Self {
        Self::Conversion {
            dir: dir.into(),
            file: file.into(),
            source,
        }
    }

    /// Whether the batch can continue with the next file after this error.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            BatchError::Conversion { .. } | BatchError::SelfOverwrite { .. }
        )
    }
}
