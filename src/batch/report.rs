//! Outcome of a batch run.

use super::naming::Job;
use serde::Serialize;
use std::path::PathBuf;

/// A file that was converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedFile {
    pub source: String,
    pub video: PathBuf,
    pub image: PathBuf,
}

impl From<&Job> for ConvertedFile {
    fn from(job: &Job) -> Self {
        Self {
            source: job.name.clone(),
            video: job.video_output.clone(),
            image: job.image_output.clone(),
        }
    }
}

/// A file that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub dry_run: bool,
    /// Converted files, or planned ones for a dry run.
    pub converted: Vec<ConvertedFile>,
    pub failed: Vec<FailedFile>,
    /// Entries that did not match the source pattern.
    pub skipped: usize,
}

impl BatchReport {
    pub fn new(directory: PathBuf, dry_run: bool) -> Self {
        Self {
            directory,
            dry_run,
            ..Self::default()
        }
    }

    /// Source names handled successfully.
    pub fn converted_names(&self) -> Vec<&str> {
        self.converted.iter().map(|c| c.source.as_str()).collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// The completion notice shown to the user.
    pub fn summary(&self) -> String {
        let converted = self.converted.len();
        let noun = if converted == 1 { "video" } else { "videos" };

        if self.dry_run {
            return format!(
                "Dry run: would convert {} {} in {}.",
                converted,
                noun,
                self.directory.display()
            );
        }

        if self.failed.is_empty() {
            format!(
                "Converted all videos ({} {} in {}).",
                converted,
                noun,
                self.directory.display()
            )
        } else {
            format!(
                "Converted {} {} in {}; {} failed.",
                converted,
                noun,
                self.directory.display(),
                self.failed.len()
            )
        }
    }
}
