//! Choosing the directory to convert.

use crate::error::BatchError;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::{Path, PathBuf};

/// Supplies the directory a batch runs in.
pub trait DirectoryPicker {
    /// # Errors
    ///
    /// [`BatchError::Selection`] if the user cancels or the choice does not
    /// lead to an existing directory.
    fn pick(&self) -> Result<PathBuf, BatchError>;
}

/// Directory containing `path`, or `path` itself when it is a directory.
///
/// `path` must exist. An existing bare file name resolves to the current
/// directory.
pub fn directory_of(path: &Path) -> Result<PathBuf, BatchError> {
    if !path.exists() {
        return Err(BatchError::Selection(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let dir = if path.is_dir() {
        path.to_path_buf()
    } else {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => {
                return Err(BatchError::Selection(format!(
                    "no directory can be derived from {}",
                    path.display()
                )))
            }
        }
    };

    if !dir.is_dir() {
        return Err(BatchError::Selection(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(dir)
}

/// Uses a path given up front, e.g. on the command line.
#[derive(Debug, Clone)]
pub struct FixedPicker {
    path: PathBuf,
}

impl FixedPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DirectoryPicker for FixedPicker {
    fn pick(&self) -> Result<PathBuf, BatchError> {
        directory_of(&self.path)
    }
}

/// Asks on the terminal for any file inside the wanted directory.
#[derive(Debug, Clone)]
pub struct PromptPicker {
    prompt: String,
}

impl PromptPicker {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for PromptPicker {
    fn default() -> Self {
        Self::new("Video file (any file in the directory to convert)")
    }
}

impl DirectoryPicker for PromptPicker {
    fn pick(&self) -> Result<PathBuf, BatchError> {
        let answer = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(&self.prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BatchError::Selection(format!("prompt failed: {e}")))?;

        let path = clean_answer(&answer)
            .ok_or_else(|| BatchError::Selection("cancelled by user".to_string()))?;
        directory_of(&path)
    }
}

/// Trim whitespace and the quotes terminals add to dropped paths, expand `~`.
fn clean_answer(answer: &str) -> Option<PathBuf> {
    let trimmed = answer.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|s| s.strip_suffix(*q))
        })
        .unwrap_or(trimmed);

    if unquoted.is_empty() {
        return None;
    }
    Some(PathBuf::from(shellexpand::tilde(unquoted).as_ref()))
}
