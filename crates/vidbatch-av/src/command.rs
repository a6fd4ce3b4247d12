//! Builder for executing external tool commands.

use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use vidbatch_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-v").arg("error")
///     .arg("-show_streams")
///     .arg("/videos/clip1.avi")
///     .execute()?;
/// println!("{}", output.stdout);
/// # Ok::<(), vidbatch_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command and wait for it, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if the program does not exist.
    /// - [`Error::ToolFailed`] if the process exits with a non-zero status
    ///   (message includes stderr).
    /// - [`Error::Io`] if spawning fails for any other reason.
    pub fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();
        tracing::debug!("Running {} {}", program_name, self.args.join(" "));

        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(&program_name)
                } else {
                    Error::Io(e)
                }
            })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool_failed(
                program_name,
                format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            ));
        }

        Ok(tool_output)
    }
}
