//! User-facing messages.

/// Where informational and error messages for the user go.
pub trait Notifier {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Prints messages to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier {
    info_to_stderr: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send informational messages to stderr, keeping stdout for
    /// machine-readable output.
    pub fn info_to_stderr(mut self, yes: bool) -> Self {
        self.info_to_stderr = yes;
        self
    }
}

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        if self.info_to_stderr {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }

    fn error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}
