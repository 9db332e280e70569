pub mod local;
pub mod ssh;

use async_trait::async_trait;

use crate::error::TransportError;

pub use local::LocalTransport;
pub use ssh::SshTransport;

/// Runs a command on a named target.
///
/// `None` means the command could not be executed or produced nothing at
/// all. Implementations report the reason through their own logging; the
/// caller only sees that the output is absent. One attempt per call.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn run(&self, target: &str, command: &str) -> Option<CommandResult>;
}

/// Verbatim output of a command: the text exactly as received plus its
/// lines with terminators stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    raw: String,
    lines: Vec<String>,
}

impl CommandResult {
    /// Build from already split lines; the raw text is each line
    /// newline-terminated.
    pub fn new(lines: Vec<String>) -> Self {
        let raw = lines.iter().fold(String::new(), |mut s, line| {
            s.push_str(line);
            s.push('\n');
            s
        });
        Self { raw, lines }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            raw: text.to_string(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The output as received, line endings included.
    pub fn raw_text(&self) -> &str {
        &self.raw
    }
}

impl<S: Into<String>> FromIterator<S> for CommandResult {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Raw output from a command execution.
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
}

impl CommandOutput {
    /// A failed command that wrote nothing to stdout (missing binary,
    /// permission denied) counts as absent output.
    pub fn into_result(self) -> Result<CommandResult, TransportError> {
        if !self.success && self.stdout.is_empty() {
            return Err(TransportError::NoOutput {
                stderr: String::from_utf8_lossy(&self.stderr).trim().to_string(),
            });
        }
        Ok(CommandResult::from_text(&String::from_utf8_lossy(&self.stdout)))
    }
}
