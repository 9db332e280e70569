use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::transport::{CommandOutput, CommandResult, CommandTransport};

/// Runs commands through `sh -c` on this machine. The target name is only
/// used for logging.
pub struct LocalTransport {
    timeout: Duration,
}

impl LocalTransport {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn execute(&self, command: &str) -> Result<CommandResult, TransportError> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| TransportError::Timeout {
                secs: self.timeout.as_secs(),
            })?
            .map_err(TransportError::Spawn)?;

        CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
        }
        .into_result()
    }
}

#[async_trait]
impl CommandTransport for LocalTransport {
    async fn run(&self, target: &str, command: &str) -> Option<CommandResult> {
        debug!(host = target, command, "running local command");
        match self.execute(command).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(host = target, command, error = %e, "local command could not be executed");
                None
            }
        }
    }
}
