use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{SshError, TransportError};
use crate::ssh::config::{resolve_target, ResolvedTarget, SshOptions};
use crate::ssh::session::Session;
use crate::transport::{CommandOutput, CommandResult, CommandTransport};

/// Opens a fresh SSH session per call, runs the command, and disconnects.
pub struct SshTransport {
    options: SshOptions,
}

impl SshTransport {
    pub fn new(options: SshOptions) -> Self {
        Self { options }
    }

    async fn execute(&self, target: &str, command: &str) -> Result<CommandResult, TransportError> {
        let resolved = resolve_target(target, &self.options);
        let password = self.options.password.as_deref();

        let output = tokio::time::timeout(
            self.options.timeout,
            connect_and_exec(&resolved, password, command),
        )
        .await
        .map_err(|_| TransportError::Timeout {
            secs: self.options.timeout.as_secs(),
        })??;

        output.into_result()
    }
}

async fn connect_and_exec(
    target: &ResolvedTarget,
    password: Option<&str>,
    command: &str,
) -> Result<CommandOutput, SshError> {
    let session = Session::connect(target, password).await?;
    let output = session.exec(command).await;
    session.close().await;
    output
}

#[async_trait]
impl CommandTransport for SshTransport {
    async fn run(&self, target: &str, command: &str) -> Option<CommandResult> {
        debug!(host = target, command, "running remote command");
        match self.execute(target, command).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(host = target, command, error = %e, "remote command could not be executed");
                None
            }
        }
    }
}
