use std::sync::Arc;

use russh::client;
use russh::{ChannelMsg, Disconnect};
use tracing::debug;

use crate::error::SshError;
use crate::ssh::config::ResolvedTarget;
use crate::transport::CommandOutput;

/// Minimal russh client handler — accepts all host keys.
struct ClientHandler;

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// One authenticated SSH connection to a scan target.
pub struct Session {
    handle: client::Handle<ClientHandler>,
}

impl Session {
    /// Connect and authenticate. Tries ssh-agent, IdentityFile entries,
    /// default key files, then `password` if one was given.
    pub async fn connect(target: &ResolvedTarget, password: Option<&str>) -> Result<Self, SshError> {
        let addr = target.addr();
        let stream = tokio::net::TcpStream::connect(&addr)
            .await
            .map_err(|e| SshError::Tcp {
                addr: addr.clone(),
                source: e,
            })?;

        let config = Arc::new(client::Config::default());
        let mut handle = client::connect_stream(config, stream, ClientHandler)
            .await
            .map_err(|e| SshError::Connection {
                destination: target.destination.clone(),
                source: e,
            })?;

        if !authenticate(&mut handle, &target.user, &target.identity_files, password).await {
            return Err(SshError::Auth {
                destination: target.destination.clone(),
                message: format!(
                    "all authentication methods failed (user={}, host={}, identity_files={:?})",
                    target.user, target.host, target.identity_files
                ),
            });
        }

        debug!(destination = %target.destination, user = %target.user, "ssh session established");
        Ok(Self { handle })
    }

    /// Execute a command and collect all output.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput, SshError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(SshError::Remote)?;
        channel
            .exec(true, command)
            .await
            .map_err(SshError::Remote)?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let mut exit_status = None;

        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => stdout.extend_from_slice(&data),
                Some(ChannelMsg::ExtendedData { data, ext: 1 }) => stderr.extend_from_slice(&data),
                Some(ChannelMsg::ExitStatus { exit_status: code }) => exit_status = Some(code),
                None => break,
                _ => {}
            }
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            success: exited_cleanly(exit_status),
        })
    }

    /// Politely end the connection. Errors are irrelevant at this point.
    pub async fn close(self) {
        let _ = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await;
    }
}

/// Closed without an exit status (killed by a signal, dropped channel)
/// counts as failure.
fn exited_cleanly(exit_status: Option<u32>) -> bool {
    exit_status == Some(0)
}

async fn authenticate(
    handle: &mut client::Handle<ClientHandler>,
    user: &str,
    identity_files: &[std::path::PathBuf],
    password: Option<&str>,
) -> bool {
    let rsa_hash = handle
        .best_supported_rsa_hash()
        .await
        .ok()
        .flatten()
        .flatten();

    // 1. ssh-agent
    if let Ok(mut agent) = russh::keys::agent::client::AgentClient::connect_env().await {
        if let Ok(identities) = agent.request_identities().await {
            for key in identities {
                match handle
                    .authenticate_publickey_with(user, key.public_key().into_owned(), rsa_hash, &mut agent)
                    .await
                {
                    Ok(res) if res.success() => return true,
                    _ => continue,
                }
            }
        }
    }

    // 2. IdentityFile from SSH config
    for path in identity_files {
        if try_key_file(handle, user, rsa_hash, path).await {
            return true;
        }
    }

    // 3. Default key files
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    for name in ["id_ed25519", "id_rsa", "id_ecdsa"] {
        let path = std::path::PathBuf::from(format!("{home}/.ssh/{name}"));
        if try_key_file(handle, user, rsa_hash, &path).await {
            return true;
        }
    }

    // 4. Password
    if let Some(password) = password {
        if let Ok(res) = handle.authenticate_password(user, password).await {
            return res.success();
        }
    }

    false
}

async fn try_key_file(
    handle: &mut client::Handle<ClientHandler>,
    user: &str,
    rsa_hash: Option<russh::keys::HashAlg>,
    path: &std::path::Path,
) -> bool {
    if !path.exists() {
        return false;
    }
    let key = match russh::keys::load_secret_key(path, None) {
        Ok(k) => k,
        Err(_) => return false,
    };
    let key = russh::keys::PrivateKeyWithHashAlg::new(Arc::new(key), rsa_hash);
    matches!(handle.authenticate_publickey(user, key).await, Ok(res) if res.success())
}
