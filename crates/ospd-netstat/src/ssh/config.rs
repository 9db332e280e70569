use std::path::{Path, PathBuf};
use std::time::Duration;

use ssh2_config::{ParseRule, SshConfig};

const DEFAULT_SSH_PORT: u16 = 22;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings supplied by the operator, applied to every target.
#[derive(Debug, Clone)]
pub struct SshOptions {
    pub user: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            user: None,
            port: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

pub struct ResolvedConfig {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub identity_files: Vec<PathBuf>,
}

/// Everything needed to open a session to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub destination: String,
    pub user: String,
    pub host: String,
    pub port: u16,
    pub identity_files: Vec<PathBuf>,
}

impl ResolvedTarget {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Resolve SSH config for a host by parsing `~/.ssh/config`.
///
/// Returns default (empty) config if the file is missing or unparseable.
pub fn resolve_host_config(host: &str) -> ResolvedConfig {
    let cfg = SshConfig::parse_default_file(
        ParseRule::ALLOW_UNKNOWN_FIELDS | ParseRule::ALLOW_UNSUPPORTED_FIELDS,
    )
    .ok();

    match cfg.as_ref().map(|c| c.query(host)) {
        Some(params) => {
            let identity_files = params
                .identity_file
                .as_ref()
                .map(|files| files.iter().map(|p| expand_tilde(p)).collect())
                .unwrap_or_default();

            ResolvedConfig {
                hostname: params.host_name.clone(),
                port: params.port,
                user: params.user.clone(),
                identity_files,
            }
        }
        None => ResolvedConfig {
            hostname: None,
            port: None,
            user: None,
            identity_files: Vec::new(),
        },
    }
}

/// Combine a `[user@]host` target with operator options and `~/.ssh/config`.
pub fn resolve_target(destination: &str, options: &SshOptions) -> ResolvedTarget {
    let (explicit_user, host) = parse_destination(destination);
    merge(destination, explicit_user, host, options, resolve_host_config)
}

fn merge(
    destination: &str,
    explicit_user: Option<String>,
    host: String,
    options: &SshOptions,
    lookup: impl FnOnce(&str) -> ResolvedConfig,
) -> ResolvedTarget {
    let host_cfg = lookup(&host);

    // user@host beats --user beats ssh config beats the local login name
    let user = explicit_user
        .or_else(|| options.user.clone())
        .or(host_cfg.user)
        .unwrap_or_else(local_user);
    let port = options
        .port
        .or(host_cfg.port)
        .unwrap_or(DEFAULT_SSH_PORT);

    ResolvedTarget {
        destination: destination.to_string(),
        user,
        host: host_cfg.hostname.unwrap_or(host),
        port,
        identity_files: host_cfg.identity_files,
    }
}

/// Parse `user@host` into `(Option<user>, host)`.
pub fn parse_destination(destination: &str) -> (Option<String>, String) {
    if let Some((user, host)) = destination.split_once('@') {
        (Some(user.to_string()), host.to_string())
    } else {
        (None, destination.to_string())
    }
}

fn local_user() -> String {
    std::env::var("USER").unwrap_or_else(|_| "root".to_string())
}

/// Expand leading `~` to `$HOME` in a path.
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(format!("{home}/{rest}"));
        }
    }
    path.to_path_buf()
}
