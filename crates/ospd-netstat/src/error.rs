#[derive(Debug, thiserror::Error)]
pub enum SshError {
    #[error("failed to reach {addr}: {source}")]
    Tcp {
        addr: String,
        source: std::io::Error,
    },

    #[error("failed to connect to {destination}: {source}")]
    Connection {
        destination: String,
        source: russh::Error,
    },

    #[error("authentication failed for {destination}: {message}")]
    Auth {
        destination: String,
        message: String,
    },

    #[error("remote command failed: {0}")]
    Remote(russh::Error),
}

/// Why a transport could not produce output. Never crosses the
/// `CommandTransport` boundary; transports log it and report `None`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("SSH error: {0}")]
    Ssh(#[from] SshError),

    #[error("failed to spawn local command: {0}")]
    Spawn(std::io::Error),

    #[error("command did not finish within {secs}s")]
    Timeout { secs: u64 },

    #[error("command failed without output: {stderr}")]
    NoOutput { stderr: String },
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("malformed option '{0}', expected NAME=VALUE")]
    MalformedPair(String),

    #[error("invalid boolean value for option '{name}': {value}")]
    InvalidBool { name: String, value: String },

    #[error("scan options must be a JSON object of scalars: {0}")]
    Json(#[from] serde_json::Error),
}
