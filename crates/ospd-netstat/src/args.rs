use clap::Parser;

/// ospd-netstat — report 0.0.0.0 TCP listeners found by netstat on scan targets
#[derive(Parser, Debug)]
#[command(name = "ospd-netstat", version, about = "Run netstat on scan targets over SSH")]
pub struct Args {
    /// Target host(s) as [user@]hostname
    #[arg(value_name = "TARGET", required_unless_present = "describe", num_args = 1..)]
    pub targets: Vec<String>,

    /// Scan id attached to every record (default: generated)
    #[arg(long = "scan-id", value_name = "ID")]
    pub scan_id: Option<String>,

    /// Add a log record with the raw netstat table
    #[arg(long)]
    pub dumptable: bool,

    /// Scan option as NAME=VALUE (repeatable)
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,

    /// Run netstat on this machine instead of over SSH
    #[arg(long)]
    pub local: bool,

    /// SSH login name (overrides ~/.ssh/config)
    #[arg(short = 'l', long = "user", value_name = "USER")]
    pub user: Option<String>,

    /// SSH port (overrides ~/.ssh/config)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Read an SSH password from this environment variable
    #[arg(long = "password-env", value_name = "VAR")]
    pub password_env: Option<String>,

    /// Per-target command timeout in seconds
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Print scanner metadata as JSON and exit
    #[arg(long)]
    pub describe: bool,

    /// Increase verbosity level (use -v or -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
