mod args;

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use args::Args;
use ospd_netstat::ssh::config::SshOptions;
use ospd_netstat::{
    ChannelSink, CommandTransport, LocalTransport, NetstatWrapper, OptionValue, ScanOptions,
    SshTransport,
};
use ospd_netstat_common::scanner::{ScannerInfo, DUMPTABLE_PARAM};
use ospd_netstat_common::types::ScanStatus;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the records, logs go to stderr
    let filter = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if args.describe {
        let info = ScannerInfo::netstat(env!("CARGO_PKG_VERSION"));
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let mut options = ScanOptions::from_pairs(&args.options).context("invalid --option")?;
    if args.dumptable {
        options.set(DUMPTABLE_PARAM, OptionValue::Bool(true));
    }
    options.dumptable().context("invalid scan options")?;

    let timeout = Duration::from_secs(args.timeout_secs);
    let transport: Arc<dyn CommandTransport> = if args.local {
        Arc::new(LocalTransport::new(timeout))
    } else {
        let password = match args.password_env.as_deref() {
            Some(var) => Some(
                std::env::var(var).with_context(|| format!("password variable {var} is not set"))?,
            ),
            None => None,
        };
        Arc::new(SshTransport::new(SshOptions {
            user: args.user.clone(),
            port: args.port,
            password,
            timeout,
        }))
    };

    let (sink, records) = ChannelSink::unbounded();
    let wrapper = Arc::new(NetstatWrapper::new(
        transport,
        Arc::new(sink),
        Arc::new(options),
    ));

    if !wrapper.check() {
        bail!("netstat scanner is not available");
    }

    // Record printer — plain OS thread, exits when every sink handle is dropped
    let printer = std::thread::spawn(move || {
        let stdout = io::stdout();
        for record in records {
            let line = match serde_json::to_string(&record) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize scan record");
                    continue;
                }
            };
            let mut handle = stdout.lock();
            if writeln!(handle, "{line}").is_err() || handle.flush().is_err() {
                break;
            }
        }
    });

    let scan_id = args.scan_id.clone().unwrap_or_else(generate_scan_id);
    info!(scan_id = %scan_id, targets = args.targets.len(), "starting netstat scan");

    let mut scans = JoinSet::new();
    for target in args.targets {
        let wrapper = wrapper.clone();
        let scan_id = scan_id.clone();
        scans.spawn(async move {
            let status = wrapper.exec_scan(&scan_id, &target).await;
            (target, status)
        });
    }

    let failed = drain_scans(&mut scans).await;

    drop(wrapper);
    printer
        .join()
        .map_err(|_| anyhow!("record printer thread panicked"))?;

    if failed > 0 {
        bail!("{failed} target(s) could not be scanned");
    }
    Ok(())
}

/// Wait for every scan task; returns how many targets failed. A panicked
/// task counts as failed so the remaining tasks are still awaited.
async fn drain_scans(scans: &mut JoinSet<(String, ScanStatus)>) -> usize {
    let mut failed = 0usize;
    while let Some(joined) = scans.join_next().await {
        match joined {
            Ok((target, status)) if !status.is_success() => {
                warn!(host = %target, code = status.code(), "scan of target failed");
                failed += 1;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "scan task failed");
                failed += 1;
            }
        }
    }
    failed
}

fn generate_scan_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("netstat-{secs}-{}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_scan_counts_as_failed_and_rest_are_drained() {
        let mut scans = JoinSet::new();
        scans.spawn(async { ("db1".to_string(), ScanStatus::Success) });
        scans.spawn(async { ("db2".to_string(), ScanStatus::ExecutionFailed) });
        scans.spawn(async {
            if true {
                panic!("scan blew up");
            }
            ("db3".to_string(), ScanStatus::Success)
        });

        assert_eq!(drain_scans(&mut scans).await, 2);
        assert!(scans.is_empty());
    }
}
