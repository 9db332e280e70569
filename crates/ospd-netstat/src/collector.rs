use ospd_netstat_common::types::{Finding, ScanStatus, PORTS_DETAIL, TCP_PORTS_DETAIL};
use tracing::{debug, info, warn};

use crate::options::ScanOptions;
use crate::parser::OutputParser;
use crate::sink::FindingSink;
use crate::transport::CommandTransport;

/// The single command run on every target.
pub const NETSTAT_COMMAND: &str = "netstat -tlpn";

pub const EXEC_FAILED_MESSAGE: &str = "A problem occurred trying to execute 'netstat'.";
pub const EMPTY_RESULT_MESSAGE: &str = "The result of 'netstat' was empty.";

/// Runs netstat on one target and reports what it found.
///
/// Holds no state between calls; one `collect` is one independent unit of
/// work and any number may run concurrently over the same capabilities.
pub struct ScanCollector<'a> {
    transport: &'a dyn CommandTransport,
    parser: &'a dyn OutputParser,
    sink: &'a dyn FindingSink,
}

impl<'a> ScanCollector<'a> {
    pub fn new(
        transport: &'a dyn CommandTransport,
        parser: &'a dyn OutputParser,
        sink: &'a dyn FindingSink,
    ) -> Self {
        Self {
            transport,
            parser,
            sink,
        }
    }

    pub async fn collect(&self, scan_id: &str, target: &str, options: &ScanOptions) -> ScanStatus {
        let dump = options.dumptable().unwrap_or_else(|e| {
            warn!(scan_id, host = target, error = %e, "ignoring dumptable option");
            false
        });

        let Some(result) = self.transport.run(target, NETSTAT_COMMAND).await else {
            // Both errors are reported on purpose
            self.error(scan_id, target, EXEC_FAILED_MESSAGE);
            self.error(scan_id, target, EMPTY_RESULT_MESSAGE);
            info!(scan_id, host = target, status = %ScanStatus::ExecutionFailed, "netstat scan finished");
            return ScanStatus::ExecutionFailed;
        };

        let ports = self.parser.parse(&result);
        debug!(
            scan_id,
            host = target,
            lines = result.lines().len(),
            ports = ports.len(),
            "parsed netstat output"
        );

        // Sent even for zero ports, otherwise the framework stores no host details
        self.sink
            .add_finding(scan_id, target, Finding::SummaryLog { count: ports.len() });

        for port in &ports {
            self.sink
                .add_finding(scan_id, target, Finding::PortLog(port.clone()));
        }

        if dump {
            self.sink.add_finding(
                scan_id,
                target,
                Finding::DumpLog {
                    raw: result.raw_text().to_string(),
                },
            );
        }

        if !ports.is_empty() {
            let joined = ports
                .iter()
                .map(|p| p.port.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            self.sink
                .add_scan_host_detail(scan_id, target, PORTS_DETAIL, &joined);
            self.sink
                .add_scan_host_detail(scan_id, target, TCP_PORTS_DETAIL, &joined);
        }

        info!(scan_id, host = target, ports = ports.len(), status = %ScanStatus::Success, "netstat scan finished");
        ScanStatus::Success
    }

    fn error(&self, scan_id: &str, target: &str, message: &str) {
        self.sink.add_finding(
            scan_id,
            target,
            Finding::Error {
                message: message.to_string(),
            },
        );
    }
}
