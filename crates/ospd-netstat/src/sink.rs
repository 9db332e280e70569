use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use ospd_netstat_common::types::{Finding, ScanRecord};

/// Receives scan results on behalf of the daemon framework.
///
/// Append-only: callers never read back. Shared between concurrent scans,
/// so implementations must be `Send + Sync`.
pub trait FindingSink: Send + Sync {
    fn push(&self, record: ScanRecord);

    fn add_scan_log(
        &self,
        scan_id: &str,
        host: &str,
        name: &str,
        value: Option<&str>,
        port: Option<&str>,
    ) {
        self.push(ScanRecord::Log {
            scan_id: scan_id.to_string(),
            host: host.to_string(),
            name: name.to_string(),
            value: value.map(str::to_string),
            port: port.map(str::to_string),
        });
    }

    fn add_scan_error(&self, scan_id: &str, host: &str, value: &str) {
        self.push(ScanRecord::Error {
            scan_id: scan_id.to_string(),
            host: host.to_string(),
            value: value.to_string(),
        });
    }

    fn add_scan_host_detail(&self, scan_id: &str, host: &str, name: &str, value: &str) {
        self.push(ScanRecord::HostDetail {
            scan_id: scan_id.to_string(),
            host: host.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn add_finding(&self, scan_id: &str, host: &str, finding: Finding) {
        self.push(finding.into_record(scan_id, host));
    }
}

/// Keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ScanRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ScanRecord> {
        self.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|r| match r {
                ScanRecord::Error { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// Log records with the given name.
    pub fn logs_named(&self, name: &str) -> Vec<ScanRecord> {
        self.lock()
            .iter()
            .filter(|r| matches!(r, ScanRecord::Log { name: n, .. } if n == name))
            .cloned()
            .collect()
    }

    /// `(name, value)` of every host detail.
    pub fn host_details(&self) -> Vec<(String, String)> {
        self.lock()
            .iter()
            .filter_map(|r| match r {
                ScanRecord::HostDetail { name, value, .. } => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ScanRecord>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FindingSink for MemorySink {
    fn push(&self, record: ScanRecord) {
        self.lock().push(record);
    }
}

/// Forwards records to a consumer over an unbounded channel. Records sent
/// after the receiver is gone are dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<ScanRecord>,
}

impl ChannelSink {
    pub fn unbounded() -> (Self, Receiver<ScanRecord>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self { tx }, rx)
    }
}

impl FindingSink for ChannelSink {
    fn push(&self, record: ScanRecord) {
        let _ = self.tx.send(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.add_scan_log("s1", "h1", "Netstat port", None, Some("22/tcp"));
        sink.add_scan_error("s1", "h1", "oops");
        sink.add_scan_host_detail("s1", "h1", "ports", "22");

        let records = sink.records();
        assert_eq!(records.len(), 3);
        assert!(matches!(records[0], ScanRecord::Log { .. }));
        assert!(matches!(records[1], ScanRecord::Error { .. }));
        assert!(matches!(records[2], ScanRecord::HostDetail { .. }));

        assert_eq!(sink.errors(), vec!["oops".to_string()]);
        assert_eq!(sink.logs_named("Netstat port").len(), 1);
        assert!(sink.logs_named("Netstat dump").is_empty());
        assert_eq!(
            sink.host_details(),
            vec![("ports".to_string(), "22".to_string())]
        );
    }

    #[test]
    fn add_finding_renders_record() {
        let sink = MemorySink::new();
        sink.add_finding("s1", "h1", Finding::SummaryLog { count: 3 });
        let logs = sink.logs_named("Netstat summary");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].scan_id(), "s1");
        assert_eq!(logs[0].host(), "h1");
    }

    #[test]
    fn channel_sink_forwards_records() {
        let (sink, rx) = ChannelSink::unbounded();
        sink.add_scan_error("s1", "h1", "first");
        sink.add_scan_error("s1", "h1", "second");
        drop(sink);

        let values: Vec<String> = rx
            .iter()
            .map(|r| match r {
                ScanRecord::Error { value, .. } => value,
                other => panic!("unexpected record: {other:?}"),
            })
            .collect();
        assert_eq!(values, ["first", "second"]);
    }

    #[test]
    fn channel_sink_ignores_closed_receiver() {
        let (sink, rx) = ChannelSink::unbounded();
        drop(rx);
        sink.add_scan_error("s1", "h1", "nobody listens");
    }
}
