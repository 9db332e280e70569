use serde::{Deserialize, Serialize};

/// Log name of the per-target summary entry.
pub const SUMMARY_LOG_NAME: &str = "Netstat summary";
/// Log name of a single discovered port.
pub const PORT_LOG_NAME: &str = "Netstat port";
/// Log name of the raw output dump.
pub const DUMP_LOG_NAME: &str = "Netstat dump";

/// Host detail keys. Both carry the same comma-joined port list.
pub const PORTS_DETAIL: &str = "ports";
pub const TCP_PORTS_DETAIL: &str = "tcp_ports";

const DUMP_PREFIX: &str = "Raw netstat output:\n\n";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A listening socket taken from netstat output.
///
/// `port` is kept as the text netstat printed; it is not range-checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PortFinding {
    pub protocol: Protocol,
    pub bind_addr: String,
    pub port: String,
}

impl PortFinding {
    /// `"<port>/<proto>"`, the form used in port log entries.
    pub fn label(&self) -> String {
        format!("{}/{}", self.port, self.protocol)
    }
}

/// A single result produced by one collector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    SummaryLog { count: usize },
    PortLog(PortFinding),
    DumpLog { raw: String },
    Error { message: String },
}

impl Finding {
    /// Convert into the record handed to a sink for `scan_id`/`host`.
    pub fn into_record(self, scan_id: &str, host: &str) -> ScanRecord {
        let scan_id = scan_id.to_string();
        let host = host.to_string();
        match self {
            Self::SummaryLog { count } => ScanRecord::Log {
                scan_id,
                host,
                name: SUMMARY_LOG_NAME.to_string(),
                value: Some(format!(
                    "Via Netstat {count} open tcp ports were found that are bound to local address 0.0.0.0."
                )),
                port: None,
            },
            Self::PortLog(finding) => ScanRecord::Log {
                scan_id,
                host,
                name: PORT_LOG_NAME.to_string(),
                value: None,
                port: Some(finding.label()),
            },
            Self::DumpLog { raw } => ScanRecord::Log {
                scan_id,
                host,
                name: DUMP_LOG_NAME.to_string(),
                value: Some(format!("{DUMP_PREFIX}{raw}")),
                port: None,
            },
            Self::Error { message } => ScanRecord::Error {
                scan_id,
                host,
                value: message,
            },
        }
    }
}

/// What a sink receives (one per JSON line on the wire).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanRecord {
    Log {
        scan_id: String,
        host: String,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        port: Option<String>,
    },
    Error {
        scan_id: String,
        host: String,
        value: String,
    },
    HostDetail {
        scan_id: String,
        host: String,
        name: String,
        value: String,
    },
}

impl ScanRecord {
    pub fn scan_id(&self) -> &str {
        match self {
            Self::Log { scan_id, .. }
            | Self::Error { scan_id, .. }
            | Self::HostDetail { scan_id, .. } => scan_id,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            Self::Log { host, .. } | Self::Error { host, .. } | Self::HostDetail { host, .. } => host,
        }
    }
}

/// Terminal status of one `exec_scan` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Success,
    ExecutionFailed,
}

impl ScanStatus {
    /// Status code returned to the daemon framework.
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 1,
            Self::ExecutionFailed => 2,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::ExecutionFailed => write!(f, "execution_failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssh_port() -> PortFinding {
        PortFinding {
            protocol: Protocol::Tcp,
            bind_addr: "0.0.0.0".to_string(),
            port: "22".to_string(),
        }
    }

    #[test]
    fn port_label() {
        assert_eq!(ssh_port().label(), "22/tcp");
    }

    #[test]
    fn summary_record_text() {
        let record = Finding::SummaryLog { count: 0 }.into_record("scan-1", "db1");
        assert_eq!(
            record,
            ScanRecord::Log {
                scan_id: "scan-1".to_string(),
                host: "db1".to_string(),
                name: "Netstat summary".to_string(),
                value: Some(
                    "Via Netstat 0 open tcp ports were found that are bound to local address 0.0.0.0."
                        .to_string()
                ),
                port: None,
            }
        );
    }

    #[test]
    fn port_record_carries_port_not_value() {
        let record = Finding::PortLog(ssh_port()).into_record("s", "h");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "log");
        assert_eq!(value["name"], "Netstat port");
        assert_eq!(value["port"], "22/tcp");
        assert!(value.get("value").is_none());
    }

    #[test]
    fn dump_record_is_prefixed() {
        let record = Finding::DumpLog {
            raw: "line one\nline two\n".to_string(),
        }
        .into_record("s", "h");
        match record {
            ScanRecord::Log { name, value, .. } => {
                assert_eq!(name, "Netstat dump");
                assert_eq!(
                    value.as_deref(),
                    Some("Raw netstat output:\n\nline one\nline two\n")
                );
            }
            other => panic!("unexpected record: {other:?}"),
        }
    }

    #[test]
    fn error_record_json_structure() {
        let record = Finding::Error {
            message: "boom".to_string(),
        }
        .into_record("scan-9", "web1");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["kind"], "error");
        assert_eq!(value["scan_id"], "scan-9");
        assert_eq!(value["host"], "web1");
        assert_eq!(value["value"], "boom");
    }

    #[test]
    fn host_detail_json_structure() {
        let record = ScanRecord::HostDetail {
            scan_id: "s".to_string(),
            host: "h".to_string(),
            name: TCP_PORTS_DETAIL.to_string(),
            value: "22, 80".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"host_detail","scan_id":"s","host":"h","name":"tcp_ports","value":"22, 80"}"#
        );
        assert_eq!(record.scan_id(), "s");
        assert_eq!(record.host(), "h");
    }

    #[test]
    fn status_codes() {
        assert_eq!(ScanStatus::Success.code(), 1);
        assert_eq!(ScanStatus::ExecutionFailed.code(), 2);
        assert!(ScanStatus::Success.is_success());
        assert!(!ScanStatus::ExecutionFailed.is_success());
    }

    #[test]
    fn protocol_serialization() {
        assert_eq!(serde_json::to_string(&Protocol::Tcp).unwrap(), "\"tcp\"");
    }
}
