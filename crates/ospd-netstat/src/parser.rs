// Pure netstat output parsing — no I/O, testable on any platform.

use ospd_netstat_common::types::{PortFinding, Protocol};

use crate::transport::CommandResult;

/// Wildcard IPv4 bind address; the only one reported.
pub const ALL_INTERFACES: &str = "0.0.0.0";

/// Rows with fewer fields than this are never candidates.
const MIN_FIELDS: usize = 3;

/// Turns raw command output into port findings.
pub trait OutputParser: Send + Sync {
    fn parse(&self, result: &CommandResult) -> Vec<PortFinding>;
}

/// One whitespace-tokenized row of `netstat -tlpn` output:
///
/// ```text
/// Proto Recv-Q Send-Q Local Address  Foreign Address  State   PID/Program name
/// tcp        0      0 0.0.0.0:22     0.0.0.0:*        LISTEN  812/sshd
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetstatLine<'a> {
    fields: Vec<&'a str>,
}

impl<'a> NetstatLine<'a> {
    /// Split a row on runs of whitespace. Rows too short to be a socket
    /// entry (banners, blank lines) yield `None`.
    pub fn tokenize(line: &'a str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }
        Some(Self { fields })
    }

    pub fn proto(&self) -> &'a str {
        self.fields[0]
    }

    /// `address:port` column, absent on truncated rows.
    pub fn local_address(&self) -> Option<&'a str> {
        self.fields.get(3).copied()
    }
}

/// Split `address:port` on the first colon. IPv4 only: an IPv6 address would
/// be cut at its first group, which is why only `tcp` rows are considered.
fn split_local_address(field: &str) -> Option<(&str, &str)> {
    let mut parts = field.split(':');
    let addr = parts.next()?;
    let port = parts.next()?;
    Some((addr, port))
}

/// Extracts IPv4 TCP listeners bound to `0.0.0.0`.
///
/// Port text passes through as printed. Malformed rows are skipped, order
/// and duplicates are preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetstatParser;

impl NetstatParser {
    fn finding(line: &str) -> Option<PortFinding> {
        let row = NetstatLine::tokenize(line)?;
        if row.proto() != Protocol::Tcp.as_str() {
            return None;
        }
        let (addr, port) = split_local_address(row.local_address()?)?;
        if addr != ALL_INTERFACES {
            return None;
        }
        Some(PortFinding {
            protocol: Protocol::Tcp,
            bind_addr: addr.to_string(),
            port: port.to_string(),
        })
    }
}

impl OutputParser for NetstatParser {
    fn parse(&self, result: &CommandResult) -> Vec<PortFinding> {
        result
            .lines()
            .iter()
            .filter_map(|line| Self::finding(line))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_NETSTAT: &str = "\
Active Internet connections (only servers)
Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name
tcp        0      0 0.0.0.0:22              0.0.0.0:*               LISTEN      812/sshd
tcp        0      0 127.0.0.1:5432          0.0.0.0:*               LISTEN      1044/postgres
tcp        0      0 0.0.0.0:80              0.0.0.0:*               LISTEN      930/nginx
tcp        0      0 192.168.1.5:8080        0.0.0.0:*               LISTEN      2210/java
tcp6       0      0 :::22                   :::*                    LISTEN      812/sshd
tcp6       0      0 :::80                   :::*                    LISTEN      930/nginx
";

    fn ports(text: &str) -> Vec<String> {
        NetstatParser
            .parse(&CommandResult::from_text(text))
            .into_iter()
            .map(|f| f.port)
            .collect()
    }

    #[test]
    fn parse_sample_listeners() {
        let findings = NetstatParser.parse(&CommandResult::from_text(SAMPLE_NETSTAT));
        assert_eq!(findings.len(), 2);

        assert_eq!(findings[0].port, "22");
        assert_eq!(findings[0].bind_addr, "0.0.0.0");
        assert_eq!(findings[0].protocol, Protocol::Tcp);

        assert_eq!(findings[1].port, "80");
    }

    #[test]
    fn tcp6_rows_are_ignored() {
        let result: CommandResult = [
            "tcp 0 0 0.0.0.0:22 0.0.0.0:* LISTEN 123/sshd",
            "tcp6 0 0 :::80 :::* LISTEN 456/nginx",
        ]
        .into_iter()
        .collect();
        let findings = NetstatParser.parse(&result);
        assert_eq!(
            findings,
            vec![PortFinding {
                protocol: Protocol::Tcp,
                bind_addr: "0.0.0.0".to_string(),
                port: "22".to_string(),
            }]
        );
    }

    #[test]
    fn non_wildcard_addresses_are_ignored() {
        let text = "\
tcp 0 0 127.0.0.1:631 0.0.0.0:* LISTEN -
tcp 0 0 192.168.1.5:22 0.0.0.0:* LISTEN -
tcp 0 0 10.0.0.0:22 0.0.0.0:* LISTEN -
tcp 0 0 0.0.0.00:22 0.0.0.0:* LISTEN -
";
        assert!(ports(text).is_empty());
    }

    #[test]
    fn order_and_duplicates_are_preserved() {
        let text = "\
tcp 0 0 0.0.0.0:8080 0.0.0.0:* LISTEN -
tcp 0 0 0.0.0.0:22 0.0.0.0:* LISTEN -
tcp 0 0 0.0.0.0:8080 0.0.0.0:* LISTEN -
";
        assert_eq!(ports(text), ["8080", "22", "8080"]);
    }

    #[test]
    fn proto_match_is_case_sensitive() {
        assert!(ports("TCP 0 0 0.0.0.0:22 0.0.0.0:* LISTEN -").is_empty());
        assert!(ports("udp 0 0 0.0.0.0:53 0.0.0.0:* -").is_empty());
    }

    #[test]
    fn whitespace_runs_are_collapsed() {
        assert_eq!(
            ports("  tcp\t\t0   0\t0.0.0.0:443     0.0.0.0:*  LISTEN   77/haproxy  "),
            ["443"]
        );
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let text = "\
tcp
tcp 0
tcp 0 0
tcp 0 0 0.0.0.0 0.0.0.0:* LISTEN -
tcp 0 0 0.0.0.0:25 0.0.0.0:* LISTEN -
";
        assert_eq!(ports(text), ["25"]);
    }

    #[test]
    fn port_text_passes_through() {
        assert_eq!(ports("tcp 0 0 0.0.0.0:ssh 0.0.0.0:* LISTEN -"), ["ssh"]);
        assert_eq!(ports("tcp 0 0 0.0.0.0: 0.0.0.0:* LISTEN -"), [""]);
    }

    #[test]
    fn splits_on_first_colon() {
        assert_eq!(split_local_address("0.0.0.0:22"), Some(("0.0.0.0", "22")));
        assert_eq!(split_local_address("0.0.0.0:22:9"), Some(("0.0.0.0", "22")));
        assert_eq!(split_local_address(":::22"), Some(("", "")));
        assert_eq!(split_local_address("0.0.0.0"), None);
    }

    #[test]
    fn tokenize_requires_three_fields() {
        assert!(NetstatLine::tokenize("").is_none());
        assert!(NetstatLine::tokenize("tcp 0").is_none());

        let row = NetstatLine::tokenize("tcp 0 0").unwrap();
        assert_eq!(row.proto(), "tcp");
        assert_eq!(row.local_address(), None);

        let row = NetstatLine::tokenize("tcp 0 0 0.0.0.0:22 0.0.0.0:* LISTEN -").unwrap();
        assert_eq!(row.local_address(), Some("0.0.0.0:22"));
    }

    #[test]
    fn parse_empty_and_header_only() {
        assert!(ports("").is_empty());
        assert!(ports(
            "Active Internet connections (only servers)\nProto Recv-Q Send-Q Local Address Foreign Address State PID/Program name\n"
        )
        .is_empty());
    }
}
