use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SCANNER_NAME: &str = "netstat";
pub const SCANNER_VERSION: &str = "depends on the local installation at the target host";

pub const SCANNER_DESCRIPTION: &str = "\
This scanner runs the tool 'netstat' on the target hosts via a ssh connection.

This tool is commonly available on most linuxoid systems and collects the open ports,
bound interfaces and processes of running services.

For executing netstat a low privileged user account is sufficient.
However, some details about high privileged services are only available with
high privileged user account.

The current version of ospd-netstat does not use such details.
It only retrieves IPv4 TCP ports that are bound to 0.0.0.0.

Optionally, the raw output table of netstat can be dumped into a log file.
This will show all detected ports in the dump.
";

/// Name of the boolean parameter that enables the raw dump log.
pub const DUMPTABLE_PARAM: &str = "dumptable";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Boolean,
}

/// A parameter the scanner exposes to operators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScannerParam {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub name: String,
    pub default: i64,
    pub mandatory: i64,
    pub description: String,
}

/// Registration data the daemon framework publishes for this scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScannerInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub server_version: String,
    /// Keyed by option name.
    pub params: BTreeMap<String, ScannerParam>,
}

impl ScannerInfo {
    /// Metadata for the netstat scanner; `server_version` is the wrapper's own version.
    pub fn netstat(server_version: &str) -> Self {
        Self {
            name: SCANNER_NAME.to_string(),
            version: SCANNER_VERSION.to_string(),
            description: SCANNER_DESCRIPTION.to_string(),
            server_version: server_version.to_string(),
            params: BTreeMap::from([(DUMPTABLE_PARAM.to_string(), dumptable_param())]),
        }
    }

    pub fn param(&self, key: &str) -> Option<&ScannerParam> {
        self.params.get(key)
    }
}

fn dumptable_param() -> ScannerParam {
    ScannerParam {
        param_type: ParamType::Boolean,
        name: "Dump the output table of netstat".to_string(),
        default: 0,
        mandatory: 0,
        description: "Whether to create a log result with the raw output table of netstat."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netstat_info_declares_dumptable() {
        let info = ScannerInfo::netstat("0.1.0");
        assert_eq!(info.name, "netstat");
        assert_eq!(info.server_version, "0.1.0");
        assert!(info.description.contains("bound to 0.0.0.0"));

        let param = info.param("dumptable").unwrap();
        assert_eq!(param.param_type, ParamType::Boolean);
        assert_eq!(param.default, 0);
        assert_eq!(param.mandatory, 0);
        assert!(info.param("missing").is_none());
    }

    #[test]
    fn param_json_structure() {
        let value = serde_json::to_value(dumptable_param()).unwrap();
        assert_eq!(value["type"], "boolean");
        assert_eq!(value["name"], "Dump the output table of netstat");
        assert_eq!(value["default"], 0);
    }

    #[test]
    fn params_serialize_as_name_keyed_object() {
        let value = serde_json::to_value(ScannerInfo::netstat("0.1.0")).unwrap();
        let params = value["params"].as_object().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params["dumptable"]["type"], "boolean");
        assert_eq!(params["dumptable"]["mandatory"], 0);
    }
}
