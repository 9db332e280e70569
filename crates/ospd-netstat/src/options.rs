use std::collections::{BTreeMap, HashMap};

use ospd_netstat_common::scanner::DUMPTABLE_PARAM;
use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// A single scan option value as the framework hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl OptionValue {
    /// OSP passes booleans as `0`/`1`; operators type all sorts of things.
    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Integer(0) => Some(false),
            Self::Integer(1) => Some(true),
            Self::Integer(_) => None,
            Self::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" | "" => Some(false),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Options selected for one scan. Read once per invocation, never mutated
/// by the collector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `NAME=VALUE` strings, as given on the command line.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair
                .split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .ok_or_else(|| OptionsError::MalformedPair(pair.to_string()))?;
            options.set(name.trim(), OptionValue::Text(value.trim().to_string()));
        }
        Ok(options)
    }

    /// Parse a JSON object of scalar values.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn set(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Boolean option, `default` when unset.
    pub fn bool_option(&self, name: &str, default: bool) -> Result<bool, OptionsError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| OptionsError::InvalidBool {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn dumptable(&self) -> Result<bool, OptionsError> {
        self.bool_option(DUMPTABLE_PARAM, false)
    }
}

/// Per-scan option lookup provided by the daemon framework.
pub trait OptionsSource: Send + Sync {
    fn get_scan_options(&self, scan_id: &str) -> ScanOptions;
}

/// Unknown scan ids get default options.
impl OptionsSource for HashMap<String, ScanOptions> {
    fn get_scan_options(&self, scan_id: &str) -> ScanOptions {
        self.get(scan_id).cloned().unwrap_or_default()
    }
}

/// The same options for every scan.
impl OptionsSource for ScanOptions {
    fn get_scan_options(&self, _scan_id: &str) -> ScanOptions {
        self.clone()
    }
}
