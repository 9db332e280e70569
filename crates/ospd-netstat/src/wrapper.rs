use std::sync::Arc;

use ospd_netstat_common::scanner::ScannerInfo;
use ospd_netstat_common::types::ScanStatus;

use crate::collector::ScanCollector;
use crate::options::{OptionsSource, ScanOptions};
use crate::parser::NetstatParser;
use crate::sink::FindingSink;
use crate::transport::CommandTransport;

/// The netstat scanner as the daemon framework sees it: metadata, an
/// availability check, and one entry point per (scan, target).
pub struct NetstatWrapper {
    transport: Arc<dyn CommandTransport>,
    sink: Arc<dyn FindingSink>,
    options: Arc<dyn OptionsSource>,
    parser: NetstatParser,
    info: ScannerInfo,
}

impl NetstatWrapper {
    pub fn new(
        transport: Arc<dyn CommandTransport>,
        sink: Arc<dyn FindingSink>,
        options: Arc<dyn OptionsSource>,
    ) -> Self {
        Self {
            transport,
            sink,
            options,
            parser: NetstatParser,
            info: ScannerInfo::netstat(env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn scanner_info(&self) -> &ScannerInfo {
        &self.info
    }

    /// netstat runs on each target, so there is no single place to check for
    /// it up front. Always available.
    pub fn check(&self) -> bool {
        true
    }

    pub fn get_scan_options(&self, scan_id: &str) -> ScanOptions {
        self.options.get_scan_options(scan_id)
    }

    pub async fn exec_scan(&self, scan_id: &str, target: &str) -> ScanStatus {
        let options = self.get_scan_options(scan_id);
        ScanCollector::new(self.transport.as_ref(), &self.parser, self.sink.as_ref())
            .collect(scan_id, target, &options)
            .await
    }
}
