//! Collects IPv4 TCP listeners bound to `0.0.0.0` by running `netstat -tlpn`
//! on scan targets and reporting them to an OSP daemon's result sink.

pub mod collector;
pub mod error;
pub mod options;
pub mod parser;
pub mod sink;
pub mod ssh;
pub mod transport;
pub mod wrapper;

pub use collector::{ScanCollector, NETSTAT_COMMAND};
pub use options::{OptionValue, OptionsSource, ScanOptions};
pub use parser::{NetstatParser, OutputParser};
pub use sink::{ChannelSink, FindingSink, MemorySink};
pub use transport::{CommandResult, CommandTransport, LocalTransport, SshTransport};
pub use wrapper::NetstatWrapper;
