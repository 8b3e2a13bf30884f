//! Reference host for the lumina grid: action scripts, exporters and
//! terminal output.

pub mod exporters;
pub mod script;
pub mod table;

use log::info;
use lumina::HostBridge;
use serde_json::Value;

/// Bridge that logs every host message.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBridge;

impl HostBridge for LogBridge {
    fn emit(&mut self, channel: &str, payload: Value) {
        info!("{}: {}", channel, payload);
    }
}
