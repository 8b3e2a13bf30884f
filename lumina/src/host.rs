//! Reporting to the embedding application.

use serde_json::Map;
use serde_json::Value;

use crate::model::Dataset;
use crate::model::ROW_INDEX_COLUMN;
use crate::selection::SelectionState;

/// Channel the embedding application listens on.
pub trait HostBridge {
    fn emit(&mut self, channel: &str, payload: Value);
}

/// Bridge that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBridge;

impl HostBridge for NullBridge {
    fn emit(&mut self, channel: &str, _payload: Value) {
        log::trace!("no host bridge, dropping message on {}", channel);
    }
}

/// Bridge that keeps every message, for hosts that poll.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    pub messages: Vec<(String, Value)>,
}

impl HostBridge for RecordingBridge {
    fn emit(&mut self, channel: &str, payload: Value) {
        self.messages.push((channel.to_string(), payload));
    }
}

/// Name of the selection channel for a grid element.
pub fn selection_channel(element_id: &str) -> String {
    format!("{}_selected", element_id)
}

/// Selected rows as `{column: value, ..., "__rowIndex__": id}` objects in
/// ascending identity order.
pub fn selection_payload(dataset: &Dataset, selection: &SelectionState) -> Value {
    let columns = dataset.columns().names();
    let rows = selection
        .selected()
        .filter_map(|id| dataset.row(id))
        .map(|row| {
            let mut object: Map<String, Value> = columns
                .iter()
                .zip(row.cells())
                .map(|(c, v)| (c.clone(), v.to_json()))
                .collect();
            object.insert(ROW_INDEX_COLUMN.to_string(), Value::from(row.id().get()));
            Value::Object(object)
        })
        .collect();
    Value::Array(rows)
}
