use crate::value::Value;
use std::collections::BTreeMap;

///
/// Item
///
/// One annotated row: the document value plus the per-row window
/// attachments the execution engine computes for window aggregates.
/// Attachments are keyed by aggregate name (`percent_rank`, `ntile`, ...).
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Item {
    value: Value,
    attachments: BTreeMap<String, Value>,
}

impl Item {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self {
            value,
            attachments: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Window attachment for one aggregate name, if the engine set one.
    #[must_use]
    pub fn window_attachment(&self, name: &str) -> Option<&Value> {
        self.attachments.get(name)
    }

    pub fn set_window_attachment(&mut self, name: impl Into<String>, attachment: Value) {
        self.attachments.insert(name.into(), attachment);
    }

    #[must_use]
    pub fn with_window_attachment(mut self, name: impl Into<String>, attachment: Value) -> Self {
        self.set_window_attachment(name, attachment);
        self
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Value> for Item {
    fn from(json: serde_json::Value) -> Self {
        Self::new(Value::from(json))
    }
}
