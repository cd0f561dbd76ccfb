use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use typed_builder::TypedBuilder;

/// One message as handed over by the broker. `data` is the base64 payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct InboundEvent {
    #[serde(default)]
    pub data: String,
    #[builder(default)]
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,
    #[builder(default)]
    #[serde(default, rename = "publishTime")]
    pub publish_time: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
#[builder(field_defaults(setter(into)))]
pub struct InvocationContext {
    #[builder(default)]
    pub event_id: Option<String>,
    #[builder(default = Utc::now())]
    pub timestamp: DateTime<Utc>,
}

impl InvocationContext {
    pub fn from_event(event: &InboundEvent) -> Self {
        Self::builder().event_id(event.message_id.clone()).build()
    }
}

impl Default for InvocationContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<String> for InboundEvent {
    fn from(data: String) -> Self {
        Self::builder().data(data).build()
    }
}

impl From<&str> for InboundEvent {
    fn from(data: &str) -> Self {
        Self::builder().data(data).build()
    }
}
