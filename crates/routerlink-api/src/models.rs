// Raw RouterOS records
//
// Deserialized straight from reply field-maps. Every value stays a string,
// exactly as the router sent it; interpretation (e.g. `disabled`) belongs
// to the consumer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::protocol::Record;

/// An entry from `/ppp/secret`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PppSecret {
    #[serde(rename = ".id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// `"true"` / `"false"` on every RouterOS version seen so far.
    #[serde(default)]
    pub disabled: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

/// An entry from `/ppp/active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PppActive {
    #[serde(rename = ".id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "caller-id")]
    pub caller_id: Option<String>,
    #[serde(default)]
    pub uptime: Option<String>,
}

/// Convert a reply record into a typed model.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, Error> {
    let value = serde_json::Value::Object(
        record
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect(),
    );
    serde_json::from_value::<T>(value.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}
