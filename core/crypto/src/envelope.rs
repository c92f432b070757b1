//! Wire representation of one encrypted value.
//!
//! ```json
//! { "salt": "<base64>", "iv": "<base64>", "value": "<base64>" }
//! ```
//!
//! Every field is optional at the type level so that an inbound value with
//! missing or `null` fields can still be parsed and then reported field by
//! field. Absent fields are omitted when serializing.

use serde::{Deserialize, Serialize};

use sealfield_common::Result;

/// `{salt, iv, ciphertext}` record, plus an optional opaque `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub id: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub salt: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub iv: Option<Vec<u8>>,
    #[serde(
        rename = "value",
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_bytes"
    )]
    pub ciphertext: Option<Vec<u8>>,
}

impl Envelope {
    /// Build a complete envelope.
    pub fn new(salt: Vec<u8>, iv: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self {
            id: None,
            salt: Some(salt),
            iv: Some(iv),
            ciphertext: Some(ciphertext),
        }
    }

    /// Attach an opaque identifier.
    pub fn with_id(mut self, id: Vec<u8>) -> Self {
        self.id = Some(id);
        self
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    pub fn iv(&self) -> Option<&[u8]> {
        self.iv.as_deref()
    }

    pub fn ciphertext(&self) -> Option<&[u8]> {
        self.ciphertext.as_deref()
    }

    /// True when salt, iv and ciphertext are all present.
    pub fn is_complete(&self) -> bool {
        self.salt.is_some() && self.iv.is_some() && self.ciphertext.is_some()
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse the JSON wire format. Missing fields are not an error here.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
