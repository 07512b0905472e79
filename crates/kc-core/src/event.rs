//! Core data types for the event log.
//!
//! Secrets are never stored as a key/value table. The log holds a sequence
//! of [`Event`]s and the current state is derived by replaying them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KcError, Result};

/// Identifier of a logical secret: `namespace:key`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretId {
    namespace: String,
    key: String,
}

impl SecretId {
    /// Build an identifier from its parts, validating both.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let key = key.into();
        validate_namespace(&namespace)?;
        if key.is_empty() {
            return Err(KcError::Validation(
                "Key cannot be empty. Format: <namespace>:<name>".to_string(),
            ));
        }
        Ok(Self { namespace, key })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

impl FromStr for SecretId {
    type Err = KcError;

    /// Parse `namespace:key`. Only the first `:` separates; the key may contain more.
    fn from_str(value: &str) -> Result<Self> {
        let (namespace, key) = value.split_once(':').ok_or_else(|| {
            KcError::Validation(format!(
                "Namespace required in \"{}\". Format: <namespace>:<name> (e.g. env:myproject)",
                value
            ))
        })?;
        SecretId::new(namespace, key)
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(KcError::Validation(
            "Namespace cannot be empty. Format: <namespace>:<name>".to_string(),
        ));
    }
    let valid = namespace
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(KcError::Validation(format!(
            "Namespace \"{}\" must contain only lowercase letters, numbers, and hyphens",
            namespace
        )));
    }
    Ok(())
}

/// Kind of change recorded by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Set,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Set => f.write_str("set"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

/// One record of the event log.
///
/// Serialized as a single JSON line:
/// `{"ts":"2024-01-02T03:04:05.678Z","op":"set","ns":"env","key":"app","val":"..."}`.
/// `val` is present exactly when `op` is `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Wall-clock time of the change, UTC, millisecond resolution
    #[serde(with = "ts_millis")]
    pub ts: DateTime<Utc>,

    pub op: Operation,

    pub ns: String,

    pub key: String,

    /// Encoded `EncryptedToken` for `set` events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

impl Event {
    /// A `set` event carrying an encoded token.
    pub fn set(ts: DateTime<Utc>, id: &SecretId, token: impl Into<String>) -> Self {
        Self {
            ts: ts.trunc_subsecs(3),
            op: Operation::Set,
            ns: id.namespace.clone(),
            key: id.key.clone(),
            val: Some(token.into()),
        }
    }

    /// A `delete` tombstone.
    pub fn delete(ts: DateTime<Utc>, id: &SecretId) -> Self {
        Self {
            ts: ts.trunc_subsecs(3),
            op: Operation::Delete,
            ns: id.namespace.clone(),
            key: id.key.clone(),
            val: None,
        }
    }

    /// The `namespace:key` this event applies to.
    pub fn id(&self) -> String {
        format!("{}:{}", self.ns, self.key)
    }

    pub fn applies_to(&self, id: &SecretId) -> bool {
        self.ns == id.namespace && self.key == id.key
    }

    /// Check the record-level invariants a parsed line must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.ns.is_empty() || self.key.is_empty() {
            return Err(KcError::Validation(
                "Event namespace and key must be non-empty".to_string(),
            ));
        }
        match (self.op, self.val.is_some()) {
            (Operation::Set, false) => Err(KcError::Validation(
                "set event is missing its value".to_string(),
            )),
            (Operation::Delete, true) => Err(KcError::Validation(
                "delete event must not carry a value".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Current wall-clock time at the log's resolution.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

mod ts_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&value)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
