//! Replay of an ordered event sequence into current state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::event::{Event, Operation, SecretId};

/// A live secret as seen after replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    pub namespace: String,
    pub key: String,
    /// Encoded `EncryptedToken` from the winning `set`
    pub value_token: String,
    pub timestamp: DateTime<Utc>,
}

/// Mapping `namespace:key → entry`. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentState {
    entries: BTreeMap<String, StateEntry>,
}

impl CurrentState {
    pub fn get(&self, id: &SecretId) -> Option<&StateEntry> {
        self.entries.get(&id.to_string())
    }

    pub fn contains(&self, id: &SecretId) -> bool {
        self.entries.contains_key(&id.to_string())
    }

    /// Identifiers in ascending order, optionally restricted to a prefix.
    pub fn ids(&self, prefix: Option<&str>) -> Vec<String> {
        self.entries
            .keys()
            .filter(|id| prefix.map_or(true, |p| id.starts_with(p)))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StateEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replay `events` left to right.
///
/// `set` inserts or overwrites, `delete` removes if present. Pure: equal
/// inputs always give equal state.
pub fn project(events: &[Event]) -> CurrentState {
    let mut state = CurrentState::default();

    for event in events {
        match event.op {
            Operation::Set => {
                // Unvalidated set records carry no token and cannot become live.
                let Some(token) = event.val.as_ref() else {
                    continue;
                };
                state.entries.insert(
                    event.id(),
                    StateEntry {
                        namespace: event.ns.clone(),
                        key: event.key.clone(),
                        value_token: token.clone(),
                        timestamp: event.ts,
                    },
                );
            }
            Operation::Delete => {
                state.entries.remove(&event.id());
            }
        }
    }

    state
}
