// ── Connection registry ──
//
// Insertion-ordered collection keyed by connection name. Order matters:
// the renderer resolves referenced connections in registry order, and the
// persisted file keeps the order the user created them in.

use std::sync::Arc;

use arc_swap::ArcSwap;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::connection::Connection;
use crate::error::CoreError;

/// Ordered connections with unique, non-empty names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionRegistry {
    entries: IndexMap<String, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a persisted list. A repeated name replaces the earlier
    /// record in place; records with empty names are skipped.
    pub fn from_connections(connections: impl IntoIterator<Item = Connection>) -> Self {
        let mut registry = Self::new();
        for conn in connections {
            if !is_blank(&conn.name) {
                registry.upsert(conn);
            }
        }
        registry
    }

    /// Append a new connection. Fails if the name is empty or taken.
    pub fn add(&mut self, connection: Connection) -> Result<(), CoreError> {
        validate_name(&connection.name)?;
        if self.entries.contains_key(&connection.name) {
            return Err(CoreError::DuplicateName {
                name: connection.name,
            });
        }
        self.entries.insert(connection.name.clone(), connection);
        Ok(())
    }

    /// Replace the connection called `name`, keeping its position.
    ///
    /// The replacement may carry a new name, as long as that name is not
    /// used by a different entry.
    pub fn update(&mut self, name: &str, connection: Connection) -> Result<(), CoreError> {
        validate_name(&connection.name)?;
        let index = self
            .entries
            .get_index_of(name)
            .ok_or_else(|| CoreError::NotFound { name: name.into() })?;

        if connection.name != name && self.entries.contains_key(&connection.name) {
            return Err(CoreError::DuplicateName {
                name: connection.name,
            });
        }

        let _ = self.entries.shift_remove_index(index);
        self.entries
            .shift_insert(index, connection.name.clone(), connection);
        Ok(())
    }

    /// Insert or replace by name. Returns `true` if the name was new.
    ///
    /// Replacement keeps the existing position; new names are appended.
    fn upsert(&mut self, connection: Connection) -> bool {
        self.entries
            .insert(connection.name.clone(), connection)
            .is_none()
    }

    /// Remove and return the connection called `name`.
    pub fn remove(&mut self, name: &str) -> Result<Connection, CoreError> {
        self.entries
            .shift_remove(name)
            .ok_or_else(|| CoreError::NotFound { name: name.into() })
    }

    pub fn get(&self, name: &str) -> Option<&Connection> {
        self.entries.get(name)
    }

    /// Connections in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Connection> {
        self.entries.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Parse the persisted JSON array.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON array, ready to write to disk.
    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if is_blank(name) {
        Err(CoreError::EmptyName)
    } else {
        Ok(())
    }
}

impl Serialize for ConnectionRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

impl<'de> Deserialize<'de> for ConnectionRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<Connection>::deserialize(deserializer)?;
        Ok(Self::from_connections(list))
    }
}

impl FromIterator<Connection> for ConnectionRegistry {
    fn from_iter<I: IntoIterator<Item = Connection>>(iter: I) -> Self {
        Self::from_connections(iter)
    }
}

// ── Shared snapshot handle ───────────────────────────────────────────

/// Copy-on-write handle used when a registry is read by a background
/// refresh while the connections file may change underneath it.
///
/// Readers take a [`snapshot`](Self::snapshot) at render start; a
/// [`replace`](Self::replace) only affects renders that start afterwards.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<ArcSwap<ConnectionRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    /// The current registry (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<ConnectionRegistry> {
        self.inner.load_full()
    }

    /// Publish a new registry.
    pub fn replace(&self, registry: ConnectionRegistry) {
        self.inner.store(Arc::new(registry));
    }
}
