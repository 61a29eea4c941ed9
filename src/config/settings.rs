//! Dotted-key access to a loaded configuration.

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::ConfigError;

/// A loaded configuration addressed by dotted keys such as `"namespace.app"`.
///
/// Produced by [`Config::load`](super::Config::load). Reads deserialize the
/// stored value on demand; writes replace whatever was at the key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    table: Table,
}

impl Settings {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    /// Returns the raw value at `key`.
    pub fn value(&self, key: &str) -> Option<&Value> {
        lookup(&self.table, key)
    }

    /// Returns the value at `key` deserialized as `T`.
    ///
    /// `None` if the key is absent or its value does not have the shape of `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.value(key)?.clone();
        match value.try_into() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::debug!(key, error = %e, "config value has unexpected shape");
                None
            }
        }
    }

    /// Like [`get`](Self::get), falling back to `default`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Writes `value` at `key`, creating intermediate tables as needed.
    ///
    /// A non-table value sitting on the path is replaced by a table.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let parts = key.split('.').collect::<Vec<_>>();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }

        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;

        let mut current = &mut self.table;
        for part in parents {
            let slot = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Table(Table::new()));
            if !slot.is_table() {
                *slot = Value::Table(Table::new());
            }
            let Value::Table(next) = slot else {
                return Err(ConfigError::InvalidKey(key.to_string()));
            };
            current = next;
        }
        current.insert(last.to_string(), value.into());
        Ok(())
    }

    /// The whole store.
    pub fn all(&self) -> &Table {
        &self.table
    }

    /// Deserializes the whole store as `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Value::Table(self.table.clone())
            .try_into()
            .map_err(ConfigError::DeserializeError)
    }
}

impl From<Table> for Settings {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

/// Follows a dotted key through nested tables.
pub(crate) fn lookup<'a>(root: &'a Table, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = root.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}
