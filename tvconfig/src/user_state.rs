//! Persisted user state
//!
//! Sources keep small, user-owned lists (favourite channels, merge
//! selections) outside of their own data. [`UserState`] is the access
//! pattern they rely on: get, set, append-if-absent and remove-if-present.
//!
//! - [`UserData`] stores lists in the YAML configuration under
//!   `userdata.<namespace>.<key>`.
//! - [`MemoryUserState`] keeps them in memory (tests, ephemeral hosts).

use crate::Config;
use anyhow::{anyhow, Result};
use serde_yaml::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Accessor for user-owned string lists
pub trait UserState: Send + Sync {
    /// Returns the list stored under `key`, or an empty list
    fn get_list(&self, key: &str) -> Result<Vec<String>>;

    /// Replaces the list stored under `key`
    fn set_list(&self, key: &str, values: &[String]) -> Result<()>;

    /// Appends `value` unless already present
    ///
    /// Returns `true` when the list changed.
    fn append_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        let mut values = self.get_list(key)?;
        if values.iter().any(|v| v == value) {
            return Ok(false);
        }
        values.push(value.to_string());
        self.set_list(key, &values)?;
        Ok(true)
    }

    /// Removes `value` if present
    ///
    /// Returns `true` when the list changed.
    fn remove_if_present(&self, key: &str, value: &str) -> Result<bool> {
        let mut values = self.get_list(key)?;
        let before = values.len();
        values.retain(|v| v != value);
        if values.len() == before {
            return Ok(false);
        }
        self.set_list(key, &values)?;
        Ok(true)
    }
}

/// User state stored in the YAML configuration
///
/// # Example
///
/// ```no_run
/// use tvconfig::{get_config, UserData, UserState};
///
/// let state = UserData::new(get_config(), "stirr");
/// state.append_if_absent("favourites", "abc")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct UserData {
    config: Arc<Config>,
    namespace: String,
}

impl UserData {
    pub fn new(config: Arc<Config>, namespace: impl Into<String>) -> Self {
        Self {
            config,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl UserState for UserData {
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        match self.config.get_value(&["userdata", &self.namespace, key]) {
            Ok(Value::Sequence(seq)) => Ok(seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()),
            Ok(Value::Null) | Err(_) => Ok(Vec::new()),
            Ok(other) => Err(anyhow!(
                "userdata.{}.{} is not a list: {:?}",
                self.namespace,
                key,
                other
            )),
        }
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        let seq = values.iter().cloned().map(Value::String).collect();
        self.config
            .set_value(&["userdata", &self.namespace, key], Value::Sequence(seq))
    }
}

/// In-memory user state
#[derive(Debug, Default)]
pub struct MemoryUserState {
    lists: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryUserState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserState for MemoryUserState {
    fn get_list(&self, key: &str) -> Result<Vec<String>> {
        let lists = self
            .lists
            .lock()
            .map_err(|_| anyhow!("user state lock poisoned"))?;
        Ok(lists.get(key).cloned().unwrap_or_default())
    }

    fn set_list(&self, key: &str, values: &[String]) -> Result<()> {
        let mut lists = self
            .lists
            .lock()
            .map_err(|_| anyhow!("user state lock poisoned"))?;
        lists.insert(key.to_string(), values.to_vec());
        Ok(())
    }
}
