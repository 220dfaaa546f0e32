//! Configuration transactions
//!
//! A transaction buffers writes and reverts until [`ConfigTransaction::commit`]
//! applies them to the file and the store in one step. It is single use.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::field::ConfigField;
use crate::format::normalize_key;
use crate::store::ConfigStore;
use crate::value::ConfigValue;
use crate::{ConfigError, Result};

#[derive(Debug)]
pub struct ConfigTransaction<'a> {
    store: &'a ConfigStore,
    pending_values: BTreeMap<String, String>,
    converted: HashMap<String, ConfigValue>,
    pending_removals: BTreeSet<String>,
    committed: bool,
}

impl<'a> ConfigTransaction<'a> {
    pub(crate) fn new(store: &'a ConfigStore) -> Self {
        Self {
            store,
            pending_values: BTreeMap::new(),
            converted: HashMap::new(),
            pending_removals: BTreeSet::new(),
            committed: false,
        }
    }

    fn ensure_uncommitted(&self) -> Result<()> {
        if self.committed {
            Err(ConfigError::AlreadyCommitted)
        } else {
            Ok(())
        }
    }

    /// Value as it would be after commit
    pub fn get(&self, key: &str) -> Result<ConfigValue> {
        let key = normalize_key(key);
        if let Some(value) = self.converted.get(key) {
            return Ok(value.clone());
        }
        if self.pending_removals.contains(key) {
            return Ok(self.store.fields().lookup(key)?.default_value());
        }
        self.store.get(key)
    }

    /// Stage a typed value
    ///
    /// Nothing is staged when the value equals the current one, so a key that
    /// still follows its default keeps doing so.
    pub fn set(&mut self, key: &str, value: impl Into<ConfigValue>) -> Result<()> {
        self.ensure_uncommitted()?;
        let key = normalize_key(key);
        let field = self.store.fields().lookup(key)?;
        let value = value.into();
        let primitive = field
            .to_primitive(&value)
            .map_err(|err| ConfigError::invalid(key, err))?;

        if value == self.get(key)? {
            return Ok(());
        }
        self.stage(key, value, primitive);
        Ok(())
    }

    /// Parse `raw` with the field's conversion and stage the result
    ///
    /// With `override_` the value is staged even if it renders the same as the
    /// current one, pinning it in the file.
    pub fn set_from_string(&mut self, key: &str, raw: &str, override_: bool) -> Result<()> {
        self.ensure_uncommitted()?;
        let key = normalize_key(key);
        let field: &ConfigField = self.store.fields().lookup(key)?;
        let value = field
            .from_string(raw)
            .map_err(|err| ConfigError::invalid(key, err))?;
        let primitive = field
            .to_primitive(&value)
            .map_err(|err| ConfigError::invalid(key, err))?;

        let current = self.get(key)?;
        if override_ || field.to_primitive(&current).ok().as_deref() != Some(primitive.as_str()) {
            self.stage(key, value, primitive);
        }
        Ok(())
    }

    /// Stage a revert to the field default
    pub fn revert_to_default(&mut self, key: &str) -> Result<()> {
        self.ensure_uncommitted()?;
        let key = normalize_key(key);
        self.pending_values.remove(key);
        self.converted.remove(key);
        self.pending_removals.insert(key.to_string());
        Ok(())
    }

    pub fn update<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Result<()>
    where
        K: AsRef<str>,
        V: Into<ConfigValue>,
    {
        pairs
            .into_iter()
            .try_for_each(|(key, value)| self.set(key.as_ref(), value))
    }

    fn stage(&mut self, key: &str, value: ConfigValue, primitive: String) {
        self.pending_removals.remove(key);
        self.pending_values.insert(key.to_string(), primitive);
        self.converted.insert(key.to_string(), value);
    }

    pub fn pending_values(&self) -> &BTreeMap<String, String> {
        &self.pending_values
    }

    pub fn pending_removals(&self) -> &BTreeSet<String> {
        &self.pending_removals
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    pub fn is_empty(&self) -> bool {
        self.pending_values.is_empty() && self.pending_removals.is_empty()
    }

    /// Write the staged changes
    ///
    /// On a write error the store is unchanged and the transaction stays open,
    /// so the caller may retry or drop it.
    pub fn commit(&mut self) -> Result<()> {
        self.ensure_uncommitted()?;
        if !self.is_empty() {
            self.store
                .apply_commit(&self.pending_values, &self.pending_removals)?;
        }
        self.committed = true;
        Ok(())
    }
}
