//! Field registry
//!
//! Maps keys to field descriptors. Built once per application instance:
//! core fields first, then plugin fields, then wrapped in an `Arc` and
//! handed to the [`ConfigStore`](crate::ConfigStore).

use std::collections::BTreeMap;

use crate::core_fields;
use crate::field::ConfigField;
use crate::format::normalize_key;
use crate::settings::RuntimeEnvironment;
use crate::ConfigError;

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: BTreeMap<String, ConfigField>,
}

impl FieldRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the system fields for the given environment
    pub fn with_core_fields(environment: RuntimeEnvironment) -> Self {
        let mut fields = BTreeMap::new();
        for field in core_fields::core_fields(environment) {
            fields.insert(field.key().to_string(), field);
        }
        Self { fields }
    }

    /// Add a field; `clansphere/name` is stored as `name`
    pub fn register(&mut self, field: ConfigField) -> Result<(), ConfigError> {
        let field = field.normalized();
        let key = field.key().to_string();
        if self.fields.contains_key(&key) {
            return Err(ConfigError::DuplicateField(key));
        }
        tracing::debug!(key = %key, "registered config field");
        self.fields.insert(key, field);
        Ok(())
    }

    pub fn register_all(
        &mut self,
        fields: impl IntoIterator<Item = ConfigField>,
    ) -> Result<(), ConfigError> {
        fields.into_iter().try_for_each(|field| self.register(field))
    }

    /// Look up a field; the default-section prefix is optional
    pub fn get(&self, key: &str) -> Option<&ConfigField> {
        self.fields.get(normalize_key(key))
    }

    pub fn lookup(&self, key: &str) -> Result<&ConfigField, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::UnknownKey(normalize_key(key).to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys sorted alphabetically
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigField> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
