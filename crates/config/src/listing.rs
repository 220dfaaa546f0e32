//! Listings for the configuration editor and the public system report

use serde::Serialize;

use crate::core_fields::HIDDEN_KEYS;
use crate::format::DEFAULT_SECTION;
use crate::store::ConfigStore;
use crate::value::ConfigValue;
use crate::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailItem {
    pub name: String,
    pub key: String,
    /// Value as stored in the file
    pub value: String,
    pub use_default: bool,
    pub help_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailCategory {
    pub name: String,
    pub items: Vec<DetailItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicEntry {
    pub key: String,
    pub default: String,
    pub value: String,
}

fn category_order(name: &str) -> (bool, String) {
    (
        name != DEFAULT_SECTION,
        name.to_lowercase().trim_start_matches('_').to_string(),
    )
}

/// Replace the password of a database URI with `***`
pub fn secure_database_uri(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://") else {
        return uri.to_string();
    };
    let rest_start = scheme_end + 3;
    let rest = &uri[rest_start..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return uri.to_string();
    };
    let Some(colon) = rest[..at].find(':') else {
        return uri.to_string();
    };

    format!(
        "{}{}:***{}",
        &uri[..rest_start],
        &rest[..colon],
        &rest[at..]
    )
}

impl ConfigStore {
    /// Fields grouped by section for the advanced editor
    ///
    /// The default section comes first, the others sort case-insensitively
    /// ignoring leading underscores.
    pub fn detail_list(&self) -> Result<Vec<DetailCategory>> {
        let mut categories: Vec<DetailCategory> = Vec::new();
        for field in self.fields().iter() {
            let value = self.get(field.key())?;
            let item = DetailItem {
                name: field.name().to_string(),
                key: field.key().to_string(),
                value: field
                    .to_primitive(&value)
                    .map_err(|err| ConfigError::invalid(field.key(), err))?,
                use_default: self.is_default(field.key()),
                help_text: field.help_text().map(str::to_string),
            };
            match categories.iter().position(|c| c.name == field.category()) {
                Some(idx) => categories[idx].items.push(item),
                None => categories.push(DetailCategory {
                    name: field.category().to_string(),
                    items: vec![item],
                }),
            }
        }

        categories.sort_by_cached_key(|c| category_order(&c.name));
        for category in &mut categories {
            category.items.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(categories)
    }

    pub fn public_list(&self, hide_insecure: bool) -> Result<Vec<PublicEntry>> {
        self.public_list_with(hide_insecure, |_, _| None)
    }

    /// Every field with its default and current value rendered as JSON
    ///
    /// With `hide_insecure`, hidden keys are masked and the database URI loses
    /// its password. Other values are offered to `cloak` first; a `Some` from
    /// it replaces the rendering.
    pub fn public_list_with<F>(&self, hide_insecure: bool, cloak: F) -> Result<Vec<PublicEntry>>
    where
        F: Fn(&str, &ConfigValue) -> Option<String>,
    {
        let mut result = Vec::with_capacity(self.fields().len());
        for field in self.fields().iter() {
            let key = field.key();
            let value = self.get(key)?;
            let rendered = if !hide_insecure {
                value.repr()
            } else if HIDDEN_KEYS.contains(&key) {
                "****".to_string()
            } else if key == "database_uri" {
                ConfigValue::Text(secure_database_uri(value.as_str().unwrap_or_default())).repr()
            } else {
                cloak(key, &value).unwrap_or_else(|| value.repr())
            };
            result.push(PublicEntry {
                key: key.to_string(),
                default: field.default_value().repr(),
                value: rendered,
            });
        }
        result.sort_by_cached_key(|entry| entry.key.to_lowercase());
        Ok(result)
    }
}
