//! Instance settings
//!
//! Where the instance lives and how it runs. Loaded from an optional settings
//! file and `CLANSPHERE__*` environment variables before the configuration
//! store is opened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::registry::FieldRegistry;
use crate::store::ConfigStore;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Errors pass through, mails are logged instead of sent
    Development,
    #[default]
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSettings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Folder holding the configuration file, logs and caches
    #[serde(default = "default_instance_folder")]
    pub instance_folder: PathBuf,

    /// Configuration file name, relative to the instance folder
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Overrides the `log_level` configuration key, e.g. `clansphere=debug`
    #[serde(default)]
    pub log_filter: Option<String>,

    /// Emit JSON log lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_instance_folder() -> PathBuf {
    PathBuf::from("instance")
}

fn default_config_file() -> String {
    "clansphere.ini".to_string()
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            environment: RuntimeEnvironment::default(),
            instance_folder: default_instance_folder(),
            config_file: default_config_file(),
            log_filter: None,
            log_json: false,
        }
    }
}

impl InstanceSettings {
    pub fn config_path(&self) -> PathBuf {
        self.resolve(&self.config_file)
    }

    /// Resolve a path from the configuration against the instance folder
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.instance_folder.join(path)
        }
    }

    /// Field registry with the core fields for this environment
    pub fn field_registry(&self) -> FieldRegistry {
        FieldRegistry::with_core_fields(self.environment)
    }
}

/// Load instance settings
///
/// Sources, later ones winning: `config/instance.{toml,yaml,json}` if present,
/// the explicit `path` if given, then `CLANSPHERE__*` environment variables.
pub fn load_settings(path: Option<&Path>) -> Result<InstanceSettings, ConfigError> {
    let mut builder =
        Config::builder().add_source(File::with_name("config/instance").required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix("CLANSPHERE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: InstanceSettings = config.try_deserialize()?;
    Ok(settings)
}

/// Open the configuration store of an instance
pub fn open_store(
    settings: &InstanceSettings,
    fields: impl Into<Arc<FieldRegistry>>,
) -> Result<ConfigStore, ConfigError> {
    ConfigStore::load(settings.config_path(), fields.into())
}
