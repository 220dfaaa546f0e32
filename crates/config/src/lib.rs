//! Configuration for a clansphere instance
//!
//! Settings live in an INI file inside the instance folder. Every key is
//! described by a [`ConfigField`] in a [`FieldRegistry`]; the [`ConfigStore`]
//! reads the file, converts values on access and writes changes through
//! single-use [`ConfigTransaction`]s.
//!
//! ```no_run
//! use clansphere_config::{load_settings, open_store};
//!
//! # fn main() -> Result<(), clansphere_config::ConfigError> {
//! let settings = load_settings(None)?;
//! let store = open_store(&settings, settings.field_registry())?;
//!
//! let mut tx = store.edit();
//! tx.set("clan_title", "Night Owls")?;
//! tx.commit()?;
//! # Ok(())
//! # }
//! ```

pub mod core_fields;
pub mod field;
pub mod format;
pub mod listing;
pub mod logging;
pub mod registry;
pub mod settings;
pub mod store;
pub mod transaction;
pub mod validators;
pub mod value;

pub use core_fields::HIDDEN_KEYS;
pub use field::{Choice, ConfigField, FieldKind};
pub use listing::{secure_database_uri, DetailCategory, DetailItem, PublicEntry};
pub use logging::init_tracing;
pub use registry::FieldRegistry;
pub use settings::{load_settings, open_store, InstanceSettings, RuntimeEnvironment};
pub use store::ConfigStore;
pub use transaction::ConfigTransaction;
pub use validators::{ValidationError, Validator};
pub use value::ConfigValue;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("This transaction was already committed")]
    AlreadyCommitted,

    #[error("Could not write configuration file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Configuration field registered twice: {0}")]
    DuplicateField(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, err: ValidationError) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: err.0,
        }
    }

    /// Failures an administrator has to fix on the host
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ConfigError::Write { .. } | ConfigError::Read { .. } | ConfigError::Logging(_)
        )
    }

    /// Guidance shown next to the error on the admin panel
    pub fn help_text(&self) -> Option<String> {
        match self {
            ConfigError::Write { path, .. } => Some(format!(
                "The configuration file ({}) could not be opened for writing. Please make \
                 sure the folder and the file are writeable by the server process.",
                path.display()
            )),
            ConfigError::Read { path, .. } => Some(format!(
                "The configuration file ({}) could not be read.",
                path.display()
            )),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_keeps_source() {
        let err = ConfigError::Write {
            path: PathBuf::from("instance/clansphere.ini"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.is_internal());
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.help_text().unwrap().contains("writeable"));
        assert_eq!(
            err.to_string(),
            "Could not write configuration file instance/clansphere.ini: denied"
        );
    }

    #[test]
    fn test_programming_errors_are_not_internal() {
        assert!(!ConfigError::AlreadyCommitted.is_internal());
        assert!(!ConfigError::UnknownKey("x".into()).is_internal());
        assert!(ConfigError::UnknownKey("x".into()).help_text().is_none());
    }
}
