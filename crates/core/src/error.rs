//! Error types for privilege handling

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown privilege: {0}")]
    UnknownPrivilege(String),

    #[error("Privilege {0} is already registered with a different definition")]
    DuplicatePrivilege(String),

    #[error("Privilege {privilege} depends on unregistered privilege {dependency}")]
    UnregisteredDependency { privilege: String, dependency: String },

    #[error("Privilege {0} depends on itself")]
    CyclicDependency(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::UnknownPrivilege("NEWS_CREATE".to_string());
        assert_eq!(err.to_string(), "Unknown privilege: NEWS_CREATE");

        let err = Error::UnregisteredDependency {
            privilege: "NEWS_PUBLIC".to_string(),
            dependency: "NEWS_EDIT".to_string(),
        };
        assert!(err.to_string().contains("NEWS_EDIT"));
    }
}
