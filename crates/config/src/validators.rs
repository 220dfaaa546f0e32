//! Value validators attached to text fields

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// A value failed conversion or validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").unwrap());
static NETADDR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[[0-9A-Fa-f:.]+\]|[A-Za-z0-9_.-]+)(:\d{1,5})?$").unwrap());

#[derive(Debug, Clone)]
pub enum Validator {
    /// Empty, or starts with a slash and does not end with one
    UrlPrefix,
    /// Absolute http or https URL
    UrlFormat,
    /// E-mail address; empty passes
    Email,
    /// `host` or `host:port`; empty passes
    NetAddr,
    /// Custom pattern
    Pattern { regex: Regex, message: String },
}

impl Validator {
    pub fn pattern(regex: Regex, message: impl Into<String>) -> Self {
        Self::Pattern {
            regex,
            message: message.into(),
        }
    }

    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        match self {
            Self::UrlPrefix => {
                if value.is_empty() {
                    return Ok(());
                }
                if !value.starts_with('/') {
                    return Err(ValidationError::new("The URL prefix must start with a slash."));
                }
                if value.ends_with('/') {
                    return Err(ValidationError::new("The URL prefix must not end with a slash."));
                }
                Ok(())
            }
            Self::UrlFormat => {
                if URL_RE.is_match(value) {
                    Ok(())
                } else {
                    Err(ValidationError::new("You have to enter a valid URL."))
                }
            }
            Self::Email => {
                if value.is_empty() || EMAIL_RE.is_match(value) {
                    Ok(())
                } else {
                    Err(ValidationError::new("You have to enter a valid e-mail address."))
                }
            }
            Self::NetAddr => {
                if value.is_empty() || is_netaddr(value) {
                    Ok(())
                } else {
                    Err(ValidationError::new("You have to enter a valid net address."))
                }
            }
            Self::Pattern { regex, message } => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(ValidationError::new(message.clone()))
                }
            }
        }
    }
}

fn is_netaddr(value: &str) -> bool {
    let Some(caps) = NETADDR_RE.captures(value) else {
        return false;
    };
    match caps.get(2) {
        Some(port) => port.as_str()[1..].parse::<u16>().is_ok(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_prefix() {
        assert!(Validator::UrlPrefix.check("").is_ok());
        assert!(Validator::UrlPrefix.check("/admin").is_ok());
        assert!(Validator::UrlPrefix.check("admin").is_err());
        assert!(Validator::UrlPrefix.check("/admin/").is_err());
    }

    #[test]
    fn test_email() {
        assert!(Validator::Email.check("").is_ok());
        assert!(Validator::Email.check("clan@example.org").is_ok());
        assert!(Validator::Email.check("not an address").is_err());
        assert!(Validator::Email.check("clan@localhost").is_err());
    }

    #[test]
    fn test_netaddr() {
        assert!(Validator::NetAddr.check("127.0.0.1:11211").is_ok());
        assert!(Validator::NetAddr.check("cache.local").is_ok());
        assert!(Validator::NetAddr.check("[::1]:11211").is_ok());
        assert!(Validator::NetAddr.check("host:99999").is_err());
        assert!(Validator::NetAddr.check("two words").is_err());
    }

    #[test]
    fn test_url_format() {
        assert!(Validator::UrlFormat.check("https://clan.example.org/").is_ok());
        assert!(Validator::UrlFormat.check("ftp://clan.example.org").is_err());
    }

    #[test]
    fn test_custom_pattern() {
        let validator = Validator::pattern(Regex::new("^[a-z]+$").unwrap(), "lowercase only");
        assert!(validator.check("theme").is_ok());
        assert_eq!(
            validator.check("Theme"),
            Err(ValidationError::new("lowercase only"))
        );
    }
}
