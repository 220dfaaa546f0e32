//! Configuration field descriptors
//!
//! A field describes one key: its kind, default, validators and help text.
//! It converts the raw strings found in the file into [`ConfigValue`]s and
//! back.

use crate::format::{normalize_key, split_key, DEFAULT_SECTION};
use crate::validators::{ValidationError, Validator};
use crate::value::ConfigValue;

/// One entry of a choice field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

impl From<&str> for Choice {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Choice(Vec<Choice>),
    /// Comma separated list of text items
    CommaSeparated,
}

#[derive(Debug, Clone)]
pub struct ConfigField {
    key: String,
    kind: FieldKind,
    default: ConfigValue,
    validators: Vec<Validator>,
    help_text: Option<String>,
}

impl ConfigField {
    fn with_kind(key: impl Into<String>, kind: FieldKind, default: ConfigValue) -> Self {
        Self {
            key: key.into(),
            kind,
            default,
            validators: Vec::new(),
            help_text: None,
        }
    }

    pub fn text(key: impl Into<String>, default: impl Into<String>) -> Self {
        Self::with_kind(key, FieldKind::Text, ConfigValue::Text(default.into()))
    }

    pub fn integer(key: impl Into<String>, default: i64) -> Self {
        Self::with_kind(
            key,
            FieldKind::Integer { min: None, max: None },
            ConfigValue::Integer(default),
        )
    }

    pub fn boolean(key: impl Into<String>, default: bool) -> Self {
        Self::with_kind(key, FieldKind::Boolean, ConfigValue::Boolean(default))
    }

    pub fn choice<C: Into<Choice>>(
        key: impl Into<String>,
        choices: impl IntoIterator<Item = C>,
        default: impl Into<String>,
    ) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        Self::with_kind(key, FieldKind::Choice(choices), ConfigValue::Text(default.into()))
    }

    pub fn comma_separated(key: impl Into<String>, default: Vec<String>) -> Self {
        Self::with_kind(key, FieldKind::CommaSeparated, ConfigValue::List(default))
    }

    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Validators run on text values and on every item of a list
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Lower bound for integer fields; ignored for other kinds
    pub fn with_min(mut self, value: i64) -> Self {
        if let FieldKind::Integer { min, .. } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    /// Upper bound for integer fields; ignored for other kinds
    pub fn with_max(mut self, value: i64) -> Self {
        if let FieldKind::Integer { max, .. } = &mut self.kind {
            *max = Some(value);
        }
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Same field with the default-section prefix stripped from its key
    pub(crate) fn normalized(mut self) -> Self {
        let key = normalize_key(&self.key);
        if key.len() != self.key.len() {
            self.key = key.to_string();
        }
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn default_value(&self) -> ConfigValue {
        self.default.clone()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref()
    }

    /// Section the key lives in
    pub fn category(&self) -> &str {
        split_key(&self.key).0
    }

    /// Key without its section
    pub fn name(&self) -> &str {
        split_key(&self.key).1
    }

    pub fn is_global(&self) -> bool {
        self.category() == DEFAULT_SECTION
    }

    /// Convert a stored string into a typed value
    pub fn from_string(&self, raw: &str) -> Result<ConfigValue, ValidationError> {
        let value = match &self.kind {
            FieldKind::Text => ConfigValue::Text(raw.to_string()),
            FieldKind::Integer { .. } => raw
                .trim()
                .parse::<i64>()
                .map(ConfigValue::Integer)
                .map_err(|_| ValidationError::new("Please enter a whole number."))?,
            FieldKind::Boolean => ConfigValue::Boolean(parse_bool(raw)?),
            FieldKind::Choice(_) => ConfigValue::Text(raw.to_string()),
            FieldKind::CommaSeparated => ConfigValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        };
        self.validate(&value)?;
        Ok(value)
    }

    /// Render a typed value into the string stored in the file
    pub fn to_primitive(&self, value: &ConfigValue) -> Result<String, ValidationError> {
        self.validate(value)?;
        Ok(match value {
            ConfigValue::Boolean(b) => b.to_string(),
            ConfigValue::Integer(i) => i.to_string(),
            ConfigValue::Text(s) => s.clone(),
            ConfigValue::List(items) => items.join(", "),
        })
    }

    /// Check that a value has the right kind and passes every validator
    pub fn validate(&self, value: &ConfigValue) -> Result<(), ValidationError> {
        match (&self.kind, value) {
            (FieldKind::Text, ConfigValue::Text(s)) => self.run_validators(s),
            (FieldKind::Integer { min, max }, ConfigValue::Integer(i)) => {
                if let Some(min) = min {
                    if i < min {
                        return Err(ValidationError(format!(
                            "Ensure this value is greater than or equal to {min}."
                        )));
                    }
                }
                if let Some(max) = max {
                    if i > max {
                        return Err(ValidationError(format!(
                            "Ensure this value is less than or equal to {max}."
                        )));
                    }
                }
                Ok(())
            }
            (FieldKind::Boolean, ConfigValue::Boolean(_)) => Ok(()),
            (FieldKind::Choice(choices), ConfigValue::Text(s)) => {
                if choices.iter().any(|choice| &choice.value == s) {
                    Ok(())
                } else {
                    Err(ValidationError(format!("Please enter a valid choice, not {s:?}.")))
                }
            }
            (FieldKind::CommaSeparated, ConfigValue::List(items)) => {
                items.iter().try_for_each(|item| self.run_validators(item))
            }
            (_, other) => Err(ValidationError(format!(
                "Expected a {} value, got {}.",
                self.kind_name(),
                other.type_name()
            ))),
        }
    }

    fn run_validators(&self, value: &str) -> Result<(), ValidationError> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.check(value))
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Text | FieldKind::Choice(_) => "text",
            FieldKind::Integer { .. } => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::CommaSeparated => "list",
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ValidationError::new("Please enter true or false.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversion() {
        let field = ConfigField::integer("cache_timeout", 300).with_min(10);

        assert_eq!(field.from_string(" 60 "), Ok(ConfigValue::Integer(60)));
        assert!(field.from_string("abc").is_err());
        assert!(field.from_string("5").is_err());
        assert_eq!(field.to_primitive(&ConfigValue::Integer(60)).unwrap(), "60");
    }

    #[test]
    fn test_boolean_conversion() {
        let field = ConfigField::boolean("force_https", false);

        assert_eq!(field.from_string("True"), Ok(ConfigValue::Boolean(true)));
        assert_eq!(field.from_string("off"), Ok(ConfigValue::Boolean(false)));
        assert!(field.from_string("maybe").is_err());
        assert_eq!(field.to_primitive(&ConfigValue::Boolean(true)).unwrap(), "true");
    }

    #[test]
    fn test_choice_conversion() {
        let field = ConfigField::choice("cache_system", ["null", "simple"], "null");

        assert_eq!(field.from_string("simple"), Ok(ConfigValue::from("simple")));
        assert!(field.from_string("redis").is_err());
    }

    #[test]
    fn test_comma_separated() {
        let field = ConfigField::comma_separated("memcached_servers", Vec::new())
            .with_validator(Validator::NetAddr);

        assert_eq!(
            field.from_string("a:1, b:2,,"),
            Ok(ConfigValue::from(vec!["a:1", "b:2"]))
        );
        assert!(field.from_string("a:1, not valid").is_err());
        assert_eq!(
            field.to_primitive(&ConfigValue::from(vec!["a:1", "b:2"])).unwrap(),
            "a:1, b:2"
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let field = ConfigField::text("theme", "default");
        let err = field.to_primitive(&ConfigValue::Integer(3)).unwrap_err();
        assert_eq!(err.to_string(), "Expected a text value, got integer.");
    }

    #[test]
    fn test_category_and_name() {
        let field = ConfigField::integer("news/per_page", 10);
        assert_eq!(field.category(), "news");
        assert_eq!(field.name(), "per_page");
        assert!(!field.is_global());

        let field = ConfigField::text("theme", "default");
        assert_eq!(field.category(), DEFAULT_SECTION);
        assert!(field.is_global());
    }
}
