//! Typed key lookups over a raw settings block.

use serde_yaml::{Mapping, Value};

use crate::error::{ConfigurationMalformed, Result};

/// Source of raw, string-keyed settings with typed accessors.
///
/// Absent keys and explicit `null` values are both reported as `None`.
/// A value of the wrong type is an error, never silently ignored.
pub trait SettingsSource {
    /// Whether `key` carries a non-null value, whatever its type.
    fn contains(&self, key: &str) -> bool;

    fn string_opt(&self, key: &str) -> Result<Option<String>>;

    fn int_opt(&self, key: &str) -> Result<Option<i64>>;

    fn boolean_opt(&self, key: &str) -> Result<Option<bool>>;

    /// A list of strings. An empty list is treated as absent.
    fn not_empty_list_opt(&self, key: &str) -> Result<Option<Vec<String>>>;

    /// Same as [`SettingsSource::string_opt`] but fails when the key is absent.
    fn string_req(&self, key: &str) -> Result<String> {
        self.string_opt(key)?
            .ok_or_else(|| ConfigurationMalformed::MissingField { key: key.into() })
    }
}

/// Settings block backed by a YAML mapping.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawSettings {
    inner: Mapping,
}

impl RawSettings {
    /// Wrap an already parsed YAML mapping.
    pub fn new(inner: Mapping) -> Self {
        Self { inner }
    }

    /// Parse a single YAML mapping.
    pub fn from_yaml(source: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source).map(Self::new)
    }

    fn value(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).filter(|value| !value.is_null())
    }
}

fn invalid(key: &str, expected: &'static str) -> ConfigurationMalformed {
    ConfigurationMalformed::InvalidType {
        key: key.into(),
        expected,
    }
}

impl SettingsSource for RawSettings {
    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    fn string_opt(&self, key: &str) -> Result<Option<String>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(invalid(key, "a string")),
        }
    }

    fn int_opt(&self, key: &str) -> Result<Option<i64>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Number(n)) => {
                n.as_i64().map(Some).ok_or_else(|| invalid(key, "an integer"))
            },
            Some(_) => Err(invalid(key, "an integer")),
        }
    }

    fn boolean_opt(&self, key: &str) -> Result<Option<bool>> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(invalid(key, "a boolean")),
        }
    }

    fn not_empty_list_opt(&self, key: &str) -> Result<Option<Vec<String>>> {
        let items = match self.value(key) {
            None => return Ok(None),
            Some(Value::Sequence(items)) => items,
            Some(_) => return Err(invalid(key, "a list of strings")),
        };

        let list = items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(invalid(key, "a list of strings")),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((!list.is_empty()).then_some(list))
    }
}
