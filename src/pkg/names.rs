use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::ResolveError;

/// Ordered list of package names. A single name is a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameList(Vec<String>);

impl NameList {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Accepts a JSON string or an array of strings; anything else is rejected
    /// with `InvalidArgument` naming `param`.
    pub fn from_json(param: &'static str, value: &Value) -> Result<Self, ResolveError> {
        match value {
            Value::String(s) => Ok(Self(vec![s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(ResolveError::InvalidArgument {
                        param,
                        found: json_kind(other),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self),
            other => Err(ResolveError::InvalidArgument {
                param,
                found: json_kind(other),
            }),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl TryFrom<&Value> for NameList {
    type Error = ResolveError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json("names", value)
    }
}

impl From<&str> for NameList {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for NameList {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<String>> for NameList {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<Vec<&str>> for NameList {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for NameList {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for NameList {
    fn from(names: &[String]) -> Self {
        Self(names.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for NameList {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&NameList> for NameList {
    fn from(names: &NameList) -> Self {
        names.clone()
    }
}

impl<'de> Deserialize<'de> for NameList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::One(s) => Self(vec![s]),
            Raw::Many(v) => Self(v),
        })
    }
}
