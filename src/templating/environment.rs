//! Template environment and truthiness

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::RewriteError;

/// Values available to conditional-comment templates.
///
/// Keys are case-sensitive. A dotted name such as `build.flavor` navigates
/// into nested JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    values: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a top-level value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Parse a JSON object into an environment.
    pub fn from_json_str(json: &str) -> Result<Self, RewriteError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| RewriteError::InvalidEnvironment {
                message: e.to_string(),
            })?;
        match value {
            Value::Object(map) => Ok(Self {
                values: map.into_iter().collect(),
            }),
            other => Err(RewriteError::InvalidEnvironment {
                message: format!("expected a JSON object, found {}", json_type_name(&other)),
            }),
        }
    }

    /// Build an environment from `KEY=VALUE` strings.
    ///
    /// Values are typed: `true`/`false` become booleans, `null` becomes
    /// null, numerals become numbers and anything else stays a string.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, RewriteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut environment = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| RewriteError::InvalidEnvironment {
                    message: format!("expected KEY=VALUE, found '{pair}'"),
                })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(RewriteError::InvalidEnvironment {
                    message: format!("empty key in '{pair}'"),
                });
            }
            environment.insert(key, parse_scalar(value));
        }
        Ok(environment)
    }

    /// Overlay `other` on top of this environment.
    pub fn merge(&mut self, other: Environment) {
        self.values.extend(other.values);
    }

    /// Look up a possibly dotted name. Every segment is case-sensitive.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.values.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.values.get(first)?, |value, segment| match value {
            Value::Object(map) => map.get(segment),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_scalar(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if trimmed.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(text.to_string())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Truthiness of a template condition.
///
/// - missing and `null` are false
/// - sequences (strings, arrays, objects) are true when non-empty, except
///   that a lone NUL character counts as a false character value
/// - booleans and numbers are false when they convert to a zero decimal
/// - a number that has no decimal representation is true
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty() && s != "\0",
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Number(n)) => number_is_nonzero(n),
    }
}

fn number_is_nonzero(number: &Number) -> bool {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(|d| !d.is_zero())
        .unwrap_or(true)
}
