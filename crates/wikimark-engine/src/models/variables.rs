use std::collections::BTreeMap;

use serde::Serialize;

use crate::html::Html;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VarError {
    #[error("@{path}: '{segment}' is not a map")]
    NotAMap { path: String, segment: String },
    #[error("@{path}: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A value stored in a variable scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Raw text, escaped whenever it is written into HTML.
    Str(String),
    /// Formatted text, inserted verbatim.
    Html(Html),
    Bool(bool),
    List(Vec<Value>),
    Map(VariableScope),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Html(_) => "html",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// The value as plain text, if it is textual.
    ///
    /// Rendered HTML has its entities decoded so that option values written as
    /// `@root.page: /page;` come back as the text the author typed.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Html(h) => Some(crate::html::unescape(h.as_str())),
            _ => None,
        }
    }

    /// A human-readable rendering for values that have no natural text form.
    pub fn human_readable(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Html(h) => h.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::human_readable)
                .collect::<Vec<_>>()
                .join(", "),
            Value::Map(scope) => format!("(map with {} keys)", scope.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Html> for Value {
    fn from(h: Html) -> Self {
        Value::Html(h)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Maps dotted variable names (`page.title`, `external.wp.root`) to values.
///
/// Each dot walks one level into a nested [`Value::Map`]. Setting a dotted
/// name creates the intermediate maps as needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableScope {
    vars: BTreeMap<String, Value>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.vars.iter()
    }

    /// Looks up a dotted name.
    ///
    /// `Ok(None)` means undefined; an error means a path segment exists but is
    /// not a map.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, VarError> {
        let mut scope = self;
        let mut segments = name.split('.').peekable();
        while let Some(segment) = segments.next() {
            let Some(value) = scope.vars.get(segment) else {
                return Ok(None);
            };
            if segments.peek().is_none() {
                return Ok(Some(value));
            }
            match value {
                Value::Map(inner) => scope = inner,
                _ => {
                    return Err(VarError::NotAMap {
                        path: name.to_string(),
                        segment: segment.to_string(),
                    });
                }
            }
        }
        Ok(None)
    }

    /// Looks up a textual value (string or rendered HTML).
    pub fn get_str(&self, name: &str) -> Result<Option<String>, VarError> {
        match self.get(name)? {
            None => Ok(None),
            Some(value) => value.as_text().map(Some).ok_or(VarError::WrongType {
                path: name.to_string(),
                expected: "string",
                found: value.type_name(),
            }),
        }
    }

    /// Looks up a boolean. Undefined reads as `false`.
    pub fn get_bool(&self, name: &str) -> Result<bool, VarError> {
        match self.get(name)? {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(VarError::WrongType {
                path: name.to_string(),
                expected: "boolean",
                found: other.type_name(),
            }),
        }
    }

    /// Looks up a nested map.
    pub fn get_map(&self, name: &str) -> Result<Option<&VariableScope>, VarError> {
        match self.get(name)? {
            None => Ok(None),
            Some(Value::Map(map)) => Ok(Some(map)),
            Some(other) => Err(VarError::WrongType {
                path: name.to_string(),
                expected: "map",
                found: other.type_name(),
            }),
        }
    }

    /// Sets a dotted name, replacing any non-map value found along the path.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match name.split_once('.') {
            None => {
                self.vars.insert(name.to_string(), value);
            }
            Some((head, rest)) => {
                let entry = self
                    .vars
                    .entry(head.to_string())
                    .or_insert_with(|| Value::Map(VariableScope::new()));
                if !matches!(entry, Value::Map(_)) {
                    *entry = Value::Map(VariableScope::new());
                }
                if let Value::Map(inner) = entry {
                    inner.set(rest, value);
                }
            }
        }
    }

    /// Removes a dotted name, returning the old value.
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        match name.split_once('.') {
            None => self.vars.remove(name),
            Some((head, rest)) => match self.vars.get_mut(head) {
                Some(Value::Map(inner)) => inner.unset(rest),
                _ => None,
            },
        }
    }
}
