use std::fmt::{Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::ast::HookDef;
use crate::error::{Error, Result};

pub type ValueObject = IndexMap<String, Value>;

/// A hook turned into a callable value. It carries its block and nothing else;
/// everything it reads arrives through its single argument.
#[derive(Debug, Clone, PartialEq, derive_more::From)]
pub struct ValueFunction {
    pub hook: Arc<HookDef>,
}
impl ValueFunction {
    pub fn new(hook: HookDef) -> Self {
        Self {
            hook: Arc::new(hook),
        }
    }
    pub fn name(&self) -> &str {
        &self.hook.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, derive_more::From)]
pub enum Value {
    #[from]
    String(String),
    #[from]
    Number(f64),
    #[from]
    Boolean(bool),
    #[default]
    Null,
    #[from]
    Array(Vec<Value>),
    #[from]
    Object(ValueObject),
    #[from]
    Function(ValueFunction),
}

/// One step of an assignment path such as `input.items[0]`.
#[derive(Debug, Clone, PartialEq)]
pub enum PathKey {
    Key(String),
    Index(usize),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }
    pub fn number(n: impl Into<f64>) -> Value {
        Value::Number(n.into())
    }
    pub fn bool(b: bool) -> Value {
        Value::Boolean(b)
    }
    pub fn null() -> Value {
        Value::Null
    }
    pub fn array(values: impl IntoIterator<Item = Value>) -> Value {
        Value::Array(values.into_iter().collect())
    }
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
    pub fn empty_object() -> Value {
        Value::Object(ValueObject::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Null, false, 0 (and NaN) and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }
    pub fn as_object(&self) -> Option<&ValueObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
    pub fn as_object_mut(&mut self) -> Option<&mut ValueObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Named property read; anything that is not an object yields Null.
    pub fn get_member(&self, name: &str) -> Value {
        match self {
            Value::Object(object) => object.get(name).cloned().unwrap_or_default(),
            _ => Value::Null,
        }
    }

    /// `value[key]`: arrays by non-negative integer, objects by string key.
    pub fn get_index(&self, key: &Value) -> Value {
        match (self, key) {
            (Value::Array(values), Value::Number(n)) => as_index(*n)
                .and_then(|i| values.get(i).cloned())
                .unwrap_or_default(),
            (Value::Object(object), Value::String(name)) => {
                object.get(name).cloned().unwrap_or_default()
            }
            (Value::Object(object), Value::Number(_)) => {
                object.get(&key.to_text()).cloned().unwrap_or_default()
            }
            _ => Value::Null,
        }
    }

    /// Writes `value` at `path`, creating intermediate objects for missing keys.
    pub fn set_path(&mut self, path: &[PathKey], value: Value) -> Result<()> {
        let Some((head, rest)) = path.split_first() else {
            *self = value;
            return Ok(());
        };
        match (self, head) {
            (Value::Object(object), PathKey::Key(key)) => {
                let slot = object.entry(key.clone()).or_insert_with(|| {
                    if rest.is_empty() {
                        Value::Null
                    } else {
                        Value::empty_object()
                    }
                });
                slot.set_path(rest, value)
            }
            (Value::Array(values), PathKey::Index(index)) => {
                let len = values.len();
                if *index == len {
                    values.push(Value::Null);
                }
                match values.get_mut(*index) {
                    Some(slot) => slot.set_path(rest, value),
                    None => Err(Error::type_mismatch(
                        "assignment",
                        format!("index {} out of bounds for array of {}", index, len),
                    )),
                }
            }
            (target, key) => Err(Error::type_mismatch(
                "assignment",
                format!("cannot assign {:?} on a {}", key, target.type_name()),
            )),
        }
    }

    /// Text form used for interpolation and splicing.
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Boolean(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => self.to_json().to_string(),
            Value::Function(function) => format!("[hook {}]", function.name()),
        }
    }
}

fn as_index(n: f64) -> Option<usize> {
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
        Some(n as usize)
    } else {
        None
    }
}

/// Integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Null => write!(f, "null"),
            Value::Array(values) => write!(f, "[{}]", values.iter().join(", ")),
            Value::Object(object) => write!(
                f,
                "{{{}}}",
                object
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .join(", ")
            ),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(values) => {
                Value::Array(values.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

pub trait ToJson {
    fn to_json(&self) -> serde_json::Value;
    fn to_value<T: DeserializeOwned>(&self) -> Result<T>
    where
        Self: Sized,
    {
        serde_json::from_value(self.to_json()).map_err(|e| Error::Validation(e.to_string()))
    }
}

impl ToJson for Value {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => json!(s),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    json!(*n as i64)
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::Boolean(b) => json!(b),
            Value::Null => serde_json::Value::Null,
            Value::Array(values) => {
                serde_json::Value::Array(values.iter().map(ToJson::to_json).collect())
            }
            Value::Object(object) => serde_json::Value::Object(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
            Value::Function(function) => json!(format!("[hook {}]", function.name())),
        }
    }
}

impl ToJson for ValueObject {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }
}
