use std::collections::BTreeMap;
use std::fmt;

use crate::error::TypeError;
use crate::serializer;

/// Ordered sequence of document nodes.
pub type Array = Vec<Value>;

/// Key-unique mapping node. Keys are 8-bit clean byte strings and iterate
/// in ascending byte order, which the serializer relies on for
/// deterministic output.
pub type Object = BTreeMap<Vec<u8>, Value>;

/// A single JSON document node.
///
/// Exactly one payload is live at a time. Strings are raw byte sequences:
/// the parser accepts any byte above 0x9F unescaped and `\u00xx` escapes up
/// to 0xFF, so a `Value::String` is not guaranteed to be valid UTF-8.
///
/// Equality is structural. Two `Number`s compare by native floating-point
/// equality (NaN never equals NaN); any other pair of differing variants is
/// unequal.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Object(Object),
    Array(Array),
    String(Vec<u8>),
    Number(f64),
    Boolean(bool),
}

/// The type tag of a [`Value`], used in type-mismatch diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Object,
    Array,
    String,
    Number,
    Boolean,
}

impl Kind {
    /// Diagnostic name of the type, as it appears in `TypeError` messages.
    pub fn name(self) -> &'static str {
        match self {
            Kind::Null => "NULL",
            Kind::Object => "OBJECT",
            Kind::Array => "ARRAY",
            Kind::String => "STRING",
            Kind::Number => "NUMBER",
            Kind::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The type tag of the live payload.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Object(_) => Kind::Object,
            Value::Array(_) => Kind::Array,
            Value::String(_) => Kind::String,
            Value::Number(_) => Kind::Number,
            Value::Boolean(_) => Kind::Boolean,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// True for everything that is not a container.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Object(_) | Value::Array(_))
    }

    /// Convenience predicate: true for `Null`, `false`, zero, or an empty
    /// string/array/object. Not a strict emptiness test.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Object(entries) => entries.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(bytes) => bytes.is_empty(),
            Value::Number(n) => *n == 0.0,
            Value::Boolean(b) => !b,
        }
    }

    /// Borrows the object payload, or fails naming OBJECT as the expected type.
    pub fn as_object(&self) -> Result<&Object, TypeError> {
        match self {
            Value::Object(entries) => Ok(entries),
            _ => Err(TypeError::Expected(Kind::Object)),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut Object, TypeError> {
        match self {
            Value::Object(entries) => Ok(entries),
            _ => Err(TypeError::Expected(Kind::Object)),
        }
    }

    /// Borrows the array payload, or fails naming ARRAY as the expected type.
    pub fn as_array(&self) -> Result<&Array, TypeError> {
        match self {
            Value::Array(items) => Ok(items),
            _ => Err(TypeError::Expected(Kind::Array)),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Array, TypeError> {
        match self {
            Value::Array(items) => Ok(items),
            _ => Err(TypeError::Expected(Kind::Array)),
        }
    }

    /// Borrows the string payload, or fails naming STRING as the expected type.
    pub fn as_string(&self) -> Result<&[u8], TypeError> {
        match self {
            Value::String(bytes) => Ok(bytes),
            _ => Err(TypeError::Expected(Kind::String)),
        }
    }

    pub fn as_string_mut(&mut self) -> Result<&mut Vec<u8>, TypeError> {
        match self {
            Value::String(bytes) => Ok(bytes),
            _ => Err(TypeError::Expected(Kind::String)),
        }
    }

    /// Copies the number payload out, or fails naming NUMBER as the expected type.
    pub fn as_number(&self) -> Result<f64, TypeError> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(TypeError::Expected(Kind::Number)),
        }
    }

    pub fn as_number_mut(&mut self) -> Result<&mut f64, TypeError> {
        match self {
            Value::Number(n) => Ok(n),
            _ => Err(TypeError::Expected(Kind::Number)),
        }
    }

    /// Copies the boolean payload out, or fails naming BOOLEAN as the expected type.
    pub fn as_boolean(&self) -> Result<bool, TypeError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(TypeError::Expected(Kind::Boolean)),
        }
    }

    pub fn as_boolean_mut(&mut self) -> Result<&mut bool, TypeError> {
        match self {
            Value::Boolean(b) => Ok(b),
            _ => Err(TypeError::Expected(Kind::Boolean)),
        }
    }

    /// Looks up a key in an object node. `None` for a missing key or a
    /// non-object node.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.get(key),
            _ => None,
        }
    }

    /// Looks up an element in an array node by position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into_bytes())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::String(bytes)
    }
}

impl From<Array> for Value {
    fn from(items: Array) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(entries: Object) -> Self {
        Value::Object(entries)
    }
}

impl fmt::Display for Value {
    /// Renders the compact serialization.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serializer::to_string(self, false))
    }
}
