//! Values exchanged with the host.

use std::fmt;

use crate::host::{CorePrimitive, HostRef, TypeDescriptor};

/// A value passed to or returned from a host member.
///
/// # Type Mapping
///
/// | Host type | Variant |
/// |-----------|---------|
/// | `System.Void` | [`Value::Void`] |
/// | `null` | [`Value::Null`] |
/// | `System.Boolean` | [`Value::Bool`] |
/// | `System.Int32` | [`Value::I32`] |
/// | `System.Int64` | [`Value::I64`] |
/// | `System.Single` | [`Value::F32`] |
/// | `System.Double` | [`Value::F64`] |
/// | `System.String` | [`Value::String`] |
/// | `System.Type` | [`Value::Type`] |
/// | Any object | [`Value::Object`] |
/// | Struct | [`Value::Struct`] |
/// | `T[]` | [`Value::Array`] |
///
/// # Examples
///
/// ```rust
/// use hostbridge::host::Value;
///
/// assert_eq!(Value::from(42).as_i32(), Some(42));
/// assert_eq!(Value::from("text").as_str(), Some("text"));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (void return)
    #[default]
    Void,
    /// The null reference
    Null,
    /// System.Boolean
    Bool(bool),
    /// System.Int32
    I32(i32),
    /// System.Int64
    I64(i64),
    /// System.Single
    F32(f32),
    /// System.Double
    F64(f64),
    /// System.String
    String(String),
    /// A reference to a host object
    Object(HostRef),
    /// A runtime type object
    Type(TypeDescriptor),
    /// A struct passed by value
    Struct(StructValue),
    /// A single dimension array
    Array(Vec<Value>),
}

/// A struct value, carried field by field
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    /// Fully qualified name of the struct type
    pub type_name: String,
    /// Field names and values, in declaration order
    pub fields: Vec<(String, Value)>,
}

impl StructValue {
    /// Creates a struct value
    pub fn new(type_name: impl Into<String>, fields: Vec<(String, Value)>) -> Self {
        StructValue {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Looks up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}

impl Value {
    /// The built-in type of primitive values; `None` for everything else
    #[must_use]
    pub fn primitive(&self) -> Option<CorePrimitive> {
        match self {
            Value::Void => Some(CorePrimitive::Void),
            Value::Bool(_) => Some(CorePrimitive::Boolean),
            Value::I32(_) => Some(CorePrimitive::Int32),
            Value::I64(_) => Some(CorePrimitive::Int64),
            Value::F32(_) => Some(CorePrimitive::Single),
            Value::F64(_) => Some(CorePrimitive::Double),
            Value::String(_) => Some(CorePrimitive::String),
            Value::Type(_) => Some(CorePrimitive::Type),
            Value::Null | Value::Object(_) | Value::Struct(_) | Value::Array(_) => None,
        }
    }

    /// A short description of the value's type, used in error messages
    #[must_use]
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Object(obj) => format!("object {obj}"),
            Value::Struct(s) => s.type_name.clone(),
            Value::Array(_) => "array".to_string(),
            other => other
                .primitive()
                .map_or_else(|| "unknown".to_string(), |p| p.fullname().to_string()),
        }
    }

    /// Returns `true` for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for [`Value::Void`]
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    /// Extracts a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Extracts a 32-bit integer
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    /// Extracts a 64-bit integer, widening 32-bit ones
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Extracts a double, widening singles
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(f64::from(*v)),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrows a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Extracts an object reference
    #[must_use]
    pub fn as_object(&self) -> Option<HostRef> {
        match self {
            Value::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    /// Borrows a runtime type
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Value::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Borrows a struct value
    #[must_use]
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("void"),
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "\"{v}\""),
            Value::Object(obj) => write!(f, "{obj}"),
            Value::Type(ty) => write!(f, "typeof({ty})"),
            Value::Struct(s) => {
                write!(f, "{} {{ ", s.type_name)?;
                for (i, (name, value)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                f.write_str(" }")
            }
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<HostRef> for Value {
    fn from(v: HostRef) -> Self {
        Value::Object(v)
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Value::Struct(v)
    }
}

impl From<TypeDescriptor> for Value {
    fn from(v: TypeDescriptor) -> Self {
        Value::Type(v)
    }
}
