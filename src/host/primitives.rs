//! Core runtime types every host is expected to know.

use strum::{EnumIter, IntoEnumIterator};

/// Name of the module that carries the core types in [`crate::host::memory::InMemoryHost`]
pub const CORE_LIBRARY: &str = "System.Private.CoreLib";

/// The built-in types that [`crate::host::Value`] variants map onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CorePrimitive {
    /// System.Void - no value
    Void,
    /// System.Object - root of every reference type
    Object,
    /// System.ValueType - root of every value type
    ValueType,
    /// System.Boolean
    Boolean,
    /// System.Int32
    Int32,
    /// System.Int64
    Int64,
    /// System.Single
    Single,
    /// System.Double
    Double,
    /// System.String
    String,
    /// System.Type - runtime type objects
    Type,
}

impl CorePrimitive {
    /// The fully qualified name
    #[must_use]
    pub fn fullname(self) -> &'static str {
        match self {
            CorePrimitive::Void => "System.Void",
            CorePrimitive::Object => "System.Object",
            CorePrimitive::ValueType => "System.ValueType",
            CorePrimitive::Boolean => "System.Boolean",
            CorePrimitive::Int32 => "System.Int32",
            CorePrimitive::Int64 => "System.Int64",
            CorePrimitive::Single => "System.Single",
            CorePrimitive::Double => "System.Double",
            CorePrimitive::String => "System.String",
            CorePrimitive::Type => "System.Type",
        }
    }

    /// The base type, `None` for `System.Object`
    #[must_use]
    pub fn base(self) -> Option<CorePrimitive> {
        match self {
            CorePrimitive::Object => None,
            CorePrimitive::Void
            | CorePrimitive::Boolean
            | CorePrimitive::Int32
            | CorePrimitive::Int64
            | CorePrimitive::Single
            | CorePrimitive::Double => Some(CorePrimitive::ValueType),
            CorePrimitive::ValueType | CorePrimitive::String | CorePrimitive::Type => {
                Some(CorePrimitive::Object)
            }
        }
    }

    /// Value types cannot hold `null`
    #[must_use]
    pub fn is_value_type(self) -> bool {
        self.base() == Some(CorePrimitive::ValueType)
    }

    /// Looks up a primitive by its fully qualified name
    #[must_use]
    pub fn from_fullname(name: &str) -> Option<CorePrimitive> {
        CorePrimitive::iter().find(|p| p.fullname() == name)
    }
}
