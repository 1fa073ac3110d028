//! Parameter type descriptors and member signatures.
//!
//! A [`Signature`] is the ordered list of parameter types of a callable member. It is the key
//! that disambiguates overloads: two signatures are equal only if every position holds the same
//! [`TypeSig`]. There is no widening and no closest-match heuristic.
//!
//! # Textual Form
//!
//! Signatures can be written as text, which is how capability tables are usually declared:
//!
//! | Text | Meaning |
//! |------|---------|
//! | `Host.Core.Rect` | A named type |
//! | `System.Int32&` | By-reference (`ref` or `out`) parameter |
//! | `System.String[]` | Single dimension array |
//! | `!!0` | First generic parameter of the method |
//! | `A, B&, !!1[]` | A three parameter signature |
//! | *(empty)* | The empty signature |
//!
//! # Examples
//!
//! ```rust
//! use hostbridge::host::signature::{Signature, TypeSig};
//!
//! let sig: Signature = "Host.Core.Sprite, Host.Core.Rect, System.Boolean&".parse()?;
//! assert_eq!(sig.len(), 3);
//! assert_eq!(sig[2], TypeSig::by_ref("System.Boolean"));
//! assert_eq!(sig.to_string(), "Host.Core.Sprite, Host.Core.Rect, System.Boolean&");
//! # Ok::<(), hostbridge::Error>(())
//! ```

use std::{fmt, ops::Index, str::FromStr};

use crate::{Error, Result};

/// A parameter type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeSig {
    /// A type identified by its fully qualified name
    Named(String),
    /// A by-reference parameter (`ref` or `out`) of the inner type
    ByRef(Box<TypeSig>),
    /// A single dimension array of the inner type
    Array(Box<TypeSig>),
    /// The n-th generic parameter of the declaring method (`!!n`)
    MethodParam(u16),
}

impl TypeSig {
    /// A named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeSig::Named(name.into())
    }

    /// A by-reference parameter of the given type
    pub fn by_ref(inner: impl Into<TypeSig>) -> Self {
        TypeSig::ByRef(Box::new(inner.into()))
    }

    /// An array of the given element type
    pub fn array(element: impl Into<TypeSig>) -> Self {
        TypeSig::Array(Box::new(element.into()))
    }

    /// The n-th generic method parameter
    #[must_use]
    pub fn generic(index: u16) -> Self {
        TypeSig::MethodParam(index)
    }

    /// The type with any by-reference wrapper removed
    #[must_use]
    pub fn referent(&self) -> &TypeSig {
        match self {
            TypeSig::ByRef(inner) => inner,
            other => other,
        }
    }

    /// The type name, if this is a (possibly by-reference) named type
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.referent() {
            TypeSig::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Returns `true` if a generic method parameter occurs anywhere in this type
    #[must_use]
    pub fn is_open(&self) -> bool {
        match self {
            TypeSig::Named(_) => false,
            TypeSig::ByRef(inner) | TypeSig::Array(inner) => inner.is_open(),
            TypeSig::MethodParam(_) => true,
        }
    }

    /// Replaces generic method parameters by the given type names.
    ///
    /// Parameters without a matching argument are left untouched.
    #[must_use]
    pub fn substitute(&self, type_args: &[String]) -> TypeSig {
        match self {
            TypeSig::Named(_) => self.clone(),
            TypeSig::ByRef(inner) => TypeSig::ByRef(Box::new(inner.substitute(type_args))),
            TypeSig::Array(inner) => TypeSig::Array(Box::new(inner.substitute(type_args))),
            TypeSig::MethodParam(index) => type_args
                .get(usize::from(*index))
                .map_or_else(|| self.clone(), |name| TypeSig::Named(name.clone())),
        }
    }

    /// Parses a single type from its textual form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the text is not a single valid type.
    pub fn parse(text: &str) -> Result<TypeSig> {
        let trimmed = text.trim();
        let invalid = |reason: &str| Error::InvalidSignature {
            text: text.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty type"));
        }

        let (body, by_ref) = match trimmed.strip_suffix('&') {
            Some(body) => (body.trim_end(), true),
            None => (trimmed, false),
        };
        if body.contains('&') {
            return Err(invalid("'&' is only allowed once, at the end"));
        }

        let mut rank = 0usize;
        let mut base = body;
        while let Some(rest) = base.strip_suffix("[]") {
            rank += 1;
            base = rest.trim_end();
        }

        if base.is_empty() {
            return Err(invalid("missing type name"));
        }
        if base
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ',' | '[' | ']'))
        {
            return Err(invalid("unexpected character in type name"));
        }

        let mut sig = match base.strip_prefix("!!") {
            Some(digits) => {
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid("'!!' must be followed by a parameter index"));
                }
                let index = digits
                    .parse::<u16>()
                    .map_err(|_| invalid("generic parameter index out of range"))?;
                TypeSig::MethodParam(index)
            }
            None => TypeSig::Named(base.to_string()),
        };

        for _ in 0..rank {
            sig = TypeSig::Array(Box::new(sig));
        }
        if by_ref {
            sig = TypeSig::ByRef(Box::new(sig));
        }

        Ok(sig)
    }
}

impl From<&str> for TypeSig {
    fn from(name: &str) -> Self {
        TypeSig::Named(name.to_string())
    }
}

impl From<String> for TypeSig {
    fn from(name: String) -> Self {
        TypeSig::Named(name)
    }
}

impl FromStr for TypeSig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TypeSig::parse(s)
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSig::Named(name) => f.write_str(name),
            TypeSig::ByRef(inner) => write!(f, "{inner}&"),
            TypeSig::Array(inner) => write!(f, "{inner}[]"),
            TypeSig::MethodParam(index) => write!(f, "!!{index}"),
        }
    }
}

/// The ordered parameter types of a callable member.
///
/// Only ever used as an equality key; a signature is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Signature(Vec<TypeSig>);

impl Signature {
    /// Creates a signature from parameter types in declaration order
    #[must_use]
    pub fn new(params: Vec<TypeSig>) -> Self {
        Signature(params)
    }

    /// The signature of a parameterless callable
    #[must_use]
    pub fn empty() -> Self {
        Signature(Vec::new())
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` for a parameterless signature
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The parameter types
    pub fn iter(&self) -> impl Iterator<Item = &TypeSig> {
        self.0.iter()
    }

    /// Parses a comma separated list of types.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] on the first malformed entry.
    pub fn parse(text: &str) -> Result<Signature> {
        if text.trim().is_empty() {
            return Ok(Signature::empty());
        }

        text.split(',')
            .map(TypeSig::parse)
            .collect::<Result<Vec<_>>>()
            .map(Signature)
    }
}

impl Index<usize> for Signature {
    type Output = TypeSig;

    fn index(&self, index: usize) -> &TypeSig {
        &self.0[index]
    }
}

impl FromStr for Signature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Signature::parse(s)
    }
}

impl From<Vec<TypeSig>> for Signature {
    fn from(params: Vec<TypeSig>) -> Self {
        Signature(params)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        Ok(())
    }
}
