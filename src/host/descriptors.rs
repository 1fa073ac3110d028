//! Descriptors reported by a host adapter.

use std::fmt;

use bitflags::bitflags;
use strum::{Display, EnumIter};

use crate::host::{
    signature::{Signature, TypeSig},
    HostMemberId, HostModuleId, HostTypeId,
};

/// A loaded host module ("assembly")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleDescriptor {
    /// Host identity of the module
    pub id: HostModuleId,
    /// Declared module name, e.g. `Host.Core`
    pub name: String,
}

/// A host type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Host identity of the type
    pub id: HostTypeId,
    /// The module declaring the type
    pub module: HostModuleId,
    /// Fully qualified name (`Namespace.Name`)
    pub fullname: String,
}

impl TypeDescriptor {
    /// The namespace part of the full name; empty for global types
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.fullname
            .rsplit_once('.')
            .map_or("", |(namespace, _)| namespace)
    }

    /// The simple name, without namespace
    #[must_use]
    pub fn name(&self) -> &str {
        self.fullname
            .rsplit_once('.')
            .map_or(self.fullname.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname)
    }
}

/// The category of a host member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum MemberKind {
    /// A data field
    Field,
    /// A property with getter and/or setter
    Property,
    /// A method, possibly generic
    Method,
    /// An instance constructor
    Constructor,
}

impl MemberKind {
    /// Fields and properties are accessed, methods and constructors are called
    #[must_use]
    pub fn is_callable(self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Constructor)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Member visibility, used both as a member attribute and as a lookup filter
    pub struct Visibility: u8 {
        /// Publicly accessible
        const PUBLIC = 0x01;
        /// Private, internal or protected
        const NON_PUBLIC = 0x02;
        /// Either of the above (lookup filter only)
        const BOTH = Self::PUBLIC.bits() | Self::NON_PUBLIC.bits();
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Visibility::BOTH {
            f.write_str("any")
        } else if *self == Visibility::PUBLIC {
            f.write_str("public")
        } else if *self == Visibility::NON_PUBLIC {
            f.write_str("non-public")
        } else {
            f.write_str("none")
        }
    }
}

/// How an argument travels to a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamMode {
    /// Passed by value
    #[default]
    In,
    /// Passed by reference; the callee may read and write it
    Ref,
    /// Passed by reference; the callee only writes it
    Out,
}

impl ParamMode {
    /// `ref` and `out` parameters both travel by reference
    #[must_use]
    pub fn is_by_ref(self) -> bool {
        !matches!(self, ParamMode::In)
    }
}

/// A declared parameter of a callable member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamDescriptor {
    /// Parameter name
    pub name: String,
    /// Parameter type; by-ref parameters carry a [`TypeSig::ByRef`]
    pub ty: TypeSig,
    /// Passing mode
    pub mode: ParamMode,
}

/// A member of a host type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberDescriptor {
    /// Host identity of the member
    pub id: HostMemberId,
    /// The type declaring the member
    pub declaring_type: HostTypeId,
    /// Member name (`.ctor` for constructors)
    pub name: String,
    /// Member category
    pub kind: MemberKind,
    /// Static members take no target
    pub is_static: bool,
    /// Either [`Visibility::PUBLIC`] or [`Visibility::NON_PUBLIC`]
    pub visibility: Visibility,
    /// Declared parameters, in order; empty for fields and properties
    pub params: Vec<ParamDescriptor>,
    /// Return type of callables, value type of fields and properties
    pub value_type: Option<TypeSig>,
    /// Number of free generic parameters; 0 for non-generic or closed methods
    pub generic_params: u16,
    /// Type arguments of a closed generic method
    pub type_args: Vec<HostTypeId>,
}

impl MemberDescriptor {
    /// The ordered parameter types, used as the overload key
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::new(self.params.iter().map(|p| p.ty.clone()).collect())
    }
}

/// Filter handed to [`crate::host::Host::enumerate_members`]
#[derive(Debug, Clone, Copy)]
pub struct MemberFilter<'a> {
    /// Exact member name
    pub name: &'a str,
    /// Member category
    pub kind: MemberKind,
    /// Accepted visibilities
    pub visibility: Visibility,
    /// Static or instance members
    pub is_static: bool,
}

impl MemberFilter<'_> {
    /// Returns `true` if `member` passes every criterion of this filter
    #[must_use]
    pub fn admits(&self, member: &MemberDescriptor) -> bool {
        member.name == self.name
            && member.kind == self.kind
            && member.is_static == self.is_static
            && self.visibility.intersects(member.visibility)
    }
}
