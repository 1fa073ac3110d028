//! Resolved member handles and the queries that describe them.

use std::{fmt, sync::Arc};

use crate::{
    bridge::types::TypeHandle,
    host::{
        signature::{Signature, TypeSig},
        HostMemberId, MemberDescriptor, MemberKind, ParamDescriptor, Visibility,
    },
};

struct MemberInfo {
    descriptor: MemberDescriptor,
    owner: TypeHandle,
    signature: Signature,
}

/// A resolved field, property, method or constructor.
///
/// Immutable once resolved. Clones share one resolution, so two handles obtained for the same
/// cache key are referentially identical (see [`MemberHandle::ptr_eq`]).
#[derive(Clone)]
pub struct MemberHandle(Arc<MemberInfo>);

impl MemberHandle {
    pub(crate) fn new(descriptor: MemberDescriptor, owner: TypeHandle) -> Self {
        let signature = descriptor.signature();
        MemberHandle(Arc::new(MemberInfo {
            descriptor,
            owner,
            signature,
        }))
    }

    /// Host identity of the member
    #[must_use]
    pub fn id(&self) -> HostMemberId {
        self.0.descriptor.id
    }

    /// Member name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.descriptor.name
    }

    /// Member category
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.0.descriptor.kind
    }

    /// Static members take no target
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.0.descriptor.is_static
    }

    /// Declared visibility
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.0.descriptor.visibility
    }

    /// The declaring type
    #[must_use]
    pub fn owner(&self) -> &TypeHandle {
        &self.0.owner
    }

    /// Ordered parameter types
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    /// Declared parameters
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.0.descriptor.params
    }

    /// Return type of callables, value type of fields and properties
    #[must_use]
    pub fn value_type(&self) -> Option<&TypeSig> {
        self.0.descriptor.value_type.as_ref()
    }

    /// Number of free generic parameters
    #[must_use]
    pub fn generic_arity(&self) -> u16 {
        self.0.descriptor.generic_params
    }

    /// Returns `true` for an open generic method that must be closed before invocation
    #[must_use]
    pub fn is_generic_definition(&self) -> bool {
        self.0.descriptor.generic_params > 0
    }

    /// The descriptor the host reported
    #[must_use]
    pub fn descriptor(&self) -> &MemberDescriptor {
        &self.0.descriptor
    }

    /// Returns `true` if both handles share one resolution
    #[must_use]
    pub fn ptr_eq(&self, other: &MemberHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// `Owner::Name` or `Owner::Name(Signature)` for callables
    #[must_use]
    pub fn display_name(&self) -> String {
        member_display(
            self.0.owner.fullname(),
            self.name(),
            self.kind(),
            Some(&self.0.signature),
        )
    }
}

pub(crate) fn member_display(
    owner: &str,
    name: &str,
    kind: MemberKind,
    signature: Option<&Signature>,
) -> String {
    match signature {
        Some(sig) if kind.is_callable() => format!("{owner}::{name}({sig})"),
        _ => format!("{owner}::{name}"),
    }
}

impl PartialEq for MemberHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.descriptor.id == other.0.descriptor.id
    }
}

impl Eq for MemberHandle {}

impl fmt::Debug for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberHandle({} {})", self.kind(), self.display_name())
    }
}

impl fmt::Display for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// A complete description of one member, from module name down to signature.
///
/// Queries are the entries of capability tables. Constructors start public, instance and, for
/// callables, with the empty signature.
///
/// # Examples
///
/// ```rust
/// use hostbridge::{bridge::MemberQuery, host::Visibility, signature};
///
/// let query = MemberQuery::method("Host.Core", "Host.Core.Thing", "Draw")
///     .as_static()
///     .non_public()
///     .signature(signature!["Host.Core.Texture", "Host.Core.Rect", "Host.Core.Color"]);
///
/// assert_eq!(query.visibility, Visibility::NON_PUBLIC);
/// assert_eq!(
///     query.to_string(),
///     "Host.Core.Thing::Draw(Host.Core.Texture, Host.Core.Rect, Host.Core.Color)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberQuery {
    /// Declared module name
    pub assembly: String,
    /// Fully qualified owner type name
    pub type_name: String,
    /// Member name
    pub name: String,
    /// Member category
    pub kind: MemberKind,
    /// Accepted visibilities
    pub visibility: Visibility,
    /// Static or instance member
    pub is_static: bool,
    /// Exact parameter types; `None` accepts any single overload
    pub signature: Option<Signature>,
}

impl MemberQuery {
    fn new(assembly: &str, type_name: &str, name: &str, kind: MemberKind) -> Self {
        MemberQuery {
            assembly: assembly.to_string(),
            type_name: type_name.to_string(),
            name: name.to_string(),
            kind,
            visibility: Visibility::PUBLIC,
            is_static: false,
            signature: kind.is_callable().then(Signature::empty),
        }
    }

    /// A field query
    #[must_use]
    pub fn field(assembly: &str, type_name: &str, name: &str) -> Self {
        Self::new(assembly, type_name, name, MemberKind::Field)
    }

    /// A property query
    #[must_use]
    pub fn property(assembly: &str, type_name: &str, name: &str) -> Self {
        Self::new(assembly, type_name, name, MemberKind::Property)
    }

    /// A method query
    #[must_use]
    pub fn method(assembly: &str, type_name: &str, name: &str) -> Self {
        Self::new(assembly, type_name, name, MemberKind::Method)
    }

    /// A constructor query
    #[must_use]
    pub fn constructor(assembly: &str, type_name: &str) -> Self {
        Self::new(assembly, type_name, ".ctor", MemberKind::Constructor)
    }

    /// Restricts the lookup to non-public members
    #[must_use]
    pub fn non_public(mut self) -> Self {
        self.visibility = Visibility::NON_PUBLIC;
        self
    }

    /// Accepts public and non-public members
    #[must_use]
    pub fn any_visibility(mut self) -> Self {
        self.visibility = Visibility::BOTH;
        self
    }

    /// Looks up a static member
    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Sets the exact parameter types
    #[must_use]
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Accepts whichever single overload carries the name
    #[must_use]
    pub fn any_signature(mut self) -> Self {
        self.signature = None;
        self
    }
}

impl fmt::Display for MemberQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&member_display(
            &self.type_name,
            &self.name,
            self.kind,
            self.signature.as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let field = MemberQuery::field("Host.Editor", "Host.Editor.ReorderableList", "m_Draggable");
        assert_eq!(field.signature, None);
        assert!(!field.is_static);
        assert_eq!(field.visibility, Visibility::PUBLIC);
        assert_eq!(field.to_string(), "Host.Editor.ReorderableList::m_Draggable");

        let ctor = MemberQuery::constructor("Host.Editor", "Host.Editor.ReorderableList");
        assert_eq!(ctor.name, ".ctor");
        assert_eq!(ctor.signature, Some(Signature::empty()));
        assert_eq!(ctor.to_string(), "Host.Editor.ReorderableList::.ctor()");
    }

    #[test]
    fn query_builders() {
        let query = MemberQuery::method("Host.Core", "Host.Core.Thing", "Draw")
            .any_visibility()
            .as_static()
            .any_signature();
        assert_eq!(query.visibility, Visibility::BOTH);
        assert!(query.is_static);
        assert_eq!(query.to_string(), "Host.Core.Thing::Draw");
    }
}
