//! Closing open generic methods over type arguments.

use crate::{
    bridge::{
        cache::{CacheMap, CacheStats},
        member::MemberHandle,
        types::TypeHandle,
    },
    host::{Host, HostMemberId, HostTypeId, MemberKind, TypeDescriptor},
    Error, Result,
};

/// Identity of one closed generic method: the open definition and the ordered type arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClosedGenericKey {
    /// The open method definition
    pub open: HostMemberId,
    /// Type arguments in declaration order
    pub type_args: Vec<HostTypeId>,
}

impl ClosedGenericKey {
    /// Builds the key of `open` closed over `type_args`
    #[must_use]
    pub fn new(open: &MemberHandle, type_args: &[TypeHandle]) -> Self {
        ClosedGenericKey {
            open: open.id(),
            type_args: type_args.iter().map(TypeHandle::id).collect(),
        }
    }
}

/// Dispatch table of closed generic methods keyed by [`ClosedGenericKey`].
///
/// Equal keys always yield the same handle instance; the host is asked to instantiate each
/// distinct key once.
pub struct GenericMethodBinder {
    entries: CacheMap<ClosedGenericKey, MemberHandle>,
}

impl GenericMethodBinder {
    /// Creates an empty binder
    #[must_use]
    pub fn new() -> Self {
        GenericMethodBinder {
            entries: CacheMap::new("generic"),
        }
    }

    /// Closes `open` over `type_args`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GenericArity`] if `open` is not a generic method definition or takes a
    /// different number of type arguments, and [`Error::Invocation`] if the host refuses the
    /// instantiation (e.g. a violated constraint).
    pub fn close(
        &self,
        host: &dyn Host,
        open: &MemberHandle,
        type_args: &[TypeHandle],
    ) -> Result<MemberHandle> {
        let expected = usize::from(open.generic_arity());
        if open.kind() != MemberKind::Method || expected == 0 || expected != type_args.len() {
            return Err(Error::GenericArity {
                method: open.display_name(),
                expected,
                found: type_args.len(),
            });
        }

        let key = ClosedGenericKey::new(open, type_args);
        self.entries.get_or_try_insert_with(&key, || {
            let descriptors: Vec<TypeDescriptor> = type_args
                .iter()
                .map(|ty| ty.descriptor().clone())
                .collect();
            host.close_generic_method(open.descriptor(), &descriptors)
                .map(|closed| MemberHandle::new(closed, open.owner().clone()))
                .map_err(|source| Error::Invocation {
                    member: open.display_name(),
                    source,
                })
        })
    }

    /// Cache counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

impl Default for GenericMethodBinder {
    fn default() -> Self {
        Self::new()
    }
}
