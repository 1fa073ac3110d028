//! Signature-exact member resolution.

use crate::{
    bridge::{
        cache::{CacheMap, CacheStats},
        member::MemberHandle,
        types::TypeHandle,
    },
    host::{signature::Signature, Host, HostTypeId, MemberFilter, MemberKind, Visibility},
    Error, Result,
};

/// Everything that identifies one member lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberKey {
    /// The declaring type
    pub owner: HostTypeId,
    /// Member name
    pub name: String,
    /// Member category
    pub kind: MemberKind,
    /// Accepted visibilities
    pub visibility: Visibility,
    /// Static or instance
    pub is_static: bool,
    /// Exact parameter types, if constrained
    pub signature: Option<Signature>,
}

/// Resolves members by [`MemberKey`], once per key.
///
/// Candidates are filtered by name, kind, visibility and staticness, then (for methods and
/// constructors with a signature) by exact ordered parameter types. There is no widening and no
/// closest-overload choice: exactly one candidate must survive.
pub struct MemberResolver {
    entries: CacheMap<MemberKey, MemberHandle>,
}

impl MemberResolver {
    /// Creates an empty resolver
    #[must_use]
    pub fn new() -> Self {
        MemberResolver {
            entries: CacheMap::new("member"),
        }
    }

    /// Resolves the single member of `owner` matching every criterion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if no member matches, or with `ambiguous` set if more
    /// than one does.
    pub fn resolve(
        &self,
        host: &dyn Host,
        owner: &TypeHandle,
        name: &str,
        kind: MemberKind,
        visibility: Visibility,
        is_static: bool,
        signature: Option<&Signature>,
    ) -> Result<MemberHandle> {
        // Fields and properties have no overloads; a signature would never match them
        let signature = signature.filter(|_| kind.is_callable());
        let key = MemberKey {
            owner: owner.id(),
            name: name.to_string(),
            kind,
            visibility,
            is_static,
            signature: signature.cloned(),
        };

        self.entries.get_or_try_insert_with(&key, || {
            let filter = MemberFilter {
                name,
                kind,
                visibility,
                is_static,
            };

            let mut matches: Vec<_> = host
                .enumerate_members(owner.descriptor(), &filter)
                .into_iter()
                .filter(|member| member.declaring_type == owner.id() && filter.admits(member))
                .filter(|member| signature.map_or(true, |sig| member.signature() == *sig))
                .collect();

            match matches.len() {
                1 => Ok(MemberHandle::new(matches.remove(0), owner.clone())),
                candidates => Err(Error::MemberNotFound {
                    owner: owner.fullname().to_string(),
                    member: match signature {
                        Some(sig) => format!("{name}({sig})"),
                        None => name.to_string(),
                    },
                    kind,
                    candidates,
                    ambiguous: candidates > 1,
                }),
            }
        })
    }

    /// Cache counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

impl Default for MemberResolver {
    fn default() -> Self {
        Self::new()
    }
}
