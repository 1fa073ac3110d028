//! Lazy lookup of host types inside resolved modules.

use std::{fmt, sync::Arc};

use crate::{
    bridge::{
        assembly::AssemblyHandle,
        cache::{CacheMap, CacheStats},
    },
    host::{Host, HostModuleId, HostTypeId, TypeDescriptor},
    Error, Result,
};

struct TypeInfo {
    descriptor: TypeDescriptor,
    assembly: AssemblyHandle,
}

/// A resolved host type.
///
/// Cloning is cheap; clones share one resolution.
#[derive(Clone)]
pub struct TypeHandle(Arc<TypeInfo>);

impl TypeHandle {
    pub(crate) fn new(descriptor: TypeDescriptor, assembly: AssemblyHandle) -> Self {
        TypeHandle(Arc::new(TypeInfo {
            descriptor,
            assembly,
        }))
    }

    /// Host identity of the type
    #[must_use]
    pub fn id(&self) -> HostTypeId {
        self.0.descriptor.id
    }

    /// Fully qualified name
    #[must_use]
    pub fn fullname(&self) -> &str {
        &self.0.descriptor.fullname
    }

    /// Simple name without namespace
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.descriptor.name()
    }

    /// Namespace, empty for global types
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.0.descriptor.namespace()
    }

    /// The descriptor the host reported
    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.0.descriptor
    }

    /// The module declaring this type
    #[must_use]
    pub fn assembly(&self) -> &AssemblyHandle {
        &self.0.assembly
    }

    /// Returns `true` if both handles share one resolution
    #[must_use]
    pub fn ptr_eq(&self, other: &TypeHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.descriptor.id == other.0.descriptor.id
    }
}

impl Eq for TypeHandle {}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeHandle({} in {})",
            self.0.descriptor.fullname, self.0.assembly
        )
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.descriptor.fullname)
    }
}

/// Resolves types by `(module, qualified name)`, once per key
pub struct TypeResolver {
    entries: CacheMap<(HostModuleId, String), TypeHandle>,
}

impl TypeResolver {
    /// Creates an empty resolver
    #[must_use]
    pub fn new() -> Self {
        TypeResolver {
            entries: CacheMap::new("type"),
        }
    }

    /// Resolves a type declared in `assembly`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if the module does not declare the type.
    pub fn resolve(
        &self,
        host: &dyn Host,
        assembly: &AssemblyHandle,
        qualified_name: &str,
    ) -> Result<TypeHandle> {
        let key = (assembly.id(), qualified_name.to_string());
        self.entries.get_or_try_insert_with(&key, || {
            host.find_type(assembly.descriptor(), qualified_name)
                .map(|descriptor| TypeHandle::new(descriptor, assembly.clone()))
                .ok_or_else(|| Error::TypeNotFound {
                    assembly: assembly.name().to_string(),
                    name: qualified_name.to_string(),
                })
        })
    }

    /// Turns a descriptor the host reported elsewhere (e.g. the runtime type of an object) into
    /// the cached handle for that type, without a host lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the descriptor belongs to another module.
    pub fn adopt(&self, assembly: &AssemblyHandle, descriptor: TypeDescriptor) -> Result<TypeHandle> {
        if descriptor.module != assembly.id() {
            return Err(Error::TypeMismatch {
                member: descriptor.fullname,
                expected: format!("a type of module '{}'", assembly.name()),
                found: format!("module {}", descriptor.module.0),
            });
        }

        let key = (assembly.id(), descriptor.fullname.clone());
        self.entries
            .get_or_try_insert_with(&key, || Ok(TypeHandle::new(descriptor, assembly.clone())))
    }

    /// Cache counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}
