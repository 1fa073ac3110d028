//! Lazy lookup of loaded host modules.

use std::{fmt, sync::Arc};

use crate::{
    bridge::cache::{CacheMap, CacheStats},
    host::{Host, HostModuleId, ModuleDescriptor},
    Error, Result,
};

/// A resolved host module, shared by every type resolved from it
#[derive(Clone)]
pub struct AssemblyHandle(Arc<ModuleDescriptor>);

impl AssemblyHandle {
    pub(crate) fn new(descriptor: ModuleDescriptor) -> Self {
        AssemblyHandle(Arc::new(descriptor))
    }

    /// The declared module name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Host identity of the module
    #[must_use]
    pub fn id(&self) -> HostModuleId {
        self.0.id
    }

    /// The descriptor the host reported
    #[must_use]
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.0
    }

    /// Returns `true` if both handles share one resolution
    #[must_use]
    pub fn ptr_eq(&self, other: &AssemblyHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for AssemblyHandle {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for AssemblyHandle {}

impl fmt::Debug for AssemblyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssemblyHandle({})", self.0.name)
    }
}

impl fmt::Display for AssemblyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Resolves modules by declared name, once per name.
///
/// A module that is not loaded yet is reported as [`Error::AssemblyNotFound`] and is looked up
/// again on the next call.
pub struct AssemblyCatalog {
    entries: CacheMap<String, AssemblyHandle>,
}

impl AssemblyCatalog {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        AssemblyCatalog {
            entries: CacheMap::new("assembly"),
        }
    }

    /// Resolves a module by exact name; the first loaded module with that name wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssemblyNotFound`] if the name is empty or no loaded module matches.
    pub fn resolve(&self, host: &dyn Host, name: &str) -> Result<AssemblyHandle> {
        if name.is_empty() {
            return Err(Error::AssemblyNotFound(String::new()));
        }

        self.entries.get_or_try_insert_with(name, || {
            host.loaded_modules()
                .into_iter()
                .find(|module| module.name == name)
                .map(AssemblyHandle::new)
                .ok_or_else(|| Error::AssemblyNotFound(name.to_string()))
        })
    }

    /// Finds the handle of a module by host identity.
    ///
    /// Checks the cached modules first and scans the host only for a module never resolved
    /// by name, which is then cached under its name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssemblyNotFound`] if no loaded module has that identity.
    pub fn by_id(&self, host: &dyn Host, id: HostModuleId) -> Result<AssemblyHandle> {
        let mut cached = None;
        self.entries.for_each(|_, handle| {
            if handle.id() == id {
                cached = Some(handle.clone());
            }
        });
        if let Some(handle) = cached {
            return Ok(handle);
        }

        let module = host
            .loaded_modules()
            .into_iter()
            .find(|module| module.id == id)
            .ok_or_else(|| Error::AssemblyNotFound(format!("<module {}>", id.0)))?;
        let name = module.name.clone();
        self.entries
            .get_or_try_insert_with(name.as_str(), || Ok(AssemblyHandle::new(module)))
    }

    /// Cache counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

impl Default for AssemblyCatalog {
    fn default() -> Self {
        Self::new()
    }
}
