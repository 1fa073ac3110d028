//! The bridge context owning every cache of one host connection.

use std::{fmt, sync::Arc};

use log::{debug, warn};

use crate::{
    bridge::{
        assembly::{AssemblyCatalog, AssemblyHandle},
        cache::CacheStats,
        capability::{Capability, CapabilityReport, CapabilityTable},
        config::BridgeConfig,
        generic::GenericMethodBinder,
        marshal::{ArgumentMarshaler, InvokeResult},
        member::{MemberHandle, MemberQuery},
        mode::{strategy_for, Applied, ApplyStrategy, ExecutionMode, Operation, TickOutcome},
        resolver::MemberResolver,
        types::{TypeHandle, TypeResolver},
    },
    host::{signature::Signature, Host, HostRef, MemberKind, TypeDescriptor, Value, Visibility},
    proxy::HostFeature,
    Error, Result,
};

/// Cache counters of a [`BridgeContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeStats {
    /// Module cache
    pub assemblies: CacheStats,
    /// Type cache
    pub types: CacheStats,
    /// Member cache
    pub members: CacheStats,
    /// Closed generic method cache
    pub generics: CacheStats,
}

/// One connection to a host.
///
/// The context owns every resolution cache, the capability table and the execution strategy.
/// It is created once per process (or once per test) and shared by all proxies, usually behind
/// an [`Arc`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use hostbridge::prelude::*;
///
/// let host = HostBuilder::new()
///     .module("Host.Core", |m| {
///         m.class("Host.Core.Thing", |t| {
///             t.method("Ping").as_static().returns("System.Int32").body(|_, _| Ok(Value::I32(1)));
///         });
///     })
///     .build();
///
/// let ctx = BridgeContext::new(Arc::new(host), BridgeConfig::default());
/// let ping = ctx.member(&MemberQuery::method("Host.Core", "Host.Core.Thing", "Ping").as_static())?;
/// assert_eq!(ctx.invoke(&ping, None, &[])?.value, Value::I32(1));
/// # Ok::<(), hostbridge::Error>(())
/// ```
pub struct BridgeContext {
    host: Arc<dyn Host>,
    config: BridgeConfig,
    assemblies: AssemblyCatalog,
    types: TypeResolver,
    members: MemberResolver,
    generics: GenericMethodBinder,
    capabilities: CapabilityTable,
    strategy: Box<dyn ApplyStrategy>,
}

impl BridgeContext {
    /// Creates a context with empty caches
    pub fn new(host: Arc<dyn Host>, config: BridgeConfig) -> Self {
        let strategy = strategy_for(config.mode);
        BridgeContext {
            host,
            config,
            assemblies: AssemblyCatalog::new(),
            types: TypeResolver::new(),
            members: MemberResolver::new(),
            generics: GenericMethodBinder::new(),
            capabilities: CapabilityTable::new(),
            strategy,
        }
    }

    /// The host adapter
    #[must_use]
    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// The configuration the context was created with
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The execution mode of state-changing operations
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.strategy.mode()
    }

    /// Resolves a module by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssemblyNotFound`] if no loaded module matches.
    pub fn assembly(&self, name: &str) -> Result<AssemblyHandle> {
        self.assemblies.resolve(self.host(), name)
    }

    /// Resolves a type by module name and fully qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssemblyNotFound`] or [`Error::TypeNotFound`].
    pub fn resolve_type(&self, assembly: &str, qualified_name: &str) -> Result<TypeHandle> {
        let assembly = self.assembly(assembly)?;
        self.type_in(&assembly, qualified_name)
    }

    /// Resolves a type inside an already resolved module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] if the module does not declare it.
    pub fn type_in(&self, assembly: &AssemblyHandle, qualified_name: &str) -> Result<TypeHandle> {
        self.types.resolve(self.host(), assembly, qualified_name)
    }

    /// The runtime type of a host object, `None` if the object no longer exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssemblyNotFound`] if the declaring module is not reported by the host.
    pub fn type_of(&self, obj: HostRef) -> Result<Option<TypeHandle>> {
        match self.host.type_of(obj) {
            Some(descriptor) => self.adopt_type(descriptor).map(Some),
            None => Ok(None),
        }
    }

    /// The handle of a type descriptor the host returned as a value (for example a
    /// `System.Type` result), sharing the cache entry of a resolution by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssemblyNotFound`] if the declaring module is not reported by the host.
    pub fn adopt_type(&self, descriptor: TypeDescriptor) -> Result<TypeHandle> {
        let assembly = self.assemblies.by_id(self.host(), descriptor.module)?;
        self.types.adopt(&assembly, descriptor)
    }

    /// Resolves one member of `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MemberNotFound`] if zero or several members match.
    pub fn resolve_member(
        &self,
        owner: &TypeHandle,
        name: &str,
        kind: MemberKind,
        visibility: Visibility,
        is_static: bool,
        signature: Option<&Signature>,
    ) -> Result<MemberHandle> {
        self.members.resolve(
            self.host(),
            owner,
            name,
            kind,
            visibility,
            is_static,
            signature,
        )
    }

    /// Resolves the member a query describes, from module name down.
    ///
    /// # Errors
    ///
    /// Returns the first resolution error: [`Error::AssemblyNotFound`],
    /// [`Error::TypeNotFound`] or [`Error::MemberNotFound`].
    pub fn member(&self, query: &MemberQuery) -> Result<MemberHandle> {
        let owner = self.resolve_type(&query.assembly, &query.type_name)?;
        self.resolve_member(
            &owner,
            &query.name,
            query.kind,
            query.visibility,
            query.is_static,
            query.signature.as_ref(),
        )
    }

    /// The non-throwing form of [`BridgeContext::member`]: `None` when the member is absent
    pub fn try_member(&self, query: &MemberQuery) -> Option<MemberHandle> {
        match self.member(query) {
            Ok(handle) => Some(handle),
            Err(err) => {
                debug!("{query} is not available: {err}");
                None
            }
        }
    }

    /// Closes an open generic method over type arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GenericArity`] or the host's refusal as [`Error::Invocation`].
    pub fn close_generic(
        &self,
        open: &MemberHandle,
        type_args: &[TypeHandle],
    ) -> Result<MemberHandle> {
        self.generics.close(self.host(), open, type_args)
    }

    /// Invokes a member with checked arguments.
    ///
    /// # Errors
    ///
    /// See [`ArgumentMarshaler::invoke`].
    pub fn invoke(
        &self,
        handle: &MemberHandle,
        target: Option<HostRef>,
        args: &[Value],
    ) -> Result<InvokeResult> {
        ArgumentMarshaler::new(self.host()).invoke(handle, target, args)
    }

    /// Registers the capabilities of feature `F`.
    ///
    /// With [`BridgeConfig::eager_validation`] every newly registered capability of the feature
    /// is resolved right away; absent optional capabilities are logged. Ids registered by an
    /// earlier install are not checked again. A failed eager install registers nothing.
    ///
    /// # Errors
    ///
    /// With eager validation, returns the resolution error of the first absent required
    /// capability.
    pub fn install<F: HostFeature>(&self) -> Result<()> {
        let fresh: Vec<Capability> = F::capabilities()
            .into_iter()
            .filter(|capability| self.capabilities.register(capability.clone()))
            .collect();
        if fresh.is_empty() {
            return Ok(());
        }
        debug!("installing {} ({} capabilities)", F::NAME, fresh.len());

        if self.config.eager_validation {
            if let Err(err) = self.check(&fresh) {
                for capability in &fresh {
                    self.capabilities.remove(capability.id);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Resolves every registered capability.
    ///
    /// # Errors
    ///
    /// Returns the resolution error of the first absent required capability, in id order.
    pub fn validate(&self) -> Result<CapabilityReport> {
        self.check(&self.capabilities.snapshot())
    }

    fn check(&self, capabilities: &[Capability]) -> Result<CapabilityReport> {
        let mut report = CapabilityReport::default();
        for capability in capabilities {
            match self.member(&capability.query) {
                Ok(_) => report.resolved.push(capability.id),
                Err(err) if capability.required => return Err(err),
                Err(err) => {
                    warn!("optional capability {capability} is unavailable: {err}");
                    report.unavailable.push((capability.id, err));
                }
            }
        }
        Ok(report)
    }

    /// The resolved member of a registered capability.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCapability`] for an unregistered id, or the resolution error.
    pub fn capability(&self, id: &str) -> Result<MemberHandle> {
        let capability = self
            .capabilities
            .get(id)
            .ok_or_else(|| Error::UnknownCapability(id.to_string()))?;
        self.member(&capability.query)
    }

    /// Capability query: whether a registered capability resolves in the running host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCapability`] for an unregistered id.
    pub fn is_available(&self, id: &str) -> Result<bool> {
        let capability = self
            .capabilities
            .get(id)
            .ok_or_else(|| Error::UnknownCapability(id.to_string()))?;
        Ok(self.try_member(&capability.query).is_some())
    }

    /// Hands a state-changing operation to the execution strategy.
    ///
    /// # Errors
    ///
    /// Returns the operation's error when it runs immediately.
    pub fn apply(&self, label: impl Into<String>, op: Operation) -> Result<Applied> {
        self.strategy.apply(self, label.into(), op)
    }

    /// Runs every operation queued before this call, oldest first.
    ///
    /// Operations queued while the tick runs are kept for the next tick. A failing operation
    /// does not stop the others; each outcome is reported.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockError`] if the queue is poisoned.
    pub fn tick(&self) -> Result<Vec<TickOutcome>> {
        let queued = self.strategy.drain()?;
        Ok(queued
            .into_iter()
            .map(|(label, op)| {
                debug!("applying deferred '{label}'");
                TickOutcome {
                    result: op(self),
                    label,
                }
            })
            .collect())
    }

    /// Number of operations waiting for the next tick
    #[must_use]
    pub fn pending(&self) -> usize {
        self.strategy.pending()
    }

    /// Cache counters
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            assemblies: self.assemblies.stats(),
            types: self.types.stats(),
            members: self.members.stats(),
            generics: self.generics.stats(),
        }
    }
}

impl fmt::Debug for BridgeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeContext")
            .field("config", &self.config)
            .field("capabilities", &self.capabilities.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
