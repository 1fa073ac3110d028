//! The adapter boundary between the bridge and a host runtime.
//!
//! Everything the bridge knows about a host runtime arrives through the [`Host`] trait. An
//! adapter lists the loaded modules, finds types inside them, enumerates members, invokes
//! members, and closes open generic methods. The bridge never talks to a host in any other way,
//! which keeps the caching and marshaling logic independent of the concrete runtime.
//!
//! # Key Components
//!
//! - [`Host`] - The adapter trait every host runtime implements
//! - [`ModuleDescriptor`], [`TypeDescriptor`], [`MemberDescriptor`] - What a host reports
//! - [`HostRef`] - An opaque, borrowed reference to a host object
//! - [`HostError`] - An exception raised by the host
//! - [`Value`] - Values passed into and out of host calls
//! - [`signature`] - Parameter type descriptors and textual signatures
//! - [`memory`] - [`memory::InMemoryHost`], a complete reference adapter
//!
//! # Examples
//!
//! ```rust
//! use hostbridge::host::{memory::HostBuilder, Host};
//!
//! let host = HostBuilder::new()
//!     .module("Host.Core", |m| {
//!         m.class("Host.Core.Thing", |_| {});
//!     })
//!     .build();
//!
//! let modules = host.loaded_modules();
//! assert!(modules.iter().any(|m| m.name == "Host.Core"));
//! ```

mod descriptors;
pub mod memory;
mod primitives;
pub mod signature;
mod value;

use std::fmt;

use thiserror::Error;

pub use descriptors::{
    MemberDescriptor, MemberFilter, MemberKind, ModuleDescriptor, ParamDescriptor, ParamMode,
    TypeDescriptor, Visibility,
};
pub use primitives::{CorePrimitive, CORE_LIBRARY};
pub use value::{StructValue, Value};

/// Identity of a loaded host module, unique within one host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostModuleId(pub u64);

/// Identity of a host type, unique within one host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostTypeId(pub u64);

/// Identity of a host member, unique within one host.
///
/// Closed generic methods receive their own id, distinct from the open definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostMemberId(pub u64);

/// An opaque reference to an object living in the host.
///
/// A `HostRef` is a borrowed handle: copying or dropping it never affects the lifetime of the
/// host object it refers to. Only the host decides when an object goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostRef(u64);

impl HostRef {
    /// Creates a reference from the host's raw object id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        HostRef(id)
    }

    /// Returns the host's raw object id.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HostRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An exception raised by the host while executing a member.
///
/// Mirrors the shape of a managed exception: the exception type, its message and an optional
/// inner exception. The bridge wraps it into [`crate::Error::Invocation`] without altering it.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{exception}: {message}")]
pub struct HostError {
    /// Fully qualified name of the exception type
    pub exception: String,
    /// Exception message
    pub message: String,
    /// The exception that caused this one, if any
    #[source]
    pub inner: Option<Box<HostError>>,
}

impl HostError {
    /// Creates a host exception without an inner cause.
    pub fn new(exception: impl Into<String>, message: impl Into<String>) -> Self {
        HostError {
            exception: exception.into(),
            message: message.into(),
            inner: None,
        }
    }

    /// Attaches an inner cause.
    #[must_use]
    pub fn with_inner(mut self, inner: HostError) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Shorthand for `System.NullReferenceException`.
    pub fn null_reference(message: impl Into<String>) -> Self {
        HostError::new("System.NullReferenceException", message)
    }

    /// Shorthand for `System.ArgumentException`.
    pub fn argument(message: impl Into<String>) -> Self {
        HostError::new("System.ArgumentException", message)
    }

    /// Shorthand for `System.MissingMemberException`.
    pub fn missing_member(message: impl Into<String>) -> Self {
        HostError::new("System.MissingMemberException", message)
    }
}

/// The operations a host runtime must provide to be bridged.
///
/// Implementations must be cheap to call repeatedly but the bridge caches every successful
/// resolution, so lookups are expected to happen at most once per distinct key in steady state.
///
/// # Thread Safety
///
/// The bridge may be shared between threads, so adapters must be `Send + Sync`. The bridge never
/// holds one of its own locks while calling into the adapter; re-entrancy guarantees are those
/// of the host itself.
///
/// # Implementing a Host
///
/// ```rust
/// use hostbridge::host::*;
///
/// struct NoHost;
///
/// impl Host for NoHost {
///     fn loaded_modules(&self) -> Vec<ModuleDescriptor> { Vec::new() }
///     fn find_type(&self, _: &ModuleDescriptor, _: &str) -> Option<TypeDescriptor> { None }
///     fn enumerate_members(&self, _: &TypeDescriptor, _: &MemberFilter<'_>) -> Vec<MemberDescriptor> {
///         Vec::new()
///     }
///     fn invoke_member(
///         &self,
///         member: &MemberDescriptor,
///         _: Option<HostRef>,
///         _: &mut [Value],
///     ) -> Result<Value, HostError> {
///         Err(HostError::missing_member(member.name.clone()))
///     }
///     fn close_generic_method(
///         &self,
///         open: &MemberDescriptor,
///         _: &[TypeDescriptor],
///     ) -> Result<MemberDescriptor, HostError> {
///         Err(HostError::missing_member(open.name.clone()))
///     }
///     fn type_of(&self, _: HostRef) -> Option<TypeDescriptor> { None }
///     fn is_assignable(&self, from: &TypeDescriptor, to: &str) -> bool { from.fullname == to }
/// }
/// ```
pub trait Host: Send + Sync {
    /// Lists the modules currently loaded in the host.
    fn loaded_modules(&self) -> Vec<ModuleDescriptor>;

    /// Finds a type by fully qualified name inside one module.
    fn find_type(&self, module: &ModuleDescriptor, qualified_name: &str) -> Option<TypeDescriptor>;

    /// Lists the members of `ty` that pass `filter`.
    ///
    /// Adapters may return a superset; the bridge re-applies the filter before choosing.
    fn enumerate_members(
        &self,
        ty: &TypeDescriptor,
        filter: &MemberFilter<'_>,
    ) -> Vec<MemberDescriptor>;

    /// Invokes a member.
    ///
    /// `args` holds one slot per declared parameter, in declaration order (for fields and
    /// properties: no slot for a read, one slot for a write). By-reference parameters are passed
    /// by reference: the host writes their final value back into the slot.
    ///
    /// # Errors
    ///
    /// Returns the exception the host raised.
    fn invoke_member(
        &self,
        member: &MemberDescriptor,
        target: Option<HostRef>,
        args: &mut [Value],
    ) -> Result<Value, HostError>;

    /// Instantiates an open generic method over concrete type arguments.
    ///
    /// # Errors
    ///
    /// Returns the exception the host raised, e.g. when a constraint is violated.
    fn close_generic_method(
        &self,
        open: &MemberDescriptor,
        type_args: &[TypeDescriptor],
    ) -> Result<MemberDescriptor, HostError>;

    /// Returns the runtime type of a host object, or `None` if the reference is dead.
    fn type_of(&self, obj: HostRef) -> Option<TypeDescriptor>;

    /// Returns `true` when a value of type `from` can be used where `to` is declared.
    fn is_assignable(&self, from: &TypeDescriptor, to: &str) -> bool;

    /// The host's own textual representation of an object.
    fn display(&self, obj: HostRef) -> String {
        obj.to_string()
    }

    /// The host's own equality of two objects.
    fn equals(&self, a: HostRef, b: HostRef) -> bool {
        a == b
    }
}
