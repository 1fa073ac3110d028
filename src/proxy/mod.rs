//! Typed facades over host features.
//!
//! A proxy wraps one borrowed host object, or none for a static surface, and exposes named
//! operations that each delegate to a capability of the [`BridgeContext`]. Proxies never own the
//! host object: dropping one leaves the object alive, and equality and display text come from
//! the host.
//!
//! # Key Components
//!
//! - [`HostProxy`] - The generic wrapper every feature builds on
//! - [`HostFeature`] - The capability table of one feature
//! - [`SpriteDrawer`] - Static sprite and texture drawing
//! - [`PropertyDriver`] - Driven-property registration, applied through the execution mode
//! - [`ListWrapper`] - An instance of the host's reorderable list
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hostbridge::prelude::*;
//!
//! let host = Arc::new(
//!     HostBuilder::new()
//!         .module("Host.Core", |m| {
//!             m.class("Host.Core.Thing", |t| {
//!                 t.property("Name", "System.String");
//!             });
//!         })
//!         .build(),
//! );
//! let obj = host.allocate_with_label("Host.Core.Thing", "thing one")?;
//! let ctx = Arc::new(BridgeContext::new(host.clone(), BridgeConfig::default()));
//!
//! let thing = ctx.resolve_type("Host.Core", "Host.Core.Thing")?;
//! let name = ctx.member(&MemberQuery::property("Host.Core", "Host.Core.Thing", "Name"))?;
//!
//! let proxy = HostProxy::wrap(&ctx, &thing, obj)?;
//! proxy.set(&name, Value::from("renamed"))?;
//! assert_eq!(proxy.get(&name)?, Value::from("renamed"));
//! assert_eq!(proxy.to_string(), "thing one");
//!
//! drop(proxy);
//! assert!(host.is_alive(obj));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod driver;
mod list;
mod sprite;

use std::{fmt, sync::Arc};

pub use driver::PropertyDriver;
pub use list::ListWrapper;
pub use sprite::{Color, Rect, SpriteDrawer};

use crate::{
    bridge::{BridgeContext, Capability, InvokeResult, MemberHandle, TypeHandle},
    host::{HostRef, Value},
    Error, Result,
};

/// A host feature reached through the bridge
pub trait HostFeature {
    /// Name used in log records
    const NAME: &'static str;

    /// Every member the feature uses
    fn capabilities() -> Vec<Capability>;
}

/// A typed facade over one host object, or over the static members of one type
#[derive(Clone)]
pub struct HostProxy {
    ctx: Arc<BridgeContext>,
    owner: TypeHandle,
    target: Option<HostRef>,
}

impl HostProxy {
    /// Adopts an existing host object without taking over its lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the object is gone or not assignable to `owner`.
    pub fn wrap(ctx: &Arc<BridgeContext>, owner: &TypeHandle, obj: HostRef) -> Result<Self> {
        let host = ctx.host();
        match host.type_of(obj) {
            Some(actual) if host.is_assignable(&actual, owner.fullname()) => Ok(HostProxy {
                ctx: Arc::clone(ctx),
                owner: owner.clone(),
                target: Some(obj),
            }),
            Some(actual) => Err(Error::TypeMismatch {
                member: format!("{owner} proxy"),
                expected: owner.fullname().to_string(),
                found: actual.fullname,
            }),
            None => Err(Error::TypeMismatch {
                member: format!("{owner} proxy"),
                expected: owner.fullname().to_string(),
                found: format!("released object {obj}"),
            }),
        }
    }

    /// A proxy over the static members of `owner`
    #[must_use]
    pub fn static_only(ctx: &Arc<BridgeContext>, owner: &TypeHandle) -> Self {
        HostProxy {
            ctx: Arc::clone(ctx),
            owner: owner.clone(),
            target: None,
        }
    }

    /// Constructs a new host object through `ctor` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns the invocation error, or [`Error::TypeMismatch`] if the constructor did not
    /// produce an object.
    pub fn create(ctx: &Arc<BridgeContext>, ctor: &MemberHandle, args: &[Value]) -> Result<Self> {
        let created = ctx.invoke(ctor, None, args)?.value;
        let obj = expect(ctor, created, Value::as_object, "a host object")?;
        Self::wrap(ctx, ctor.owner(), obj)
    }

    /// The bridge context
    #[must_use]
    pub fn context(&self) -> &Arc<BridgeContext> {
        &self.ctx
    }

    /// The wrapped type
    #[must_use]
    pub fn owner(&self) -> &TypeHandle {
        &self.owner
    }

    /// The wrapped object, `None` for a static surface
    #[must_use]
    pub fn target(&self) -> Option<HostRef> {
        self.target
    }

    /// Returns `true` for a static surface
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.target.is_none()
    }

    fn target_for(&self, member: &MemberHandle) -> Option<HostRef> {
        if member.is_static() {
            None
        } else {
            self.target
        }
    }

    /// Reads a field or property.
    ///
    /// # Errors
    ///
    /// Returns the marshaling or invocation error.
    pub fn get(&self, member: &MemberHandle) -> Result<Value> {
        Ok(self.ctx.invoke(member, self.target_for(member), &[])?.value)
    }

    /// Writes a field or property.
    ///
    /// # Errors
    ///
    /// Returns the marshaling or invocation error.
    pub fn set(&self, member: &MemberHandle, value: Value) -> Result<()> {
        self.ctx.invoke(member, self.target_for(member), &[value])?;
        Ok(())
    }

    /// Calls a method.
    ///
    /// # Errors
    ///
    /// Returns the marshaling or invocation error.
    pub fn call(&self, member: &MemberHandle, args: &[Value]) -> Result<InvokeResult> {
        self.ctx.invoke(member, self.target_for(member), args)
    }

    /// Calls a capability by id.
    ///
    /// # Errors
    ///
    /// Returns the resolution, marshaling or invocation error.
    pub fn call_capability(&self, id: &str, args: &[Value]) -> Result<InvokeResult> {
        let member = self.ctx.capability(id)?;
        self.call(&member, args)
    }
}

impl PartialEq for HostProxy {
    fn eq(&self, other: &Self) -> bool {
        match (self.target, other.target) {
            (Some(a), Some(b)) => self.ctx.host().equals(a, b),
            (None, None) => self.owner == other.owner,
            _ => false,
        }
    }
}

impl fmt::Display for HostProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(obj) => f.write_str(&self.ctx.host().display(obj)),
            None => write!(f, "static {}", self.owner),
        }
    }
}

impl fmt::Debug for HostProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostProxy")
            .field("owner", &self.owner)
            .field("target", &self.target)
            .finish()
    }
}

/// Extracts a typed value from a member's result
pub(crate) fn expect<T>(
    member: &MemberHandle,
    value: Value,
    extract: impl FnOnce(&Value) -> Option<T>,
    expected: &str,
) -> Result<T> {
    extract(&value).ok_or_else(|| Error::TypeMismatch {
        member: member.display_name(),
        expected: expected.to_string(),
        found: value.type_label(),
    })
}

/// Unpacks the `bool Try...(..., out x)` convention: the first output when the call reports
/// success, `None` otherwise
pub(crate) fn out_value(member: &MemberHandle, result: InvokeResult) -> Result<Option<Value>> {
    let found = expect(member, result.value, Value::as_bool, "System.Boolean")?;
    Ok(if found {
        result.outputs.into_iter().next()
    } else {
        None
    })
}
