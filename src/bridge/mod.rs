//! The dynamic capability bridge.
//!
//! This module locates, caches and invokes members of a host's API surface, including
//! non-public fields and methods and open generic methods, and hands them to the typed proxies
//! in [`crate::proxy`].
//!
//! # Architecture
//!
//! Components, leaves first:
//!
//! 1. [`AssemblyCatalog`] - resolves a module by declared name, once per name
//! 2. [`TypeResolver`] - resolves a type by qualified name inside a module
//! 3. [`MemberResolver`] - resolves a member by name, kind, visibility, staticness and exact
//!    signature
//! 4. [`GenericMethodBinder`] - closes an open generic method over a type-argument tuple
//! 5. [`ArgumentMarshaler`] - checks and packs arguments, unpacks by-reference results
//!
//! [`BridgeContext`] owns one instance of each, the [`Capability`] table and the execution
//! [`ApplyStrategy`]. All caches are [`CacheMap`]s: lookups never hold a lock across a host
//! call, failures are never cached, and racing fills publish exactly one handle.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use hostbridge::prelude::*;
//!
//! let host = HostBuilder::new()
//!     .module("Host.Core", |m| {
//!         m.class("Host.Core.Thing", |t| {
//!             t.method("Draw").as_static().param("label", "System.String");
//!             t.method("Draw").as_static().non_public().param("code", "System.Int32");
//!         });
//!     })
//!     .build();
//! let ctx = BridgeContext::new(Arc::new(host), BridgeConfig::default());
//!
//! let private = MemberQuery::method("Host.Core", "Host.Core.Thing", "Draw")
//!     .as_static()
//!     .non_public()
//!     .signature(signature!["System.Int32"]);
//! let draw = ctx.member(&private)?;
//! assert_eq!(draw.visibility(), Visibility::NON_PUBLIC);
//! ctx.invoke(&draw, None, &[Value::I32(3)])?;
//! # Ok::<(), hostbridge::Error>(())
//! ```

mod assembly;
mod cache;
mod capability;
mod config;
mod context;
mod generic;
mod marshal;
mod member;
mod mode;
mod resolver;
mod types;

pub use assembly::{AssemblyCatalog, AssemblyHandle};
pub use cache::{CacheMap, CacheSlot, CacheStats};
pub use capability::{Capability, CapabilityReport};
pub use config::BridgeConfig;
pub use context::{BridgeContext, BridgeStats};
pub use generic::{ClosedGenericKey, GenericMethodBinder};
pub use marshal::{is_assignable, ArgumentMarshaler, InvokeResult};
pub use member::{MemberHandle, MemberQuery};
pub use mode::{
    strategy_for, Applied, ApplyStrategy, DeferredStrategy, ExecutionMode, ImmediateStrategy,
    Operation, TickOutcome,
};
pub use resolver::{MemberKey, MemberResolver};
pub use types::{TypeHandle, TypeResolver};
