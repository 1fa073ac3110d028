// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![allow(clippy::too_many_arguments)]

//! # hostbridge
//!
//! A dynamic capability bridge: locate, cache and invoke members of a host runtime's API
//! surface, including internal types, non-public fields and methods and open generic methods,
//! and expose them as strongly typed operations.
//!
//! ## Features
//!
//! - **Exactly-once caching** - every module, type, member and closed generic method is
//!   resolved once and shared; failures are never cached
//! - **Signature-exact overloads** - members are selected by their full ordered parameter list
//! - **By-reference marshaling** - `ref` and `out` parameters come back as typed outputs
//! - **Capability tables** - each feature declares the members it needs, validated up front or
//!   on first use
//! - **Execution modes** - host mutations run immediately or on the next tick
//! - **In-memory host** - a complete reference host for tests and embedding
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hostbridge::prelude::*;
//!
//! let host = Arc::new(
//!     HostBuilder::new()
//!         .module("Host.Core", |m| {
//!             m.class("Host.Core.Parser", |t| {
//!                 t.method("TryParse")
//!                     .as_static()
//!                     .non_public()
//!                     .param("text", "System.String")
//!                     .param_out("result", "System.Int32")
//!                     .returns("System.Boolean")
//!                     .body(|_, args| {
//!                         let parsed = args[0].as_str().and_then(|s| s.parse().ok());
//!                         args[1] = parsed.map_or(Value::Null, Value::I32);
//!                         Ok(Value::Bool(parsed.is_some()))
//!                     });
//!             });
//!         })
//!         .build(),
//! );
//!
//! let ctx = BridgeContext::new(host, BridgeConfig::default());
//! let try_parse = ctx.member(
//!     &MemberQuery::method("Host.Core", "Host.Core.Parser", "TryParse")
//!         .as_static()
//!         .non_public()
//!         .signature(Signature::parse("System.String, System.Int32&")?),
//! )?;
//!
//! let result = ctx.invoke(&try_parse, None, &[Value::from("42")])?;
//! assert_eq!(result.value, Value::Bool(true));
//! assert_eq!(result.outputs, vec![Value::I32(42)]);
//! # Ok::<(), hostbridge::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`host`] - The adapter boundary: the [`host::Host`] trait, descriptors, values and
//!   signatures, plus the in-memory host
//! - [`bridge`] - Resolution caches, argument marshaling, capabilities, execution modes and
//!   the [`bridge::BridgeContext`] owning them
//! - [`proxy`] - Typed facades over host features
//! - [`converter`] - The host's string converter registry
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Absence of a host feature is an error
//! of its own kind, which capability queries turn into `false`:
//!
//! ```rust
//! use std::sync::Arc;
//! use hostbridge::prelude::*;
//!
//! let ctx = BridgeContext::new(Arc::new(HostBuilder::new().build()), BridgeConfig::lazy());
//! match ctx.resolve_type("Host.Editor", "Host.Editor.SpriteUtility") {
//!     Err(Error::AssemblyNotFound(name)) => assert_eq!(name, "Host.Editor"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench --bench resolution
//! cargo +nightly fuzz run signature --release
//! ```
#[macro_use]
pub(crate) mod macros;

pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use hostbridge::prelude::*;
///
/// let host = HostBuilder::new().build();
/// assert_eq!(host.object_count(), 0);
/// ```
pub mod prelude;

/// The host adapter boundary.
///
/// Everything the bridge needs from a host runtime goes through the [`host::Host`] trait. The
/// module also defines the values passed across the boundary and the signatures that identify
/// overloads, and ships [`host::memory::InMemoryHost`] as a complete reference implementation.
pub mod host;

/// Resolution, caching and invocation of host members.
///
/// # Key Types
///
/// - [`bridge::BridgeContext`] - One host connection owning every cache
/// - [`bridge::MemberQuery`] - Describes one member to resolve
/// - [`bridge::MemberHandle`] - A resolved member, shared by every caller
/// - [`bridge::BridgeConfig`] - Execution mode and validation policy
pub mod bridge;

/// Typed facades over host features
pub mod proxy;

/// The host's attribute converter registry
pub mod converter;

/// `hostbridge` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `hostbridge` Error type
///
/// The main error type for all operations in this crate: resolution failures, marshaling
/// failures and host exceptions.
///
/// # Examples
///
/// ```rust
/// use hostbridge::Error;
///
/// let err = Error::AssemblyNotFound("Host.Missing".into());
/// assert!(err.is_absence());
/// ```
pub use error::Error;
