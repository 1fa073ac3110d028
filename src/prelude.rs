//! # hostbridge Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the hostbridge library. Import this module to get quick access to everything needed
//! to connect to a host, resolve its members and drive its features.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all hostbridge operations
pub use crate::Error;

/// The result type used throughout hostbridge
pub use crate::Result;

/// Builds a parameter signature from type names
pub use crate::signature;

// ================================================================================================
// Host Adapter
// ================================================================================================

/// The host adapter trait and the identifiers crossing it
pub use crate::host::{Host, HostError, HostRef, CORE_LIBRARY};

/// Values exchanged with the host
pub use crate::host::{StructValue, Value};

/// Member classification
pub use crate::host::{MemberKind, ParamMode, Visibility};

/// Parameter signatures
pub use crate::host::signature::{Signature, TypeSig};

/// The in-memory reference host
pub use crate::host::memory::{HostBuilder, InMemoryHost};

// ================================================================================================
// Bridge
// ================================================================================================

/// Entry point and its configuration
pub use crate::bridge::{BridgeConfig, BridgeContext};

/// Resolved handles
pub use crate::bridge::{AssemblyHandle, MemberHandle, TypeHandle};

/// Member lookup and invocation results
pub use crate::bridge::{InvokeResult, MemberQuery};

/// Capability declarations
pub use crate::bridge::{Capability, CapabilityReport};

/// Execution modes
pub use crate::bridge::{Applied, ExecutionMode, TickOutcome};

// ================================================================================================
// Features
// ================================================================================================

/// Proxy base and feature trait
pub use crate::proxy::{HostFeature, HostProxy};

/// Typed host features
pub use crate::proxy::{Color, ListWrapper, PropertyDriver, Rect, SpriteDrawer};

/// Attribute converters
pub use crate::converter::{Converter, ConverterRegistry, HostTyped};
