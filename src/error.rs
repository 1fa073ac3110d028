use thiserror::Error;

use crate::host::{HostError, MemberKind};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Resolution and marshaling errors are never retried or recovered inside the bridge. They are
/// handed back unchanged to the proxy operation that triggered them, which hands them to its
/// consumer.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::AssemblyNotFound`] - No loaded host module carries the requested name
/// - [`Error::TypeNotFound`] - The module exists but does not declare the type
/// - [`Error::MemberNotFound`] - Zero or several members matched a member query
/// - [`Error::GenericArity`] - Wrong number of type arguments for a generic method
/// - [`Error::UnknownCapability`] - A capability id was never registered
/// - [`Error::InvalidSignature`] - A textual signature could not be parsed
///
/// ## Invocation Errors
/// - [`Error::TypeMismatch`] - Wrong target type, or an argument not assignable to its parameter
/// - [`Error::ArgumentCount`] - Wrong number of arguments for a member
/// - [`Error::Invocation`] - The host raised an exception; the original cause is preserved
///
/// ## Miscellaneous
/// - [`Error::LockError`] - Thread synchronization failure
/// - [`Error::Error`] - Free-form error
///
/// A missing converter is not an error: converter lookups return `None`.
///
/// # Examples
///
/// ```rust
/// use hostbridge::{Error, host::HostError};
///
/// let err = Error::Invocation {
///     member: "Host.Core.Thing::Draw".to_string(),
///     source: HostError::new("System.ArgumentException", "bad rect"),
/// };
///
/// match &err {
///     Error::MemberNotFound { ambiguous: true, .. } => eprintln!("ambiguous overload"),
///     Error::Invocation { source, .. } => eprintln!("host raised {}", source.exception),
///     other => eprintln!("{other}"),
/// }
/// assert!(std::error::Error::source(&err).is_some());
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No currently loaded host module matches the requested name.
    ///
    /// Failed lookups are never cached, so a module that loads later is found by the next call.
    #[error("Assembly '{0}' is not loaded in the host")]
    AssemblyNotFound(String),

    /// The module exists but does not declare a type with this fully qualified name.
    ///
    /// This is the usual symptom of a type introduced in a newer host version.
    #[error("Type '{name}' was not found in assembly '{assembly}'")]
    TypeNotFound {
        /// Name of the module that was searched
        assembly: String,
        /// Fully qualified type name that was requested
        name: String,
    },

    /// No unique member matched the query.
    ///
    /// `candidates == 0` means the member is absent. `ambiguous` is set when more than one
    /// member survived filtering, which indicates a query that is not specific enough.
    #[error("No unique {kind} '{owner}::{member}' ({candidates} candidates)")]
    MemberNotFound {
        /// Fully qualified name of the declaring type
        owner: String,
        /// Member name, with the requested signature for callables
        member: String,
        /// The kind of member that was requested
        kind: MemberKind,
        /// Number of members left after filtering
        candidates: usize,
        /// More than one member matched
        ambiguous: bool,
    },

    /// A generic method was closed (or invoked) with the wrong number of type arguments.
    #[error("Generic method '{method}' expects {expected} type arguments, got {found}")]
    GenericArity {
        /// The open generic method
        method: String,
        /// Number of free generic parameters
        expected: usize,
        /// Number of supplied type arguments
        found: usize,
    },

    /// The invocation target or an argument is not assignable to what the member declares.
    #[error("Type mismatch on '{member}': expected {expected}, found {found}")]
    TypeMismatch {
        /// The member being accessed
        member: String,
        /// What the member declares
        expected: String,
        /// What the caller supplied
        found: String,
    },

    /// The number of supplied arguments does not fit the member.
    #[error("'{member}' takes {expected} arguments, got {found}")]
    ArgumentCount {
        /// The member being accessed
        member: String,
        /// Accepted argument count(s), in human readable form
        expected: String,
        /// Number of supplied arguments
        found: usize,
    },

    /// The host raised an exception while executing a member.
    ///
    /// The original host exception is kept as the error source.
    #[error("Invocation of '{member}' failed: {source}")]
    Invocation {
        /// The member that was invoked
        member: String,
        /// The exception raised by the host
        #[source]
        source: HostError,
    },

    /// A capability id was requested that no installed feature registered.
    #[error("Capability '{0}' is not registered")]
    UnknownCapability(String),

    /// A textual type signature could not be parsed.
    #[error("Invalid signature '{text}': {reason}")]
    InvalidSignature {
        /// The offending input
        text: String,
        /// Why parsing failed
        reason: String,
    },

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns `true` for errors that mean "the host does not provide this".
    ///
    /// These are the errors a capability query swallows; everything else points at a
    /// programming error or a failing host call.
    #[must_use]
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            Error::AssemblyNotFound(_) | Error::TypeNotFound { .. } | Error::MemberNotFound { .. }
        )
    }
}
