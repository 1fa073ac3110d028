//! The capability descriptor table.
//!
//! Every proxied feature declares the host members it needs once, as [`Capability`] entries.
//! The table is filled when a feature is installed into a [`crate::bridge::BridgeContext`] and
//! can be validated eagerly, so an absent host API is reported at startup rather than at first
//! use. Optional entries describe version-conditional host APIs: their absence is logged and
//! queried through [`crate::bridge::BridgeContext::is_available`].

use std::fmt;

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{bridge::member::MemberQuery, Error};

/// One member a feature relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// Unique id, conventionally `feature.operation`
    pub id: &'static str,
    /// The member to resolve
    pub query: MemberQuery,
    /// Required capabilities fail validation when absent
    pub required: bool,
}

impl Capability {
    /// A capability the feature cannot work without
    #[must_use]
    pub fn required(id: &'static str, query: MemberQuery) -> Self {
        Capability {
            id,
            query,
            required: true,
        }
    }

    /// A capability that may be missing in some host versions
    #[must_use]
    pub fn optional(id: &'static str, query: MemberQuery) -> Self {
        Capability {
            id,
            query,
            required: false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let need = if self.required { "required" } else { "optional" };
        write!(f, "{} ({need}): {}", self.id, self.query)
    }
}

/// Result of validating the capability table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapabilityReport {
    /// Ids that resolved, in id order
    pub resolved: Vec<&'static str>,
    /// Optional ids that did not resolve, with the resolution error
    pub unavailable: Vec<(&'static str, Error)>,
}

impl CapabilityReport {
    /// Returns `true` if every registered capability resolved
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }
}

/// Registered capabilities keyed by id
pub(crate) struct CapabilityTable {
    entries: DashMap<&'static str, Capability>,
}

impl CapabilityTable {
    pub fn new() -> Self {
        CapabilityTable {
            entries: DashMap::new(),
        }
    }

    /// Registers `capability`; an id that is already registered keeps its first entry.
    ///
    /// Returns `true` if the id was new.
    pub fn register(&self, capability: Capability) -> bool {
        match self.entries.entry(capability.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(capability);
                true
            }
        }
    }

    pub fn remove(&self, id: &str) {
        self.entries.remove(id);
    }

    pub fn get(&self, id: &str) -> Option<Capability> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    /// All entries, sorted by id
    pub fn snapshot(&self) -> Vec<Capability> {
        let mut all: Vec<Capability> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|capability| capability.id);
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
