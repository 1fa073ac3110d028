//! Object storage of the in-memory host.
//!
//! Objects are kept in a lock-free ordered map keyed by their raw id. Field storage is a
//! per-object concurrent map, so field writes never block readers of other objects.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::host::{HostRef, HostTypeId, Value};

/// One live object
pub(crate) struct HostObject {
    pub type_id: HostTypeId,
    pub label: Option<String>,
    pub fields: DashMap<String, Value>,
}

/// All live objects of one host
pub(crate) struct ObjectHeap {
    objects: SkipMap<u64, HostObject>,
    next_id: AtomicU64,
}

impl ObjectHeap {
    pub fn new() -> Self {
        ObjectHeap {
            objects: SkipMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates an object with initial field values and returns its reference
    pub fn allocate(
        &self,
        type_id: HostTypeId,
        label: Option<String>,
        fields: impl IntoIterator<Item = (String, Value)>,
    ) -> HostRef {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let object = HostObject {
            type_id,
            label,
            fields: fields.into_iter().collect(),
        };
        self.objects.insert(id, object);
        HostRef::new(id)
    }

    /// Removes an object; later accesses through stale references fail
    pub fn release(&self, obj: HostRef) -> bool {
        self.objects.remove(&obj.id()).is_some()
    }

    pub fn is_alive(&self, obj: HostRef) -> bool {
        self.objects.contains_key(&obj.id())
    }

    pub fn type_id(&self, obj: HostRef) -> Option<HostTypeId> {
        self.objects.get(&obj.id()).map(|entry| entry.value().type_id)
    }

    pub fn label(&self, obj: HostRef) -> Option<String> {
        self.objects
            .get(&obj.id())
            .and_then(|entry| entry.value().label.clone())
    }

    /// Reads a field; `None` if the object is dead or the field was never written
    pub fn field(&self, obj: HostRef, name: &str) -> Option<Value> {
        let entry = self.objects.get(&obj.id())?;
        let value = entry.value().fields.get(name).map(|v| v.value().clone());
        value
    }

    /// Writes a field; returns `false` if the object is dead
    pub fn set_field(&self, obj: HostRef, name: &str, value: Value) -> bool {
        match self.objects.get(&obj.id()) {
            Some(entry) => {
                entry.value().fields.insert(name.to_string(), value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}
