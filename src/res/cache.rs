//! The identifier-keyed resource cache.

use std::sync::Arc;

use crate::utils::{wildcard_match, FastHashMap};

use super::assets::Resource;
use super::ident::ResourceIdentifier;

/// The observable state of one cache slot.
///
/// `LoadFailed` is a cached negative outcome: repeated lookups of a missing
/// or undecodable asset cost a map probe instead of archive I/O. A `Loaded`
/// slot whose resource has been marked dirty is treated as stale by the
/// manager but stays here until the next load overwrites it.
#[derive(Debug, Clone)]
pub enum CacheSlot {
    NotCached,
    LoadFailed,
    Loaded(Arc<Resource>),
}

impl CacheSlot {
    #[inline]
    pub fn is_cached(&self) -> bool {
        match *self {
            CacheSlot::NotCached => false,
            _ => true,
        }
    }

    /// The resource, if this slot holds a successful load.
    #[inline]
    pub fn resource(&self) -> Option<&Arc<Resource>> {
        match *self {
            CacheSlot::Loaded(ref v) => Some(v),
            _ => None,
        }
    }
}

/// The cache map itself. Callers hold the manager's single state mutex for
/// every check-then-insert sequence; nothing here locks.
pub(crate) struct CacheTable {
    slots: FastHashMap<ResourceIdentifier, CacheSlot>,
}

impl CacheTable {
    pub fn new() -> Self {
        CacheTable {
            slots: FastHashMap::default(),
        }
    }

    /// The slot for `id`; absence reads as `NotCached`.
    pub fn get(&self, id: &ResourceIdentifier) -> CacheSlot {
        self.slots.get(id).cloned().unwrap_or(CacheSlot::NotCached)
    }

    pub fn insert_loaded(&mut self, id: ResourceIdentifier, resource: Arc<Resource>) {
        self.slots.insert(id, CacheSlot::Loaded(resource));
    }

    pub fn insert_failed(&mut self, id: ResourceIdentifier) {
        self.slots.insert(id, CacheSlot::LoadFailed);
    }

    /// Hard-removes a slot. Returns whether anything was cached under `id`.
    pub fn remove(&mut self, id: &ResourceIdentifier) -> bool {
        self.slots.remove(id).is_some()
    }

    /// Marks the resource under `id` dirty, if one is loaded. Returns whether
    /// a resource was marked.
    pub fn mark_dirty(&mut self, id: &ResourceIdentifier) -> bool {
        match self.slots.get(id) {
            Some(CacheSlot::Loaded(resource)) => {
                resource.mark_dirty();
                true
            }
            _ => false,
        }
    }

    /// Hard-removes every slot whose path matches the wildcard, regardless of
    /// owner or archive scope. Returns the number of removed slots.
    pub fn remove_matching(&mut self, pattern: &str) -> usize {
        let before = self.slots.len();
        self.slots.retain(|id, _| !wildcard_match(pattern, id.path()));
        before - self.slots.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
