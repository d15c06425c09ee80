//! Logical identifiers of cache slots.

use crate::archive::normalize;

/// An opaque token naming the consumer subsystem a resource is loaded for.
/// The same path loaded under a different owner is a distinct cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OwnerToken(pub u64);

/// Uniquely names one cache slot: a normalized logical path, an owner scope
/// and an optional pin to a specific archive layer. Immutable once built;
/// equality and hashing combine all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    path: String,
    owner: OwnerToken,
    archive: Option<usize>,
}

impl ResourceIdentifier {
    pub fn new<T: AsRef<str>>(path: T) -> Self {
        ResourceIdentifier {
            path: normalize(path),
            owner: OwnerToken::default(),
            archive: None,
        }
    }

    /// Scopes this identifier to a consumer subsystem.
    pub fn with_owner(mut self, owner: OwnerToken) -> Self {
        self.owner = owner;
        self
    }

    /// Pins this identifier to a specific archive layer slot.
    pub fn with_archive(mut self, slot: usize) -> Self {
        self.archive = Some(slot);
        self
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn owner(&self) -> OwnerToken {
        self.owner
    }

    #[inline]
    pub fn archive(&self) -> Option<usize> {
        self.archive
    }

    /// Rebinds the path, keeping owner and archive scope. Used internally
    /// when a legacy or alternate prefix rewrites the lookup path.
    pub(crate) fn rebind<T: AsRef<str>>(&self, path: T) -> Self {
        ResourceIdentifier {
            path: normalize(path),
            owner: self.owner,
            archive: self.archive,
        }
    }
}

impl<'a> From<&'a str> for ResourceIdentifier {
    fn from(v: &'a str) -> Self {
        ResourceIdentifier::new(v)
    }
}
