//! The resource cache and concurrency facade.
//!
//! A [`ResourceManager`] resolves a [`ResourceIdentifier`] to a decoded
//! resource. The fast path is a cache probe; the slow path reads bytes from
//! the archive stack and decodes them on a bounded worker pool, then caches
//! the outcome. Negative outcomes are cached too, so repeated lookups of a
//! missing asset cost a map probe instead of archive I/O.
//!
//! # Lookup order
//!
//! Unless a caller asks for an exact load, a lookup for `ui/icon.png` first
//! probes the alternate-asset namespace (`hd/ui/icon.png`) and falls back to
//! the canonical path. Paths carrying a legacy absolute-path signature (a
//! DOS drive prefix from assets authored against the original tooling) are
//! stripped down to their `data/`-relative remainder before anything else.
//!
//! # Concurrency
//!
//! The cache map and the single-flight table share one mutex; every
//! check-then-insert runs under it. A concurrent request for an identifier
//! that is already being loaded waits on the first request's promise instead
//! of duplicating the archive read. Loads run to completion once started;
//! there is no cancellation.
//!
//! A synchronous [`load`](ResourceManager::load) is "submit at high priority
//! and block on the future", so interactive call sites are serviced ahead of
//! speculative bulk loads issued through
//! [`load_directory`](ResourceManager::load_directory).

pub mod assets;
pub mod cache;
pub mod cursor;
pub mod ident;
pub mod loader;

pub use self::assets::{AssetPayload, Resource};
pub use self::cache::CacheSlot;
pub use self::ident::{OwnerToken, ResourceIdentifier};
pub use self::loader::{AssetFactory, ResourceInitData, ResourceLoader};

use std::sync::{Arc, Mutex, RwLock};

use crate::archive::ArchiveManager;
use crate::sched::{Priority, Promise, Scheduler};
use crate::utils::{FastHashMap, HashValue};

use self::cache::CacheTable;

/// The reserved path prefix probed for alternate (higher-fidelity) asset
/// variants before the canonical path is tried.
pub const ALTERNATE_PREFIX: &str = "hd/";

/// The marker segment legacy absolute paths are resolved against.
const LEGACY_DATA_SEGMENT: &str = "data";

/// The future handed back by asynchronous loads.
pub type LoadFuture = Arc<Promise<Option<Arc<Resource>>>>;

struct State {
    cache: CacheTable,
    inflight: FastHashMap<ResourceIdentifier, LoadFuture>,
}

struct Inner {
    archives: RwLock<ArchiveManager>,
    loader: ResourceLoader,
    state: Mutex<State>,
}

/// The cache + concurrency facade over the archive stack.
pub struct ResourceManager {
    inner: Arc<Inner>,
    sched: Scheduler,
}

impl ResourceManager {
    /// Creates a manager over an already-populated archive stack.
    ///
    /// If archive admission failed entirely and `archives` holds no loaded
    /// archive, the worker pool is permanently paused: no load could ever
    /// succeed, so none are attempted and every lookup reports absent. This
    /// is a deliberate fail-stop, not a retry loop.
    pub fn new(archives: ArchiveManager, loader: ResourceLoader) -> Self {
        let sched = Scheduler::new();

        if !archives.has_loaded_archives() {
            warn!(
                "[ResourceManager] no usable archives; the worker pool is paused and all loads \
                 will report absent."
            );
            sched.pause();
        }

        ResourceManager {
            inner: Arc::new(Inner {
                archives: RwLock::new(archives),
                loader,
                state: Mutex::new(State {
                    cache: CacheTable::new(),
                    inflight: FastHashMap::default(),
                }),
            }),
            sched,
        }
    }

    /// The underlying archive stack. Hot-swapping through the write half is
    /// exclusive relative to in-flight loads.
    #[inline]
    pub fn archives(&self) -> &RwLock<ArchiveManager> {
        &self.inner.archives
    }

    /// Resolves `id` to a resource, blocking until the outcome is known.
    ///
    /// Probes the alternate namespace first; see the module docs for the
    /// full lookup order.
    pub fn load(&self, id: &ResourceIdentifier) -> Option<Arc<Resource>> {
        self.load_async_impl(id.clone(), false, Priority::High)
            .wait_peek()
            .and_then(|v| v)
    }

    /// Like [`load`](ResourceManager::load), but skips the alternate-asset
    /// probe and resolves exactly the given path.
    pub fn load_exact(&self, id: &ResourceIdentifier) -> Option<Arc<Resource>> {
        self.load_async_impl(id.clone(), true, Priority::High)
            .wait_peek()
            .and_then(|v| v)
    }

    /// Resolves `id` on the worker pool and returns a future of the outcome.
    pub fn load_async(&self, id: &ResourceIdentifier, priority: Priority) -> LoadFuture {
        self.load_async_impl(id.clone(), false, priority)
    }

    fn load_async_impl(&self, id: ResourceIdentifier, exact: bool, priority: Priority) -> LoadFuture {
        if self.sched.is_paused() {
            return Arc::new(Promise::resolved(None));
        }

        let promise: LoadFuture = Arc::new(Promise::new());
        let tx = promise.clone();
        let inner = self.inner.clone();

        self.sched.spawn(priority, move || {
            tx.set(inner.resolve(&id, exact, true));
        });

        promise
    }

    /// Lazily invalidates `id`: the cached value stays in place but the next
    /// load re-resolves it. Returns whether a loaded resource was marked.
    pub fn dirty(&self, id: &ResourceIdentifier) -> bool {
        self.inner.state.lock().unwrap().cache.mark_dirty(id)
    }

    /// Eagerly removes the cache entry under `id`, positive or negative.
    /// Returns whether anything was removed.
    pub fn unload(&self, id: &ResourceIdentifier) -> bool {
        self.inner.state.lock().unwrap().cache.remove(id)
    }

    /// The current state of the cache slot under `id`.
    pub fn cached_state(&self, id: &ResourceIdentifier) -> CacheSlot {
        self.inner.state.lock().unwrap().cache.get(id)
    }

    /// The cached resource under the default-scoped identifier for `path`,
    /// without triggering a load.
    pub fn get_cached_resource<T: AsRef<str>>(&self, path: T) -> Option<Arc<Resource>> {
        self.cached_state(&ResourceIdentifier::new(path))
            .resource()
            .cloned()
    }

    /// Loads every archived file matching the wildcard on the worker pool at
    /// low priority, waits for all of them, and returns how many resolved.
    pub fn load_directory<T: AsRef<str>>(&self, filter: T) -> usize {
        let paths = self.inner.archives.read().unwrap().list_files(filter);

        let futures: Vec<_> = paths
            .into_iter()
            .map(|path| self.load_async_impl(ResourceIdentifier::new(path), false, Priority::Low))
            .collect();

        futures
            .iter()
            .filter(|future| future.wait_peek().and_then(|v| v).is_some())
            .count()
    }

    /// Marks every cached resource whose path matches the wildcard (resolved
    /// against the archive index) dirty. Returns how many were marked.
    pub fn dirty_directory<T: AsRef<str>>(&self, filter: T) -> usize {
        let paths = self.inner.archives.read().unwrap().list_files(filter);

        let mut state = self.inner.state.lock().unwrap();
        paths
            .into_iter()
            .filter(|path| state.cache.mark_dirty(&ResourceIdentifier::new(path)))
            .count()
    }

    /// Hard-removes every cache entry whose path matches the wildcard,
    /// across all owner and archive scopes. Unlike
    /// [`dirty_directory`](ResourceManager::dirty_directory) this matches
    /// against the cache rather than the archive index, so negative entries
    /// for files that no longer exist are evicted too. Returns how many
    /// entries were removed.
    pub fn unload_directory<T: AsRef<str>>(&self, filter: T) -> usize {
        let pattern = crate::archive::normalize(filter);
        self.inner
            .state
            .lock()
            .unwrap()
            .cache
            .remove_matching(&pattern)
    }

    /// Collaborator-facing wrapper: resolve a logical path with default
    /// scoping.
    pub fn load_resource<T: AsRef<str>>(&self, path: T) -> Option<Arc<Resource>> {
        self.load(&ResourceIdentifier::new(path))
    }

    /// Collaborator-facing wrapper: remove the entry for a logical path and
    /// return the number of removed cache entries.
    pub fn unload_resource<T: AsRef<str>>(&self, path: T) -> usize {
        if self.unload(&ResourceIdentifier::new(path)) {
            1
        } else {
            0
        }
    }

    /// Unloads every current archive, then re-admits the supplied set in
    /// order, exclusively with respect to in-flight loads. Cached resources
    /// are not invalidated; callers hot-swapping content typically follow
    /// with a `dirty_directory("*")`.
    pub fn set_archives<I, T>(&self, paths: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<::std::path::PathBuf>,
    {
        self.inner.archives.write().unwrap().set_archives(paths);
    }

    /// The number of populated cache slots, positive and negative.
    pub fn cached_count(&self) -> usize {
        self.inner.state.lock().unwrap().cache.len()
    }
}

enum Step {
    Done(Option<Arc<Resource>>),
    Wait(LoadFuture),
    Load(LoadFuture),
}

impl Inner {
    /// The loading process for one identifier. `cache_negative` is false for
    /// alternate-namespace probes, so a missing alternate never shadows the
    /// canonical asset with a cached failure.
    fn resolve(
        &self,
        id: &ResourceIdentifier,
        exact: bool,
        cache_negative: bool,
    ) -> Option<Arc<Resource>> {
        // Assets authored against the original tooling occasionally carry
        // absolute machine paths; resolve them to their data-relative form.
        if let Some(stripped) = strip_legacy_prefix(id.path()) {
            return self.resolve(&id.rebind(stripped), exact, cache_negative);
        }

        // The alternate probe loads exact, which keeps an already-prefixed
        // path from being prefixed again and bounds the recursion.
        if !exact && !id.path().starts_with(ALTERNATE_PREFIX) {
            let alt = id.rebind(format!("{}{}", ALTERNATE_PREFIX, id.path()));
            if let Some(resource) = self.resolve(&alt, true, false) {
                return Some(resource);
            }
        }

        let step = {
            let mut state = self.state.lock().unwrap();
            match state.cache.get(id) {
                CacheSlot::Loaded(resource) => {
                    if resource.is_dirty() {
                        self.begin_load(&mut state, id)
                    } else {
                        Step::Done(Some(resource))
                    }
                }
                CacheSlot::LoadFailed => Step::Done(None),
                CacheSlot::NotCached => self.begin_load(&mut state, id),
            }
        };

        match step {
            Step::Done(outcome) => outcome,
            // Someone else is already loading this identifier; observe their
            // result instead of duplicating the work.
            Step::Wait(promise) => promise.wait_peek().and_then(|v| v),
            Step::Load(promise) => {
                let outcome = self.load_physical(id);

                {
                    let mut state = self.state.lock().unwrap();
                    state.inflight.remove(id);

                    match outcome {
                        Some(ref resource) => {
                            state.cache.insert_loaded(id.clone(), resource.clone());
                        }
                        None if cache_negative => state.cache.insert_failed(id.clone()),
                        None => {}
                    }
                }

                promise.set(outcome.clone());
                outcome
            }
        }
    }

    fn begin_load(&self, state: &mut State, id: &ResourceIdentifier) -> Step {
        if let Some(promise) = state.inflight.get(id) {
            return Step::Wait(promise.clone());
        }

        let promise: LoadFuture = Arc::new(Promise::new());
        state.inflight.insert(id.clone(), promise.clone());
        Step::Load(promise)
    }

    /// One archive read plus decode; synchronous and uninterruptible.
    fn load_physical(&self, id: &ResourceIdentifier) -> Option<Arc<Resource>> {
        let raw = {
            let archives = self.archives.read().unwrap();
            match id.archive() {
                Some(slot) => archives.archives().get(slot).and_then(|archive| {
                    crate::archive::Archive::load_file_raw(archive, HashValue::from(id.path()))
                }),
                None => archives.load_file(id.path()),
            }
        };

        match raw {
            Some(raw) => self.loader.decode(raw).map(Arc::new),
            None => {
                info!("[ResourceManager] '{}' not found in any archive.", id.path());
                None
            }
        }
    }
}

/// Resolves a legacy absolute-path signature: a path led by a DOS drive
/// segment is cut back to its `data/`-relative remainder (or to everything
/// past the drive when no marker segment is present).
fn strip_legacy_prefix(path: &str) -> Option<String> {
    let mut segments = path.split('/');

    let first = segments.next()?;
    let is_drive = first.len() == 2
        && first.ends_with(':')
        && first.as_bytes()[0].is_ascii_alphabetic();
    if !is_drive {
        return None;
    }

    let rest: Vec<&str> = segments.collect();
    let start = rest
        .iter()
        .position(|&segment| segment == LEGACY_DATA_SEGMENT)
        .map(|i| i + 1)
        .unwrap_or(0);

    Some(rest[start..].join("/"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strips_legacy_prefixes() {
        assert_eq!(
            strip_legacy_prefix("c:/program files/game/data/textures/sky.tex"),
            Some("textures/sky.tex".to_string())
        );
        assert_eq!(
            strip_legacy_prefix("d:/game/ui/icon.png"),
            Some("game/ui/icon.png".to_string())
        );
        assert_eq!(strip_legacy_prefix("textures/sky.tex"), None);
        assert_eq!(strip_legacy_prefix("data/textures/sky.tex"), None);
    }
}
