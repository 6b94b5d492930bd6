//! Process-wide cache of loaded native libraries.
//!
//! The registry deduplicates loads by name and serializes every access
//! through a single lock. The OS side (loading, unloading and reporting
//! the last error) is abstracted behind [`Loader`] so each platform crate
//! supplies its own mechanism.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::NativeHandle;

/// OS boundary used by [`LibraryRegistry`].
///
/// The registry calls these with its lock held, so implementations must
/// not log or do any other I/O beyond the OS call itself.
pub trait Loader {
    /// Loads a library by its OS-specific name. Returns `None` on failure.
    fn load(&self, name: &str) -> Option<NativeHandle>;

    /// Unloads a handle previously returned by [`Loader::load`], returning
    /// the OS error text on failure.
    fn unload(&self, handle: NativeHandle) -> Result<(), String>;

    /// Returns a readable description of the most recent OS error, or an
    /// empty string when there is none.
    fn last_error(&self) -> String;
}

/// A thread-safe map of library names to loaded module handles.
///
/// Holds at most one entry per name. Every operation acquires the same
/// lock for its full duration (including the OS call), so operations are
/// linearizable and must not be nested. Logging happens after the lock is
/// released.
///
/// Entries stay loaded until [`release`](Self::release) or
/// [`release_all`](Self::release_all) is called; dropping the registry
/// does not unload anything. Call `release_all` before process exit.
pub struct LibraryRegistry<L> {
    loader: L,
    libraries: Mutex<BTreeMap<String, NativeHandle>>,
}

/// What a single OS load or unload did, logged once the lock is gone.
enum Outcome<'a> {
    Loaded(&'a str, NativeHandle),
    LoadFailed(&'a str),
    Unloaded(String, NativeHandle),
    UnloadFailed(String, NativeHandle, String),
}

impl Outcome<'_> {
    fn log(&self) {
        match self {
            Self::Loaded(name, handle) => crate::log_debug!("loaded library {name} ({handle})"),
            Self::LoadFailed(name) => crate::log_warn!("failed to load library {name}"),
            Self::Unloaded(name, handle) => {
                crate::log_debug!("unloaded library {name} ({handle})")
            }
            Self::UnloadFailed(name, handle, e) => {
                crate::log_warn!("failed to unload library {name} ({handle}): {e}")
            }
        }
    }
}

impl<L: Loader> LibraryRegistry<L> {
    /// Creates an empty registry. Usable in a `static`.
    pub const fn new(loader: L) -> Self {
        Self {
            loader,
            libraries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns whether `name` has an entry.
    pub fn has_library(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Returns the cached handle for `name`, loading it on first use.
    ///
    /// A failed load is not cached: the next call tries the OS again.
    pub fn load(&self, name: &str) -> Option<NativeHandle> {
        let outcome = {
            let mut libraries = self.lock();
            if let Some(&handle) = libraries.get(name) {
                return Some(handle);
            }
            let outcome = self.load_uncached(name);
            if let Outcome::Loaded(_, handle) = outcome {
                libraries.insert(name.to_string(), handle);
            }
            outcome
        };

        outcome.log();
        match outcome {
            Outcome::Loaded(_, handle) => Some(handle),
            _ => None,
        }
    }

    /// Loads every name that is not cached yet.
    ///
    /// Returns only the names this call loaded successfully, in input
    /// order. Names that were already present are left out.
    pub fn load_many<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        let mut outcomes = Vec::new();
        {
            let mut libraries = self.lock();
            for name in names {
                let name: &str = name.as_ref();
                if libraries.contains_key(name) {
                    continue;
                }
                let outcome = self.load_uncached(name);
                if let Outcome::Loaded(_, handle) = outcome {
                    libraries.insert(name.to_string(), handle);
                }
                outcomes.push(outcome);
            }
        }

        outcomes
            .iter()
            .filter_map(|outcome| {
                outcome.log();
                match outcome {
                    Outcome::Loaded(name, _) => Some(name.to_string()),
                    _ => None,
                }
            })
            .collect()
    }

    /// Looks up `name` without loading it.
    pub fn get(&self, name: &str) -> Option<NativeHandle> {
        self.lock().get(name).copied()
    }

    /// Unloads `name` and removes its entry. Does nothing if absent.
    pub fn release(&self, name: &str) {
        let outcome = {
            let mut libraries = self.lock();
            libraries
                .remove(name)
                .map(|handle| self.unload(name.to_string(), handle))
        };
        if let Some(outcome) = outcome {
            outcome.log();
        }
    }

    /// Unloads every entry and empties the registry.
    pub fn release_all(&self) {
        let outcomes: Vec<_> = {
            let mut libraries = self.lock();
            std::mem::take(&mut *libraries)
                .into_iter()
                .map(|(name, handle)| self.unload(name, handle))
                .collect()
        };
        for outcome in &outcomes {
            outcome.log();
        }
    }

    /// Returns the loader's description of the last OS error.
    ///
    /// Fetch this right after a failed [`load`](Self::load); any later
    /// OS call may overwrite it.
    pub fn last_error(&self) -> String {
        let _libraries = self.lock();
        self.loader.last_error()
    }

    /// Number of cached libraries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Names of every cached library, sorted.
    pub fn loaded_names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn load_uncached<'a>(&self, name: &'a str) -> Outcome<'a> {
        match self.loader.load(name) {
            Some(handle) => Outcome::Loaded(name, handle),
            None => Outcome::LoadFailed(name),
        }
    }

    fn unload(&self, name: String, handle: NativeHandle) -> Outcome<'static> {
        match self.loader.unload(handle) {
            Ok(()) => Outcome::Unloaded(name, handle),
            Err(e) => Outcome::UnloadFailed(name, handle, e),
        }
    }

    // The map is updated in single steps, so a panic elsewhere can't leave
    // it half-written.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, NativeHandle>> {
        self.libraries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, mpsc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    /// Loader that "finds" only names ending in `.dll` and counts calls.
    #[derive(Default)]
    struct FakeLoader {
        loads: Mutex<HashMap<String, usize>>,
        unloads: Mutex<Vec<NativeHandle>>,
        next: AtomicUsize,
        delay: Option<Duration>,
    }

    impl FakeLoader {
        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Default::default()
            }
        }

        fn load_count(&self, name: &str) -> usize {
            self.loads.lock().unwrap().get(name).copied().unwrap_or(0)
        }

        fn unloaded(&self) -> Vec<NativeHandle> {
            self.unloads.lock().unwrap().clone()
        }
    }

    impl Loader for FakeLoader {
        fn load(&self, name: &str) -> Option<NativeHandle> {
            *self.loads.lock().unwrap().entry(name.into()).or_default() += 1;
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            if !name.ends_with(".dll") {
                return None;
            }
            let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            NativeHandle::from_usize(id * 0x1000)
        }

        fn unload(&self, handle: NativeHandle) -> Result<(), String> {
            self.unloads.lock().unwrap().push(handle);
            Ok(())
        }

        fn last_error(&self) -> String {
            "module not found".into()
        }
    }

    impl Loader for Arc<FakeLoader> {
        fn load(&self, name: &str) -> Option<NativeHandle> {
            self.as_ref().load(name)
        }

        fn unload(&self, handle: NativeHandle) -> Result<(), String> {
            self.as_ref().unload(handle)
        }

        fn last_error(&self) -> String {
            self.as_ref().last_error()
        }
    }

    fn registry() -> (Arc<FakeLoader>, LibraryRegistry<Arc<FakeLoader>>) {
        let loader = Arc::new(FakeLoader::default());
        let registry = LibraryRegistry::new(Arc::clone(&loader));
        (loader, registry)
    }

    #[test]
    fn load_caches_the_handle() {
        // Arrange
        let (loader, registry) = registry();

        // Act
        let first = registry.load("user32.dll");
        let second = registry.load("user32.dll");

        // Assert
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(loader.load_count("user32.dll"), 1);
        assert!(registry.has_library("user32.dll"));
        assert_eq!(registry.get("user32.dll"), first);
    }

    #[test]
    fn failed_load_is_not_cached() {
        // Arrange
        let (loader, registry) = registry();

        // Act
        let result = registry.load("missing.lib");
        let retry = registry.load("missing.lib");

        // Assert
        assert_eq!(result, None);
        assert_eq!(retry, None);
        assert!(!registry.has_library("missing.lib"));
        assert_eq!(loader.load_count("missing.lib"), 2);
        assert_eq!(registry.last_error(), "module not found");
    }

    #[test]
    fn get_never_loads() {
        // Arrange
        let (loader, registry) = registry();

        // Act
        let handle = registry.get("gdi32.dll");

        // Assert
        assert_eq!(handle, None);
        assert_eq!(loader.load_count("gdi32.dll"), 0);
    }

    #[test]
    fn load_many_reports_only_new_loads() {
        // Arrange
        let (_loader, registry) = registry();
        registry.load("a.dll");

        // Act
        let loaded = registry.load_many(&["a.dll", "b.dll", "missing.lib", "c.dll"]);

        // Assert
        assert_eq!(loaded, vec!["b.dll", "c.dll"]);
        assert_eq!(registry.loaded_names(), vec!["a.dll", "b.dll", "c.dll"]);
    }

    #[test]
    fn overlapping_load_many_reports_each_name_once() {
        // Arrange
        let (loader, registry) = registry();
        let batches: [&[&str]; 3] = [
            &["a.dll", "b.dll"],
            &["b.dll", "c.dll", "c.dll"],
            &["a.dll", "c.dll", "d.dll"],
        ];

        // Act
        let mut reported = Vec::new();
        for batch in batches {
            reported.extend(registry.load_many(batch));
            assert!(registry.has_library("a.dll"));
            assert!(registry.get("b.dll").is_some());
        }

        // Assert
        assert_eq!(reported, vec!["a.dll", "b.dll", "c.dll", "d.dll"]);
        for name in ["a.dll", "b.dll", "c.dll", "d.dll"] {
            assert_eq!(loader.load_count(name), 1);
        }
    }

    #[test]
    fn release_unloads_and_removes() {
        // Arrange
        let (loader, registry) = registry();
        let handle = registry.load("user32.dll").unwrap();

        // Act
        registry.release("user32.dll");

        // Assert
        assert!(!registry.has_library("user32.dll"));
        assert_eq!(loader.unloaded(), vec![handle]);
    }

    #[test]
    fn release_of_missing_name_is_a_no_op() {
        // Arrange
        let (loader, registry) = registry();

        // Act
        registry.release("never-loaded.dll");

        // Assert
        assert!(loader.unloaded().is_empty());
    }

    #[test]
    fn release_all_unloads_everything_once() {
        // Arrange
        let (loader, registry) = registry();
        registry.load_many(&["a.dll", "b.dll", "c.dll"]);

        // Act
        registry.release_all();
        registry.release_all();

        // Assert
        assert!(registry.is_empty());
        assert_eq!(loader.unloaded().len(), 3);
    }

    #[test]
    fn load_after_release_goes_back_to_the_os() {
        // Arrange
        let (loader, registry) = registry();
        registry.load("a.dll");
        registry.release("a.dll");

        // Act
        let handle = registry.load("a.dll");

        // Assert
        assert!(handle.is_some());
        assert_eq!(loader.load_count("a.dll"), 2);
    }

    #[test]
    fn concurrent_loads_hit_the_os_once() {
        // Arrange
        let loader = Arc::new(FakeLoader::slow(Duration::from_millis(5)));
        let registry = LibraryRegistry::new(Arc::clone(&loader));

        // Act
        let registry = &registry;
        let handles: Vec<_> = thread::scope(|s| {
            let workers: Vec<_> = (0..8)
                .map(|_| s.spawn(move || registry.load("shared.dll")))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        // Assert
        assert_eq!(loader.load_count("shared.dll"), 1);
        assert!(handles[0].is_some());
        assert!(handles.iter().all(|h| *h == handles[0]));
    }

    #[test]
    fn len_counts_cached_entries() {
        // Arrange
        let (_loader, registry) = registry();

        // Act
        registry.load_many(&["a.dll", "b.dll", "missing.lib", "a.dll"]);

        // Assert
        assert_eq!(registry.len(), 2);
        registry.release("a.dll");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookups_do_not_wait_on_a_stalled_logger() {
        // Arrange
        let (_loader, registry) = registry();
        let registry = &registry;
        let (tx, rx) = mpsc::channel();

        // Act
        let lookup = thread::scope(|s| {
            crate::log::hold_logger(|| {
                s.spawn(move || registry.load("a.dll"));
                thread::sleep(Duration::from_millis(50));
                s.spawn(move || tx.send(registry.has_library("b.dll")));
                rx.recv_timeout(Duration::from_millis(500))
            })
        });

        // Assert
        assert_eq!(lookup, Ok(false));
        assert!(registry.has_library("a.dll"));
    }

    #[test]
    fn works_as_a_static() {
        // Arrange
        struct NullLoader;
        impl Loader for NullLoader {
            fn load(&self, _name: &str) -> Option<NativeHandle> {
                None
            }
            fn unload(&self, _handle: NativeHandle) -> Result<(), String> {
                Ok(())
            }
            fn last_error(&self) -> String {
                String::new()
            }
        }
        static REGISTRY: LibraryRegistry<NullLoader> = LibraryRegistry::new(NullLoader);

        // Act
        let handle = REGISTRY.load("anything.dll");

        // Assert
        assert_eq!(handle, None);
        assert!(REGISTRY.is_empty());
    }
}
