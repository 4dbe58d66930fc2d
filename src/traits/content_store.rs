//! Seam to the external page-backed content store.
//!
//! The namespace never reads or writes file bytes. A regular file only holds an
//! opaque [`ContentHandle`] obtained from the store at creation and handed back
//! when the node is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle to a regular file's content in the external store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentHandle(pub u64);

/// External store owning regular-file content.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self`; the store
/// owns the concurrency discipline of the content behind each handle.
///
/// # Object Safety
///
/// This trait is object-safe and is held as `Arc<dyn ContentStore>`.
pub trait ContentStore: Send + Sync {
    /// Allocate an empty content handle for a new regular file.
    ///
    /// Returns `None` when the store is exhausted; the caller reports
    /// [`FsError::OutOfResources`](crate::FsError::OutOfResources).
    fn allocate(&self) -> Option<ContentHandle>;

    /// Release a handle whose node has been reclaimed.
    fn release(&self, handle: ContentHandle);
}

/// Default store: hands out sequential handles and counts live ones.
///
/// Suitable when the host keeps file bytes elsewhere keyed by handle.
#[derive(Debug)]
pub struct CountingStore {
    next: AtomicU64,
    live: AtomicU64,
}

impl CountingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            live: AtomicU64::new(0),
        }
    }

    /// Number of handles allocated and not yet released.
    pub fn live(&self) -> u64 {
        self.live.load(Ordering::Acquire)
    }
}

impl Default for CountingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for CountingStore {
    fn allocate(&self) -> Option<ContentHandle> {
        self.live.fetch_add(1, Ordering::AcqRel);
        Some(ContentHandle(self.next.fetch_add(1, Ordering::Relaxed)))
    }

    fn release(&self, _handle: ContentHandle) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_store_is_object_safe() {
        fn _check(_: &dyn ContentStore) {}
    }

    #[test]
    fn content_store_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: ContentStore>() {
            _assert_send_sync::<T>();
        }
    }

    #[test]
    fn counting_store_hands_out_distinct_handles() {
        let store = CountingStore::new();
        let a = store.allocate().unwrap();
        let b = store.allocate().unwrap();
        assert_ne!(a, b);
        assert_eq!(store.live(), 2);

        store.release(a);
        assert_eq!(store.live(), 1);
    }
}
