use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keeps count of what happened to the [`TrackedItem`]s it created.
///
/// Tests use this to prove that pooled items are never lost, duplicated or released twice.
#[derive(Debug, Default)]
pub struct Tracker {
    created: AtomicUsize,
    released: AtomicUsize,
    dropped: AtomicUsize,
}

impl Tracker {
    /// Creates a tracker that has not created any items yet.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a new item with an ID that is unique within this tracker.
    #[must_use]
    pub fn item(self: &Arc<Self>) -> TrackedItem {
        let id = self.created.fetch_add(1, Ordering::Relaxed);

        TrackedItem {
            id,
            released: false,
            tracker: Arc::clone(self),
        }
    }

    /// How many items this tracker has created.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// How many items have been released via [`TrackedItem::release()`].
    #[must_use]
    pub fn released(&self) -> usize {
        self.released.load(Ordering::Relaxed)
    }

    /// How many items have been dropped.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// A test item that reports its release and drop to the [`Tracker`] that created it.
#[derive(Debug)]
pub struct TrackedItem {
    id: usize,
    released: bool,
    tracker: Arc<Tracker>,
}

impl TrackedItem {
    /// The unique ID assigned by the tracker.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether [`release()`][Self::release] has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Marks the resources held by the item as released.
    ///
    /// # Panics
    ///
    /// Panics if the item was already released.
    pub fn release(&mut self) {
        assert!(!self.released, "item {} released twice", self.id);

        self.released = true;
        self.tracker.released.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for TrackedItem {
    fn drop(&mut self) {
        self.tracker.dropped.fetch_add(1, Ordering::Relaxed);
    }
}
