use std::fmt;
use std::hint::spin_loop;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use crossbeam_utils::CachePadded;
use nm::Event;

use crate::metrics::{
    RENT_HITS, RENT_MISSES, RENT_RETRIES, RETURN_RETRIES, RETURNS_DISCARDED, RETURNS_STORED,
};
use crate::{
    AtomicSlotIndex, Discard, Dispose, DisposeOnDiscard, DropOnDiscard, Error, MAX_CAPACITY,
    Result, RingPoolBuilder, SlotIndex,
};

/// A fixed-capacity pool of boxed items that can be rented and returned from any thread.
///
/// The pool starts empty. Items enter it through [`return_item()`][Self::return_item] and
/// leave it through [`try_rent()`][Self::try_rent]. Ownership moves with the box: a rented
/// item belongs to the caller until it is returned, at which point it belongs to the pool until
/// the next renter claims it.
///
/// The pool never grows. An item returned while the pool is full is handed to the pool's
/// [discard hook][Discard] instead of being stored. This is normal operation, not an error:
/// the pool is a cache of reusable allocations, not a queue with delivery guarantees.
///
/// # Ordering
///
/// Items are stored in a ring. Without contention, a thread renting items gets them back
/// oldest-returned first. Under contention, whichever thread wins the race gets the next item.
///
/// # Thread safety
///
/// The pool is thread-safe ([`Sync`]) whenever the items are thread-mobile ([`Send`]), as no
/// reference to a stored item is ever shared. Neither operation blocks on a lock; both retry
/// with a spin hint when they lose a race with another thread.
///
/// # Examples
///
/// ```
/// use ring_pool::RingPool;
///
/// let pool = RingPool::<Vec<u8>>::new(4).unwrap();
///
/// // An empty pool has nothing to hand out, so the caller allocates.
/// let mut buffer = pool.try_rent().unwrap_or_else(|| Box::new(Vec::with_capacity(1024)));
/// buffer.extend_from_slice(b"hello");
///
/// // Hand the allocation back for somebody else to reuse.
/// buffer.clear();
/// pool.return_item(buffer);
///
/// let buffer = pool.try_rent().unwrap();
/// assert!(buffer.capacity() >= 1024);
/// ```
pub struct RingPool<T, D = DropOnDiscard>
where
    D: Discard<T>,
{
    // Slot contents are only meaningful for positions in [start, end). Slots outside that range
    // keep stale pointers to items that have since been rented; they are never dereferenced.
    items: Box<[AtomicPtr<T>]>,

    // Next position to rent from.
    start: CachePadded<AtomicSlotIndex>,

    // Next position to return into. Locked while a returning thread fills the slot it claimed.
    end: CachePadded<AtomicSlotIndex>,

    max_index: u32,

    discard: D,

    _owns_items: PhantomData<Box<T>>,
}

/// A [`RingPool`] that calls [`Dispose::dispose()`] on every item it does not keep.
pub type DisposingRingPool<T> = RingPool<T, DisposeOnDiscard>;

impl<T> RingPool<T> {
    /// Creates a builder for configuring a new pool.
    ///
    /// # Examples
    ///
    /// ```
    /// use ring_pool::RingPool;
    ///
    /// let pool = RingPool::<String>::builder().capacity(8).build().unwrap();
    ///
    /// assert_eq!(pool.capacity(), 8);
    /// ```
    #[inline]
    pub fn builder() -> RingPoolBuilder<T> {
        RingPoolBuilder::new()
    }

    /// Creates an empty pool with room for `capacity` items. Discarded items are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or larger than the pool can address.
    ///
    /// # Examples
    ///
    /// ```
    /// use ring_pool::{Error, RingPool};
    ///
    /// assert!(RingPool::<u64>::new(16).is_ok());
    /// assert_eq!(RingPool::<u64>::new(0).unwrap_err(), Error::ZeroCapacity);
    /// ```
    #[inline]
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_discard(capacity, DropOnDiscard::new())
    }
}

impl<T> RingPool<T, DisposeOnDiscard>
where
    T: Dispose,
{
    /// Creates an empty pool with room for `capacity` items. Discarded items are disposed.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or larger than the pool can address.
    #[inline]
    pub fn disposing(capacity: usize) -> Result<Self> {
        Self::with_discard(capacity, DisposeOnDiscard::new())
    }
}

impl<T, D> RingPool<T, D>
where
    D: Discard<T>,
{
    /// Creates an empty pool with room for `capacity` items, handing every item it does not
    /// keep to `discard`.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero or larger than the pool can address.
    pub fn with_discard(capacity: usize, discard: D) -> Result<Self> {
        let Ok(capacity_u32) = u32::try_from(capacity) else {
            return Err(Error::CapacityTooLarge {
                capacity,
                max: MAX_CAPACITY,
            });
        };

        let Some(max_index) = capacity_u32.checked_sub(1) else {
            return Err(Error::ZeroCapacity);
        };

        let items = (0..capacity)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();

        Ok(Self {
            items,
            start: CachePadded::new(AtomicSlotIndex::default()),
            end: CachePadded::new(AtomicSlotIndex::default()),
            max_index,
            discard,
            _owns_items: PhantomData,
        })
    }

    /// The number of items the pool can hold.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// The hook that receives items the pool does not keep.
    #[must_use]
    #[inline]
    pub fn discard_hook(&self) -> &D {
        &self.discard
    }

    /// An estimate of how many items are currently stored in the pool.
    ///
    /// The value is computed from an unsynchronized snapshot and may already be outdated when
    /// the caller sees it. It is meant for diagnostics only: a nonzero count does not mean the
    /// next [`try_rent()`][Self::try_rent] will succeed, and a count below capacity does not mean
    /// the next returned item will be stored.
    #[must_use]
    #[inline]
    pub fn available_count(&self) -> usize {
        let start = self.start.load_relaxed();
        let end = self.end.load_relaxed();

        SlotIndex::distance(start, end, self.capacity()).min(self.capacity())
    }

    /// Takes an item out of the pool, if there is one.
    ///
    /// Returns `None` if the pool is empty. An empty pool is an expected condition; callers
    /// typically allocate a fresh item instead (see [`rent_or_else()`][Self::rent_or_else]).
    ///
    /// # Examples
    ///
    /// ```
    /// use ring_pool::RingPool;
    ///
    /// let pool = RingPool::new(2).unwrap();
    /// assert!(pool.try_rent().is_none());
    ///
    /// pool.return_item(Box::new("reusable"));
    /// assert_eq!(*pool.try_rent().unwrap(), "reusable");
    /// ```
    #[must_use]
    pub fn try_rent(&self) -> Option<Box<T>> {
        let item = self.try_rent_fast().or_else(|| self.try_rent_slow());

        if item.is_some() {
            _ = RENT_HITS.try_with(Event::observe_once);
        } else {
            _ = RENT_MISSES.try_with(Event::observe_once);
        }

        item
    }

    /// Takes an item out of the pool or, if the pool is empty, boxes a new one created by `f`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ring_pool::RingPool;
    ///
    /// let pool = RingPool::<Vec<u8>>::new(2).unwrap();
    ///
    /// let buffer = pool.rent_or_else(|| Vec::with_capacity(64));
    /// assert!(buffer.capacity() >= 64);
    /// ```
    pub fn rent_or_else(&self, f: impl FnOnce() -> T) -> Box<T> {
        self.try_rent().unwrap_or_else(|| Box::new(f()))
    }

    /// Makes one optimistic attempt to claim the oldest item.
    ///
    /// Gives up as soon as anything looks contended: an empty-looking pool, a returning thread
    /// mid-write or a lost race on `start`. The slow path sorts those cases out.
    #[inline]
    fn try_rent_fast(&self) -> Option<Box<T>> {
        // `start` first: it never overtakes `end`, so every position between the two snapshots
        // was filled by the time `end` was read.
        let start = self.start.load();
        let end = self.end.load();

        if end.locked() || start.eq_loop(end) {
            return None;
        }

        self.try_claim(start)
    }

    #[cold]
    fn try_rent_slow(&self) -> Option<Box<T>> {
        let mut retries: u32 = 0;

        let item = loop {
            let start = self.start.load();
            let end = self.end.load();

            if !end.locked() {
                if start == end {
                    break None;
                }

                if let Some(item) = self.try_claim(start) {
                    break Some(item);
                }
            }

            retries = retries.saturating_add(1);
            spin_loop();
        };

        _ = RENT_RETRIES.try_with(|e| e.observe(retries));

        item
    }

    /// Claims the item at `start`, which the caller has observed to be occupied.
    ///
    /// Returns `None` if another thread moved `start` first.
    #[inline]
    fn try_claim(&self, start: SlotIndex) -> Option<Box<T>> {
        // The slot must be read before `start` moves on: once it does, a returning thread may
        // refill the slot with the next lap's item.
        let candidate = self.slot(start).load(Ordering::Acquire);

        self.start
            .compare_exchange(start.advance(self.max_index), start)
            .ok()?;

        debug_assert!(!candidate.is_null());

        // SAFETY: The snapshot `start` was occupied when observed and our compare-exchange moved
        // `start` on from exactly that snapshot, so no other renter claimed this position and no
        // returning thread could have refilled the slot in between. The candidate is therefore
        // the pointer stored from a `Box<T>` by the return that filled this position, and we are
        // the only thread that takes ownership of it.
        Some(unsafe { Box::from_raw(candidate) })
    }

    /// Puts an item into the pool for later reuse.
    ///
    /// If the pool is already full, the item is not stored but handed to the pool's
    /// [discard hook][Discard] before this call returns. The caller is not told which of the two
    /// happened.
    ///
    /// # Panics
    ///
    /// Panics if the pool's internal cursor state is found to be corrupted. This indicates a
    /// defect in the pool, not a caller error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ring_pool::RingPool;
    ///
    /// let pool = RingPool::new(1).unwrap();
    ///
    /// pool.return_item(Box::new(1));
    ///
    /// // The pool is full, so this item is dropped.
    /// pool.return_item(Box::new(2));
    ///
    /// assert_eq!(*pool.try_rent().unwrap(), 1);
    /// assert!(pool.try_rent().is_none());
    /// ```
    pub fn return_item(&self, item: Box<T>) {
        let mut retries: u32 = 0;

        loop {
            // `end` first: any `start` read afterwards is at least as new as `end`, which keeps
            // the computed size within one lap of the truth. The reverse order can let a stale
            // `start` make a full pool look like it has room.
            let end = self.end.load();
            let start = self.start.load();

            if !end.locked() {
                let capacity = self.capacity();

                if SlotIndex::distance(start, end, capacity) >= capacity {
                    // Only discard based on a consistent view; a renter may have just made room.
                    if self.end.load() == end && self.start.load() == start {
                        self.discard.discard(item);

                        _ = RETURNS_DISCARDED.try_with(Event::observe_once);
                        _ = RETURN_RETRIES.try_with(|e| e.observe(retries));
                        return;
                    }
                } else {
                    let new_end = end.advance(self.max_index);

                    if self.end.compare_exchange(new_end.lock(), end).is_ok() {
                        self.store_locked(end, new_end, item);

                        _ = RETURNS_STORED.try_with(Event::observe_once);
                        _ = RETURN_RETRIES.try_with(|e| e.observe(retries));
                        return;
                    }
                }
            }

            retries = retries.saturating_add(1);
            spin_loop();
        }
    }

    /// Fills the slot at `claimed` and publishes it by unlocking `end` at `new_end`.
    ///
    /// The caller must have locked `end` by moving it from `claimed` to `new_end.lock()`.
    #[inline]
    fn store_locked(&self, claimed: SlotIndex, new_end: SlotIndex, item: Box<T>) {
        self.slot(claimed)
            .store(Box::into_raw(item), Ordering::Release);

        if let Err(observed) = self.end.compare_exchange(new_end, new_end.lock()) {
            panic!(
                "ring pool end cursor changed while locked by a returning thread: expected {:?}, found {observed:?}",
                new_end.lock()
            );
        }
    }

    #[inline]
    #[expect(
        clippy::indexing_slicing,
        reason = "slot index values are always below capacity"
    )]
    fn slot(&self, index: SlotIndex) -> &AtomicPtr<T> {
        &self.items[index.value() as usize]
    }
}

impl<T, D> Drop for RingPool<T, D>
where
    D: Discard<T>,
{
    fn drop(&mut self) {
        let mut index = self.start.get_mut();
        let end = self.end.get_mut();

        while !index.eq_loop(end) {
            #[expect(
                clippy::indexing_slicing,
                reason = "slot index values are always below capacity"
            )]
            let item = *self.items[index.value() as usize].get_mut();

            // SAFETY: Every position in [start, end) holds a pointer stored from a `Box<T>`
            // that no renter has claimed. We have exclusive access, so nobody else can claim it.
            let item = unsafe { Box::from_raw(item) };

            index = index.advance(self.max_index);

            self.discard.discard(item);
        }
    }
}

// SAFETY: The pool owns the items it stores and has no thread affinity of its own, so it can
// move to another thread as long as the items and the discard hook can.
unsafe impl<T, D> Send for RingPool<T, D>
where
    T: Send,
    D: Discard<T> + Send,
{
}

// SAFETY: Shared access only moves whole items in and out under the cursor protocol. The pool
// never hands out references to stored items, so items only need to be thread-mobile. The
// discard hook is called through a shared reference from any thread, so it must be `Sync`.
unsafe impl<T, D> Sync for RingPool<T, D>
where
    T: Send,
    D: Discard<T> + Sync,
{
}

impl<T, D> fmt::Debug for RingPool<T, D>
where
    D: Discard<T> + fmt::Debug,
{
    #[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingPool")
            .field("capacity", &self.capacity())
            .field("available_count", &self.available_count())
            .field("start", &*self.start)
            .field("end", &*self.end)
            .field("discard", &self.discard)
            .finish_non_exhaustive()
    }
}
