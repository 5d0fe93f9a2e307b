use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

use crate::{Discard, DropOnDiscard, Result, RingPool};

/// Builder for creating an instance of [`RingPool`].
///
/// The capacity is mandatory. The discard hook is optional and defaults to [`DropOnDiscard`].
///
/// # Examples
///
/// ```
/// use ring_pool::{Dispose, DisposeOnDiscard, RingPool};
///
/// struct Connection {
///     open: bool,
/// }
///
/// impl Dispose for Connection {
///     fn dispose(&mut self) {
///         self.open = false;
///     }
/// }
///
/// let pool = RingPool::<Connection>::builder()
///     .capacity(32)
///     .discard(DisposeOnDiscard::new())
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.capacity(), 32);
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing pool configuration to happen on different threads than where the pool is used.
/// However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[must_use]
pub struct RingPoolBuilder<T, D = DropOnDiscard> {
    capacity: usize,
    discard: D,

    _item: PhantomData<fn() -> T>,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl<T> RingPoolBuilder<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            discard: DropOnDiscard::new(),
            _item: PhantomData,
            _not_sync: PhantomData,
        }
    }
}

impl<T, D> RingPoolBuilder<T, D> {
    /// Sets the number of items the pool can hold. Must be at least 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use ring_pool::RingPool;
    ///
    /// let pool = RingPool::<u32>::builder().capacity(3).build().unwrap();
    ///
    /// assert_eq!(pool.capacity(), 3);
    /// ```
    #[inline]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the hook that receives items the pool does not keep, replacing any previous hook.
    #[inline]
    pub fn discard<D2>(self, discard: D2) -> RingPoolBuilder<T, D2>
    where
        D2: Discard<T>,
    {
        RingPoolBuilder {
            capacity: self.capacity,
            discard,
            _item: PhantomData,
            _not_sync: PhantomData,
        }
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity was never set, was set to zero or is larger than the
    /// pool can address.
    #[inline]
    pub fn build(self) -> Result<RingPool<T, D>>
    where
        D: Discard<T>,
    {
        RingPool::with_discard(self.capacity, self.discard)
    }
}

impl<T, D> fmt::Debug for RingPoolBuilder<T, D>
where
    D: fmt::Debug,
{
    #[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
    #[expect(clippy::missing_fields_in_debug, reason = "phantoms are boring")]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingPoolBuilder")
            .field("capacity", &self.capacity)
            .field("discard", &self.discard)
            .finish()
    }
}
