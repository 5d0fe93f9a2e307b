//! Metrics for ring pools.
//!
//! The events are shared by all pools in the process. They use per-thread event instances, so
//! recording an observation does not add contention on top of the pool's own cursors.
//!
//! Pools are also used from thread-local destructors, where these events may already be gone.
//! Observations are recorded via `try_with()` and skipped when the event is no longer available.

use nm::{Event, Magnitude};

/// Histogram buckets for the number of spin retries a single call needed.
///
/// Almost every call should finish on the first attempt. Anything in the upper buckets points
/// at heavy contention on one pool, typically more threads than the pool has slots.
const RETRIES_BUCKETS: &[Magnitude] = &[0, 1, 2, 4, 8, 16, 64, 256, 1024];

thread_local! {
    /// A rent call that produced an item.
    pub(crate) static RENT_HITS: Event = Event::builder()
        .name("ring_pool_rent_hits")
        .build();

    /// A rent call that found the pool empty.
    pub(crate) static RENT_MISSES: Event = Event::builder()
        .name("ring_pool_rent_misses")
        .build();

    /// A returned item that was stored for reuse.
    pub(crate) static RETURNS_STORED: Event = Event::builder()
        .name("ring_pool_returns_stored")
        .build();

    /// A returned item that was handed to the discard hook because the pool was full.
    pub(crate) static RETURNS_DISCARDED: Event = Event::builder()
        .name("ring_pool_returns_discarded")
        .build();

    /// Spin retries taken by one rent call after its fast path failed.
    pub(crate) static RENT_RETRIES: Event = Event::builder()
        .name("ring_pool_rent_retries")
        .histogram(RETRIES_BUCKETS)
        .build();

    /// Spin retries taken by one return call.
    pub(crate) static RETURN_RETRIES: Event = Event::builder()
        .name("ring_pool_return_retries")
        .histogram(RETRIES_BUCKETS)
        .build();
}

