#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-capacity object pool that recycles boxed items across threads.
//!
//! This crate provides [`RingPool`], a pool that hands out previously used items so that hot
//! paths can reuse allocations (such as byte buffers) instead of allocating new ones on every
//! operation. Any number of threads can rent from and return to the same pool concurrently;
//! neither operation takes a lock on the common path.
//!
//! # Key Features
//!
//! - **Fixed capacity**: All slots are allocated once when the pool is created. The pool
//!   never grows.
//! - **Non-blocking**: Renting from an empty pool returns `None` immediately and returning to a
//!   full pool discards the item immediately. Neither operation waits for other threads.
//! - **Moves, not copies**: The rented `Box<T>` is the same allocation that was returned.
//! - **Discard hook**: Items the pool does not keep, because it is full or because the pool
//!   itself is dropped, go through a [`Discard`] hook. The [`DisposingRingPool`] variant calls
//!   [`Dispose::dispose()`] on them to release held resources.
//! - **Metrics**: Hits, misses, discards and contention are recorded as [`nm`] events.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use ring_pool::RingPool;
//!
//! let pool = Arc::new(RingPool::<Vec<u8>>::new(16).unwrap());
//!
//! let workers = (0..4)
//!     .map(|_| {
//!         let pool = Arc::clone(&pool);
//!
//!         thread::spawn(move || {
//!             for chunk in 0..100_u8 {
//!                 let mut buffer = pool.rent_or_else(|| Vec::with_capacity(4096));
//!                 buffer.clear();
//!                 buffer.push(chunk);
//!                 pool.return_item(buffer);
//!             }
//!         })
//!     })
//!     .collect::<Vec<_>>();
//!
//! for worker in workers {
//!     worker.join().unwrap();
//! }
//!
//! assert!(pool.available_count() <= pool.capacity());
//! ```
//!
//! # Metrics
//!
//! The following events are recorded for all pools in the process:
//!
//! * `ring_pool_rent_hits` - a rent produced an item.
//! * `ring_pool_rent_misses` - a rent found the pool empty.
//! * `ring_pool_returns_stored` - a returned item was stored.
//! * `ring_pool_returns_discarded` - a returned item went to the discard hook.
//! * `ring_pool_rent_retries` - histogram of spin retries per rent that left the fast path.
//! * `ring_pool_return_retries` - histogram of spin retries per return.
//!
//! Collect them with [`nm::Report::collect()`].
//!
//! # Platform support
//!
//! Each cursor of the pool is a single 64-bit atomic word. The crate does not build for targets
//! without native 64-bit atomics.

#[cfg(not(target_has_atomic = "64"))]
compile_error!("ring_pool requires a target with native 64-bit atomics");

mod builder;
mod discard;
mod error;
mod metrics;
mod pool;
mod slot_index;

pub use builder::*;
pub use discard::*;
pub use error::*;
pub use pool::*;
pub(crate) use slot_index::*;
