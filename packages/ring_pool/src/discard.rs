/// Decides what happens to an item that the pool does not keep.
///
/// A [`RingPool`][crate::RingPool] hands items to its discard hook in two situations:
///
/// * An item is returned while the pool is already at capacity.
/// * The pool is dropped while it still holds items.
///
/// The hook is the only behavioral variation point of the pool. It is chosen as a type
/// parameter when the pool is created and cannot be changed afterwards.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use ring_pool::{Discard, RingPool};
///
/// #[derive(Debug, Default)]
/// struct CountDiscarded(AtomicUsize);
///
/// impl<T> Discard<T> for CountDiscarded {
///     fn discard(&self, item: Box<T>) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///         drop(item);
///     }
/// }
///
/// let pool = RingPool::with_discard(1, CountDiscarded::default()).unwrap();
///
/// pool.return_item(Box::new(1));
/// pool.return_item(Box::new(2));
///
/// assert_eq!(pool.discard_hook().0.load(Ordering::Relaxed), 1);
/// ```
pub trait Discard<T> {
    /// Releases an item that the pool will not store.
    fn discard(&self, item: Box<T>);
}

/// The default discard hook. Discarded items are simply dropped.
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct DropOnDiscard;

impl DropOnDiscard {
    /// Creates the hook.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<T> Discard<T> for DropOnDiscard {
    #[inline]
    fn discard(&self, item: Box<T>) {
        drop(item);
    }
}

/// An item that holds a resource with an explicit release step, separate from being dropped.
///
/// Used together with [`DisposeOnDiscard`] to release the resource of every item that a pool
/// does not keep.
pub trait Dispose {
    /// Releases the resources held by the item.
    ///
    /// The pool calls this at most once per discarded item, immediately before dropping it.
    fn dispose(&mut self);
}

/// A discard hook that calls [`Dispose::dispose()`] on each discarded item before dropping it.
///
/// This is the hook used by [`DisposingRingPool`][crate::DisposingRingPool].
#[derive(Clone, Copy, Debug, Default)]
#[non_exhaustive]
pub struct DisposeOnDiscard;

impl DisposeOnDiscard {
    /// Creates the hook.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<T> Discard<T> for DisposeOnDiscard
where
    T: Dispose,
{
    #[inline]
    fn discard(&self, mut item: Box<T>) {
        item.dispose();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;
    use std::rc::Rc;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(DropOnDiscard: Send, Sync, Debug, Copy, Default);
    assert_impl_all!(DisposeOnDiscard: Send, Sync, Debug, Copy, Default);

    struct Resource {
        disposed: Rc<Cell<usize>>,
        dropped: Rc<Cell<usize>>,
    }

    impl Dispose for Resource {
        fn dispose(&mut self) {
            self.disposed.set(self.disposed.get() + 1);
        }
    }

    impl Drop for Resource {
        fn drop(&mut self) {
            self.dropped.set(self.dropped.get() + 1);
        }
    }

    fn resource() -> (Box<Resource>, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let disposed = Rc::new(Cell::new(0));
        let dropped = Rc::new(Cell::new(0));

        let item = Box::new(Resource {
            disposed: Rc::clone(&disposed),
            dropped: Rc::clone(&dropped),
        });

        (item, disposed, dropped)
    }

    #[test]
    fn drop_on_discard_drops_without_disposing() {
        let (item, disposed, dropped) = resource();

        DropOnDiscard::new().discard(item);

        assert_eq!(disposed.get(), 0);
        assert_eq!(dropped.get(), 1);
    }

    #[test]
    fn dispose_on_discard_disposes_then_drops() {
        let (item, disposed, dropped) = resource();

        DisposeOnDiscard::new().discard(item);

        assert_eq!(disposed.get(), 1);
        assert_eq!(dropped.get(), 1);
    }
}
