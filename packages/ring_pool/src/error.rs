use thiserror::Error;

/// Errors that can occur when creating a [`RingPool`][crate::RingPool].
#[derive(Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The requested capacity was zero. A pool must have room for at least one item.
    #[error("ring pool capacity must be at least 1")]
    ZeroCapacity,

    /// The requested capacity cannot be addressed by the slot index.
    #[error("ring pool capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge {
        /// The capacity that was requested.
        capacity: usize,

        /// The largest capacity a pool can be created with.
        max: usize,
    },
}

/// A specialized `Result` type for ring pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn zero_capacity_message() {
        assert_eq!(
            Error::ZeroCapacity.to_string(),
            "ring pool capacity must be at least 1"
        );
    }

    #[test]
    fn capacity_too_large_message() {
        let error = Error::CapacityTooLarge {
            capacity: 10,
            max: 5,
        };

        assert_eq!(
            error.to_string(),
            "ring pool capacity 10 exceeds the maximum of 5"
        );
    }
}
