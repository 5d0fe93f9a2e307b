use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// Word layout, from the least significant bit:
//
// 0..32   position in the ring
// 32      locked flag
// 33..64  lap counter; its lowest bit (33) is the loop flag
const VALUE_MASK: u64 = 0xFFFF_FFFF;
const LOCKED_BIT: u64 = 1 << 32;
const LAP_SHIFT: u32 = 33;
const LOOP_BIT: u64 = 1 << LAP_SHIFT;

/// The largest capacity whose positions fit in the position field of a [`SlotIndex`].
pub(crate) const MAX_CAPACITY: usize = u32::MAX as usize;

/// A cursor into a fixed-size ring, packed into a single machine word.
///
/// The word carries three logical fields:
///
/// * `value` - the position in the ring, always less than the ring capacity.
/// * `loop` - flipped every time the position wraps from the last slot back to the first.
///   Two cursors at the same position are "empty" apart if their loop flags match and
///   "full" apart if they differ.
/// * `locked` - set on the `end` cursor while a writer is filling the slot it just claimed.
///
/// The loop flag is the lowest bit of a lap counter that occupies the remaining high bits.
/// Only the flag takes part in the size arithmetic; the rest of the counter exists so that a
/// thread holding a stale snapshot cannot mistake a cursor that has wrapped around twice for
/// the one it originally observed.
///
/// Equality (`==`) compares the full bit pattern, including the locked flag.
#[derive(Clone, Copy, Default, Eq, Hash, PartialEq)]
pub(crate) struct SlotIndex(u64);

impl SlotIndex {
    /// The position in the ring.
    #[must_use]
    #[inline]
    #[expect(clippy::cast_possible_truncation, reason = "masked to 32 bits")]
    pub(crate) const fn value(self) -> u32 {
        (self.0 & VALUE_MASK) as u32
    }

    #[must_use]
    #[inline]
    pub(crate) const fn loop_bit(self) -> bool {
        self.0 & LOOP_BIT != 0
    }

    #[must_use]
    #[inline]
    pub(crate) const fn locked(self) -> bool {
        self.0 & LOCKED_BIT != 0
    }

    /// Moves the position forward by one slot without wrapping.
    ///
    /// Only valid while `value()` is below the last index of the ring; at the last index the
    /// caller must use [`toggle_loop()`][Self::toggle_loop] instead.
    #[must_use]
    #[inline]
    pub(crate) const fn increment(self) -> Self {
        debug_assert!(self.value() < u32::MAX);

        Self(self.0.wrapping_add(1))
    }

    /// Wraps the position back to zero and flips the loop flag. The locked flag is preserved.
    #[must_use]
    #[inline]
    pub(crate) const fn toggle_loop(self) -> Self {
        // Adding at the lowest lap bit flips the loop flag and carries into the rest of the lap
        // counter. The carry out of the top bit is discarded, so the counter wraps.
        Self((self.0 & !VALUE_MASK).wrapping_add(LOOP_BIT))
    }

    #[must_use]
    #[inline]
    pub(crate) const fn lock(self) -> Self {
        Self(self.0 | LOCKED_BIT)
    }

    /// The index of the next slot in a ring whose last index is `max_index`.
    #[must_use]
    #[inline]
    pub(crate) const fn advance(self, max_index: u32) -> Self {
        if self.value() == max_index {
            self.toggle_loop()
        } else {
            self.increment()
        }
    }

    /// Whether two indices refer to the same logical position, regardless of locking.
    #[must_use]
    #[inline]
    pub(crate) const fn eq_loop(self, other: Self) -> bool {
        (self.0 & !LOCKED_BIT) == (other.0 & !LOCKED_BIT)
    }

    /// The number of occupied slots between `start` (inclusive) and `end` (exclusive) in a ring
    /// of the given capacity. Ranges from zero (empty) to `capacity` (full).
    #[must_use]
    #[inline]
    pub(crate) fn distance(start: Self, end: Self, capacity: usize) -> usize {
        let start_value = start.value() as usize;
        let end_value = end.value() as usize;

        if start.loop_bit() == end.loop_bit() {
            end_value.saturating_sub(start_value)
        } else {
            end_value
                .saturating_add(capacity)
                .saturating_sub(start_value)
        }
    }

    #[cfg(test)]
    pub(crate) const fn from_parts(value: u32, lap: u32, locked: bool) -> Self {
        let locked = if locked { LOCKED_BIT } else { 0 };
        Self(((lap as u64) << LAP_SHIFT) | locked | value as u64)
    }

    #[cfg(test)]
    #[expect(clippy::cast_possible_truncation, reason = "lap counter is 31 bits")]
    pub(crate) const fn lap(self) -> u32 {
        (self.0 >> LAP_SHIFT) as u32
    }
}

impl fmt::Debug for SlotIndex {
    #[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotIndex")
            .field("value", &self.value())
            .field("loop", &self.loop_bit())
            .field("locked", &self.locked())
            .finish()
    }
}

/// A [`SlotIndex`] stored in an atomic word, so that every field is read and written together.
#[derive(Default)]
pub(crate) struct AtomicSlotIndex(AtomicU64);

impl AtomicSlotIndex {
    /// Takes a snapshot of the index, synchronizing with the write that published it.
    #[must_use]
    #[inline]
    pub(crate) fn load(&self) -> SlotIndex {
        SlotIndex(self.0.load(Ordering::Acquire))
    }

    /// Takes a snapshot of the index without synchronizing with anything.
    ///
    /// Only suitable for diagnostics, where the result is an estimate anyway.
    #[must_use]
    #[inline]
    pub(crate) fn load_relaxed(&self) -> SlotIndex {
        SlotIndex(self.0.load(Ordering::Relaxed))
    }

    /// Replaces the index with `new` if it currently equals `comparand` (full bit pattern).
    ///
    /// Returns the index observed before the attempt: `Ok` if it matched `comparand` and the
    /// swap happened, `Err` otherwise.
    #[inline]
    pub(crate) fn compare_exchange(
        &self,
        new: SlotIndex,
        comparand: SlotIndex,
    ) -> Result<SlotIndex, SlotIndex> {
        self.0
            .compare_exchange(comparand.0, new.0, Ordering::AcqRel, Ordering::Acquire)
            .map(SlotIndex)
            .map_err(SlotIndex)
    }

    /// Reads the index through exclusive access, which needs no synchronization.
    #[must_use]
    #[inline]
    pub(crate) fn get_mut(&mut self) -> SlotIndex {
        SlotIndex(*self.0.get_mut())
    }
}

impl fmt::Debug for AtomicSlotIndex {
    #[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load_relaxed(), f)
    }
}
