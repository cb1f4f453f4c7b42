//! Capacity planning helpers and platform constants.

use crossbeam_utils::CachePadded;

use crate::sync::AtomicUsize;

/// Size in bytes of the region each cursor is padded to.
///
/// Matches the alignment [`CachePadded`] applies on the target, which is the
/// destructive-interference size (64 on most targets, 128 on x86_64 and aarch64
/// where adjacent-line prefetching pairs lines).
pub const CACHE_LINE_SIZE: usize = core::mem::align_of::<CachePadded<AtomicUsize>>();

/// Largest capacity that can be rounded to a power of two without overflow.
pub const MAX_CAPACITY: usize = 1 << (usize::BITS - 1);

/// Smallest power of two `>= x`, or `1` when `x == 0`.
///
/// Values above [`MAX_CAPACITY`] have no representable result and wrap to `0`.
#[inline]
pub const fn next_power_of_two(x: usize) -> usize {
    if x == 0 {
        return 1;
    }
    let mut v = x - 1;
    let mut shift = 1;
    while shift < usize::BITS {
        v |= v >> shift;
        shift <<= 1;
    }
    v.wrapping_add(1)
}
