//! Alignment arithmetic

use taskrt_core::{AllocError, AllocResult};

/// Reject alignments that are zero or not a power of two
#[inline]
pub fn check_align(align: usize) -> AllocResult<()> {
    if align == 0 || !align.is_power_of_two() {
        return Err(AllocError::InvalidArgument("alignment must be a power of two"));
    }
    Ok(())
}

/// Round `value` up to a multiple of `align` (power of two)
///
/// Returns `None` on overflow.
#[inline]
pub fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    value.checked_add(align - 1).map(|v| v & !(align - 1))
}

/// Bytes needed to move `addr` forward to the next multiple of `align`
#[inline]
pub fn padding_for(addr: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    addr.wrapping_neg() & (align - 1)
}
