//! Index mapping for samples that fall outside an image.

/// Reflect an index once across the nearest edge.
///
/// Negative indices are negated and indices past the end map to
/// `2 * len - index - 2`. A sample that is still out of range after one
/// reflection (kernel wider than the image) yields `None` and is skipped by
/// the caller.
#[inline]
pub fn mirror_index(i: isize, len: usize) -> Option<usize> {
    let len = len as isize;
    let r = if i < 0 {
        -i
    } else if i >= len {
        2 * len - i - 2
    } else {
        i
    };

    if (0..len).contains(&r) {
        Some(r as usize)
    } else {
        None
    }
}

/// Clamp an index to `[0, len - 1]`.
#[inline]
pub fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else {
        (i as usize).min(len.saturating_sub(1))
    }
}
