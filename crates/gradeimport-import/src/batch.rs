//! Splitting records into batches.

use std::ops::Range;

/// Number of batches `len` rows split into.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    len.div_ceil(batch_size)
}

/// Contiguous, in-order index ranges of at most `batch_size` rows.
pub fn batch_ranges(len: usize, batch_size: usize) -> Vec<Range<usize>> {
    if batch_size == 0 {
        return Vec::new();
    }
    (0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect()
}
