//! Static partitioning of the pending task sequence across workers.

use std::ops::Range;
use thiserror::Error;

/// Errors that abort a run before any task starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
    #[error("no pending tasks to schedule")]
    NoPendingTasks,
}

/// Split `len` items into `n` contiguous slices.
///
/// Sizes are balanced: the first `len % n` slices take one extra item, so
/// slice lengths never differ by more than one and always sum to `len`.
/// Slices may be empty when `n > len`.
pub fn partition_slices(len: usize, n: usize) -> Result<Vec<Range<usize>>, PartitionError> {
    if n == 0 {
        return Err(PartitionError::InvalidConcurrency);
    }
    if len == 0 {
        return Err(PartitionError::NoPendingTasks);
    }

    let base = len / n;
    let extra = len % n;
    let mut slices = Vec::with_capacity(n);
    let mut start = 0;
    for w in 0..n {
        let size = base + usize::from(w < extra);
        slices.push(start..start + size);
        start += size;
    }
    Ok(slices)
}
