//! Keeps deeply nested parsing and evaluation off the end of the native stack.

/// When less than this is left, the next frame runs on a fresh segment.
const RED_ZONE: usize = 128 * 1024;

/// Size of every segment allocated when growing.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Runs `f`, first moving to a newly allocated stack segment if the current one is nearly used up.
///
/// Wrap the recursive entry points (one statement, one expression) with this,
/// the depth limits of the parser and interpreter then bound how much gets allocated.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}
