//! Per-axis lookup acceleration.

use super::spline::bracket;

/// Caches the last cell found on one axis.
///
/// Successive lookups in a timestep loop tend to land in the same or an
/// adjacent cell, so the cached index is checked before falling back to a
/// binary search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accelerator {
    cache: usize,
    hits: u64,
    misses: u64,
}

impl Accelerator {
    /// Creates an empty accelerator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the cell index for `x` on axis `xa` (see [`bracket`]).
    pub fn find(&mut self, xa: &[f64], x: f64) -> usize {
        let last = xa.len() - 2;
        let c = self.cache.min(last);
        let in_cell = (c == 0 || xa[c] <= x) && (c == last || x < xa[c + 1]);
        if in_cell {
            self.hits += 1;
            return c;
        }
        let idx = bracket(xa, x);
        self.cache = idx;
        self.misses += 1;
        idx
    }

    /// Number of lookups answered from the cache.
    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that needed a search.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

/// Evaluation context: one accelerator per axis.
///
/// A context belongs to exactly one caller at a time. Contexts are never
/// stored inside an interpolator, so copies of an interpolator can be
/// evaluated concurrently without sharing mutable state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalContext {
    /// Accelerator for the x axis.
    pub x: Accelerator,
    /// Accelerator for the y axis.
    pub y: Accelerator,
}

impl EvalContext {
    /// Creates a fresh context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            x: Accelerator::new(),
            y: Accelerator::new(),
        }
    }
}
