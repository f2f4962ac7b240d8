//! Resize policy: when the bucket array grows or shrinks.

/// Maximum average bucket occupancy before the table grows.
pub const LOAD_FACTOR: usize = 10;

/// Multiplier applied to the bucket count on growth, divisor on shrink.
pub const RESIZE_FACTOR: usize = 2;

/// Tuning constants for [`BucketHashMap`](crate::BucketHashMap).
///
/// After every insert and every removal the map keeps
/// `len <= buckets * load_factor`. It also keeps
/// `len * load_factor >= buckets` unless only one bucket is left or one
/// more shrink step would break the first bound. With the default
/// policy (any policy where `load_factor² >= resize_factor`) that second
/// exception never applies.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResizePolicy {
    load_factor: usize,
    resize_factor: usize,
}

impl ResizePolicy {
    /// Panics if `load_factor == 0` or `resize_factor < 2`.
    pub fn new(load_factor: usize, resize_factor: usize) -> Self {
        assert!(load_factor >= 1, "load factor must be at least 1");
        assert!(resize_factor >= 2, "resize factor must be at least 2");
        Self {
            load_factor,
            resize_factor,
        }
    }

    pub fn load_factor(&self) -> usize {
        self.load_factor
    }

    pub fn resize_factor(&self) -> usize {
        self.resize_factor
    }

    /// Bucket count a table holding `len` entries in `buckets` buckets
    /// should have. Returns `buckets` unchanged when no resize is due.
    ///
    /// Growth and shrinkage repeat until the bound holds, so one call
    /// restores the invariant even after a jump in `len` (e.g. a table
    /// emptied from many buckets down to zero entries). A shrink step
    /// that would leave `len > buckets * load_factor` is never taken.
    pub fn target_buckets(&self, len: usize, buckets: usize) -> usize {
        let mut n = buckets.max(1);
        if len > n.saturating_mul(self.load_factor) {
            while len > n.saturating_mul(self.load_factor) {
                n = n.saturating_mul(self.resize_factor);
            }
        } else {
            while self.can_shrink(len, n) {
                n = self.shrunk(n);
            }
        }
        n
    }

    /// Whether `len` entries in `buckets` buckets satisfy the bound.
    pub fn is_balanced(&self, len: usize, buckets: usize) -> bool {
        buckets >= 1
            && len <= buckets.saturating_mul(self.load_factor)
            && !self.can_shrink(len, buckets)
    }

    fn shrunk(&self, buckets: usize) -> usize {
        (buckets / self.resize_factor).max(1)
    }

    /// Sparse enough to shrink, and the smaller table still fits `len`.
    fn can_shrink(&self, len: usize, buckets: usize) -> bool {
        buckets > 1
            && len.saturating_mul(self.load_factor) < buckets
            && len <= self.shrunk(buckets).saturating_mul(self.load_factor)
    }
}

impl Default for ResizePolicy {
    fn default() -> Self {
        Self {
            load_factor: LOAD_FACTOR,
            resize_factor: RESIZE_FACTOR,
        }
    }
}
