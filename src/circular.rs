/// A half-open range `[low, high)` on a ring of `modulus` slots.
///
/// When `low > high` the range wraps past the last slot back to zero and is
/// walked as `[low, modulus)` followed by `[0, high)`. When `low == high` the
/// range is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircularRange {
    low: usize,
    high: usize,
    modulus: usize,
}

impl CircularRange {
    /// Creates a range from explicit bounds.
    ///
    /// # Arguments
    /// * `low` - Inclusive lower bound, reduced modulo `modulus`.
    /// * `high` - Exclusive upper bound, reduced modulo `modulus`.
    /// * `modulus` - Ring size. Must be non-zero.
    ///
    /// # Panics
    /// * If `modulus` is zero.
    pub fn new(low: usize, high: usize, modulus: usize) -> Self {
        assert!(modulus > 0, "circular range needs a non-zero modulus");
        Self {
            low: low % modulus,
            high: high % modulus,
            modulus,
        }
    }

    /// Builds the range `[(center - before) mod m, (center + after) mod m)`.
    ///
    /// `before` and `after` must each be smaller than `modulus`.
    pub fn around(center: usize, before: usize, after: usize, modulus: usize) -> Self {
        assert!(modulus > 0, "circular range needs a non-zero modulus");
        let center = center % modulus;
        let low = (center + modulus - before % modulus) % modulus;
        let high = (center + after) % modulus;
        Self { low, high, modulus }
    }

    /// Inclusive lower bound.
    pub fn low(&self) -> usize {
        self.low
    }

    /// Exclusive upper bound. Below `low` when the range wraps.
    pub fn high(&self) -> usize {
        self.high
    }

    /// Number of slots on the ring.
    pub fn modulus(&self) -> usize {
        self.modulus
    }

    /// True when the range crosses from the last slot back to slot zero.
    pub fn wraps(&self) -> bool {
        self.low > self.high
    }

    /// The one or two linear pieces that make up the range, in walk order.
    pub fn segments(&self) -> Vec<std::ops::Range<usize>> {
        if self.wraps() {
            vec![self.low..self.modulus, 0..self.high]
        } else {
            vec![self.low..self.high]
        }
    }

    /// Slot indices in walk order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments().into_iter().flatten()
    }

    /// Number of slots covered, counting both pieces of a wrapped range.
    pub fn len(&self) -> usize {
        if self.wraps() {
            self.modulus - self.low + self.high
        } else {
            self.high - self.low
        }
    }

    /// True when `low == high`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether `slot` lies in the range.
    ///
    /// # Arguments
    /// * `slot` - A slot index. Indices at or past `modulus` are never contained.
    ///
    /// # Returns
    /// * `bool` - True if walking the range would visit `slot`.
    pub fn contains(&self, slot: usize) -> bool {
        if slot >= self.modulus {
            return false;
        }
        if self.wraps() {
            slot >= self.low || slot < self.high
        } else {
            slot >= self.low && slot < self.high
        }
    }
}
