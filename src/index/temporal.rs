//! Sample index over a time axis for closed-interval lookups

use crate::core::temporal::{TimeRange, Timestamp};
use std::ops::Range;

/// Index over the timestamps of a series.
///
/// Non-decreasing axes are searched with binary search. Anything else falls
/// back to a linear scan, so the answer is correct for any ordering.
pub struct TimeIndex<'a> {
    time: &'a [Timestamp],
    sorted: bool,
}

impl<'a> TimeIndex<'a> {
    pub fn new(time: &'a [Timestamp]) -> Self {
        let sorted = time.windows(2).all(|w| w[0] <= w[1]);
        Self { time, sorted }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Index range of samples inside `interval` on a sorted axis
    fn sorted_range(&self, interval: &TimeRange) -> Range<usize> {
        let lo = self.time.partition_point(|t| *t < interval.start());
        let hi = self.time.partition_point(|t| *t <= interval.end());
        lo..hi.max(lo)
    }

    /// Set `mask[i]` for every sample inside `interval`, bounds included.
    /// Returns how many samples lie inside, whether or not they were
    /// already masked.
    pub fn mark(&self, interval: &TimeRange, mask: &mut [bool]) -> usize {
        debug_assert_eq!(mask.len(), self.time.len());
        if self.sorted {
            let range = self.sorted_range(interval);
            let count = range.len();
            mask[range].iter_mut().for_each(|m| *m = true);
            return count;
        }

        let mut count = 0;
        for (t, m) in self.time.iter().zip(mask.iter_mut()) {
            if interval.contains(*t) {
                *m = true;
                count += 1;
            }
        }
        count
    }

    /// Number of samples inside `interval`
    pub fn count_in(&self, interval: &TimeRange) -> usize {
        if self.sorted {
            return self.sorted_range(interval).len();
        }
        self.time.iter().filter(|t| interval.contains(**t)).count()
    }
}
