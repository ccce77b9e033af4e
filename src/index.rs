//! Sorted range index with point lookup
//!
//! A [`RangeIndex`] holds inclusive `[start, end]` ranges sorted by `start`.
//! Lookups binary-search the starts for the rightmost range beginning at or
//! below the key, then check that the key does not run past that range's end.
//!
//! ```text
//!   starts:   10        25            40
//!             [10..20]  [25..30]      [40..40]
//!   key 22 ──────────▶ candidate [10..20], 22 > 20 → miss
//!   key 30 ────────────────────▶ candidate [25..30] → hit
//! ```
//!
//! Ranges are expected not to overlap. When they do, the range with the
//! greatest start at or below the key wins, and among ranges sharing a start
//! the one inserted last wins. [`RangeIndex::overlapping_pairs`] reports such
//! anomalies.

use crate::record::{AsnInfo, RangeKey, RangeRecord};

/// Immutable index of address ranges for one address family
#[derive(Debug, Clone)]
pub struct RangeIndex<K: RangeKey> {
    /// Range starts, parallel to `records`, kept apart for cache-friendly search
    starts: Vec<K>,
    records: Vec<RangeRecord<K>>,
}

impl<K: RangeKey> Default for RangeIndex<K> {
    fn default() -> Self {
        Self {
            starts: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl<K: RangeKey> RangeIndex<K> {
    /// Build an index from records in any order
    ///
    /// Records are sorted by start with a stable sort, so records sharing a
    /// start keep their input order. No de-duplication is done.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RangeRecord<K>>,
    {
        let mut records: Vec<RangeRecord<K>> = records.into_iter().collect();
        records.sort_by_key(|r| r.start);
        let starts = records.iter().map(|r| r.start).collect();
        Self { starts, records }
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the index holds no ranges
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ranges in start order
    pub fn records(&self) -> &[RangeRecord<K>] {
        &self.records
    }

    /// Position of the rightmost range whose start is `<= key`
    ///
    /// This is the insertion point of `key` after all equal starts, minus one.
    /// Returns `None` when the index is empty or `key` sorts before every start.
    /// The returned range may still end before `key`.
    #[inline]
    pub fn search(&self, key: K) -> Option<usize> {
        self.starts.partition_point(|&start| start <= key).checked_sub(1)
    }

    /// Range containing `key`, if any
    #[inline]
    pub fn find(&self, key: K) -> Option<&RangeRecord<K>> {
        let candidate = &self.records[self.search(key)?];
        candidate.contains(key).then_some(candidate)
    }

    /// Tag of the range containing `key`, or the shared miss result
    #[inline]
    pub fn lookup(&self, key: K) -> &AsnInfo {
        self.find(key)
            .map(|record| &record.info)
            .unwrap_or(AsnInfo::not_found())
    }

    /// Pairs of ranges that overlap
    ///
    /// Each pair is `(earlier, later)` in start order, where `earlier` is the
    /// preceding range reaching furthest. A range overlapping several earlier
    /// ones is reported once.
    pub fn overlapping_pairs(&self) -> Vec<(&RangeRecord<K>, &RangeRecord<K>)> {
        let mut pairs = Vec::new();
        let mut furthest: Option<&RangeRecord<K>> = None;

        for record in &self.records {
            match furthest {
                Some(prev) if record.start <= prev.end => {
                    pairs.push((prev, record));
                    if record.end > prev.end {
                        furthest = Some(record);
                    }
                }
                _ => furthest = Some(record),
            }
        }

        pairs
    }
}
