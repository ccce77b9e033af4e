//! Property tests for range lookups over generated non-overlapping layouts

use ipasn::{Asn, AsnInfo, Country, Org, RangeIndex, RangeRecord};
use proptest::prelude::*;

/// Generate sorted, non-overlapping ranges as (start, end) pairs.
///
/// Each range is described by a gap before it and a length; gaps of zero
/// produce adjacent ranges.
fn layout() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..1000, 0u32..1000), 0..40).prop_map(|parts| {
        let mut next = 1u32;
        parts
            .into_iter()
            .map(|(gap, len)| {
                let start = next + gap;
                let end = start + len;
                next = end + 1;
                (start, end)
            })
            .collect()
    })
}

fn tag(i: usize) -> AsnInfo {
    AsnInfo::new(
        Asn::Known(i.to_string()),
        Country::Code("ZZ".to_string()),
        Org::Name(format!("org-{}", i)),
    )
}

fn build(ranges: &[(u32, u32)]) -> RangeIndex<u32> {
    RangeIndex::build(
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| RangeRecord::new(start, end, tag(i))),
    )
}

/// Reference answer by linear scan
fn brute_force(ranges: &[(u32, u32)], key: u32) -> Option<usize> {
    ranges
        .iter()
        .position(|&(start, end)| start <= key && key <= end)
}

proptest! {
    #[test]
    fn prop_inside_every_range_hits(ranges in layout(), offset in any::<u32>()) {
        let index = build(&ranges);
        for (i, &(start, end)) in ranges.iter().enumerate() {
            let key = start + offset % (end - start + 1);
            prop_assert_eq!(index.lookup(key), &tag(i));
            prop_assert_eq!(index.lookup(start), &tag(i));
            prop_assert_eq!(index.lookup(end), &tag(i));
        }
    }

    #[test]
    fn prop_below_first_start_misses(ranges in layout(), key in any::<u32>()) {
        let index = build(&ranges);
        if let Some(&(first, _)) = ranges.first() {
            let key = key % first;
            prop_assert_eq!(index.search(key), None);
            prop_assert!(!index.lookup(key).is_found());
        }
    }

    #[test]
    fn prop_gaps_miss(ranges in layout()) {
        let index = build(&ranges);
        for pair in ranges.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            for key in (prev_end + 1)..next_start {
                prop_assert_eq!(index.lookup(key), AsnInfo::not_found());
            }
        }
    }

    #[test]
    fn prop_matches_linear_scan(ranges in layout(), keys in prop::collection::vec(0u32..100_000, 1..64)) {
        let index = build(&ranges);
        for key in keys {
            let expected = brute_force(&ranges, key).map(tag);
            let actual = index.find(key).map(|r| r.info.clone());
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prop_input_order_is_irrelevant(ranges in layout(), seed in any::<u64>()) {
        let mut shuffled: Vec<(usize, (u32, u32))> = ranges.iter().copied().enumerate().collect();
        // Deterministic shuffle driven by the seed
        shuffled.sort_by_key(|(i, _)| (*i as u64).wrapping_mul(seed | 1).rotate_left(17));

        let sorted = build(&ranges);
        let unsorted = RangeIndex::build(
            shuffled
                .into_iter()
                .map(|(i, (start, end))| RangeRecord::new(start, end, tag(i))),
        );
        prop_assert_eq!(sorted.records(), unsorted.records());
    }
}
