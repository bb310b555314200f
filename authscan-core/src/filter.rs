//! Threshold filter.

use crate::table::FrozenTable;

/// Entries with `count >= threshold`, in no particular order.
///
/// Ordering is applied when the report is built, not here.
pub fn filter_by_threshold(table: &FrozenTable, threshold: u64) -> Vec<(String, u64)> {
    table
        .iter()
        .filter(|&(_, count)| count >= threshold)
        .map(|(address, count)| (address.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::AttemptTable;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn table(entries: &[(&str, u64)]) -> FrozenTable {
        let mut table = AttemptTable::new();
        for (address, count) in entries {
            for _ in 0..*count {
                table.record(address);
            }
        }
        table.freeze()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let table = table(&[("10.0.0.5", 12), ("10.0.0.9", 3), ("10.0.0.7", 10)]);
        let mut selected = filter_by_threshold(&table, 10);
        selected.sort();
        assert_eq!(
            selected,
            vec![("10.0.0.5".to_string(), 12), ("10.0.0.7".to_string(), 10)]
        );
    }

    #[test]
    fn test_zero_threshold_selects_everything() {
        let table = table(&[("10.0.0.5", 12), ("10.0.0.9", 3)]);
        assert_eq!(filter_by_threshold(&table, 0).len(), 2);
    }

    #[test]
    fn test_empty_table() {
        assert!(filter_by_threshold(&FrozenTable::default(), 0).is_empty());
    }

    proptest! {
        #[test]
        fn higher_threshold_selects_subset(
            counts in prop::collection::hash_map("[a-f0-9.]{1,8}", 1u64..40, 0..30),
            t1 in 0u64..50,
            delta in 0u64..50,
        ) {
            let mut attempts = AttemptTable::new();
            for (address, count) in &counts {
                for _ in 0..*count {
                    attempts.record(address);
                }
            }
            let frozen = attempts.freeze();

            let low: HashSet<_> = filter_by_threshold(&frozen, t1).into_iter().collect();
            let high: HashSet<_> = filter_by_threshold(&frozen, t1 + delta).into_iter().collect();
            prop_assert!(high.is_subset(&low));
        }
    }
}
