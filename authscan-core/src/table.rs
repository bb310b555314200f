//! Per-address failure counters.
//!
//! [`AttemptTable`] is the mutable accumulator owned by one scan (or one scan
//! worker). Once the pass completes it is frozen into a [`FrozenTable`], which is
//! the only form downstream stages accept.

use std::collections::hash_map::{Entry, HashMap};

use crate::error::ScanError;
use crate::events::FailedLoginEvent;

/// Mutable address → count mapping. Every present key has a count of at least 1.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AttemptTable {
    counts: HashMap<String, u64>,
}

impl AttemptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-insert-zero, then increment. Returns the new count.
    pub fn record(&mut self, address: &str) -> u64 {
        // Avoid allocating a key for addresses already present.
        if let Some(count) = self.counts.get_mut(address) {
            *count += 1;
            return *count;
        }
        self.counts.insert(address.to_string(), 1);
        1
    }

    pub fn record_event(&mut self, event: &FailedLoginEvent) -> u64 {
        self.record(&event.source_address)
    }

    /// Per-key summation of another table into this one.
    pub fn merge(&mut self, other: AttemptTable) {
        for (address, count) in other.counts {
            match self.counts.entry(address) {
                Entry::Occupied(mut slot) => *slot.get_mut() += count,
                Entry::Vacant(slot) => {
                    slot.insert(count);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn freeze(self) -> FrozenTable {
        FrozenTable {
            counts: self.counts,
        }
    }
}

impl Extend<FailedLoginEvent> for AttemptTable {
    fn extend<T: IntoIterator<Item = FailedLoginEvent>>(&mut self, events: T) {
        for event in events {
            self.record_event(&event);
        }
    }
}

impl FromIterator<FailedLoginEvent> for AttemptTable {
    fn from_iter<T: IntoIterator<Item = FailedLoginEvent>>(events: T) -> Self {
        let mut table = AttemptTable::new();
        table.extend(events);
        table
    }
}

/// Drains a scanner into a fresh table, stopping at the first fatal error.
pub fn aggregate<I>(events: I) -> Result<AttemptTable, ScanError>
where
    I: IntoIterator<Item = Result<FailedLoginEvent, ScanError>>,
{
    let mut table = AttemptTable::new();
    for event in events {
        table.record_event(&event?);
    }
    Ok(table)
}

/// Read-only view of a completed scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrozenTable {
    counts: HashMap<String, u64>,
}

impl FrozenTable {
    pub fn get(&self, address: &str) -> Option<u64> {
        self.counts.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(address, count)| (address.as_str(), *count))
    }

    /// Sum of all counts, i.e. the number of events observed.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}
