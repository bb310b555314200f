//! Partitioned parallel scan.
//!
//! The log is cut into contiguous, newline-aligned chunks. Each worker owns a local
//! [`AttemptTable`] for its chunk; tables are merged by per-key summation once every
//! worker has finished, so the result equals a sequential scan.

use authscan_detection::FailureMatcher;
use tracing::{debug, error};

use crate::error::ScanError;
use crate::events::LogLine;
use crate::scanner::{scan_line, ScanStats};
use crate::table::AttemptTable;

/// A contiguous run of whole lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// 1-based number of the chunk's first line.
    pub first_line: u64,
    pub bytes: &'a [u8],
}

/// Maps the configured worker count to an effective one (`0` = one per CPU).
pub fn resolve_workers(workers: usize) -> usize {
    if workers == 0 {
        num_cpus::get().max(1)
    } else {
        workers
    }
}

/// Splits `data` into at most `parts` chunks, never cutting a line in two.
pub fn split_chunks(data: &[u8], parts: usize) -> Vec<Chunk<'_>> {
    let parts = parts.max(1);
    let target = data.len().div_ceil(parts).max(1);

    let mut chunks = Vec::with_capacity(parts);
    let mut start = 0;
    let mut first_line = 1;
    while start < data.len() {
        let mut end = (start + target).min(data.len());
        if end < data.len() {
            end = match data[end - 1..].iter().position(|&b| b == b'\n') {
                Some(offset) => end + offset,
                None => data.len(),
            };
        }

        let bytes = &data[start..end];
        chunks.push(Chunk { first_line, bytes });
        first_line += bytes.iter().filter(|&&b| b == b'\n').count() as u64;
        start = end;
    }
    chunks
}

/// Scans one chunk into its own table.
pub fn scan_chunk(chunk: Chunk<'_>, matcher: &FailureMatcher) -> (AttemptTable, ScanStats) {
    let mut table = AttemptTable::new();
    let mut stats = ScanStats::default();

    for (offset, raw) in chunk.bytes.split_inclusive(|&b| b == b'\n').enumerate() {
        let line = LogLine::new(chunk.first_line + offset as u64, raw);
        if let Some(event) = scan_line(matcher, line, &mut stats) {
            table.record_event(&event);
        }
    }
    (table, stats)
}

/// Scans `data` on up to `workers` scoped threads and merges the local tables.
pub fn scan_partitioned(
    data: &[u8],
    matcher: &FailureMatcher,
    workers: usize,
) -> Result<(AttemptTable, ScanStats), ScanError> {
    let chunks = split_chunks(data, workers);
    debug!(chunks = chunks.len(), "Scanning partitioned log");

    let results = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| s.spawn(move |_| scan_chunk(chunk, matcher)))
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    })
    .map_err(|_| ScanError::WorkerPanicked)?;

    let mut table = AttemptTable::new();
    let mut stats = ScanStats::default();
    for result in results {
        let (local, local_stats) = result.map_err(|_| {
            error!("Scan worker panicked");
            ScanError::WorkerPanicked
        })?;
        table.merge(local);
        stats += local_stats;
    }
    Ok((table, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::LineScanner;
    use crate::table::aggregate;
    use authscan_detection::{DEFAULT_MARKER, DEFAULT_PATTERN};
    use proptest::prelude::*;
    use std::io::Cursor;

    fn sshd() -> FailureMatcher {
        FailureMatcher::new([DEFAULT_MARKER], DEFAULT_PATTERN).unwrap()
    }

    fn sequential(data: &[u8], matcher: &FailureMatcher) -> (AttemptTable, ScanStats) {
        let mut scanner = LineScanner::new(Cursor::new(data), matcher, "mem");
        let table = aggregate(&mut scanner).unwrap();
        (table, scanner.stats())
    }

    #[test]
    fn test_chunks_cover_input_on_line_boundaries() {
        let data = b"aaaa\nbb\ncccccc\nd\neeeeeeeee";
        let chunks = split_chunks(data, 3);

        let joined: Vec<u8> = chunks.iter().flat_map(|c| c.bytes.iter().copied()).collect();
        assert_eq!(joined, data.to_vec());
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.bytes.last(), Some(&b'\n'));
        }
        assert_eq!(chunks[0].first_line, 1);
    }

    #[test]
    fn test_chunk_line_numbers() {
        let data = b"x\nFailed password for root from 10.0.0.5\ny\nz\nFailed password for root from 10.0.0.6\n";
        let matcher = sshd();
        let mut numbers = Vec::new();
        for chunk in split_chunks(data, 4) {
            let mut stats = ScanStats::default();
            for (offset, raw) in chunk.bytes.split_inclusive(|&b| b == b'\n').enumerate() {
                let line = LogLine::new(chunk.first_line + offset as u64, raw);
                if let Some(event) = scan_line(&matcher, line, &mut stats) {
                    numbers.push(event.line_number);
                }
            }
        }
        assert_eq!(numbers, vec![2, 5]);
    }

    #[test]
    fn test_more_workers_than_lines() {
        let data = b"Failed password for root from 10.0.0.5\n";
        let (table, stats) = scan_partitioned(data, &sshd(), 16).unwrap();
        assert_eq!(table.freeze().get("10.0.0.5"), Some(1));
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(split_chunks(b"", 4).is_empty());
        let (table, stats) = scan_partitioned(b"", &sshd(), 4).unwrap();
        assert!(table.is_empty());
        assert_eq!(stats, ScanStats::default());
    }

    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(3), 3);
        assert!(resolve_workers(0) >= 1);
    }

    fn log_line() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..6).prop_map(|n| format!("sshd: Failed password for root from 10.0.0.{n} port 22")),
            (0u8..3).prop_map(|n| format!("Failed password for invalid user u{n} from host{n}.example")),
            Just("sshd: Failed password for".to_string()),
            Just("sshd: Accepted publickey for deploy from 10.0.0.1".to_string()),
            "[a-z ]{0,20}",
        ]
    }

    proptest! {
        #[test]
        fn partitioned_scan_matches_sequential(
            lines in prop::collection::vec(log_line(), 0..80),
            trailing_newline in any::<bool>(),
            workers in 1usize..12,
        ) {
            let mut data = lines.join("\n");
            if trailing_newline && !data.is_empty() {
                data.push('\n');
            }
            let matcher = sshd();

            let (expected, expected_stats) = sequential(data.as_bytes(), &matcher);
            let (actual, actual_stats) = scan_partitioned(data.as_bytes(), &matcher, workers).unwrap();

            prop_assert_eq!(expected.freeze(), actual.freeze());
            prop_assert_eq!(expected_stats, actual_stats);
        }

        #[test]
        fn merge_is_order_independent(
            lines in prop::collection::vec(log_line(), 0..60),
            workers in 1usize..8,
        ) {
            let data = lines.join("\n");
            let matcher = sshd();
            let mut locals: Vec<_> = split_chunks(data.as_bytes(), workers)
                .into_iter()
                .map(|chunk| scan_chunk(chunk, &matcher).0)
                .collect();

            let mut forward = AttemptTable::new();
            for local in locals.iter().cloned() {
                forward.merge(local);
            }
            locals.reverse();
            let mut backward = AttemptTable::new();
            for local in locals {
                backward.merge(local);
            }

            prop_assert_eq!(forward.freeze(), backward.freeze());
        }
    }
}
