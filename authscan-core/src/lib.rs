//! # authscan-core
//!
//! Single-pass brute-force analysis of authentication logs.
//!
//! Data flows strictly forward:
//! scan (`scanner`, `partition`) → aggregate (`table`) → filter (`filter`) → report (`report`).
//! Geographic enrichment sits between filter and report and lives in `authscan-geo`.
//!
//! ### Key Submodules:
//! - `scanner`: streaming line scanner over any `BufRead`
//! - `partition`: chunked parallel scan with per-worker tables merged at the end
//! - `table`: attempt counters and their frozen, read-only form

pub mod error;
pub mod events;
pub mod filter;
pub mod partition;
pub mod report;
pub mod scanner;
pub mod table;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use authscan_detection::FailureMatcher;
use tracing::{debug, instrument};

pub use error::{MalformedLine, ScanError};
pub use events::{FailedLoginEvent, LogLine};
pub use filter::filter_by_threshold;
pub use report::{AttackReport, OffenderRecord, ReportFormat, UNKNOWN_COUNTRY};
pub use scanner::{LineScanner, ScanStats};
pub use table::{AttemptTable, FrozenTable};

/// A completed scan: the frozen table plus line accounting.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub table: FrozenTable,
    pub stats: ScanStats,
}

/// Scans the log at `path` to completion.
///
/// `workers == 1` streams the file line by line. Any other value loads the file and
/// scans contiguous chunks in parallel (`0` picks one worker per CPU).
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display(), workers = workers))]
pub fn scan_path<P: AsRef<Path>>(
    path: P,
    matcher: &FailureMatcher,
    workers: usize,
) -> Result<ScanOutcome, ScanError> {
    let path = path.as_ref();
    let workers = partition::resolve_workers(workers);

    if workers == 1 {
        let file = File::open(path).map_err(|e| ScanError::unavailable(path.display(), e))?;
        let mut scanner = LineScanner::new(BufReader::new(file), matcher, path.display());
        let table = table::aggregate(&mut scanner)?;
        return Ok(ScanOutcome {
            table: table.freeze(),
            stats: scanner.stats(),
        });
    }

    let data = fs::read(path).map_err(|e| ScanError::unavailable(path.display(), e))?;
    debug!(bytes = data.len(), workers, "Loaded log for partitioned scan");
    let (table, stats) = partition::scan_partitioned(&data, matcher, workers)?;
    Ok(ScanOutcome {
        table: table.freeze(),
        stats,
    })
}
