//! Streaming line scanner.
//!
//! Reads the source exactly once, in order, and yields one [`FailedLoginEvent`]
//! per failure line. Non-matching and non-UTF-8 lines yield nothing; malformed
//! failure lines are counted and skipped.

use std::io::BufRead;
use std::ops::AddAssign;

use authscan_detection::{FailureMatcher, LineMatch};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{MalformedLine, ScanError};
use crate::events::{FailedLoginEvent, LogLine};

/// Line accounting for one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub lines: u64,
    pub events: u64,
    pub malformed: u64,
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, rhs: Self) {
        self.lines += rhs.lines;
        self.events += rhs.events;
        self.malformed += rhs.malformed;
    }
}

/// Classifies one line, updating `stats`.
#[inline]
pub(crate) fn scan_line(
    matcher: &FailureMatcher,
    line: LogLine<'_>,
    stats: &mut ScanStats,
) -> Option<FailedLoginEvent> {
    stats.lines += 1;
    let text = line.text()?;

    match matcher.classify(text) {
        LineMatch::NoMatch => None,
        LineMatch::Address(address) => {
            stats.events += 1;
            trace!(line = line.number, address, "Failed login");
            Some(FailedLoginEvent {
                source_address: address.to_string(),
                line_number: line.number,
            })
        }
        LineMatch::Malformed => {
            stats.malformed += 1;
            let skipped = MalformedLine {
                line_number: line.number,
            };
            debug!("{skipped}, skipping");
            None
        }
    }
}

/// Lazy, single-pass iterator of failure events over a buffered reader.
pub struct LineScanner<'m, R> {
    reader: R,
    matcher: &'m FailureMatcher,
    name: String,
    buf: Vec<u8>,
    line_number: u64,
    stats: ScanStats,
    done: bool,
}

impl<'m, R: BufRead> LineScanner<'m, R> {
    /// `name` identifies the source in error messages.
    pub fn new(reader: R, matcher: &'m FailureMatcher, name: impl std::fmt::Display) -> Self {
        Self {
            reader,
            matcher,
            name: name.to_string(),
            buf: Vec::with_capacity(256),
            line_number: 0,
            stats: ScanStats::default(),
            done: false,
        }
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }
}

impl<R: BufRead> Iterator for LineScanner<'_, R> {
    type Item = Result<FailedLoginEvent, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line_number += 1;
                    let line = LogLine::new(self.line_number, &self.buf);
                    if let Some(event) = scan_line(self.matcher, line, &mut self.stats) {
                        return Some(Ok(event));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(ScanError::unavailable(&self.name, e)));
                }
            }
        }
        None
    }
}
