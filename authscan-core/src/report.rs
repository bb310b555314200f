//! Attack report model and rendering.
//!
//! Offender rows are ordered by count descending, then address ascending, so the
//! same frozen table always renders the same body regardless of hash-map order.

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Country label used whenever enrichment cannot name a country.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SEPARATOR_WIDTH: usize = 60;

/// An address at or above the reporting threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffenderRecord {
    pub source_address: String,
    pub count: u64,
    pub country: String,
}

impl OffenderRecord {
    pub fn new(source_address: impl Into<String>, count: u64, country: Option<String>) -> Self {
        Self {
            source_address: source_address.into(),
            count,
            country: country.unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
        }
    }
}

/// Output format for [`AttackReport::render`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Fixed-width text table.
    #[default]
    #[serde(alias = "text")]
    Table,
    Yaml,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "yaml" => Ok(ReportFormat::Yaml),
            other => Err(format!("unknown report format `{other}` (expected table or yaml)")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Table => write!(f, "table"),
            ReportFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// The immutable result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct AttackReport {
    #[serde(serialize_with = "serialize_timestamp")]
    generated_at: DateTime<Local>,
    offenders: Vec<OffenderRecord>,
}

fn serialize_timestamp<S: serde::Serializer>(
    ts: &DateTime<Local>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

impl AttackReport {
    pub fn new(generated_at: DateTime<Local>, mut offenders: Vec<OffenderRecord>) -> Self {
        offenders.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.source_address.cmp(&b.source_address))
        });
        Self {
            generated_at,
            offenders,
        }
    }

    pub fn generated_at(&self) -> DateTime<Local> {
        self.generated_at
    }

    pub fn offenders(&self) -> &[OffenderRecord] {
        &self.offenders
    }

    pub fn render<W: Write>(&self, format: ReportFormat, out: &mut W) -> io::Result<()> {
        match format {
            ReportFormat::Table => self.render_table(out),
            ReportFormat::Yaml => serde_yaml::to_writer(out, self).map_err(io::Error::other),
        }
    }

    pub fn render_table<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "ATTACK REPORT - {}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(out)?;
        writeln!(out, "{:<20} {:<20} {}", "IP Address", "Failed Attempts", "Country")?;
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
        for offender in &self.offenders {
            writeln!(
                out,
                "{:<20} {:<20} {}",
                offender.source_address, offender.count, offender.country
            )?;
        }
        Ok(())
    }

    /// Renders into an owned buffer.
    pub fn to_bytes(&self, format: ReportFormat) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.render(format, &mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 11, 3, 14, 5, 9).unwrap()
    }

    fn render(report: &AttackReport) -> String {
        String::from_utf8(report.to_bytes(ReportFormat::Table).unwrap()).unwrap()
    }

    #[test]
    fn test_table_layout() {
        let report = AttackReport::new(
            at(),
            vec![OffenderRecord::new("10.0.0.5", 12, Some("Germany".into()))],
        );
        let text = render(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ATTACK REPORT - 2025-11-03 14:05:09");
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "IP Address           Failed Attempts      Country"
        );
        assert_eq!(lines[3], "-".repeat(60));
        assert_eq!(
            lines[4],
            "10.0.0.5             12                   Germany"
        );
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_empty_body() {
        let text = render(&AttackReport::new(at(), Vec::new()));
        assert_eq!(text.lines().count(), 4);
        assert!(text.ends_with(&format!("{}\n", "-".repeat(60))));
    }

    #[test]
    fn test_rows_are_deterministic() {
        let rows = vec![
            OffenderRecord::new("10.0.0.9", 3, None),
            OffenderRecord::new("10.0.0.5", 12, None),
            OffenderRecord::new("10.0.0.1", 3, None),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let a = AttackReport::new(at(), rows);
        let b = AttackReport::new(at(), reversed);
        assert_eq!(a.offenders(), b.offenders());

        let order: Vec<_> = a.offenders().iter().map(|o| o.source_address.as_str()).collect();
        assert_eq!(order, vec!["10.0.0.5", "10.0.0.1", "10.0.0.9"]);
        assert_eq!(a.offenders()[0].country, UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_yaml_output() {
        let report = AttackReport::new(
            at(),
            vec![OffenderRecord::new("10.0.0.5", 12, Some("Germany".into()))],
        );
        let yaml = String::from_utf8(report.to_bytes(ReportFormat::Yaml).unwrap()).unwrap();
        assert!(yaml.contains("2025-11-03 14:05:09"));
        assert!(yaml.contains("10.0.0.5"));
        assert!(yaml.contains("count: 12"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("TABLE".parse::<ReportFormat>(), Ok(ReportFormat::Table));
        assert_eq!("yaml".parse::<ReportFormat>(), Ok(ReportFormat::Yaml));
        assert!("json".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_format_names_agree_with_serde() {
        for name in ["table", "text", "yaml"] {
            let parsed: ReportFormat = name.parse().unwrap();
            let deserialized: ReportFormat = serde_yaml::from_str(name).unwrap();
            assert_eq!(parsed, deserialized);
        }
        assert_eq!(serde_yaml::to_string(&ReportFormat::Table).unwrap().trim(), "table");
    }
}
