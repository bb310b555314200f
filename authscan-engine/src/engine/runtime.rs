//! Report runtime - drives one scan from log source to rendered report.
//!
//! Stages run strictly in order: the scan completes and its table is frozen before
//! filtering starts, and every lookup has settled before the report is built.

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use opentelemetry::KeyValue;
use tokio::task::spawn_blocking;
use tracing::{debug, info, instrument};

use authscan_config::AuthscanConfig;
use authscan_core::{filter_by_threshold, scan_path, AttackReport, ScanOutcome};
use authscan_detection::FailureMatcher;
use authscan_geo::{EnricherOptions, GeoEnricher, GeoLookup};
use authscan_telemetry::{EventLogger, MetricsRecorder};

use crate::engine::error::EngineError;
use crate::engine::lookup::open_lookup;

pub struct ReportRuntime {
    config: Arc<AuthscanConfig>,
    matcher: FailureMatcher,
    enricher: GeoEnricher,
    pub metrics: Arc<MetricsRecorder>,
}

impl ReportRuntime {
    /// Creates a runtime with an explicit lookup capability.
    pub fn new(
        config: AuthscanConfig,
        lookup: Arc<dyn GeoLookup>,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, EngineError> {
        let matcher =
            FailureMatcher::new(config.scan.markers.iter().cloned(), &config.scan.pattern)?;
        debug!(
            markers = ?matcher.markers(),
            pattern = matcher.pattern(),
            workers = config.scan.workers,
            "Failure matcher ready"
        );

        let options = EnricherOptions {
            concurrency: config.geo.concurrency,
            lookup_timeout: config.geo.lookup_timeout(),
        };
        let enricher = GeoEnricher::new(lookup, options).with_metrics(metrics.clone());

        Ok(Self {
            config: Arc::new(config),
            matcher,
            enricher,
            metrics,
        })
    }

    /// Creates a runtime whose lookup comes from `config.geo`.
    pub fn from_config(
        config: AuthscanConfig,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, EngineError> {
        let lookup = open_lookup(&config.geo);
        Self::new(config, lookup, metrics)
    }

    /// Reads the whole log on a blocking thread and returns the frozen table.
    #[instrument(skip(self), fields(path = %self.config.scan.log_path.display()))]
    pub async fn scan(&self) -> Result<ScanOutcome, EngineError> {
        let path = self.config.scan.log_path.clone();
        let workers = self.config.scan.workers;
        let matcher = self.matcher.clone();

        let outcome = spawn_blocking(move || scan_path(&path, &matcher, workers)).await??;

        let stats = outcome.stats;
        self.metrics
            .record_scan(stats.lines, stats.events, stats.malformed);
        info!(
            lines = stats.lines,
            events = stats.events,
            malformed = stats.malformed,
            addresses = outcome.table.len(),
            attempts = outcome.table.total(),
            "Scan complete"
        );
        EventLogger::log_event(
            "scan_complete",
            vec![
                KeyValue::new("lines", stats.lines as i64),
                KeyValue::new("events", stats.events as i64),
                KeyValue::new("addresses", outcome.table.len() as i64),
            ],
        )
        .await;
        Ok(outcome)
    }

    /// Runs scan → filter → enrich and builds the report.
    #[instrument(skip(self))]
    pub async fn generate(&self) -> Result<AttackReport, EngineError> {
        info!("Generating attack report");
        let outcome = self.scan().await?;

        let threshold = self.config.report.threshold;
        let selected = filter_by_threshold(&outcome.table, threshold);
        debug!(threshold, offenders = selected.len(), "Threshold applied");

        let offenders = self.enricher.enrich(selected).await;
        let report = AttackReport::new(Local::now(), offenders);

        for offender in report.offenders() {
            EventLogger::log_event(
                "offender_detected",
                vec![
                    KeyValue::new("source_address", offender.source_address.clone()),
                    KeyValue::new("count", offender.count as i64),
                    KeyValue::new("country", offender.country.clone()),
                ],
            )
            .await;
        }
        Ok(report)
    }

    /// Generates the report and writes it to `out` in the configured format.
    ///
    /// Nothing is written unless the whole pipeline succeeded.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<AttackReport, EngineError> {
        let report = self.generate().await?;
        self.write_report(&report, out)?;
        self.log_report(&report).await;
        Ok(report)
    }

    /// Like [`ReportRuntime::run`], writing to `report.output` when configured and
    /// stdout otherwise.
    pub async fn run_to_sink(&self) -> Result<AttackReport, EngineError> {
        // An existing output file is only truncated once the report is fully rendered.
        let report = self.generate().await?;
        let rendered = self.render(&report)?;
        match &self.config.report.output {
            Some(path) => {
                let mut file = File::create(path).map_err(|source| self.output_error(source))?;
                self.write_rendered(&rendered, &mut file)?;
                info!("Report written to {}", path.display());
            }
            None => self.write_rendered(&rendered, &mut std::io::stdout().lock())?,
        }
        self.log_report(&report).await;
        Ok(report)
    }

    fn write_report<W: Write>(
        &self,
        report: &AttackReport,
        out: &mut W,
    ) -> Result<(), EngineError> {
        let rendered = self.render(report)?;
        self.write_rendered(&rendered, out)
    }

    fn render(&self, report: &AttackReport) -> Result<Vec<u8>, EngineError> {
        report
            .to_bytes(self.config.report.format)
            .map_err(|source| self.output_error(source))
    }

    fn write_rendered<W: Write>(&self, rendered: &[u8], out: &mut W) -> Result<(), EngineError> {
        out.write_all(rendered)
            .and_then(|_| out.flush())
            .map_err(|source| self.output_error(source))
    }

    async fn log_report(&self, report: &AttackReport) {
        EventLogger::log_event(
            "report_generated",
            vec![
                KeyValue::new("offenders", report.offenders().len() as i64),
                KeyValue::new(
                    "generated_at",
                    report.generated_at().format("%Y-%m-%d %H:%M:%S").to_string(),
                ),
                KeyValue::new("target", self.output_target()),
            ],
        )
        .await;
    }

    fn output_target(&self) -> String {
        match &self.config.report.output {
            Some(path) => path.display().to_string(),
            None => "stdout".to_string(),
        }
    }

    fn output_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Output {
            target: self.output_target(),
            source,
        }
    }
}
