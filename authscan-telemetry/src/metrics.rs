//! ## authscan-telemetry::metrics
//! **Prometheus counters for one scan run**

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub lines_scanned: IntCounter,
    pub failed_logins: IntCounter,
    pub malformed_lines: IntCounter,
    pub lookup_failures: IntCounter,
    pub lookup_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let lines_scanned =
            IntCounter::new("authscan_lines_scanned_total", "Log lines read by the scanner")?;
        let failed_logins = IntCounter::new(
            "authscan_failed_logins_total",
            "Failed login events extracted from the log",
        )?;
        let malformed_lines = IntCounter::new(
            "authscan_malformed_lines_total",
            "Failure lines skipped for lack of a source address",
        )?;
        let lookup_failures = IntCounter::new(
            "authscan_geo_lookup_failures_total",
            "Geo lookups that errored or timed out",
        )?;
        let lookup_latency = Histogram::with_opts(
            HistogramOpts::new(
                "authscan_geo_lookup_latency_seconds",
                "Time spent per geo lookup",
            )
            .buckets(vec![0.0001, 0.001, 0.01, 0.1, 1.0]),
        )?;

        registry.register(Box::new(lines_scanned.clone()))?;
        registry.register(Box::new(failed_logins.clone()))?;
        registry.register(Box::new(malformed_lines.clone()))?;
        registry.register(Box::new(lookup_failures.clone()))?;
        registry.register(Box::new(lookup_latency.clone()))?;

        Ok(Self {
            registry,
            lines_scanned,
            failed_logins,
            malformed_lines,
            lookup_failures,
            lookup_latency,
        })
    }

    pub fn record_scan(&self, lines: u64, events: u64, malformed: u64) {
        self.lines_scanned.inc_by(lines);
        self.failed_logins.inc_by(events);
        self.malformed_lines.inc_by(malformed);
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
