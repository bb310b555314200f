use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use authscan_config::AuthscanConfig;
use authscan_core::ReportFormat;
use authscan_engine::ReportRuntime;
use authscan_telemetry::{EventLogger, MetricsRecorder};

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "authscan", version, about)]
pub struct Cli {
    /// Configuration file (default: config/authscan.yaml plus AUTHSCAN_* variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan an authentication log and print the attack report
    Report(ReportArgs),
    /// Validate the configuration and print the effective values
    CheckConfig,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Authentication log to scan
    #[arg(short, long)]
    pub log: Option<PathBuf>,
    /// Minimum failed attempts for an address to be reported
    #[arg(short, long)]
    pub threshold: Option<u64>,
    /// Scan workers (1 streams the file, 0 uses one per CPU)
    #[arg(short, long)]
    pub workers: Option<usize>,
    /// MaxMind Country database used for origin lookups
    #[arg(long)]
    pub geoip_db: Option<PathBuf>,
    /// Output format: table or yaml
    #[arg(short, long)]
    pub format: Option<ReportFormat>,
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print Prometheus metrics to stderr after the run
    #[arg(long)]
    pub print_metrics: bool,
}

impl ReportArgs {
    /// Command-line values win over file and environment configuration.
    pub fn apply(&self, config: &mut AuthscanConfig) {
        if let Some(log) = &self.log {
            config.scan.log_path = log.clone();
        }
        if let Some(threshold) = self.threshold {
            config.report.threshold = threshold;
        }
        if let Some(workers) = self.workers {
            config.scan.workers = workers;
        }
        if let Some(db) = &self.geoip_db {
            config.geo.database = Some(db.clone());
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(output) = &self.output {
            config.report.output = Some(output.clone());
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AuthscanConfig, CliError> {
    let config = match path {
        Some(path) => AuthscanConfig::load_from_path(path)?,
        None => AuthscanConfig::load()?,
    };
    Ok(config)
}

pub async fn run_command(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Report(args) => {
            args.apply(&mut config);
            config.check()?;
            EventLogger::init(&config.telemetry.log_level);
            run_report(config, args.print_metrics).await
        }
        Commands::CheckConfig => {
            print!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

async fn run_report(config: AuthscanConfig, print_metrics: bool) -> Result<(), CliError> {
    info!("Generating attack report from {}", config.scan.log_path.display());
    let metrics = Arc::new(MetricsRecorder::new()?);
    let runtime = ReportRuntime::from_config(config, metrics.clone())?;

    let result = runtime.run_to_sink().await;

    if print_metrics {
        eprint!("{}", metrics.gather_metrics()?);
    }
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flags() {
        let cli = Cli::try_parse_from([
            "authscan",
            "report",
            "--log",
            "/tmp/secure",
            "-t",
            "0",
            "--workers",
            "4",
            "--format",
            "yaml",
        ])
        .unwrap();

        let Commands::Report(args) = cli.command else {
            panic!("expected report command");
        };
        let mut config = AuthscanConfig::default();
        args.apply(&mut config);

        assert_eq!(config.scan.log_path, PathBuf::from("/tmp/secure"));
        assert_eq!(config.report.threshold, 0);
        assert_eq!(config.scan.workers, 4);
        assert_eq!(config.report.format, ReportFormat::Yaml);
        assert_eq!(config.report.output, None);
    }

    #[test]
    fn test_defaults_untouched_without_flags() {
        let mut config = AuthscanConfig::default();
        ReportArgs::default().apply(&mut config);
        assert_eq!(config.report.threshold, 10);
        assert_eq!(config.scan.log_path, PathBuf::from("/var/log/auth.log"));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let parsed = Cli::try_parse_from(["authscan", "report", "--format", "csv"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["authscan", "check-config", "--config", "ops.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ops.yaml")));
        assert!(matches!(cli.command, Commands::CheckConfig));
    }

    #[tokio::test]
    async fn test_missing_log_is_an_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AuthscanConfig::default();
        config.scan.log_path = dir.path().join("auth.log");

        let err = run_report(config, false).await.unwrap_err();
        assert!(matches!(err, CliError::Engine(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
