//! Command-line arguments for the proxy-ranker binary

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::AppConfig;
use crate::types::MaxCandidates;

/// How often the binary runs a selection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Once,
    Every(Duration),
}

/// Measure proxy candidates, rank them and push the winner to API channels
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (defaults plus environment when absent)
    #[arg(short, long, default_value = "config.toml", env = "PROXY_RANKER_CONFIG")]
    pub config: PathBuf,

    /// Seconds between selection cycles (overrides `[schedule] interval_secs`)
    #[arg(short, long, env = "PROXY_RANKER_INTERVAL")]
    pub interval: Option<u64>,

    /// Run a single cycle even if an interval is configured
    #[arg(long)]
    pub once: bool,

    /// Rank candidates but do not update any channel
    #[arg(long)]
    pub dry_run: bool,

    /// Print each selection result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Region column to keep from the proxy list
    #[arg(short, long)]
    pub region: Option<String>,

    /// Maximum number of candidates to measure
    #[arg(short = 'n', long)]
    pub max_candidates: Option<MaxCandidates>,
}

impl Args {
    /// Apply command-line overrides on top of file and environment settings
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(region) = &self.region {
            config.source.region.clone_from(region);
        }
        if let Some(max) = self.max_candidates {
            config.source.max_candidates = max;
        }
        if let Some(secs) = self.interval {
            config.schedule.interval_secs = Some(secs);
        }
    }

    /// `--once` wins; otherwise a positive configured interval repeats
    #[must_use]
    pub fn run_mode(&self, config: &AppConfig) -> RunMode {
        if self.once {
            return RunMode::Once;
        }
        config
            .schedule
            .interval()
            .map_or(RunMode::Once, RunMode::Every)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("proxy-ranker").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert!(!args.once && !args.dry_run && !args.json);
        assert_eq!(args.run_mode(&AppConfig::default()), RunMode::Once);
    }

    #[test]
    fn test_overrides() {
        let args = parse(&["--region", "日本", "--max-candidates", "8", "--interval", "600"]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.source.region, "日本");
        assert_eq!(config.source.max_candidates.get(), 8);
        assert_eq!(
            args.run_mode(&config),
            RunMode::Every(Duration::from_secs(600))
        );
    }

    #[test]
    fn test_once_beats_interval() {
        let args = parse(&["--once", "--interval", "60"]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(args.run_mode(&config), RunMode::Once);
    }

    #[test]
    fn test_zero_interval_runs_once() {
        let args = parse(&["--interval", "0"]);
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(args.run_mode(&config), RunMode::Once);
    }

    #[test]
    fn test_zero_max_candidates_rejected() {
        let argv = ["proxy-ranker", "--max-candidates", "0"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
