//! `defectlab.toml` config loading.

use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Base directory for timelines and fault logs.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Default reporter for CLI commands.
    #[serde(default = "default_reporter")]
    pub reporter: crate::Reporter,

    /// Time source for scenario instances.
    #[serde(default = "default_clock")]
    pub clock: crate::ClockMode,

    /// Seed for timer tie-breaking and simulated jitter.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Ordering of timers that fall due at the same instant.
    #[serde(default = "default_schedule")]
    pub schedule: crate::SchedulerMode,

    /// Reference timings used by scenario scripts.
    #[serde(default)]
    pub timings: Timings,
}

/// Millisecond defaults for every scripted wait. These are reference values,
/// not a contract; recordings may stretch or shrink them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Timings {
    pub toast_ms: u64,
    pub toast_flash_ms: u64,
    pub request_ms: u64,
    pub redirect_ms: u64,
    pub token_ttl_ms: u64,
    pub slow_load_ms: u64,
    pub escalation_base_ms: u64,
    pub queue_job_ms: u64,
    pub burn_iterations: u64,
    pub large_list_len: usize,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            toast_ms: 1500,
            toast_flash_ms: 300,
            request_ms: 600,
            redirect_ms: 700,
            token_ttl_ms: 500,
            slow_load_ms: 3000,
            escalation_base_ms: 400,
            queue_job_ms: 600,
            burn_iterations: 3_000_000,
            large_list_len: 5000,
        }
    }
}

impl Timings {
    /// Clamps waits that re-arm themselves from their own timer. At 0ms such a
    /// timer is due again at the instant it fires and virtual time stalls.
    pub fn sanitized(mut self) -> Self {
        if self.redirect_ms == 0 {
            tracing::warn!("timings.redirect_ms = 0 would re-fire without end; using 1ms");
            self.redirect_ms = 1;
        }
        self
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".defectlab")
}

fn default_reporter() -> crate::Reporter {
    crate::Reporter::Pretty
}

fn default_clock() -> crate::ClockMode {
    crate::ClockMode::Virtual
}

fn default_seed() -> u64 {
    7
}

fn default_schedule() -> crate::SchedulerMode {
    crate::SchedulerMode::Fifo
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            reporter: default_reporter(),
            clock: default_clock(),
            seed: default_seed(),
            schedule: default_schedule(),
            timings: Timings::default(),
        }
    }
}

impl Config {
    pub fn load_optional(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => match Self::parse(&s) {
                Ok(cfg) => cfg,
                Err(err) => {
                    tracing::warn!("failed to parse config {}: {err}", path.display());
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                tracing::warn!("failed to read config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(raw: &str) -> crate::HarnessResult<Self> {
        let mut cfg =
            toml::from_str::<Config>(raw).map_err(|e| crate::HarnessError::Config(e.to_string()))?;
        cfg.timings = cfg.timings.sanitized();
        Ok(cfg)
    }

    pub fn timelines_dir(&self) -> PathBuf {
        self.base_dir.join("timelines")
    }

    pub fn faults_path(&self) -> PathBuf {
        self.base_dir.join("faults.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_reference_timings() {
        let cfg = Config::parse(
            r#"
seed = 99
clock = "wall"

[timings]
toast_ms = 2000
"#,
        )
        .expect("parse");
        assert_eq!(cfg.seed, 99);
        assert_eq!(cfg.clock, crate::ClockMode::Wall);
        assert_eq!(cfg.timings.toast_ms, 2000);
        assert_eq!(cfg.timings.toast_flash_ms, 300);
        assert_eq!(cfg.base_dir, PathBuf::from(".defectlab"));
    }

    #[test]
    fn missing_config_file_is_default() {
        let path = std::env::temp_dir().join(format!("defectlab-missing-{}.toml", uuid::Uuid::new_v4()));
        let cfg = Config::load_optional(&path);
        assert_eq!(cfg.timings, Timings::default());
        assert_eq!(cfg.seed, 7);
    }

    #[test]
    fn zero_redirect_interval_is_clamped() {
        let cfg = Config::parse("[timings]\nredirect_ms = 0\nrequest_ms = 0\n").expect("parse");
        assert_eq!(cfg.timings.redirect_ms, 1);
        assert_eq!(cfg.timings.request_ms, 0);
    }

    #[test]
    fn invalid_config_is_rejected_by_parse() {
        let err = Config::parse("seed = \"nope\"").expect_err("must fail");
        assert!(err.to_string().contains("config error"));
    }
}
