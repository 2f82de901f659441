use anyhow::Context;
use chrono::NaiveDate;

use crate::stats::DEFAULT_LOW_THRESHOLD;

pub const SEED_VAR: &str = "ATTENDANCE_SEED";
pub const TODAY_VAR: &str = "ATTENDANCE_TODAY";
pub const THRESHOLD_VAR: &str = "ATTENDANCE_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub seed: Option<u64>,
    pub today: Option<NaiveDate>,
    pub threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            today: None,
            threshold: DEFAULT_LOW_THRESHOLD,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = non_empty(lookup(SEED_VAR)) {
            let seed = raw
                .parse::<u64>()
                .with_context(|| format!("{SEED_VAR} must be an unsigned integer, got '{raw}'"))?;
            config.seed = Some(seed);
        }

        if let Some(raw) = non_empty(lookup(TODAY_VAR)) {
            let today = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("{TODAY_VAR} must be a YYYY-MM-DD date, got '{raw}'"))?;
            config.today = Some(today);
        }

        if let Some(raw) = non_empty(lookup(THRESHOLD_VAR)) {
            let threshold = raw
                .parse::<u32>()
                .with_context(|| format!("{THRESHOLD_VAR} must be a percentage, got '{raw}'"))?;
            config.threshold = check_threshold(threshold).context(THRESHOLD_VAR)?;
        }

        Ok(config)
    }

    /// Applies command-line values over the environment.
    pub fn with_overrides(mut self, seed: Option<u64>, today: Option<NaiveDate>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        if today.is_some() {
            self.today = today;
        }
        self
    }

    /// Threshold for one command: the `--threshold` value when given, else the
    /// configured one.
    pub fn threshold_or(&self, requested: Option<u32>) -> anyhow::Result<u32> {
        match requested {
            Some(threshold) => check_threshold(threshold).context("--threshold"),
            None => Ok(self.threshold),
        }
    }
}

fn check_threshold(threshold: u32) -> anyhow::Result<u32> {
    anyhow::ensure!(
        threshold <= 100,
        "threshold must be between 0 and 100, got {threshold}"
    );
    Ok(threshold)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}
