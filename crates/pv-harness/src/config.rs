use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result, bail};
use pv_verify::{CompareThresholds, InvariantConfig};
use serde::{Deserialize, Serialize};

/// Everything a run is parameterized by. Every field has a default, so a
/// config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Filter sizes swept per corpus image. Must be odd.
    pub filter_sizes: Vec<usize>,
    /// `max_levels` values swept per corpus image.
    pub max_levels: Vec<usize>,
    pub min_level_dim: usize,
    pub compare: CompareThresholds,
    pub invariants: InvariantConfig,
    pub round_trip: RoundTripConfig,
    /// Levels requested when rendering a corpus pyramid.
    pub render_levels: usize,
    pub stress: StressConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            filter_sizes: vec![3, 5, 7],
            max_levels: vec![2, 4, 6],
            min_level_dim: 16,
            compare: CompareThresholds::default(),
            invariants: InvariantConfig::default(),
            round_trip: RoundTripConfig::default(),
            render_levels: 4,
            stress: StressConfig::default(),
        }
    }
}

/// Parameters of the reconstruction and oracle comparison cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTripConfig {
    pub max_levels: usize,
    pub filter_size: usize,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            max_levels: 4,
            filter_size: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Number of random matrices, each its own case.
    pub cases: usize,
    pub min_dim: usize,
    pub max_dim: usize,
    pub min_levels: usize,
    pub max_levels: usize,
    pub seed: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            cases: 20,
            min_dim: 1,
            max_dim: 300,
            min_levels: 1,
            max_levels: 10,
            seed: 0x5EED,
        }
    }
}

impl StressConfig {
    pub fn dims(&self) -> RangeInclusive<usize> {
        self.min_dim..=self.max_dim
    }

    pub fn levels(&self) -> RangeInclusive<usize> {
        self.min_levels..=self.max_levels
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.filter_sizes.is_empty() {
            bail!("filter_sizes must not be empty.");
        }
        if let Some(size) = self.filter_sizes.iter().find(|&&s| s % 2 == 0) {
            bail!("filter size {size} is even; filter sizes must be odd.");
        }
        if self.max_levels.is_empty() {
            bail!("max_levels must not be empty.");
        }
        if self.round_trip.filter_size % 2 == 0 {
            bail!(
                "round_trip.filter_size {} is even; it must be odd.",
                self.round_trip.filter_size
            );
        }
        if self.stress.levels().is_empty() || self.stress.dims().is_empty() {
            bail!(
                "stress ranges are empty: dims {:?}, levels {:?}.",
                self.stress.dims(),
                self.stress.levels()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::HarnessConfig;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: HarnessConfig =
            serde_json::from_str(r#"{ "filter_sizes": [3], "stress": { "cases": 2 } }"#)
                .expect("parses");
        assert_eq!(config.filter_sizes, vec![3]);
        assert_eq!(config.max_levels, vec![2, 4, 6]);
        assert_eq!(config.stress.cases, 2);
        assert_eq!(config.stress.seed, 0x5EED);
        assert_eq!(config.compare.min_correlation, 0.9);
        assert_eq!(config.invariants.value_bound_eps, 1e-9);
    }

    #[test]
    fn even_filter_sizes_are_rejected() {
        let config = HarnessConfig {
            filter_sizes: vec![3, 4],
            ..HarnessConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("filter size 4 is even"));
        assert!(HarnessConfig::default().validate().is_ok());
    }

    #[test]
    fn load_reads_and_validates_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "render_levels": 3 }"#).expect("write");
        assert_eq!(HarnessConfig::load(&path).expect("loads").render_levels, 3);

        std::fs::write(&path, r#"{ "stress": { "min_dim": 10, "max_dim": 2 } }"#).expect("write");
        assert!(HarnessConfig::load(&path).is_err());
    }
}
