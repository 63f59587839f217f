//! Trial configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `evobody.ron` file (if exists), or an explicit file passed with `--config`
//! 3. Environment variables prefixed with `EVOBODY_`
//!
//! Command-line flags are applied on top by the binary.
//!
//! Example environment variable: `EVOBODY_ALGORITHM__PROB_MUTATION=0.2`

use std::path::Path;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File, FileFormat};
use evobody_ga::{Encoding, MicrobialConfig};
use serde::{Deserialize, Serialize};

use crate::layout::{GeneLayout, LayoutKind};
use crate::oracle::OracleKind;

/// Main trial configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default)]
    pub trial: TrialSettings,

    #[serde(default = "trial_algorithm")]
    pub algorithm: MicrobialConfig,

    #[serde(default)]
    pub oracle: OracleSettings,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            trial: TrialSettings::default(),
            algorithm: trial_algorithm(),
            oracle: OracleSettings::default(),
        }
    }
}

/// Body and driver trials evolve real-valued genes with 5% mutations
fn trial_algorithm() -> MicrobialConfig {
    MicrobialConfig {
        encoding: Encoding::Real,
        mutation_deviation: 0.05,
        ..MicrobialConfig::default()
    }
}

/// Run length, population and output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialSettings {
    /// Used in report file names
    pub title: String,
    /// Number of independent trials run back to back
    pub trials: usize,
    /// Number of cycles after the initial evaluation
    pub generations: usize,
    pub population_size: usize,
    /// Fixed seed for reproducible runs; drawn from entropy when unset
    pub seed: Option<u64>,
    pub layout: LayoutKind,
    /// Gene count for the `uniform` and `binary` layouts
    pub genome_length: usize,
    /// Seeding range for the `uniform` layout
    pub gene_min: f64,
    pub gene_max: f64,
    pub output_dir: String,
    /// Print a progress line every N generations (0 disables)
    pub log_interval: usize,
    pub show_progress: bool,
}

impl Default for TrialSettings {
    fn default() -> Self {
        Self {
            title: "trial".to_string(),
            trials: 1,
            generations: 100,
            population_size: 20,
            seed: None,
            layout: LayoutKind::Body,
            genome_length: 16,
            gene_min: -5.0,
            gene_max: 5.0,
            output_dir: "trial_output".to_string(),
            log_interval: 10,
            show_progress: true,
        }
    }
}

/// Fitness oracle selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub kind: OracleKind,
    /// Overrides the oracle's natural direction when set
    pub minimise: Option<bool>,
}

impl TrialConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path` if given (must exist), otherwise `evobody.ron` if present
    /// 3. Environment variables prefixed with `EVOBODY_` (highest priority)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let trial = &defaults.trial;
        let algorithm = &defaults.algorithm;

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("evobody")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("trial.title", trial.title.clone())?
            .set_default("trial.trials", trial.trials as i64)?
            .set_default("trial.generations", trial.generations as i64)?
            .set_default("trial.population_size", trial.population_size as i64)?
            .set_default("trial.layout", trial.layout.name())?
            .set_default("trial.genome_length", trial.genome_length as i64)?
            .set_default("trial.gene_min", trial.gene_min)?
            .set_default("trial.gene_max", trial.gene_max)?
            .set_default("trial.output_dir", trial.output_dir.clone())?
            .set_default("trial.log_interval", trial.log_interval as i64)?
            .set_default("trial.show_progress", trial.show_progress)?
            .set_default("algorithm.name", algorithm.name.clone())?
            .set_default("algorithm.prob_reproduction", algorithm.prob_reproduction)?
            .set_default("algorithm.prob_mutation", algorithm.prob_mutation)?
            .set_default("algorithm.mutation_deviation", algorithm.mutation_deviation)?
            .set_default("algorithm.encoding", algorithm.encoding.name())?
            .set_default("oracle.kind", "sphere")?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (EVOBODY_TRIAL__GENERATIONS, etc.)
            .add_source(
                Environment::with_prefix("EVOBODY")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Reject settings the trial cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.trial.trials == 0 {
            bail!("trials must be at least 1");
        }
        if self.trial.population_size < 2 {
            bail!(
                "population_size must be at least 2, got {}",
                self.trial.population_size
            );
        }
        if matches!(self.trial.layout, LayoutKind::Uniform | LayoutKind::Binary)
            && self.trial.genome_length == 0
        {
            bail!("genome_length must be positive for the {} layout", self.trial.layout.name());
        }
        if self.trial.gene_min > self.trial.gene_max {
            bail!(
                "gene_min ({}) exceeds gene_max ({})",
                self.trial.gene_min,
                self.trial.gene_max
            );
        }
        self.algorithm
            .validate()
            .context("Invalid algorithm settings")?;
        Ok(())
    }

    /// Gene layout selected by `trial.layout`
    pub fn gene_layout(&self) -> GeneLayout {
        match self.trial.layout {
            LayoutKind::Body => GeneLayout::body(),
            LayoutKind::Driver => GeneLayout::driver(),
            LayoutKind::Uniform => GeneLayout::uniform(
                self.trial.genome_length,
                self.trial.gene_min,
                self.trial.gene_max,
            ),
            LayoutKind::Binary => GeneLayout::binary(self.trial.genome_length),
        }
    }

    /// Binary layouts always evolve bits, whatever the algorithm section says
    pub fn effective_encoding(&self) -> Encoding {
        match self.trial.layout {
            LayoutKind::Binary => Encoding::Binary,
            _ => self.algorithm.encoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TrialConfig::default();
        assert_eq!(config.trial.title, "trial");
        assert_eq!(config.trial.trials, 1);
        assert_eq!(config.trial.generations, 100);
        assert_eq!(config.trial.population_size, 20);
        assert_eq!(config.trial.layout, LayoutKind::Body);
        assert_eq!(config.oracle.kind, OracleKind::Sphere);
        assert_eq!(config.algorithm.prob_reproduction, 0.8);
        assert_eq!(config.algorithm.encoding, Encoding::Real);
        assert_eq!(config.algorithm.mutation_deviation, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = TrialConfig::load(None).expect("Failed to load config");
        assert_eq!(config.trial.population_size, 20);
        assert_eq!(config.algorithm.prob_mutation, 0.1);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".ron")
            .tempfile()
            .expect("Failed to create temp file");
        write!(
            file,
            r#"(
                trial: (
                    title: "legs",
                    trials: 3,
                    generations: 7,
                    layout: "driver",
                    seed: 42,
                ),
                algorithm: (
                    prob_mutation: 0.3,
                    encoding: "binary",
                    deme_size: 4,
                ),
                oracle: (
                    kind: "rastrigin",
                ),
            )"#
        )
        .expect("Failed to write config");

        let config = TrialConfig::load(Some(file.path())).expect("Failed to load config");
        assert_eq!(config.trial.title, "legs");
        assert_eq!(config.trial.trials, 3);
        assert_eq!(config.trial.generations, 7);
        assert_eq!(config.trial.layout, LayoutKind::Driver);
        assert_eq!(config.trial.seed, Some(42));
        // Untouched fields keep their defaults
        assert_eq!(config.trial.population_size, 20);
        assert_eq!(config.algorithm.prob_mutation, 0.3);
        assert_eq!(config.algorithm.prob_reproduction, 0.8);
        assert_eq!(config.algorithm.encoding, Encoding::Binary);
        assert_eq!(config.algorithm.mutation_deviation, 0.05);
        assert_eq!(config.algorithm.deme_size, Some(4));
        assert_eq!(config.oracle.kind, OracleKind::Rastrigin);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let missing = dir.path().join("nope.ron");
        assert!(TrialConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = TrialConfig::default();
        config.trial.population_size = 1;
        assert!(config.validate().is_err());

        let mut config = TrialConfig::default();
        config.trial.trials = 0;
        assert!(config.validate().is_err());

        let mut config = TrialConfig::default();
        config.algorithm.prob_mutation = 1.5;
        assert!(config.validate().is_err());

        let mut config = TrialConfig::default();
        config.trial.layout = LayoutKind::Uniform;
        config.trial.genome_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gene_layout_selection() {
        let mut config = TrialConfig::default();
        assert_eq!(config.gene_layout().len(), 15);

        config.trial.layout = LayoutKind::Driver;
        assert_eq!(config.gene_layout().len(), 8);

        config.trial.layout = LayoutKind::Uniform;
        config.trial.genome_length = 5;
        let layout = config.gene_layout();
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.genes[0].min, -5.0);

        config.trial.layout = LayoutKind::Binary;
        config.algorithm.encoding = Encoding::Real;
        assert_eq!(config.effective_encoding(), Encoding::Binary);
    }
}
