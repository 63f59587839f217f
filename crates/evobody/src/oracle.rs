//! Fitness oracles
//!
//! The real oracle is a physics simulation that builds a robot from the genes
//! and reports how far it travelled. It lives outside this workspace; anything
//! implementing [`FitnessOracle`] can take its place. The analytic oracles here
//! stand in for it in tests and smoke runs.

use serde::{Deserialize, Serialize};

/// Trait for fitness evaluation functions
pub trait FitnessOracle: Send + Sync {
    /// Score one individual
    fn evaluate(&self, genes: &[f64]) -> f64;

    /// Get the name of this oracle
    fn name(&self) -> &str;

    /// Get a description of what this oracle measures
    fn description(&self) -> &str;

    /// Whether lower scores are better for this oracle
    fn minimise(&self) -> bool {
        false
    }
}

/// Counts set bits; maximal when every gene is 1
pub struct OneMax;

impl FitnessOracle for OneMax {
    fn evaluate(&self, genes: &[f64]) -> f64 {
        genes.iter().filter(|&&g| g != 0.0).count() as f64
    }

    fn name(&self) -> &str {
        "OneMax"
    }

    fn description(&self) -> &str {
        "Number of non-zero genes"
    }
}

/// Sum of squares; minimal at the origin
pub struct Sphere;

impl FitnessOracle for Sphere {
    fn evaluate(&self, genes: &[f64]) -> f64 {
        genes.iter().map(|g| g * g).sum()
    }

    fn name(&self) -> &str {
        "Sphere"
    }

    fn description(&self) -> &str {
        "Sum of squared genes, minimum 0 at the origin"
    }

    fn minimise(&self) -> bool {
        true
    }
}

/// Rastrigin function; many local minima, global minimum 0 at the origin
pub struct Rastrigin {
    pub amplitude: f64,
}

impl Default for Rastrigin {
    fn default() -> Self {
        Self { amplitude: 10.0 }
    }
}

impl FitnessOracle for Rastrigin {
    fn evaluate(&self, genes: &[f64]) -> f64 {
        let a = self.amplitude;
        a * genes.len() as f64
            + genes
                .iter()
                .map(|g| g * g - a * (2.0 * std::f64::consts::PI * g).cos())
                .sum::<f64>()
    }

    fn name(&self) -> &str {
        "Rastrigin"
    }

    fn description(&self) -> &str {
        "Multimodal benchmark, minimum 0 at the origin"
    }

    fn minimise(&self) -> bool {
        true
    }
}

/// Adapts a closure (e.g. a call into an external simulator) into an oracle
pub struct FnOracle<F> {
    name: String,
    minimise: bool,
    evaluate: F,
}

impl<F> FnOracle<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, minimise: bool, evaluate: F) -> Self {
        Self {
            name: name.into(),
            minimise,
            evaluate,
        }
    }
}

impl<F> FitnessOracle for FnOracle<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate(&self, genes: &[f64]) -> f64 {
        (self.evaluate)(genes)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "User-supplied evaluation function"
    }

    fn minimise(&self) -> bool {
        self.minimise
    }
}

/// Built-in oracle choice for configuration and CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    OneMax,
    #[default]
    Sphere,
    Rastrigin,
}

impl OracleKind {
    pub fn build(&self) -> Box<dyn FitnessOracle> {
        match self {
            Self::OneMax => Box::new(OneMax),
            Self::Sphere => Box::new(Sphere),
            Self::Rastrigin => Box::new(Rastrigin::default()),
        }
    }
}

impl std::str::FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "one_max" | "onemax" => Ok(Self::OneMax),
            "sphere" => Ok(Self::Sphere),
            "rastrigin" => Ok(Self::Rastrigin),
            _ => Err(format!("Unknown oracle '{}'", s)),
        }
    }
}
