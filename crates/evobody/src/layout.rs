//! Gene layouts: what each gene means and where it is seeded
//!
//! The engine treats individuals as bare vectors. A layout gives every gene a
//! name (used as a report column) and the range its initial value is drawn
//! from. Ranges only apply to seeding; evolution may push genes outside them.

use std::f64::consts::PI;

use evobody_ga::{Encoding, Individual};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Name and seeding range of one gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneSpec {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl GeneSpec {
    pub fn new(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }

    /// Draw a value uniformly from [min, max)
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }
}

/// Ordered gene specs for one kind of trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneLayout {
    pub genes: Vec<GeneSpec>,
}

/// Upper bound for every body dimension
const BODY_DIM_LIMIT: f64 = 5.0;
/// Motor amplitude bound (symmetric)
const AMPLITUDE_LIMIT: f64 = 2.0;

impl GeneLayout {
    /// Quadruped body: torso width/length/height, then widths, lengths and
    /// heights of the four legs
    pub fn body() -> Self {
        let mut genes = vec![
            GeneSpec::new("body_w", 0.0, BODY_DIM_LIMIT),
            GeneSpec::new("body_l", 0.0, BODY_DIM_LIMIT),
            GeneSpec::new("body_h", 0.0, BODY_DIM_LIMIT),
        ];
        for dim in ["w", "l", "h"] {
            for leg in 1..=4 {
                genes.push(GeneSpec::new(
                    format!("leg_{}{}", dim, leg),
                    0.0,
                    BODY_DIM_LIMIT,
                ));
            }
        }
        Self { genes }
    }

    /// Leg motor drivers: four amplitudes then four phase offsets
    pub fn driver() -> Self {
        let mut genes: Vec<GeneSpec> = (1..=4)
            .map(|i| GeneSpec::new(format!("amp_{}", i), -AMPLITUDE_LIMIT, AMPLITUDE_LIMIT))
            .collect();
        genes.extend((1..=4).map(|i| GeneSpec::new(format!("phase_{}", i), -2.0 * PI, 2.0 * PI)));
        Self { genes }
    }

    /// `length` anonymous genes sharing one range
    pub fn uniform(length: usize, min: f64, max: f64) -> Self {
        Self {
            genes: (0..length)
                .map(|i| GeneSpec::new(format!("gene_{}", i), min, max))
                .collect(),
        }
    }

    /// `length` anonymous bits
    pub fn binary(length: usize) -> Self {
        Self::uniform(length, 0.0, 1.0)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.genes.iter().map(|g| g.name.clone()).collect()
    }

    /// Draw one individual
    ///
    /// Binary encoding ignores the ranges and draws each gene from {0, 1}.
    pub fn random_individual<R: Rng + ?Sized>(&self, encoding: Encoding, rng: &mut R) -> Individual {
        match encoding {
            Encoding::Binary => self
                .genes
                .iter()
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 })
                .collect(),
            Encoding::Real => self.genes.iter().map(|g| g.sample(rng)).collect(),
        }
    }

    /// Draw a whole starting population
    pub fn random_population<R: Rng + ?Sized>(
        &self,
        encoding: Encoding,
        size: usize,
        rng: &mut R,
    ) -> Vec<Individual> {
        (0..size)
            .map(|_| self.random_individual(encoding, rng))
            .collect()
    }
}

/// Named layout choice for configuration and CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Body,
    Driver,
    Uniform,
    Binary,
}

impl LayoutKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Driver => "driver",
            Self::Uniform => "uniform",
            Self::Binary => "binary",
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "body" | "bodies" => Ok(Self::Body),
            "driver" | "drivers" => Ok(Self::Driver),
            "uniform" => Ok(Self::Uniform),
            "binary" | "bits" => Ok(Self::Binary),
            _ => Err(format!("Unknown layout '{}'", s)),
        }
    }
}
