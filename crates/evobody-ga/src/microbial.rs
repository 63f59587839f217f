//! Microbial genetic algorithm with localized tournament selection
//!
//! Algorithm per cycle:
//! 1. Pick two individuals from the same deme (local "neighborhood")
//! 2. Compare their fitness and assign a winner and a loser
//! 3. Infect the loser with some proportion of the winner's genes
//! 4. With some probability, mutate the loser
//!
//! Only the loser changes, so exactly one individual needs re-evaluation
//! before the next cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{Encoding, flip_bit};
use crate::error::{GaError, Result};
use crate::ledger::Ledger;
use crate::rng::{DefaultRng, GaRng, seeded_rng};
use crate::strategy::{CycleReport, GeneticAlgorithm, Mutation};

/// Configuration for the microbial strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrobialConfig {
    /// Instance name, used in logs and the `Display` output
    pub name: String,
    /// Per-gene probability that the loser takes the winner's gene
    pub prob_reproduction: f64,
    /// Probability that the loser receives a mutation
    pub prob_mutation: f64,
    /// Fraction of the current value added or subtracted by a real mutation
    pub mutation_deviation: f64,
    /// Gene encoding, selects bit-flip or proportional mutation
    pub encoding: Encoding,
    /// Individuals on *each side* of the first parent eligible as second parent.
    /// `None`, or a deme covering the whole population, means unrestricted.
    pub deme_size: Option<usize>,
}

impl Default for MicrobialConfig {
    fn default() -> Self {
        Self {
            name: "Microbial".to_string(),
            prob_reproduction: 0.8,
            prob_mutation: 0.1,
            mutation_deviation: 0.01,
            encoding: Encoding::Binary,
            deme_size: None,
        }
    }
}

impl MicrobialConfig {
    /// Check probabilities and deviation before any evolution happens
    pub fn validate(&self) -> Result<()> {
        check_probability("prob_reproduction", self.prob_reproduction)?;
        check_probability("prob_mutation", self.prob_mutation)?;
        if !self.mutation_deviation.is_finite() {
            return Err(GaError::InvalidDeviation {
                value: self.mutation_deviation,
            });
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GaError::InvalidProbability { name, value })
    }
}

fn check_bits(ledger: &Ledger) -> Result<()> {
    for (index, individual) in ledger.population().iter().enumerate() {
        if let Some((gene, &value)) = individual
            .iter()
            .enumerate()
            .find(|&(_, &value)| value != 0.0 && value != 1.0)
        {
            return Err(GaError::NonBinaryGene { index, gene, value });
        }
    }
    Ok(())
}

/// Normalize a requested deme to the effective neighborhood radius
///
/// A deme of `floor(population_size / 2)` or more already reaches every
/// individual, so it collapses to 0 ("whole population").
pub fn effective_deme(deme_size: Option<usize>, population_size: usize) -> usize {
    match deme_size {
        Some(deme) if deme < population_size / 2 => deme,
        _ => 0,
    }
}

/// Microbial GA driving one [`Ledger`]
pub struct Microbial<R: GaRng = DefaultRng> {
    ledger: Ledger,
    config: MicrobialConfig,
    /// Effective deme radius after normalization (0 = unrestricted)
    deme_size: usize,
    replaced: Vec<bool>,
    rng: R,
}

impl Microbial<DefaultRng> {
    /// Create an engine with a seeded default generator
    pub fn with_seed(ledger: Ledger, config: MicrobialConfig, seed: u64) -> Result<Self> {
        Self::new(ledger, config, seeded_rng(seed))
    }
}

impl<R: GaRng> Microbial<R> {
    /// Create a new engine
    ///
    /// # Errors
    /// - [`GaError::PopulationTooSmall`] for fewer than two individuals
    /// - [`GaError::InvalidProbability`] / [`GaError::InvalidDeviation`] for
    ///   out-of-range configuration values
    /// - [`GaError::NonBinaryGene`] if a binary engine is handed a gene other
    ///   than 0 or 1
    pub fn new(ledger: Ledger, config: MicrobialConfig, rng: R) -> Result<Self> {
        if ledger.len() < 2 {
            return Err(GaError::PopulationTooSmall { size: ledger.len() });
        }
        config.validate()?;
        if config.encoding == Encoding::Binary {
            check_bits(&ledger)?;
        }

        let deme_size = effective_deme(config.deme_size, ledger.len());
        let replaced = vec![false; ledger.len()];

        Ok(Self {
            ledger,
            config,
            deme_size,
            replaced,
            rng,
        })
    }

    pub fn config(&self) -> &MicrobialConfig {
        &self.config
    }

    /// Effective deme radius (0 = whole population)
    pub fn deme_size(&self) -> usize {
        self.deme_size
    }

    /// Replacement flags from the most recent cycle
    pub fn replaced(&self) -> &[bool] {
        &self.replaced
    }

    /// Consume the engine, returning its ledger
    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Randomly select two distinct individuals from the same deme
    ///
    /// The first parent is drawn from the whole population. The second is drawn
    /// from `[index1 - deme, index1 + deme]` with wrap-around, or from the whole
    /// population when the deme is 0, until it differs from the first.
    pub fn select(&mut self) -> (usize, usize) {
        let size = self.ledger.len();
        let index1 = self.rng.gen_index(size);
        let mut index2 = index1;

        while index2 == index1 {
            index2 = if self.deme_size > 0 {
                let offset = self.rng.gen_offset(self.deme_size);
                (index1 as i64 + offset).rem_euclid(size as i64) as usize
            } else {
                self.rng.gen_index(size)
            };
        }

        log::trace!(
            "{}: selected {} (score = {}) and {} (score = {})",
            self.config.name,
            index1,
            self.ledger.fitness()[index1],
            index2,
            self.ledger.fitness()[index2]
        );

        (index1, index2)
    }

    /// Infect the loser of `index1` vs `index2` with the winner's genes
    ///
    /// The smaller adjusted fitness wins; on a tie `index2` wins. Each gene of
    /// the loser is overwritten by the winner's gene when a unit draw is at or
    /// below `prob_reproduction`. The winner is never modified.
    ///
    /// Returns the index of the loser, which is flagged as replaced.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn reproduce(&mut self, index1: usize, index2: usize) -> usize {
        let (winner, loser) = if self.ledger.adjusted_fitness(index1)
            < self.ledger.adjusted_fitness(index2)
        {
            (index1, index2)
        } else {
            (index2, index1)
        };

        log::trace!(
            "{}: winner {} (score = {}), loser {} (score = {})",
            self.config.name,
            winner,
            self.ledger.fitness()[winner],
            loser,
            self.ledger.fitness()[loser]
        );

        let prob = self.config.prob_reproduction;
        let gene_count = self.ledger.gene_count();
        let population = self.ledger.population_mut();

        for gene in 0..gene_count {
            if self.rng.check_probability(prob) {
                population[loser][gene] = population[winner][gene];
            }
        }

        log::trace!(
            "{}: infected loser {:?} replaces index {}",
            self.config.name,
            population[loser],
            loser
        );

        self.replaced[loser] = true;
        loser
    }

    /// Mutate the individual at `index` with the operator for the configured encoding
    pub fn mutate(&mut self, index: usize) -> Option<Mutation> {
        match self.config.encoding {
            Encoding::Binary => self.bit_mutate(index),
            Encoding::Real => self.real_mutate(index),
        }
    }

    /// With probability `prob_mutation`, flip one randomly chosen bit
    pub fn bit_mutate(&mut self, index: usize) -> Option<Mutation> {
        if !self.rng.check_probability(self.config.prob_mutation) {
            return None;
        }

        let gene = self.rng.gen_index(self.ledger.gene_count());
        let individual = &mut self.ledger.population_mut()[index];
        let before = individual[gene];
        individual[gene] = flip_bit(before);

        log::trace!(
            "{}: mutation {} -> {} at gene {} of index {}",
            self.config.name,
            before,
            individual[gene],
            gene,
            index
        );

        Some(Mutation {
            individual: index,
            gene,
            before,
            after: individual[gene],
        })
    }

    /// With probability `prob_mutation`, scale one randomly chosen gene by
    /// `1 ± mutation_deviation`
    ///
    /// The change is proportional to the gene, so a gene at exactly 0 stays at 0.
    /// The returned [`Mutation`] still reports the attempt (`before == after`).
    pub fn real_mutate(&mut self, index: usize) -> Option<Mutation> {
        if !self.rng.check_probability(self.config.prob_mutation) {
            return None;
        }

        let gene = self.rng.gen_index(self.ledger.gene_count());
        let sign = self.rng.gen_sign();
        let deviation = self.config.mutation_deviation;
        let individual = &mut self.ledger.population_mut()[index];
        let before = individual[gene];
        individual[gene] += before * deviation * sign;

        log::trace!(
            "{}: mutation {} -> {} at gene {} of index {}",
            self.config.name,
            before,
            individual[gene],
            gene,
            index
        );

        Some(Mutation {
            individual: index,
            gene,
            before,
            after: individual[gene],
        })
    }
}

impl<R: GaRng> GeneticAlgorithm for Microbial<R> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// One generation: select, infect the loser, mutate the loser
    ///
    /// Fitness is not re-evaluated here; the single replaced index must be
    /// scored by the caller and written back before the next cycle.
    fn cycle(&mut self) -> CycleReport<'_> {
        self.replaced.fill(false);

        let (index1, index2) = self.select();
        let loser = self.reproduce(index1, index2);
        let mutation = self.mutate(loser);

        log::debug!(
            "{}: evolved individual at index {}: {:?}",
            self.config.name,
            loser,
            self.ledger.population()[loser]
        );

        CycleReport {
            population: self.ledger.population(),
            replaced: &self.replaced,
            loser,
            mutation,
        }
    }
}

impl<R: GaRng> fmt::Display for Microbial<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Genetic Algorithm with population size: {}, reproduction rate: {}, mutation rate: {}, minimise = {}",
            self.config.name,
            self.ledger.len(),
            self.config.prob_reproduction,
            self.config.prob_mutation,
            self.ledger.minimise()
        )?;
        if self.deme_size > 0 {
            write!(f, ", and deme size {}", self.deme_size)
        } else {
            write!(f, ", and deme size includes whole population")
        }
    }
}

impl<R: GaRng> fmt::Debug for Microbial<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Microbial")
            .field("ledger", &self.ledger)
            .field("config", &self.config)
            .field("deme_size", &self.deme_size)
            .field("replaced", &self.replaced)
            .finish_non_exhaustive()
    }
}

/// Check whether two indices lie within `deme` of each other on the wrapped index ring
pub fn within_deme(index1: usize, index2: usize, deme: usize, population_size: usize) -> bool {
    let diff = index1.abs_diff(index2);
    diff.min(population_size - diff) <= deme
}
