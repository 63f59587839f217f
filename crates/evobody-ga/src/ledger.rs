//! Population/fitness ledger
//!
//! Stores the population and its fitness vector in lockstep and answers
//! "who is best" queries. The ledger knows nothing about how individuals are
//! selected or bred; strategies such as [`crate::Microbial`] own a ledger and
//! mutate genes through crate-private accessors.
//!
//! Fitness comparisons go through a sign multiplier: `+1` when minimising and
//! `-1` when maximising, so the better individual always has the smaller
//! adjusted value.

use crate::encoding::Individual;
use crate::error::{GaError, Result};

/// Fixed-size population with one fitness value per individual
#[derive(Debug, Clone)]
pub struct Ledger {
    population: Vec<Individual>,
    fitness: Vec<f64>,
    minimise: bool,
    /// Index of the best individual, recomputed on every fitness write
    best: usize,
}

impl Ledger {
    /// Create a ledger from an externally evaluated initial population
    ///
    /// # Errors
    /// - [`GaError::EmptyPopulation`] if `population` is empty
    /// - [`GaError::DimensionMismatch`] if the fitness vector has a different length
    /// - [`GaError::EmptyGenome`] / [`GaError::GeneCountMismatch`] for zero-length
    ///   or ragged individuals
    /// - [`GaError::NanFitness`] if any score is NaN
    pub fn new(population: Vec<Individual>, fitness: Vec<f64>, minimise: bool) -> Result<Self> {
        if population.is_empty() {
            return Err(GaError::EmptyPopulation);
        }
        check_dimensions(population.len(), &fitness)?;

        let expected = population[0].len();
        if expected == 0 {
            return Err(GaError::EmptyGenome);
        }
        if let Some((index, individual)) = population
            .iter()
            .enumerate()
            .find(|(_, individual)| individual.len() != expected)
        {
            return Err(GaError::GeneCountMismatch {
                index,
                expected,
                actual: individual.len(),
            });
        }

        let mut ledger = Self {
            population,
            fitness,
            minimise,
            best: 0,
        };
        ledger.find_most_fit();
        Ok(ledger)
    }

    /// Replace the whole fitness vector and recompute the best individual
    ///
    /// Either the new vector is applied completely or the ledger is left as it was.
    pub fn set_fitness(&mut self, fitness: Vec<f64>) -> Result<()> {
        check_dimensions(self.population.len(), &fitness)?;
        self.fitness = fitness;
        self.find_most_fit();
        Ok(())
    }

    /// Replace the fitness of a single individual
    ///
    /// Builds the full vector with only `index` changed and routes it through
    /// [`Ledger::set_fitness`], so the best-individual cache is rebuilt from scratch.
    pub fn update_fitness(&mut self, index: usize, value: f64) -> Result<()> {
        if index >= self.population.len() {
            return Err(GaError::IndexOutOfBounds {
                index,
                len: self.population.len(),
            });
        }
        let mut fitness = self.fitness.clone();
        fitness[index] = value;
        self.set_fitness(fitness)
    }

    /// Get the best individual and its fitness
    pub fn most_fit(&self) -> (&Individual, f64) {
        (&self.population[self.best], self.fitness[self.best])
    }

    /// Get the index of the best individual
    pub fn most_fit_index(&self) -> usize {
        self.best
    }

    /// Linear scan for the first index attaining the smallest adjusted fitness
    fn find_most_fit(&mut self) {
        let sign = self.sign();
        let mut best = 0;
        let mut best_adjusted = self.fitness[0] * sign;

        for (i, &value) in self.fitness.iter().enumerate().skip(1) {
            let adjusted = value * sign;
            if adjusted < best_adjusted {
                best = i;
                best_adjusted = adjusted;
            }
        }

        self.best = best;
    }

    /// Sign multiplier applied before comparing fitness values
    pub fn sign(&self) -> f64 {
        if self.minimise { 1.0 } else { -1.0 }
    }

    /// Direction-adjusted fitness of one individual (smaller is better)
    pub fn adjusted_fitness(&self, index: usize) -> f64 {
        self.fitness[index] * self.sign()
    }

    pub fn minimise(&self) -> bool {
        self.minimise
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Number of individuals (fixed at construction)
    pub fn len(&self) -> usize {
        self.population.len()
    }

    /// Always false; construction rejects empty populations
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Number of genes per individual
    pub fn gene_count(&self) -> usize {
        self.population[0].len()
    }

    pub(crate) fn population_mut(&mut self) -> &mut [Individual] {
        &mut self.population
    }

    /// Consume the ledger, returning population and fitness
    pub fn into_parts(self) -> (Vec<Individual>, Vec<f64>) {
        (self.population, self.fitness)
    }
}

fn check_dimensions(expected: usize, fitness: &[f64]) -> Result<()> {
    if fitness.len() != expected {
        return Err(GaError::DimensionMismatch {
            expected,
            actual: fitness.len(),
        });
    }
    if let Some(index) = fitness.iter().position(|f| f.is_nan()) {
        return Err(GaError::NanFitness { index });
    }
    Ok(())
}
