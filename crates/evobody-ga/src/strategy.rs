//! Strategy-agnostic interface for steady-state genetic algorithms
//!
//! A strategy owns a [`Ledger`] and advances it one generation at a time.
//! It never evaluates fitness: after each [`GeneticAlgorithm::cycle`] the
//! caller re-evaluates every replaced individual and writes the scores back
//! before the next cycle.

use crate::encoding::Individual;
use crate::error::Result;
use crate::ledger::Ledger;

/// A single gene change applied during mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mutation {
    /// Population index of the mutated individual
    pub individual: usize,
    /// Gene position inside the individual
    pub gene: usize,
    pub before: f64,
    pub after: f64,
}

impl Mutation {
    /// Absolute change of the gene value
    pub fn delta(&self) -> f64 {
        (self.after - self.before).abs()
    }
}

/// Outcome of one generational cycle
#[derive(Debug)]
pub struct CycleReport<'a> {
    /// The whole population after the cycle
    pub population: &'a [Individual],
    /// One flag per index, true where the individual was replaced this cycle
    pub replaced: &'a [bool],
    /// Index of the tournament loser, the one individual that changed
    pub loser: usize,
    /// Mutation applied to the loser, if the mutation draw succeeded
    pub mutation: Option<Mutation>,
}

impl CycleReport<'_> {
    /// Indices flagged as replaced
    pub fn replaced_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.replaced
            .iter()
            .enumerate()
            .filter_map(|(i, &flag)| flag.then_some(i))
    }
}

/// Common framework shared by all genetic algorithm strategies
pub trait GeneticAlgorithm {
    /// Name of this instance (used to tell several runs apart in logs)
    fn name(&self) -> &str;

    fn ledger(&self) -> &Ledger;

    fn ledger_mut(&mut self) -> &mut Ledger;

    /// Run selection, reproduction and mutation once
    fn cycle(&mut self) -> CycleReport<'_>;

    /// Replace the whole fitness vector
    fn set_fitness(&mut self, fitness: Vec<f64>) -> Result<()> {
        self.ledger_mut().set_fitness(fitness)
    }

    /// Replace the fitness of one individual
    fn update_fitness(&mut self, index: usize, value: f64) -> Result<()> {
        self.ledger_mut().update_fitness(index, value)
    }

    /// Best individual and its fitness
    fn most_fit(&self) -> (&Individual, f64) {
        self.ledger().most_fit()
    }
}
