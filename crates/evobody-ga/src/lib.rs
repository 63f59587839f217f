//! Evolutionary core for evobody
//!
//! This crate implements:
//! - A population/fitness ledger that keeps scores in lockstep with individuals
//!   and caches the best individual
//! - A microbial genetic algorithm (localized tournament, gene infection,
//!   bit-flip or proportional mutation)
//! - An injectable, seedable RNG abstraction
//!
//! Fitness evaluation is left to the caller. Each cycle changes exactly one
//! individual; score it and write the result back before cycling again:
//!
//! ```rust
//! use evobody_ga::{GeneticAlgorithm, Ledger, Microbial, MicrobialConfig};
//!
//! let population = vec![vec![0.0, 1.0, 1.0], vec![1.0, 1.0, 1.0], vec![0.0, 0.0, 1.0]];
//! let score = |genes: &[f64]| genes.iter().sum::<f64>();
//! let fitness = population.iter().map(|g| score(g)).collect();
//!
//! let ledger = Ledger::new(population, fitness, false)?;
//! let mut ga = Microbial::with_seed(ledger, MicrobialConfig::default(), 7)?;
//!
//! for _ in 0..10 {
//!     let replaced: Vec<usize> = ga.cycle().replaced_indices().collect();
//!     for index in replaced {
//!         let value = score(&ga.ledger().population()[index]);
//!         ga.update_fitness(index, value)?;
//!     }
//! }
//!
//! let (_best, best_fitness) = ga.most_fit();
//! assert!(best_fitness >= 3.0);
//! # Ok::<(), evobody_ga::GaError>(())
//! ```

pub mod encoding;
pub mod error;
pub mod ledger;
pub mod microbial;
pub mod rng;
pub mod strategy;

// Re-export main types for convenience
pub use encoding::{Encoding, Gene, Individual};
pub use error::{GaError, Result};
pub use ledger::Ledger;
pub use microbial::{Microbial, MicrobialConfig};
pub use rng::{DefaultRng, GaRng, seeded_rng};
pub use strategy::{CycleReport, GeneticAlgorithm, Mutation};
