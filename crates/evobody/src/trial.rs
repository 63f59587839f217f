//! Trial loop
//!
//! Seeds a population from a gene layout, scores it in parallel, then drives
//! the microbial engine one cycle at a time, re-scoring the single replaced
//! individual after every cycle and recording the champion of each
//! generation.

use anyhow::{Context, Result};
use evobody_ga::{GeneticAlgorithm, Individual, Ledger, Microbial, seeded_rng};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::TrialConfig;
use crate::layout::GeneLayout;
use crate::oracle::FitnessOracle;

/// Champion of one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// 0 is the initial, unevolved population
    pub generation: usize,
    pub best_fitness: f64,
    pub best_index: usize,
    pub best_genes: Individual,
}

impl GenerationSummary {
    fn of(generation: usize, ledger: &Ledger) -> Self {
        let best_index = ledger.most_fit_index();
        let (best_genes, best_fitness) = ledger.most_fit();
        Self {
            generation,
            best_fitness,
            best_index,
            best_genes: best_genes.clone(),
        }
    }
}

/// Everything a finished trial produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub title: String,
    pub oracle: String,
    pub seed: u64,
    pub minimise: bool,
    pub gene_names: Vec<String>,
    /// One entry per generation, starting at generation 0
    pub summaries: Vec<GenerationSummary>,
    pub population: Vec<Individual>,
    pub fitness: Vec<f64>,
}

impl TrialOutcome {
    /// Summary of the final generation
    pub fn champion(&self) -> Option<&GenerationSummary> {
        self.summaries.last()
    }
}

/// Score every individual in parallel
pub fn evaluate_population(oracle: &dyn FitnessOracle, population: &[Individual]) -> Vec<f64> {
    population
        .par_iter()
        .map(|genes| oracle.evaluate(genes))
        .collect()
}

/// Advance `ga` by one generation and re-score what it replaced
///
/// Returns the replaced indices.
pub fn advance<G>(ga: &mut G, oracle: &dyn FitnessOracle) -> Result<Vec<usize>>
where
    G: GeneticAlgorithm + ?Sized,
{
    let replaced: Vec<usize> = ga.cycle().replaced_indices().collect();
    for &index in &replaced {
        let value = oracle.evaluate(&ga.ledger().population()[index]);
        ga.update_fitness(index, value)
            .with_context(|| format!("{} scored individual {}", oracle.name(), index))?;
    }
    Ok(replaced)
}

/// One configured evolution run
pub struct Trial {
    config: TrialConfig,
    layout: GeneLayout,
    oracle: Box<dyn FitnessOracle>,
}

impl Trial {
    /// Build a trial using the oracle named in the configuration
    pub fn new(config: TrialConfig) -> Self {
        let oracle = config.oracle.kind.build();
        Self::with_oracle(config, oracle)
    }

    /// Build a trial around a custom oracle (e.g. a physics simulation)
    pub fn with_oracle(config: TrialConfig, oracle: Box<dyn FitnessOracle>) -> Self {
        let layout = config.gene_layout();
        Self {
            config,
            layout,
            oracle,
        }
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn layout(&self) -> &GeneLayout {
        &self.layout
    }

    /// Whether lower scores win in this trial
    pub fn minimise(&self) -> bool {
        self.config
            .oracle
            .minimise
            .unwrap_or_else(|| self.oracle.minimise())
    }

    /// Create a progress bar style
    fn progress_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░")
    }

    /// Run a single trial to completion under the configured title and seed
    pub fn run(&self) -> Result<TrialOutcome> {
        self.config.validate()?;
        let seed = self.config.trial.seed.unwrap_or_else(rand::random);
        self.run_seeded(&self.config.trial.title, seed)
    }

    /// Run `trial.trials` independent trials back to back
    ///
    /// Trial `k` (counting from 1) is titled `<title>_<k>` and seeded with
    /// `seed + k - 1`, so a whole batch replays from its base seed. A batch of
    /// one keeps the plain title.
    pub fn run_batch(&self) -> Result<Vec<TrialOutcome>> {
        self.config.validate()?;
        let settings = &self.config.trial;
        let base_seed = settings.seed.unwrap_or_else(rand::random);

        if settings.trials == 1 {
            return Ok(vec![self.run_seeded(&settings.title, base_seed)?]);
        }

        (0..settings.trials)
            .map(|k| -> Result<TrialOutcome> {
                let number = k + 1;
                log::info!("Starting trial {} of {}", number, settings.trials);
                let title = format!("{}_{}", settings.title, number);
                let outcome = self.run_seeded(&title, base_seed.wrapping_add(k as u64))?;
                log::info!("Finished trial {} of {}", number, settings.trials);
                Ok(outcome)
            })
            .collect()
    }

    fn run_seeded(&self, title: &str, seed: u64) -> Result<TrialOutcome> {
        let settings = &self.config.trial;
        let encoding = self.config.effective_encoding();
        let minimise = self.minimise();

        let pb = if settings.show_progress {
            let pb = ProgressBar::new(settings.generations as u64);
            pb.set_style(Self::progress_style());
            pb
        } else {
            ProgressBar::hidden()
        };

        log::info!(
            "Trial '{}': {} genes ({}), oracle {} ({}), seed {}",
            title,
            self.layout.len(),
            encoding,
            self.oracle.name(),
            if minimise { "minimise" } else { "maximise" },
            seed
        );
        log::info!("  {}: {}", self.oracle.name(), self.oracle.description());

        let mut rng = seeded_rng(seed);
        let population =
            self.layout
                .random_population(encoding, settings.population_size, &mut rng);
        let fitness = evaluate_population(self.oracle.as_ref(), &population);

        let ledger = Ledger::new(population, fitness, minimise)
            .context("Initial population could not be scored")?;
        let algorithm = evobody_ga::MicrobialConfig {
            encoding,
            ..self.config.algorithm.clone()
        };
        let mut ga = Microbial::new(ledger, algorithm, rng)?;
        log::info!("{}", ga);

        let mut summaries = Vec::with_capacity(settings.generations + 1);
        summaries.push(GenerationSummary::of(0, ga.ledger()));

        for generation in 1..=settings.generations {
            advance(&mut ga, self.oracle.as_ref())
                .with_context(|| format!("Generation {} failed", generation))?;

            let summary = GenerationSummary::of(generation, ga.ledger());
            if settings.log_interval > 0 && generation % settings.log_interval == 0 {
                pb.println(format!(
                    "Gen {:>5}: best fitness {:.4} (index {})",
                    generation, summary.best_fitness, summary.best_index
                ));
            }
            pb.set_message(format!("best {:.4}", summary.best_fitness));
            summaries.push(summary);
            pb.inc(1);
        }

        pb.finish_with_message("Trial complete!");

        let (population, fitness) = ga.into_ledger().into_parts();
        Ok(TrialOutcome {
            title: title.to_string(),
            oracle: self.oracle.name().to_string(),
            seed,
            minimise,
            gene_names: self.layout.names(),
            summaries,
            population,
            fitness,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutKind;
    use crate::oracle::{FnOracle, OneMax, OracleKind, Sphere};
    use evobody_ga::{Encoding, MicrobialConfig};

    fn quiet_config() -> TrialConfig {
        let mut config = TrialConfig::default();
        config.trial.show_progress = false;
        config.trial.seed = Some(1234);
        config.trial.generations = 200;
        config.trial.population_size = 10;
        config
    }

    #[test]
    fn test_evaluate_population() {
        let population = vec![vec![1.0, 2.0], vec![0.0, 0.0], vec![3.0, 4.0]];
        assert_eq!(evaluate_population(&Sphere, &population), vec![5.0, 0.0, 25.0]);
    }

    #[test]
    fn test_advance_rescores_replaced() {
        let population = vec![vec![1.0, 1.0], vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let fitness = evaluate_population(&OneMax, &population);
        let ledger = Ledger::new(population, fitness, false).unwrap();
        let mut ga = Microbial::with_seed(ledger, MicrobialConfig::default(), 5).unwrap();

        for _ in 0..50 {
            let replaced = advance(&mut ga, &OneMax).unwrap();
            assert_eq!(replaced.len(), 1);
        }
        let ledger = ga.ledger();
        for (genes, &score) in ledger.population().iter().zip(ledger.fitness()) {
            assert_eq!(OneMax.evaluate(genes), score);
        }
    }

    #[test]
    fn test_advance_surfaces_nan_from_oracle() {
        let population = vec![vec![1.0], vec![0.0], vec![1.0]];
        let ledger = Ledger::new(population, vec![1.0, 2.0, 3.0], false).unwrap();
        let mut ga = Microbial::with_seed(ledger, MicrobialConfig::default(), 5).unwrap();
        let broken = FnOracle::new("broken", false, |_: &[f64]| f64::NAN);

        let err = advance(&mut ga, &broken).unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_run_records_every_generation() {
        let trial = Trial::new(quiet_config());
        let outcome = trial.run().unwrap();

        assert_eq!(outcome.summaries.len(), 201);
        assert_eq!(outcome.summaries[0].generation, 0);
        assert_eq!(outcome.champion().unwrap().generation, 200);
        assert_eq!(outcome.gene_names.len(), 15);
        assert_eq!(outcome.population.len(), 10);
        assert_eq!(outcome.seed, 1234);
        assert!(outcome.minimise);
    }

    #[test]
    fn test_run_best_never_worsens() {
        let trial = Trial::new(quiet_config());
        let outcome = trial.run().unwrap();

        for window in outcome.summaries.windows(2) {
            assert!(window[1].best_fitness <= window[0].best_fitness);
        }
        let champion = outcome.champion().unwrap();
        assert_eq!(Sphere.evaluate(&champion.best_genes), champion.best_fitness);
    }

    #[test]
    fn test_run_is_reproducible_with_seed() {
        let first = Trial::new(quiet_config()).run().unwrap();
        let second = Trial::new(quiet_config()).run().unwrap();
        assert_eq!(first.summaries, second.summaries);
        assert_eq!(first.population, second.population);
    }

    #[test]
    fn test_binary_layout_one_max() {
        let mut config = quiet_config();
        config.trial.layout = LayoutKind::Binary;
        config.trial.genome_length = 12;
        config.trial.generations = 1500;
        config.oracle.kind = OracleKind::OneMax;
        config.algorithm.prob_mutation = 0.9;

        let outcome = Trial::new(config).run().unwrap();
        assert!(!outcome.minimise);
        for individual in &outcome.population {
            assert!(individual.iter().all(|&g| g == 0.0 || g == 1.0));
        }
        let first = outcome.summaries[0].best_fitness;
        let last = outcome.champion().unwrap().best_fitness;
        assert!(last >= first);
    }

    #[test]
    fn test_batch_titles_and_seeds() {
        let mut config = quiet_config();
        config.trial.generations = 20;
        config.trial.trials = 3;
        config.trial.title = "legs".to_string();

        let outcomes = Trial::new(config.clone()).run_batch().unwrap();
        let titles: Vec<&str> = outcomes.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["legs_1", "legs_2", "legs_3"]);
        let seeds: Vec<u64> = outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, vec![1234, 1235, 1236]);

        // Replaying the batch from the same base seed reproduces every trial
        let replay = Trial::new(config).run_batch().unwrap();
        for (a, b) in outcomes.iter().zip(&replay) {
            assert_eq!(a.summaries, b.summaries);
        }
        assert_ne!(outcomes[0].population, outcomes[1].population);
    }

    #[test]
    fn test_batch_of_one_keeps_title() {
        let mut config = quiet_config();
        config.trial.generations = 5;
        let outcomes = Trial::new(config).run_batch().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].title, "trial");
        assert_eq!(outcomes[0].seed, 1234);
    }

    #[test]
    fn test_minimise_override() {
        let mut config = quiet_config();
        config.oracle.minimise = Some(false);
        let trial = Trial::new(config);
        assert!(!trial.minimise());
    }

    #[test]
    fn test_custom_oracle() {
        let mut config = quiet_config();
        config.trial.layout = LayoutKind::Driver;
        config.algorithm.encoding = Encoding::Real;
        // Prefer large first amplitude
        let oracle = FnOracle::new("amp", false, |genes: &[f64]| genes[0]);
        let outcome = Trial::with_oracle(config, Box::new(oracle)).run().unwrap();

        assert_eq!(outcome.oracle, "amp");
        assert_eq!(outcome.gene_names[0], "amp_1");
        let first = outcome.summaries[0].best_fitness;
        assert!(outcome.champion().unwrap().best_fitness >= first);
    }

    #[test]
    fn test_run_rejects_tiny_population() {
        let mut config = quiet_config();
        config.trial.population_size = 1;
        assert!(Trial::new(config).run().is_err());
    }
}
