use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use evobody::{LayoutKind, OracleKind, Trial, TrialConfig, load_outcome, write_report};
use evobody_ga::Encoding;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON configuration file (default: ./evobody.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of independent trials to run
    #[arg(long)]
    trials: Option<usize>,

    /// Number of generations to evolve
    #[arg(long)]
    generations: Option<usize>,

    /// Population size
    #[arg(long)]
    population: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Gene layout: body, driver, uniform, binary
    #[arg(long)]
    layout: Option<LayoutKind>,

    /// Fitness oracle: one_max, sphere, rastrigin
    #[arg(long)]
    oracle: Option<OracleKind>,

    /// Gene encoding: binary, real
    #[arg(long)]
    encoding: Option<Encoding>,

    /// Deme radius around the first parent (omit for whole population)
    #[arg(long)]
    deme: Option<usize>,

    /// Output directory for reports
    #[arg(long)]
    output: Option<String>,

    /// Trial title, used in report file names
    #[arg(long)]
    title: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,

    /// Print the resolved configuration and exit
    #[arg(long)]
    dry_run: bool,

    /// Print the champion of a saved `.ron` report and exit
    #[arg(long)]
    summarize: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(path) = &args.summarize {
        return summarize(path);
    }

    let mut config = TrialConfig::load(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    if args.dry_run {
        let ron = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default())
            .context("Failed to serialize configuration")?;
        println!("{}", ron);
        return Ok(());
    }

    log::info!("Starting evolution trial");
    log::info!("  Title: {}", config.trial.title);
    log::info!("  Layout: {}", config.trial.layout.name());
    log::info!("  Oracle: {:?}", config.oracle.kind);
    log::info!("  Trials: {}", config.trial.trials);
    log::info!("  Generations: {}", config.trial.generations);
    log::info!("  Population: {}", config.trial.population_size);
    log::info!("  Output: {}", config.trial.output_dir);

    let output_dir = PathBuf::from(&config.trial.output_dir);
    let trial = Trial::new(config);
    for outcome in trial.run_batch()? {
        if let Some(champion) = outcome.champion() {
            log::info!(
                "{}: champion after {} generations: fitness {:.4}, genes {:?}",
                outcome.title,
                champion.generation,
                champion.best_fitness,
                champion.best_genes
            );
        }
        write_report(&outcome, &output_dir)?;
    }

    log::info!("Evolution trials complete");
    Ok(())
}

fn apply_overrides(config: &mut TrialConfig, args: &Args) {
    let trial = &mut config.trial;
    if let Some(trials) = args.trials {
        trial.trials = trials;
    }
    if let Some(generations) = args.generations {
        trial.generations = generations;
    }
    if let Some(population) = args.population {
        trial.population_size = population;
    }
    if args.seed.is_some() {
        trial.seed = args.seed;
    }
    if let Some(layout) = args.layout {
        trial.layout = layout;
    }
    if let Some(output) = &args.output {
        trial.output_dir = output.clone();
    }
    if let Some(title) = &args.title {
        trial.title = title.clone();
    }
    if args.quiet {
        trial.show_progress = false;
    }
    if let Some(oracle) = args.oracle {
        config.oracle.kind = oracle;
    }
    if let Some(encoding) = args.encoding {
        config.algorithm.encoding = encoding;
    }
    if args.deme.is_some() {
        config.algorithm.deme_size = args.deme;
    }
}

fn summarize(path: &Path) -> Result<()> {
    let outcome = load_outcome(path)?;
    log::info!(
        "Trial '{}' ({} oracle, seed {}, {})",
        outcome.title,
        outcome.oracle,
        outcome.seed,
        if outcome.minimise { "minimise" } else { "maximise" }
    );
    match outcome.champion() {
        Some(champion) => {
            println!("generation,{}", champion.generation);
            println!("fitness,{}", champion.best_fitness);
            for (name, gene) in outcome.gene_names.iter().zip(&champion.best_genes) {
                println!("{},{}", name, gene);
            }
        }
        None => log::warn!("{} holds no generations", path.display()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_priority() {
        let args = Args::parse_from([
            "evobody",
            "--trials",
            "4",
            "--generations",
            "5",
            "--layout",
            "driver",
            "--oracle",
            "one_max",
            "--encoding",
            "binary",
            "--deme",
            "2",
            "--seed",
            "11",
            "--quiet",
        ]);
        let mut config = TrialConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.trial.trials, 4);
        assert_eq!(config.trial.generations, 5);
        assert_eq!(config.trial.layout, LayoutKind::Driver);
        assert_eq!(config.oracle.kind, OracleKind::OneMax);
        assert_eq!(config.algorithm.encoding, Encoding::Binary);
        assert_eq!(config.algorithm.deme_size, Some(2));
        assert_eq!(config.trial.seed, Some(11));
        assert!(!config.trial.show_progress);
        // Untouched fields keep their loaded values
        assert_eq!(config.trial.population_size, 20);
    }

    #[test]
    fn test_invalid_layout_flag_rejected() {
        assert!(Args::try_parse_from(["evobody", "--layout", "wheels"]).is_err());
    }
}
