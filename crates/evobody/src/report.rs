//! Trial reports
//!
//! Two files per trial in the output directory:
//! - `trial_<title>.csv`: one row per generation (Generation, Fitness, then
//!   the champion's genes under their layout names)
//! - `trial_<title>.ron`: the full [`TrialOutcome`], reloadable with serde

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::trial::TrialOutcome;

/// Where a report was written
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub csv: PathBuf,
    pub ron: PathBuf,
}

/// Per-generation champion table
pub fn render_csv(outcome: &TrialOutcome) -> String {
    let mut csv = String::from("Generation,Fitness");
    for name in &outcome.gene_names {
        csv.push(',');
        csv.push_str(name);
    }
    csv.push('\n');

    for summary in &outcome.summaries {
        csv.push_str(&format!("{},{}", summary.generation, summary.best_fitness));
        for gene in &summary.best_genes {
            csv.push_str(&format!(",{}", gene));
        }
        csv.push('\n');
    }
    csv
}

/// Write the CSV and RON reports, creating `output_dir` if needed
pub fn write_report(outcome: &TrialOutcome, output_dir: &Path) -> Result<ReportPaths> {
    fs::create_dir_all(output_dir).context("Failed to create output directory")?;

    let csv = output_dir.join(format!("trial_{}.csv", outcome.title));
    fs::write(&csv, render_csv(outcome)).context("Failed to write trial CSV")?;

    let ron = output_dir.join(format!("trial_{}.ron", outcome.title));
    let serialized = ron::ser::to_string_pretty(outcome, ron::ser::PrettyConfig::default())
        .context("Failed to serialize trial outcome")?;
    fs::write(&ron, serialized).context("Failed to write trial RON")?;

    log::info!("Report written: {}", csv.display());
    Ok(ReportPaths { csv, ron })
}

/// Load an outcome previously written by [`write_report`]
pub fn load_outcome(path: &Path) -> Result<TrialOutcome> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::GenerationSummary;

    fn sample_outcome() -> TrialOutcome {
        TrialOutcome {
            title: "sample".to_string(),
            oracle: "Sphere".to_string(),
            seed: 9,
            minimise: true,
            gene_names: vec!["a".to_string(), "b".to_string()],
            summaries: vec![
                GenerationSummary {
                    generation: 0,
                    best_fitness: 2.5,
                    best_index: 1,
                    best_genes: vec![1.5, 0.5],
                },
                GenerationSummary {
                    generation: 1,
                    best_fitness: 1.25,
                    best_index: 0,
                    best_genes: vec![1.0, 0.5],
                },
            ],
            population: vec![vec![1.0, 0.5], vec![1.5, 0.5]],
            fitness: vec![1.25, 2.5],
        }
    }

    #[test]
    fn test_render_csv() {
        let csv = render_csv(&sample_outcome());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["Generation,Fitness,a,b", "0,2.5,1.5,0.5", "1,1.25,1,0.5"]);
    }

    #[test]
    fn test_write_report_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("out");
        let paths = write_report(&sample_outcome(), &output).unwrap();

        assert_eq!(paths.csv, output.join("trial_sample.csv"));
        assert!(paths.csv.exists());
        assert!(paths.ron.exists());

        let loaded = load_outcome(&paths.ron).unwrap();
        assert_eq!(loaded.title, "sample");
        assert_eq!(loaded.summaries, sample_outcome().summaries);
        assert_eq!(loaded.fitness, vec![1.25, 2.5]);
    }

    #[test]
    fn test_load_outcome_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_outcome(&dir.path().join("missing.ron")).unwrap_err();
        assert!(err.to_string().contains("missing.ron"));
    }
}
