//! Trial driver for evobody
//!
//! Wires the microbial engine from `evobody_ga` to gene layouts, fitness
//! oracles, layered configuration and report files.

pub mod config;
pub mod layout;
pub mod oracle;
pub mod report;
pub mod trial;

pub use config::{OracleSettings, TrialConfig, TrialSettings};
pub use layout::{GeneLayout, GeneSpec, LayoutKind};
pub use oracle::{FitnessOracle, FnOracle, OneMax, OracleKind, Rastrigin, Sphere};
pub use report::{ReportPaths, load_outcome, write_report};
pub use trial::{GenerationSummary, Trial, TrialOutcome, advance, evaluate_population};
