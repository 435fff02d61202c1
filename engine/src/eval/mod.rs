//! Coverage evaluation.
//!
//! Selects the best link station for each device and evaluates whole batches
//! of devices, sequentially or across a rayon pool.

pub(crate) mod coverage;

pub use coverage::{
    best_station, evaluate, evaluate_par, evaluate_with, summarize, Coverage, CoverageSummary,
    EvalOptions, Evaluator, DEFAULT_PARALLEL_THRESHOLD,
};
