//! Best-station selection and batch evaluation.
//!
//! Each device is scored against every station independently, so a batch is
//! embarrassingly parallel. Output order always follows device input order.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Device, LinkStation};

/// Minimum batch size before `evaluate_with` considers going parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1024;

/// The evaluation result for one device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub device: Device,
    /// The winning station, or `None` if nothing is in reach.
    pub station: Option<LinkStation>,
    pub power: f64,
}

impl Coverage {
    pub fn is_covered(&self) -> bool {
        self.station.is_some()
    }
}

/// Evaluation tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOptions {
    /// Worker threads for large batches. 1 keeps evaluation on the caller's thread.
    pub threads: usize,
    /// Minimum device count before the parallel path is used.
    pub parallel_threshold: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Aggregate counts over a batch of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoverageSummary {
    pub devices: usize,
    pub covered: usize,
    pub uncovered: usize,
}

/// Finds the station delivering the most power to `device`.
///
/// Stations are scanned in order and only a strictly greater power replaces
/// the current best, so among equal maxima the first station wins. Returns
/// `(None, 0.0)` when no station delivers positive power, including when
/// `stations` is empty.
pub fn best_station<'a>(
    device: &Device,
    stations: &'a [LinkStation],
) -> (Option<&'a LinkStation>, f64) {
    let mut best: Option<&LinkStation> = None;
    let mut best_power = 0.0;

    for station in stations {
        let power = station.power(device);
        if power > best_power {
            best = Some(station);
            best_power = power;
        }
    }

    (best, best_power)
}

fn coverage_for(device: &Device, stations: &[LinkStation]) -> Coverage {
    let (station, power) = best_station(device, stations);
    Coverage {
        device: *device,
        station: station.copied(),
        power,
    }
}

/// Evaluates every device against every station on the current thread.
pub fn evaluate(stations: &[LinkStation], devices: &[Device]) -> Vec<Coverage> {
    devices.iter().map(|d| coverage_for(d, stations)).collect()
}

/// Parallel version of [`evaluate`]. Runs on the ambient rayon pool and
/// returns results in the same order.
pub fn evaluate_par(stations: &[LinkStation], devices: &[Device]) -> Vec<Coverage> {
    devices
        .par_iter()
        .map(|d| coverage_for(d, stations))
        .collect()
}

/// Evaluates a batch, going parallel only when configured for more than one
/// thread and the batch is at least `parallel_threshold` devices.
///
/// A parallel call sizes a fresh pool each time; use an [`Evaluator`] to
/// evaluate many batches with the same options.
pub fn evaluate_with(
    stations: &[LinkStation],
    devices: &[Device],
    options: &EvalOptions,
) -> Vec<Coverage> {
    if !goes_parallel(options, stations, devices) {
        return evaluate(stations, devices);
    }
    match build_pool(options.threads) {
        Some(pool) => pool.install(|| evaluate_par(stations, devices)),
        None => evaluate(stations, devices),
    }
}

/// Evaluates batches with one worker pool built up front.
pub struct Evaluator {
    options: EvalOptions,
    pool: Option<rayon::ThreadPool>,
}

impl Evaluator {
    /// Builds the worker pool when `options` asks for more than one thread.
    /// If the pool cannot be built every batch runs sequentially.
    pub fn new(options: EvalOptions) -> Self {
        let pool = if options.threads > 1 {
            build_pool(options.threads)
        } else {
            None
        };
        Evaluator { options, pool }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Same results as [`evaluate_with`], reusing this evaluator's pool.
    pub fn evaluate(&self, stations: &[LinkStation], devices: &[Device]) -> Vec<Coverage> {
        match &self.pool {
            Some(pool) if goes_parallel(&self.options, stations, devices) => {
                pool.install(|| evaluate_par(stations, devices))
            }
            _ => evaluate(stations, devices),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::new(EvalOptions::default())
    }
}

fn goes_parallel(options: &EvalOptions, stations: &[LinkStation], devices: &[Device]) -> bool {
    let parallel = options.threads > 1 && devices.len() >= options.parallel_threshold;
    debug!(
        stations = stations.len(),
        devices = devices.len(),
        parallel,
        "evaluating batch"
    );
    parallel
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!("failed to build rayon pool, evaluating sequentially: {}", e);
            None
        }
    }
}

/// Counts covered and uncovered devices.
pub fn summarize(results: &[Coverage]) -> CoverageSummary {
    let covered = results.iter().filter(|c| c.is_covered()).count();
    CoverageSummary {
        devices: results.len(),
        covered,
        uncovered: results.len() - covered,
    }
}
