//! Parallel per-city fan-out for the batch job.

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::analyzer::{CityAnalysis, CityAnalyzer};
use crate::config::Config;
use crate::dataset::{Dataset, Partition};
use crate::types::AnnotatedRecord;

/// Run `task` over every partition on a pool of `workers` threads
/// (`None` = one per CPU).
///
/// Tasks share no mutable state. The first failing task aborts the batch and
/// its error is returned; no partial results are kept. Output follows the
/// order of `partitions`.
pub fn run_batch<F>(partitions: Vec<Partition>, workers: Option<usize>, task: F) -> Result<Vec<CityAnalysis>>
where
    F: Fn(Partition) -> Result<CityAnalysis> + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.unwrap_or(0))
        .thread_name(|i| format!("tempwatch-worker-{}", i))
        .build()
        .context("Failed to build worker pool")?;

    tracing::info!(
        tasks = partitions.len(),
        workers = pool.current_num_threads(),
        "Starting batch"
    );

    pool.install(|| {
        partitions
            .into_par_iter()
            .map(|partition| {
                let city = partition.city.clone();
                task(partition).with_context(|| format!("Processing city '{}' failed", city))
            })
            .collect::<Result<Vec<_>>>()
    })
}

/// Analyze every city of `dataset` in parallel and concatenate the rows.
pub fn analyze_dataset(dataset: &Dataset, config: &Config) -> Result<Vec<AnnotatedRecord>> {
    let analyzer = CityAnalyzer::new(&config.analysis);
    let analyses = run_batch(dataset.partitions(), config.batch.workers, |partition| {
        Ok(analyzer.analyze_partition(partition))
    })?;

    let rows: Vec<AnnotatedRecord> = analyses.into_iter().flat_map(|a| a.records).collect();
    tracing::info!(
        rows = rows.len(),
        anomalies = rows.iter().filter(|r| r.anomaly).count(),
        "Batch complete"
    );
    Ok(rows)
}
