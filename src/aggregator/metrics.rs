//! Rank modules by a caller-chosen sample metric.
//!
//! Downstream reporting wants "the N modules that matter most" rather than
//! every module in execution order. The caller picks the metric by passing
//! an accessor over memory samples, e.g. `|sample| sample.peak_mib`.

use std::cmp::Ordering;

use super::model::MemorySample;
use super::AggregateView;

/// Order module names by the highest value the accessor yields for any step
///
/// **Public** - main entry point for ranking
///
/// # Arguments
/// * `view` - The aggregate to rank (a model or a rollup)
/// * `accessor` - Extracts the metric from a memory sample
///
/// # Returns
/// All module names from `modules`, highest maximum first. Modules without
/// any memory sample rank as zero.
pub fn rank_modules_by<V, F>(view: &V, accessor: F) -> Vec<String>
where
    V: AggregateView,
    F: Fn(&MemorySample) -> f64,
{
    let mut maxima: Vec<(String, f64)> = view
        .modules()
        .iter()
        .map(|(name, record)| {
            let maximum = record
                .memory_by_step()
                .values()
                .map(&accessor)
                .fold(0.0_f64, f64::max);
            (name.clone(), maximum)
        })
        .collect();

    maxima.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    maxima.into_iter().map(|(name, _)| name).collect()
}

/// The same ranking, truncated to the top `count` names
///
/// **Public** - convenience for summary output
pub fn top_modules_by<V, F>(view: &V, accessor: F, count: usize) -> Vec<String>
where
    V: AggregateView,
    F: Fn(&MemorySample) -> f64,
{
    let mut ranked = rank_modules_by(view, accessor);
    ranked.truncate(count);
    ranked
}
