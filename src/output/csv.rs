//! CSV metric table writer.
//!
//! One table per metric: columns are the steps in first-seen order, rows are
//! the modules in execution order. Works on any `AggregateView`, so the same
//! code exports a full model and a per-type rollup.

use crate::aggregator::{AggregateView, ModuleRecord, RunModel};
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The exportable metrics
///
/// **Public** - one CSV table is written per metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    PeakMemory,
    HeldMemory,
    RealTime,
    UserTime,
    SysTime,
}

impl MetricKind {
    /// Every metric, memory first
    pub const ALL: [MetricKind; 5] = [
        MetricKind::PeakMemory,
        MetricKind::HeldMemory,
        MetricKind::RealTime,
        MetricKind::UserTime,
        MetricKind::SysTime,
    ];

    /// Short label used in output file names
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::PeakMemory => "peak_memory",
            MetricKind::HeldMemory => "held_memory",
            MetricKind::RealTime => "real_time",
            MetricKind::UserTime => "user_time",
            MetricKind::SysTime => "sys_time",
        }
    }

    /// Human-readable name for summaries and logs
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::PeakMemory => "Peak memory",
            MetricKind::HeldMemory => "Retained memory",
            MetricKind::RealTime => "Real time",
            MetricKind::UserTime => "User time",
            MetricKind::SysTime => "Sys time",
        }
    }

    /// Whether the metric reads memory samples (as opposed to timing)
    pub fn is_memory(&self) -> bool {
        matches!(self, MetricKind::PeakMemory | MetricKind::HeldMemory)
    }
}

/// The metrics a model actually has data for
///
/// **Public** - used by the report command to decide which tables to write
pub fn metrics_for(model: &RunModel) -> Vec<MetricKind> {
    MetricKind::ALL
        .into_iter()
        .filter(|metric| {
            if metric.is_memory() {
                model.contains_memory()
            } else {
                model.contains_timing()
            }
        })
        .collect()
}

/// Write one metric table to a writer
///
/// **Public** - main entry point for CSV output
///
/// # Arguments
/// * `writer` - Destination for the CSV text
/// * `view` - The aggregate to export
/// * `metric` - Which metric to tabulate
///
/// # Format
/// Header row `Type,Name,<steps...>`, then one row per module in execution
/// order. A module with no sample for a step gets an empty cell. The
/// synthetic whole-event total is skipped in memory tables (it carries no
/// counter data of its own) and rendered as `Event,Total` in timing tables.
pub fn write_metric_table<W: Write>(
    writer: &mut W,
    view: &impl AggregateView,
    metric: MetricKind,
) -> Result<(), OutputError> {
    let steps = view.step_order();

    let mut header: Vec<String> = vec!["Type".to_string(), "Name".to_string()];
    header.extend(steps.iter().cloned());
    writeln!(writer, "{}", header.join(","))?;

    for name in view.module_order() {
        let Some(record) = view.module(name) else {
            continue;
        };

        let mut row: Vec<String> = if record.is_event_total() {
            if metric.is_memory() {
                continue;
            }
            vec!["Event".to_string(), "Total".to_string()]
        } else {
            vec![
                record.module_type().to_string(),
                record.name().to_string(),
            ]
        };

        for step in steps {
            row.push(
                metric_value(record, step, metric)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            );
        }

        writeln!(writer, "{}", row.join(","))?;
    }

    Ok(())
}

/// Write one metric table to a file, creating parent directories if needed
///
/// **Public** - file-based wrapper around write_metric_table
pub fn write_metric_file(
    output_path: impl AsRef<Path>,
    view: &impl AggregateView,
    metric: MetricKind,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!(
        "Writing {} table to: {}",
        metric.title(),
        output_path.display()
    );

    if output_path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    write_metric_table(&mut writer, view, metric)?;
    writer.flush()?;

    Ok(())
}

/// Extract one cell value
///
/// **Private** - internal helper for write_metric_table
fn metric_value(record: &ModuleRecord, step: &str, metric: MetricKind) -> Option<f64> {
    match metric {
        MetricKind::PeakMemory => record.memory_for_step(step).map(|s| s.peak_mib),
        MetricKind::HeldMemory => record.memory_for_step(step).map(|s| s.held_mib),
        MetricKind::RealTime => record.timing_for_step(step).map(|s| s.real_seconds),
        MetricKind::UserTime => record.timing_for_step(step).map(|s| s.user_seconds),
        MetricKind::SysTime => record.timing_for_step(step).map(|s| s.sys_seconds),
    }
}
