//! The run model: accumulated per-module memory and timing history.
//!
//! One `RunModel` is populated from one job log, line by line, in file
//! order. It records which pipeline steps were seen, which modules ran (in
//! execution order), and one memory/timing sample per module per step.
//! Once parsing finishes the model is never mutated again and can be handed
//! to any number of downstream readers.

use crate::parser::{classify_line, Classified};
use crate::utils::config::{
    BYTES_PER_MIB, EVENT_STEP_PREFIX, EVENT_TOTAL_MODULE, KB_PER_MB, MIN_MEMORY_COLUMNS,
    MIN_TIMING_COLUMNS, PRODUCT_COLUMNS, RSS_VALUE_INDEX, TICKS_PER_SECOND,
};
use crate::utils::error::ParseError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::BufRead;

use super::AggregateView;

/// Memory counters for one module during one pipeline step
///
/// Byte counts are normalized to MiB; allocation counts are kept raw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySample {
    /// Memory still held when the step completed (MiB)
    pub held_mib: f64,

    /// Transient maximum observed during the step (MiB)
    pub peak_mib: f64,

    /// Number of allocations still live when the step completed
    pub held_allocations: u64,

    /// Maximum number of live allocations during the step
    pub peak_allocations: u64,

    /// Size of the data products created during the step (MiB). Only known
    /// once the step has completed, so this arrives as a deferred attachment
    /// on a later record and defaults to zero until then.
    #[serde(default)]
    pub produced_mib: f64,
}

/// Timing counters for one module during one pipeline step, in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingSample {
    pub real_seconds: f64,
    pub user_seconds: f64,
    pub sys_seconds: f64,
}

/// Accumulated history for one named processing unit
///
/// **Public** - exposed read-only through `AggregateView`
///
/// `name` and `module_type` are fixed at creation; every later record for
/// the same name must carry the identical identity or ingestion fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRecord {
    name: String,
    module_type: String,
    memory_by_step: HashMap<String, MemorySample>,
    timing_by_step: HashMap<String, TimingSample>,
}

impl ModuleRecord {
    /// Create an empty record for a module identity
    pub(crate) fn new(name: String, module_type: String) -> Self {
        Self {
            name,
            module_type,
            memory_by_step: HashMap::new(),
            timing_by_step: HashMap::new(),
        }
    }

    /// Stable module name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class/category of the module (many modules may share a type)
    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    /// All memory samples, keyed by step identifier
    pub fn memory_by_step(&self) -> &HashMap<String, MemorySample> {
        &self.memory_by_step
    }

    /// All timing samples, keyed by step identifier
    pub fn timing_by_step(&self) -> &HashMap<String, TimingSample> {
        &self.timing_by_step
    }

    /// Memory sample for one step, if the module was measured there
    pub fn memory_for_step(&self, step: &str) -> Option<&MemorySample> {
        self.memory_by_step.get(step)
    }

    /// Timing sample for one step, if the module was measured there
    pub fn timing_for_step(&self, step: &str) -> Option<&TimingSample> {
        self.timing_by_step.get(step)
    }

    /// Whether this is the synthetic whole-event total the job emits
    /// alongside the real modules
    pub fn is_event_total(&self) -> bool {
        self.name == EVENT_TOTAL_MODULE && self.module_type == EVENT_TOTAL_MODULE
    }

    /// Guard against a corrupted stream assigning a second identity to an
    /// existing module
    ///
    /// **Private** - internal invariant check
    fn check_identity(&self, name: &str, module_type: &str) -> Result<(), ParseError> {
        if self.name != name || self.module_type != module_type {
            return Err(ParseError::ModuleIdentityMismatch {
                name: name.to_string(),
                module_type: module_type.to_string(),
                existing_name: self.name.clone(),
                existing_type: self.module_type.clone(),
            });
        }
        Ok(())
    }

    fn insert_memory(&mut self, step: &str, sample: MemorySample) {
        self.memory_by_step.insert(step.to_string(), sample);
    }

    fn insert_timing(&mut self, step: &str, sample: TimingSample) {
        self.timing_by_step.insert(step.to_string(), sample);
    }

    /// Set the produced-data size on the sample already stored for `step`
    ///
    /// Returns false when no sample exists under that step, in which case
    /// the attachment is dropped.
    fn attach_product_size(&mut self, step: &str, produced_mib: f64) -> bool {
        match self.memory_by_step.get_mut(step) {
            Some(sample) => {
                sample.produced_mib = produced_mib;
                true
            }
            None => false,
        }
    }

    /// Fold another module's memory sample for `step` into this record.
    /// Held memory, product sizes and live allocations add up; peaks never
    /// happen together, so only the maximum is kept.
    ///
    /// **Crate** - used by the per-type rollup
    pub(crate) fn accumulate_memory(&mut self, step: &str, sample: &MemorySample) {
        let entry = self.memory_by_step.entry(step.to_string()).or_default();
        entry.held_mib += sample.held_mib;
        entry.produced_mib += sample.produced_mib;
        entry.held_allocations += sample.held_allocations;
        entry.peak_mib = entry.peak_mib.max(sample.peak_mib);
        entry.peak_allocations = entry.peak_allocations.max(sample.peak_allocations);
    }

    /// Fold another module's timing sample for `step` into this record
    ///
    /// **Crate** - used by the per-type rollup
    pub(crate) fn accumulate_timing(&mut self, step: &str, sample: &TimingSample) {
        let entry = self.timing_by_step.entry(step.to_string()).or_default();
        entry.real_seconds += sample.real_seconds;
        entry.user_seconds += sample.user_seconds;
        entry.sys_seconds += sample.sys_seconds;
    }
}

/// The aggregate model for one parsed job log
///
/// **Public** - main data structure of the crate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunModel {
    /// Every step identifier ever seen, first-seen order, no duplicates
    step_order: Vec<String>,

    /// Module names in the order they first ran during a per-event step.
    /// Modules only seen in setup steps never appear here.
    module_order: Vec<String>,

    /// Module name -> accumulated history
    modules: HashMap<String, ModuleRecord>,

    /// Out-of-band resident set size samples (MB), in file order
    rss_samples: Vec<f64>,

    contains_memory: bool,
    contains_timing: bool,
}

impl RunModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an entire log source into this model
    ///
    /// **Public** - main entry point for populating a model
    ///
    /// Lines are classified and ingested strictly in file order. Reading
    /// stops at the end-of-data sentinel the job writes when it has nothing
    /// more to report.
    ///
    /// # Errors
    /// The first `ParseError` aborts the pass; callers processing several
    /// independent sources should discard this model and move on to the next
    /// source.
    pub fn parse_reader<R: BufRead>(&mut self, reader: R) -> Result<(), ParseError> {
        for line in reader.lines() {
            let line = line?;
            match classify_line(&line) {
                Classified::EndOfData => {
                    debug!("end-of-data sentinel reached, stopping read");
                    break;
                }
                classified => self.ingest(classified)?,
            }
        }
        Ok(())
    }

    /// Ingest one classified line, mutating the model in place
    ///
    /// **Public** - per-line entry point
    ///
    /// `Ignore` is a no-op by definition; `EndOfData` is also accepted as a
    /// no-op so that feeding lines past the sentinel cannot crash.
    pub fn ingest(&mut self, classified: Classified) -> Result<(), ParseError> {
        match classified {
            Classified::Memory(fields) => self.ingest_memory(&fields),
            Classified::Timing(fields) => self.ingest_timing(&fields),
            Classified::Rss(tokens) => self.ingest_rss(&tokens),
            Classified::EndOfData | Classified::Ignore => Ok(()),
        }
    }

    /// Convenience wrapper: classify and ingest one raw line
    pub fn ingest_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.ingest(classify_line(line))
    }

    /// Ingest a memory counter record
    ///
    /// **Private** - internal ingestion logic
    fn ingest_memory(&mut self, fields: &[String]) -> Result<(), ParseError> {
        if fields.len() < MIN_MEMORY_COLUMNS {
            return Err(ParseError::TooFewColumns {
                kind: "memory",
                expected: MIN_MEMORY_COLUMNS,
                found: fields.len(),
            });
        }

        // Parse every numeric field before touching any bookkeeping, so a
        // rejected record leaves the model exactly as it was.
        let sample = MemorySample {
            held_mib: parse_f64("held bytes", &fields[3])? / BYTES_PER_MIB,
            peak_mib: parse_f64("peak bytes", &fields[4])? / BYTES_PER_MIB,
            held_allocations: parse_u64("held allocations", &fields[5])?,
            peak_allocations: parse_u64("peak allocations", &fields[6])?,
            produced_mib: 0.0,
        };

        let product = if fields.len() >= PRODUCT_COLUMNS {
            let produced_mib = parse_f64("produced bytes", &fields[8])? / BYTES_PER_MIB;
            Some((fields[7].as_str(), produced_mib))
        } else {
            None
        };

        let record = self.record_step(&fields[0], &fields[1], &fields[2])?;
        record.insert_memory(&fields[0], sample);

        // The size of a step's data products is only known once that step
        // has completed, so it arrives tagged onto a later record and is
        // attached to the sample already stored under the earlier step. In
        // a well-formed log the parent sample always exists; if it does not,
        // the attachment is dropped.
        if let Some((product_step, produced_mib)) = product {
            if !record.attach_product_size(product_step, produced_mib) {
                debug!(
                    "no prior sample for step \"{}\" on module \"{}\", dropping product size",
                    product_step, fields[1]
                );
            }
        }

        self.contains_memory = true;
        Ok(())
    }

    /// Ingest a module timer record
    ///
    /// **Private** - internal ingestion logic
    fn ingest_timing(&mut self, fields: &[String]) -> Result<(), ParseError> {
        if fields.len() < MIN_TIMING_COLUMNS {
            return Err(ParseError::TooFewColumns {
                kind: "timing",
                expected: MIN_TIMING_COLUMNS,
                found: fields.len(),
            });
        }

        let sample = TimingSample {
            real_seconds: parse_f64("real ticks", &fields[3])? / TICKS_PER_SECOND,
            user_seconds: parse_f64("user ticks", &fields[4])? / TICKS_PER_SECOND,
            sys_seconds: parse_f64("sys ticks", &fields[5])? / TICKS_PER_SECOND,
        };

        let record = self.record_step(&fields[0], &fields[1], &fields[2])?;
        record.insert_timing(&fields[0], sample);

        self.contains_timing = true;
        Ok(())
    }

    /// Ingest an out-of-band resident set size sample
    ///
    /// **Private** - internal ingestion logic
    ///
    /// RSS samples carry no step/module correlation; the kB value is
    /// converted to MB and appended to a flat sequence.
    fn ingest_rss(&mut self, tokens: &[String]) -> Result<(), ParseError> {
        let raw = tokens
            .get(RSS_VALUE_INDEX)
            .ok_or(ParseError::TooFewColumns {
                kind: "rss",
                expected: RSS_VALUE_INDEX + 1,
                found: tokens.len(),
            })?;

        let value = parse_f64("resident set size", raw)?;
        self.rss_samples.push(value / KB_PER_MB);
        Ok(())
    }

    /// Common preamble for memory and timing records: step and module order
    /// bookkeeping, then module lookup-or-create with the identity check
    ///
    /// **Private** - internal ingestion logic
    fn record_step(
        &mut self,
        step: &str,
        name: &str,
        module_type: &str,
    ) -> Result<&mut ModuleRecord, ParseError> {
        if !self.step_order.iter().any(|existing| existing == step) {
            self.step_order.push(step.to_string());
        }

        // Only per-event steps establish the module execution order. Setup
        // steps still record their data under the module, they just never
        // contribute to the ordering.
        if step.starts_with(EVENT_STEP_PREFIX)
            && !self.module_order.iter().any(|existing| existing == name)
        {
            self.module_order.push(name.to_string());
        }

        match self.modules.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.check_identity(name, module_type)?;
                Ok(record)
            }
            Entry::Vacant(entry) => Ok(entry.insert(ModuleRecord::new(
                name.to_string(),
                module_type.to_string(),
            ))),
        }
    }

    /// Every step identifier seen, in first-seen order
    pub fn step_order(&self) -> &[String] {
        &self.step_order
    }

    /// Module names in first-seen per-event execution order
    pub fn module_order(&self) -> &[String] {
        &self.module_order
    }

    /// All module records, keyed by name
    pub fn modules(&self) -> &HashMap<String, ModuleRecord> {
        &self.modules
    }

    /// Look up one module by name
    pub fn module(&self, name: &str) -> Option<&ModuleRecord> {
        self.modules.get(name)
    }

    /// Resident set size samples (MB), in file order
    pub fn rss_samples(&self) -> &[f64] {
        &self.rss_samples
    }

    /// True once at least one memory record has been ingested
    pub fn contains_memory(&self) -> bool {
        self.contains_memory
    }

    /// True once at least one timing record has been ingested
    pub fn contains_timing(&self) -> bool {
        self.contains_timing
    }

    /// True when nothing at all was ingested
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.rss_samples.is_empty()
    }
}

impl AggregateView for RunModel {
    fn step_order(&self) -> &[String] {
        &self.step_order
    }

    fn module_order(&self) -> &[String] {
        &self.module_order
    }

    fn modules(&self) -> &HashMap<String, ModuleRecord> {
        &self.modules
    }
}

/// Parse a float field, naming the field in the error
///
/// **Private** - internal utility
fn parse_f64(field: &'static str, value: &str) -> Result<f64, ParseError> {
    value.trim().parse::<f64>().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Parse an integer field, naming the field in the error
///
/// **Private** - internal utility
fn parse_u64(field: &'static str, value: &str) -> Result<u64, ParseError> {
    value.trim().parse::<u64>().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
