//! Per-module-type rollup.
//!
//! Folds every module of the same type into one synthetic record, so the
//! memory cost of a whole category of modules can be exported or ranked as
//! a unit. The rollup implements `AggregateView`, which means the CSV
//! exporter and the ranking helpers work on it unchanged.

use log::debug;
use std::collections::HashMap;

use super::model::ModuleRecord;
use super::AggregateView;

/// A derived aggregate with one record per module type
///
/// **Public** - built from any `AggregateView`, usually a `RunModel`
#[derive(Debug, Clone)]
pub struct TypeRollup {
    step_order: Vec<String>,
    module_order: Vec<String>,
    modules: HashMap<String, ModuleRecord>,
}

impl TypeRollup {
    /// Build the rollup from a source view
    ///
    /// **Public** - main entry point
    ///
    /// Every module in the source contributes to the record keyed (and
    /// named) by its type. Per step: held memory, product sizes and live
    /// allocation counts are summed; peaks never happen together, so only
    /// the maximum peak is kept. Timing is summed throughout.
    ///
    /// The rollup's module order lists each type at the position its first
    /// module appeared in the source's execution order; the step order is
    /// shared unchanged.
    pub fn from_view(view: &impl AggregateView) -> Self {
        let mut modules: HashMap<String, ModuleRecord> = HashMap::new();

        for record in view.modules().values() {
            let type_record = modules
                .entry(record.module_type().to_string())
                .or_insert_with(|| {
                    ModuleRecord::new(
                        record.module_type().to_string(),
                        record.module_type().to_string(),
                    )
                });

            for (step, sample) in record.memory_by_step() {
                type_record.accumulate_memory(step, sample);
            }
            for (step, sample) in record.timing_by_step() {
                type_record.accumulate_timing(step, sample);
            }
        }

        let module_order = order_types(view);

        debug!(
            "rolled {} modules up into {} types",
            view.modules().len(),
            modules.len()
        );

        Self {
            step_order: view.step_order().to_vec(),
            module_order,
            modules,
        }
    }
}

/// Derive the rollup row order from the source's execution order: each type
/// appears where its first module ran
///
/// **Private** - internal helper for from_view
fn order_types(view: &impl AggregateView) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();

    for name in view.module_order() {
        let Some(record) = view.module(name) else {
            continue;
        };
        let module_type = record.module_type();
        if !order.iter().any(|existing| existing == module_type) {
            order.push(module_type.to_string());
        }
    }

    order
}

impl AggregateView for TypeRollup {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RunModel;

    fn model_with_shared_type() -> RunModel {
        let mut model = RunModel::new();
        let lines = [
            " *MEMCOUNTER* event1,modA,Shared,1048576,2097152,5,10",
            " *MEMCOUNTER* event1,modB,Shared,1048576,4194304,7,2",
            " *MEMCOUNTER* event1,modC,Other,1048576,1048576,1,1",
            " *MODULETIMER* event1,modA,Shared,1000000000000,500000000000,0",
            " *MODULETIMER* event1,modB,Shared,2000000000000,500000000000,0",
        ];
        for line in lines {
            model.ingest_line(line).unwrap();
        }
        model
    }

    #[test]
    fn test_rollup_sums_held_and_maxes_peak() {
        let rollup = TypeRollup::from_view(&model_with_shared_type());

        let shared = rollup.module("Shared").unwrap();
        let sample = shared.memory_for_step("event1").unwrap();
        assert_eq!(sample.held_mib, 2.0);
        assert_eq!(sample.peak_mib, 4.0);
        assert_eq!(sample.held_allocations, 12);
        assert_eq!(sample.peak_allocations, 10);
    }

    #[test]
    fn test_rollup_sums_timing() {
        let rollup = TypeRollup::from_view(&model_with_shared_type());

        let shared = rollup.module("Shared").unwrap();
        let sample = shared.timing_for_step("event1").unwrap();
        assert_eq!(sample.real_seconds, 3.0);
        assert_eq!(sample.user_seconds, 1.0);
    }

    #[test]
    fn test_rollup_order_follows_first_module_of_each_type() {
        let rollup = TypeRollup::from_view(&model_with_shared_type());

        assert_eq!(rollup.module_order(), ["Shared", "Other"]);
        assert_eq!(rollup.step_order(), ["event1"]);
    }
}
