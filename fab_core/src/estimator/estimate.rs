//! # Per-Frame Estimate
//!
//! Turns validated [`FabricationParameters`] into a [`FabricationBreakdown`].
//!
//! ## Formulas
//!
//! - material = Σ segment length × cost per unit
//! - task cost = count × cost per unit, task time = count × time per unit
//! - operations = cutting + welding + other task costs
//! - fabrication time = Σ task times (minutes)
//! - labour hours = fabrication time / 60; labour cost = hours × workers × hourly rate
//! - grand total = material + operations + labour + add-ons
//!
//! ## Example
//!
//! ```rust
//! use fab_core::estimator::estimate;
//! use fab_core::materials::MaterialType;
//! use fab_core::parameters::{FabricationParameters, TaskInput};
//!
//! let params = FabricationParameters::new(
//!     MaterialType::MildSteel,
//!     4.0,
//!     150.0,
//!     TaskInput::new(70, 25.0, 2.0),
//!     TaskInput::new(58, 100.0, 5.0),
//! );
//!
//! let breakdown = estimate(&params).unwrap();
//! assert_eq!(breakdown.total_summary.grand_total_cost, 8150.0);
//! assert_eq!(breakdown.total_summary.total_fabrication_time_min, 430.0);
//! assert!(breakdown.labour_details.is_none());
//! ```

use tracing::debug;

use crate::errors::EstimateResult;
use crate::parameters::{AddOnInput, FabricationParameters, FinishingBasis, HelperCharge, LabourInput};
use crate::units::{Hours, Minutes};

use super::breakdown::{
    AddOnDetails, FabricationBreakdown, LabourDetails, MaterialUsage, SegmentUsage, TaskDetails, TaskLine,
    TotalSummary,
};

/// Estimate cost and time for a single frame.
///
/// # Arguments
///
/// * `params` - Frame parameters; validated before anything is computed
///
/// # Returns
///
/// * `Ok(FabricationBreakdown)` - Per-frame breakdown, every field finite
/// * `Err(EstimateError::InvalidInput)` - The first invalid field
pub fn estimate(params: &FabricationParameters) -> EstimateResult<FabricationBreakdown> {
    params.validate()?;

    // Material
    let segments: Vec<SegmentUsage> = params.material.iter().map(SegmentUsage::from_segment).collect();
    let material_usage = MaterialUsage {
        total_required: params.material_length(),
        total_cost: segments.iter().map(|s| s.cost).sum(),
        segments,
    };

    // Operations
    let cutting_details = TaskDetails::from_input(&params.cutting);
    let welding_details = TaskDetails::from_input(&params.welding);
    let other_tasks: Vec<TaskLine> = params
        .other_tasks
        .iter()
        .map(|task| TaskLine {
            task_type: task.task_type.clone(),
            details: TaskDetails::from_input(&task.input),
        })
        .collect();

    let total_operations_cost = cutting_details.total_cost
        + welding_details.total_cost
        + other_tasks.iter().map(|t| t.details.total_cost).sum::<f64>();
    let fabrication_time = Minutes(cutting_details.total_time_min)
        + Minutes(welding_details.total_time_min)
        + Minutes(other_tasks.iter().map(|t| t.details.total_time_min).sum());

    let labour_details = params.labour.as_ref().map(|labour| labour_cost(labour, fabrication_time));
    let labour_cost_value = labour_details.map(|l| l.total_cost);

    let add_on_details = params
        .add_ons
        .as_ref()
        .filter(|a| !a.is_empty())
        .map(|a| add_on_cost(a, total_operations_cost, labour_cost_value.unwrap_or(0.0)));
    let add_on_total = add_on_details.map(|a| a.total_add_on_cost);

    let grand_total_cost = material_usage.total_cost
        + total_operations_cost
        + labour_cost_value.unwrap_or(0.0)
        + add_on_total.unwrap_or(0.0);

    let total_summary = TotalSummary {
        total_material_cost: material_usage.total_cost,
        total_operations_cost,
        total_labour_cost: labour_cost_value,
        total_add_on_cost: add_on_total,
        grand_total_cost,
        total_fabrication_time_min: fabrication_time.value(),
    };

    debug!(
        material = %params.material_type,
        grand_total = grand_total_cost,
        time_min = fabrication_time.value(),
        labour = labour_details.is_some(),
        "estimated frame"
    );

    Ok(FabricationBreakdown {
        material_type: params.material_type.clone(),
        material_usage,
        cutting_details,
        welding_details,
        other_tasks,
        labour_details,
        add_on_details,
        total_summary,
    })
}

fn labour_cost(labour: &LabourInput, fabrication_time: Minutes) -> LabourDetails {
    let hours: Hours = fabrication_time.into();
    LabourDetails {
        total_hours: hours.value(),
        total_cost: hours.value() * f64::from(labour.labour_count) * labour.cost_per_hour,
    }
}

fn add_on_cost(add_ons: &AddOnInput, operations_cost: f64, labour_cost: f64) -> AddOnDetails {
    let finishing_cost = add_ons.finishing.map(|finishing| {
        let basis = match finishing.basis {
            FinishingBasis::Operations => operations_cost,
            FinishingBasis::Labour => labour_cost,
        };
        basis * finishing.rate
    });
    let helper_charge = add_ons.helper.map(|helper| match helper {
        HelperCharge::LabourFraction(rate) => labour_cost * rate,
        HelperCharge::Flat(amount) => amount,
    });

    let total_add_on_cost = [finishing_cost, helper_charge, add_ons.consumables, add_ons.transport_charge]
        .iter()
        .flatten()
        .sum::<f64>();

    AddOnDetails {
        finishing_cost,
        helper_charge,
        consumables_cost: add_ons.consumables,
        transport_cost: add_ons.transport_charge,
        total_add_on_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Constraint;
    use crate::materials::MaterialType;
    use crate::parameters::{MaterialSegment, TaskInput};
    use crate::tasks::TaskType;

    fn signage_frame() -> FabricationParameters {
        FabricationParameters::new(
            MaterialType::MildSteel,
            4.0,
            150.0,
            TaskInput::new(70, 25.0, 2.0),
            TaskInput::new(58, 100.0, 5.0),
        )
    }

    #[test]
    fn test_reference_scenario() {
        let b = estimate(&signage_frame()).unwrap();

        assert_eq!(b.material_usage.total_cost, 600.0);
        assert_eq!(b.cutting_details.total_cost, 1750.0);
        assert_eq!(b.cutting_details.total_time_min, 140.0);
        assert_eq!(b.welding_details.total_cost, 5800.0);
        assert_eq!(b.welding_details.total_time_min, 290.0);
        assert_eq!(b.total_summary.total_operations_cost, 7550.0);
        assert_eq!(b.total_summary.total_fabrication_time_min, 430.0);
        assert_eq!(b.total_summary.grand_total_cost, 8150.0);
    }

    #[test]
    fn test_no_labour_section_without_labour_inputs() {
        let b = estimate(&signage_frame()).unwrap();
        assert!(b.labour_details.is_none());
        assert!(b.total_summary.total_labour_cost.is_none());

        let json = serde_json::to_string(&b).unwrap();
        assert!(!json.contains("labour"));
    }

    #[test]
    fn test_labour_section_with_labour_inputs() {
        let b = estimate(&signage_frame().with_labour(2, 120.0)).unwrap();
        let labour = b.labour_details.unwrap();

        // 430 min = 7.1667 h; 7.1667 × 2 × 120 = 1720
        assert!((labour.total_hours - 430.0 / 60.0).abs() < 1e-9);
        assert!((labour.total_cost - 1720.0).abs() < 1e-9);
        assert!((b.total_summary.grand_total_cost - 9870.0).abs() < 1e-9);
    }

    #[test]
    fn test_labour_with_zero_workers_is_present_and_zero() {
        let b = estimate(&signage_frame().with_labour(0, 120.0)).unwrap();
        assert!(b.has_labour());
        assert_eq!(b.total_summary.total_labour_cost, Some(0.0));
    }

    #[test]
    fn test_zero_operations() {
        let params = FabricationParameters::new(
            MaterialType::MildSteel,
            4.0,
            150.0,
            TaskInput::new(0, 25.0, 2.0),
            TaskInput::new(0, 100.0, 5.0),
        );
        let b = estimate(&params).unwrap();
        assert_eq!(b.total_summary.total_operations_cost, 0.0);
        assert_eq!(b.total_summary.total_fabrication_time_min, 0.0);
        assert_eq!(b.total_summary.total_material_cost, 600.0);
    }

    #[test]
    fn test_operations_cost_is_cutting_plus_welding() {
        for (cuts, welds) in [(0, 0), (1, 0), (0, 1), (13, 7), (250, 999)] {
            let params = FabricationParameters::new(
                MaterialType::Aluminum,
                1.0,
                10.0,
                TaskInput::new(cuts, 30.0, 1.5),
                TaskInput::new(welds, 150.0, 7.0),
            );
            let b = estimate(&params).unwrap();
            assert_eq!(b.cutting_details.total_cost, f64::from(cuts) * 30.0);
            assert_eq!(b.welding_details.total_cost, f64::from(welds) * 150.0);
            assert_eq!(
                b.total_summary.total_operations_cost,
                b.cutting_details.total_cost + b.welding_details.total_cost
            );
        }
    }

    #[test]
    fn test_other_tasks_add_cost_and_time() {
        let params = signage_frame().with_task(TaskType::FrameAssembly, TaskInput::new(1, 120.0, 10.0));
        let b = estimate(&params).unwrap();

        assert_eq!(b.other_tasks.len(), 1);
        assert_eq!(b.other_tasks[0].task_type, TaskType::FrameAssembly);
        assert_eq!(b.total_summary.total_operations_cost, 7670.0);
        assert_eq!(b.total_summary.total_fabrication_time_min, 440.0);
        assert_eq!(b.total_summary.grand_total_cost, 8270.0);
    }

    #[test]
    fn test_multi_segment_material() {
        let params = signage_frame().with_segments(vec![
            MaterialSegment::new("Outer Pipe (2'x1')", 1.5, 900.0),
            MaterialSegment::new("Inner Support Pipe", 0.75, 900.0),
        ]);
        let b = estimate(&params).unwrap();
        assert_eq!(b.material_usage.total_required, 2.25);
        assert_eq!(b.material_usage.total_cost, 2025.0);
        assert_eq!(b.material_usage.segments[0].cost, 1350.0);
        assert_eq!(b.material_usage.segments[1].cost, 675.0);
    }

    #[test]
    fn test_finishing_on_operations_and_transport() {
        let params = signage_frame().with_add_ons(
            AddOnInput::default()
                .with_finishing(0.5, FinishingBasis::Operations)
                .with_transport(500.0),
        );
        let b = estimate(&params).unwrap();
        let add_ons = b.add_on_details.unwrap();

        assert_eq!(add_ons.finishing_cost, Some(3775.0));
        assert_eq!(add_ons.transport_cost, Some(500.0));
        assert_eq!(add_ons.helper_charge, None);
        assert_eq!(add_ons.total_add_on_cost, 4275.0);
        assert_eq!(b.total_summary.total_add_on_cost, Some(4275.0));
        assert_eq!(b.total_summary.grand_total_cost, 8150.0 + 4275.0);
    }

    #[test]
    fn test_finishing_and_helper_on_labour() {
        // 60 min of cutting, 1 worker at 100/h -> labour 100
        let params = FabricationParameters::new(
            MaterialType::MildSteel,
            1.0,
            100.0,
            TaskInput::new(30, 0.0, 2.0),
            TaskInput::default(),
        )
        .with_labour(1, 100.0)
        .with_add_ons(
            AddOnInput::default()
                .with_finishing(0.5, FinishingBasis::Labour)
                .with_helper(HelperCharge::LabourFraction(0.5))
                .with_consumables(100.0),
        );
        let b = estimate(&params).unwrap();
        let add_ons = b.add_on_details.unwrap();

        assert_eq!(b.total_summary.total_labour_cost, Some(100.0));
        assert_eq!(add_ons.finishing_cost, Some(50.0));
        assert_eq!(add_ons.helper_charge, Some(50.0));
        assert_eq!(add_ons.consumables_cost, Some(100.0));
        assert_eq!(b.total_summary.grand_total_cost, 100.0 + 0.0 + 100.0 + 200.0);
    }

    #[test]
    fn test_empty_add_ons_are_omitted() {
        let b = estimate(&signage_frame().with_add_ons(AddOnInput::default())).unwrap();
        assert!(b.add_on_details.is_none());
        assert!(b.total_summary.total_add_on_cost.is_none());
    }

    #[test]
    fn test_invalid_input_fails_before_compute() {
        let mut params = signage_frame();
        params.cutting.cost_per_unit = -25.0;
        let err = estimate(&params).unwrap_err();
        assert_eq!(err.field(), Some("cut_cost_per_unit"));
        assert_eq!(err.constraint(), Some(Constraint::Negative));
    }

    #[test]
    fn test_all_fields_finite_at_limits() {
        let params = FabricationParameters::new(
            MaterialType::Steel,
            crate::parameters::MAX_AMOUNT,
            crate::parameters::MAX_AMOUNT,
            TaskInput::new(u32::MAX, crate::parameters::MAX_AMOUNT, crate::parameters::MAX_AMOUNT),
            TaskInput::new(u32::MAX, crate::parameters::MAX_AMOUNT, crate::parameters::MAX_AMOUNT),
        )
        .with_labour(u32::MAX, crate::parameters::MAX_AMOUNT);
        let b = estimate(&params).unwrap();
        assert!(b.total_summary.grand_total_cost.is_finite());
        assert!(b.scaled(u32::MAX).total_summary.grand_total_cost.is_finite());
    }
}
