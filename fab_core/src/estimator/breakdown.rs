//! Breakdown types returned by [`estimate`](super::estimate).
//!
//! Every section knows how to scale itself by a frame count, which is all
//! batch estimation does. Optional sections stay `None` when scaled.

use serde::{Deserialize, Serialize};

use crate::materials::MaterialType;
use crate::parameters::{MaterialSegment, TaskInput};
use crate::tasks::TaskType;

/// Cost of one material segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentUsage {
    pub name: String,
    pub length: f64,
    pub cost: f64,
}

impl SegmentUsage {
    pub(crate) fn from_segment(segment: &MaterialSegment) -> Self {
        SegmentUsage {
            name: segment.name.clone(),
            length: segment.length,
            cost: segment.length * segment.cost_per_unit,
        }
    }

    fn scaled(&self, factor: f64) -> Self {
        SegmentUsage {
            name: self.name.clone(),
            length: self.length * factor,
            cost: self.cost * factor,
        }
    }
}

/// Material consumed and its cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
    /// Total length of stock required
    pub total_required: f64,
    pub total_cost: f64,
    pub segments: Vec<SegmentUsage>,
}

impl MaterialUsage {
    fn scaled(&self, factor: f64) -> Self {
        MaterialUsage {
            total_required: self.total_required * factor,
            total_cost: self.total_cost * factor,
            segments: self.segments.iter().map(|s| s.scaled(factor)).collect(),
        }
    }
}

/// Totals for one task type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskDetails {
    pub total_count: u64,
    pub total_cost: f64,
    pub total_time_min: f64,
}

impl TaskDetails {
    /// `count × cost_per_unit` and `count × time_per_unit`
    pub(crate) fn from_input(input: &TaskInput) -> Self {
        let count = f64::from(input.count);
        TaskDetails {
            total_count: u64::from(input.count),
            total_cost: count * input.cost_per_unit,
            total_time_min: count * input.time_per_unit_min,
        }
    }

    fn scaled(&self, frames: u32) -> Self {
        let factor = f64::from(frames);
        TaskDetails {
            total_count: self.total_count * u64::from(frames),
            total_cost: self.total_cost * factor,
            total_time_min: self.total_time_min * factor,
        }
    }
}

/// Totals for a task other than cutting or welding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLine {
    pub task_type: TaskType,
    #[serde(flatten)]
    pub details: TaskDetails,
}

/// Labour hours and cost
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabourDetails {
    pub total_hours: f64,
    pub total_cost: f64,
}

impl LabourDetails {
    fn scaled(&self, factor: f64) -> Self {
        LabourDetails {
            total_hours: self.total_hours * factor,
            total_cost: self.total_cost * factor,
        }
    }
}

/// Fixed add-on lines; each line present only if it was supplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AddOnDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper_charge: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumables_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_cost: Option<f64>,
    pub total_add_on_cost: f64,
}

impl AddOnDetails {
    fn scaled(&self, factor: f64) -> Self {
        AddOnDetails {
            finishing_cost: self.finishing_cost.map(|v| v * factor),
            helper_charge: self.helper_charge.map(|v| v * factor),
            consumables_cost: self.consumables_cost.map(|v| v * factor),
            transport_cost: self.transport_cost.map(|v| v * factor),
            total_add_on_cost: self.total_add_on_cost * factor,
        }
    }
}

/// Summary lines
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TotalSummary {
    pub total_material_cost: f64,
    /// Cutting + welding + other task costs
    pub total_operations_cost: f64,
    /// Present only when labour was estimated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_labour_cost: Option<f64>,
    /// Present only when add-ons were supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_add_on_cost: Option<f64>,
    pub grand_total_cost: f64,
    pub total_fabrication_time_min: f64,
}

impl TotalSummary {
    fn scaled(&self, factor: f64) -> Self {
        TotalSummary {
            total_material_cost: self.total_material_cost * factor,
            total_operations_cost: self.total_operations_cost * factor,
            total_labour_cost: self.total_labour_cost.map(|v| v * factor),
            total_add_on_cost: self.total_add_on_cost.map(|v| v * factor),
            grand_total_cost: self.grand_total_cost * factor,
            total_fabrication_time_min: self.total_fabrication_time_min * factor,
        }
    }
}

/// Cost and time breakdown for one frame (or, scaled, for a batch).
///
/// ## JSON Example
///
/// ```json
/// {
///   "material_type": "Mild Steel",
///   "material_usage": { "total_required": 4.0, "total_cost": 600.0, "segments": [...] },
///   "cutting_details": { "total_count": 70, "total_cost": 1750.0, "total_time_min": 140.0 },
///   "welding_details": { "total_count": 58, "total_cost": 5800.0, "total_time_min": 290.0 },
///   "total_summary": {
///     "total_material_cost": 600.0,
///     "total_operations_cost": 7550.0,
///     "grand_total_cost": 8150.0,
///     "total_fabrication_time_min": 430.0
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricationBreakdown {
    pub material_type: MaterialType,
    pub material_usage: MaterialUsage,
    pub cutting_details: TaskDetails,
    pub welding_details: TaskDetails,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_tasks: Vec<TaskLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_details: Option<LabourDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_on_details: Option<AddOnDetails>,
    pub total_summary: TotalSummary,
}

impl FabricationBreakdown {
    /// Grand total cost
    pub fn grand_total(&self) -> f64 {
        self.total_summary.grand_total_cost
    }

    /// Total fabrication time in minutes
    pub fn total_time_min(&self) -> f64 {
        self.total_summary.total_fabrication_time_min
    }

    /// Whether labour was estimated
    pub fn has_labour(&self) -> bool {
        self.labour_details.is_some()
    }

    /// Multiply every quantity by `frames`.
    pub fn scaled(&self, frames: u32) -> Self {
        let factor = f64::from(frames);
        FabricationBreakdown {
            material_type: self.material_type.clone(),
            material_usage: self.material_usage.scaled(factor),
            cutting_details: self.cutting_details.scaled(frames),
            welding_details: self.welding_details.scaled(frames),
            other_tasks: self
                .other_tasks
                .iter()
                .map(|line| TaskLine {
                    task_type: line.task_type.clone(),
                    details: line.details.scaled(frames),
                })
                .collect(),
            labour_details: self.labour_details.map(|l| l.scaled(factor)),
            add_on_details: self.add_on_details.map(|a| a.scaled(factor)),
            total_summary: self.total_summary.scaled(factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_details_from_input() {
        let details = TaskDetails::from_input(&TaskInput::new(70, 25.0, 2.0));
        assert_eq!(details.total_count, 70);
        assert_eq!(details.total_cost, 1750.0);
        assert_eq!(details.total_time_min, 140.0);
    }

    #[test]
    fn test_zero_count_task() {
        let details = TaskDetails::from_input(&TaskInput::new(0, 25.0, 2.0));
        assert_eq!(details, TaskDetails::default());
    }

    #[test]
    fn test_task_scaling_counts_stay_integral() {
        let details = TaskDetails::from_input(&TaskInput::new(58, 100.0, 5.0)).scaled(3);
        assert_eq!(details.total_count, 174);
        assert_eq!(details.total_cost, 17400.0);
        assert_eq!(details.total_time_min, 870.0);
    }

    #[test]
    fn test_add_on_scaling_keeps_absent_lines_absent() {
        let add_ons = AddOnDetails {
            finishing_cost: None,
            helper_charge: Some(25.0),
            consumables_cost: None,
            transport_cost: Some(100.0),
            total_add_on_cost: 125.0,
        };
        let scaled = add_ons.scaled(4.0);
        assert_eq!(scaled.finishing_cost, None);
        assert_eq!(scaled.helper_charge, Some(100.0));
        assert_eq!(scaled.transport_cost, Some(400.0));
        assert_eq!(scaled.total_add_on_cost, 500.0);
    }
}
