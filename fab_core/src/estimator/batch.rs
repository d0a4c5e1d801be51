//! # Batch Scaling
//!
//! A batch is N identical frames. There is no batch discount and no rounding
//! between frames: every quantity of the per-frame breakdown is multiplied
//! by the frame count.
//!
//! ## Example
//!
//! ```rust
//! use fab_core::estimator::{estimate, scale_to_batch};
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
//! let per_frame = estimate(&params).unwrap();
//! let batch = scale_to_batch(&per_frame, 3).unwrap();
//! assert_eq!(batch.totals.total_summary.grand_total_cost, 24450.0);
//! assert!(scale_to_batch(&per_frame, 0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Constraint, EstimateError, EstimateResult};
use crate::parameters::FabricationParameters;

use super::breakdown::FabricationBreakdown;
use super::estimate::estimate;

/// Per-frame breakdown together with its batch totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEstimate {
    /// Number of frames (≥ 1)
    pub frame_count: u32,
    /// Breakdown for one frame
    pub per_frame: FabricationBreakdown,
    /// `per_frame` with every quantity multiplied by `frame_count`
    pub totals: FabricationBreakdown,
}

impl BatchEstimate {
    /// Grand total for the whole batch
    pub fn grand_total(&self) -> f64 {
        self.totals.grand_total()
    }

    /// Fabrication time for the whole batch in minutes
    pub fn total_time_min(&self) -> f64 {
        self.totals.total_time_min()
    }
}

/// Check a requested frame count and narrow it to `u32`.
pub fn validate_frame_count(frame_count: i64) -> EstimateResult<u32> {
    if frame_count < 1 {
        return Err(EstimateError::invalid_input(
            "frame_count",
            frame_count.to_string(),
            Constraint::LessThanOne,
        ));
    }
    u32::try_from(frame_count).map_err(|_| {
        EstimateError::invalid_input("frame_count", frame_count.to_string(), Constraint::OutOfRange)
    })
}

/// Scale a per-frame breakdown to `frame_count` frames.
///
/// # Returns
///
/// * `Ok(BatchEstimate)` - Per-frame and total breakdowns
/// * `Err(EstimateError::InvalidInput)` - `frame_count` below 1 or above `u32::MAX`
pub fn scale_to_batch(breakdown: &FabricationBreakdown, frame_count: i64) -> EstimateResult<BatchEstimate> {
    let frames = validate_frame_count(frame_count)?;
    let totals = breakdown.scaled(frames);

    debug!(
        frames,
        grand_total = totals.total_summary.grand_total_cost,
        "scaled estimate to batch"
    );

    Ok(BatchEstimate {
        frame_count: frames,
        per_frame: breakdown.clone(),
        totals,
    })
}

/// Validate the frame count, estimate one frame, then scale.
pub fn estimate_batch(params: &FabricationParameters, frame_count: i64) -> EstimateResult<BatchEstimate> {
    validate_frame_count(frame_count)?;
    let per_frame = estimate(params)?;
    scale_to_batch(&per_frame, frame_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::MaterialType;
    use crate::parameters::{AddOnInput, FinishingBasis, TaskInput};
    use crate::tasks::TaskType;

    fn per_frame() -> FabricationBreakdown {
        let params = FabricationParameters::new(
            MaterialType::MildSteel,
            4.0,
            150.0,
            TaskInput::new(70, 25.0, 2.0),
            TaskInput::new(58, 100.0, 5.0),
        )
        .with_task(TaskType::FrameAssembly, TaskInput::new(1, 120.0, 10.0))
        .with_labour(2, 120.0)
        .with_add_ons(AddOnInput::default().with_finishing(0.5, FinishingBasis::Operations).with_transport(250.0));
        estimate(&params).unwrap()
    }

    #[test]
    fn test_reference_batch() {
        let params = FabricationParameters::new(
            MaterialType::MildSteel,
            4.0,
            150.0,
            TaskInput::new(70, 25.0, 2.0),
            TaskInput::new(58, 100.0, 5.0),
        );
        let batch = estimate_batch(&params, 3).unwrap();
        assert_eq!(batch.frame_count, 3);
        assert_eq!(batch.per_frame.total_summary.grand_total_cost, 8150.0);
        assert_eq!(batch.grand_total(), 24450.0);
        assert_eq!(batch.total_time_min(), 1290.0);
        assert_eq!(batch.totals.cutting_details.total_count, 210);
    }

    #[test]
    fn test_identity_scaling() {
        let b = per_frame();
        let batch = scale_to_batch(&b, 1).unwrap();
        assert_eq!(batch.totals, b);
        assert_eq!(batch.per_frame, b);
    }

    #[test]
    fn test_grand_total_scales_linearly() {
        let b = per_frame();
        for n in [1_i64, 2, 3, 7, 90, 1000] {
            let batch = scale_to_batch(&b, n).unwrap();
            assert_eq!(batch.totals.total_summary.grand_total_cost, b.total_summary.grand_total_cost * n as f64);
        }
    }

    #[test]
    fn test_every_section_scales() {
        let b = per_frame();
        let batch = scale_to_batch(&b, 4).unwrap();
        let t = &batch.totals;

        assert_eq!(t.material_usage.total_required, b.material_usage.total_required * 4.0);
        assert_eq!(t.material_usage.segments[0].cost, b.material_usage.segments[0].cost * 4.0);
        assert_eq!(t.welding_details.total_time_min, b.welding_details.total_time_min * 4.0);
        assert_eq!(t.other_tasks[0].details.total_count, 4);

        let labour = t.labour_details.unwrap();
        assert_eq!(labour.total_cost, b.labour_details.unwrap().total_cost * 4.0);

        let add_ons = t.add_on_details.unwrap();
        assert_eq!(add_ons.transport_cost, Some(1000.0));
        assert_eq!(add_ons.helper_charge, None);
    }

    #[test]
    fn test_scaling_never_adds_labour() {
        let params = FabricationParameters::new(
            MaterialType::Aluminum,
            2.5,
            250.0,
            TaskInput::new(20, 30.0, 1.5),
            TaskInput::new(14, 150.0, 7.0),
        );
        let batch = estimate_batch(&params, 5).unwrap();
        assert!(batch.totals.labour_details.is_none());
        assert!(batch.totals.total_summary.total_labour_cost.is_none());
    }

    #[test]
    fn test_rejects_zero_and_negative_frames() {
        let b = per_frame();
        for n in [0_i64, -1, -90] {
            let err = scale_to_batch(&b, n).unwrap_err();
            assert_eq!(err.field(), Some("frame_count"));
            assert_eq!(err.constraint(), Some(Constraint::LessThanOne));
        }
    }

    #[test]
    fn test_rejects_oversized_frame_count() {
        let err = validate_frame_count(i64::from(u32::MAX) + 1).unwrap_err();
        assert_eq!(err.constraint(), Some(Constraint::OutOfRange));
    }

    #[test]
    fn test_frame_count_checked_before_estimate() {
        let mut params = FabricationParameters::new(
            MaterialType::MildSteel,
            4.0,
            150.0,
            TaskInput::default(),
            TaskInput::default(),
        );
        params.material[0].length = -1.0;
        let err = estimate_batch(&params, 0).unwrap_err();
        assert_eq!(err.field(), Some("frame_count"));
    }
}
