//! # Fabrication Estimator
//!
//! Pure functions from parameters to cost and time. The pattern follows
//! the rest of the crate:
//!
//! - [`FabricationParameters`](crate::parameters::FabricationParameters) - validated input (JSON-serializable)
//! - [`FabricationBreakdown`] - per-frame result (JSON-serializable)
//! - [`estimate`] - one frame
//! - [`scale_to_batch`] / [`estimate_batch`] - N identical frames
//!
//! Nothing here performs I/O or keeps state, so calls can be repeated or run
//! from several threads freely.

pub mod batch;
pub mod breakdown;
pub mod estimate;

pub use batch::{estimate_batch, scale_to_batch, validate_frame_count, BatchEstimate};
pub use breakdown::{
    AddOnDetails, FabricationBreakdown, LabourDetails, MaterialUsage, SegmentUsage, TaskDetails, TaskLine,
    TotalSummary,
};
pub use estimate::estimate;
