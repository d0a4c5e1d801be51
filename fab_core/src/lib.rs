//! # fab_core - Metal Frame Fabrication Cost Estimator
//!
//! `fab_core` turns a handful of fabrication parameters (material length,
//! cut and weld counts, per-unit rates, optional labour and add-ons) into an
//! itemized cost and time breakdown for one frame, then scales it to a batch
//! of identical frames. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Every rejected input names its field and the violated constraint
//! - **No Silent Defaults**: Counts and lengths are never invented; rates only
//!   ever come from the caller or an explicit rate sheet
//!
//! ## Quick Start
//!
//! ```rust
//! use fab_core::{estimate_batch, FabricationSheet, ParameterForm};
//! use fab_core::form::FormValue;
//!
//! let form = ParameterForm {
//!     material_type: Some("Mild Steel".to_string()),
//!     material_length: Some(FormValue::from(4.0)),
//!     cut_count: Some(FormValue::from(70.0)),
//!     weld_count: Some(FormValue::from(58.0)),
//!     ..Default::default()
//! };
//!
//! let params = form.resolve(Some(FabricationSheet::builtin())).unwrap();
//! let batch = estimate_batch(&params, 3).unwrap();
//! assert_eq!(batch.per_frame.grand_total(), 8150.0);
//! assert_eq!(batch.grand_total(), 24450.0);
//! ```
//!
//! ## Modules
//!
//! - [`parameters`] - Validated estimator input
//! - [`form`] - Raw form input, parsing and rate-sheet defaulting
//! - [`extraction`] - Untrusted parameters from an AI extraction step
//! - [`estimator`] - Per-frame estimate and batch scaling
//! - [`sheet`] - Default rates per material and task
//! - [`presets`] - Catalogue of standard frames
//! - [`format`] / [`report`] - Currency, time and text report output
//! - [`settings`] - Shop-level configuration
//! - [`materials`] / [`tasks`] / [`units`] - Supporting types
//! - [`errors`] - Structured error types

pub mod errors;
pub mod estimator;
pub mod extraction;
pub mod form;
pub mod format;
pub mod materials;
pub mod parameters;
pub mod presets;
pub mod report;
pub mod settings;
pub mod sheet;
pub mod tasks;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use errors::{EstimateError, EstimateResult};
pub use estimator::{estimate, estimate_batch, scale_to_batch, BatchEstimate, FabricationBreakdown};
pub use form::ParameterForm;
pub use parameters::FabricationParameters;
pub use settings::EstimatorSettings;
pub use sheet::FabricationSheet;
