//! # Fabrication Parameters
//!
//! Validated input to the estimator. Each section of a frame's cost is its
//! own field, and the optional sections (labour, add-ons, extra tasks) are
//! `Option`/`Vec` so the estimator can tell "not supplied" apart from zero.
//!
//! Values arrive here either from Rust code directly or from
//! [`ParameterForm::resolve`](crate::form::ParameterForm::resolve), which
//! handles missing and non-numeric form fields and then calls
//! [`FabricationParameters::validate`] like everyone else.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "material_type": "Mild Steel",
//!   "material": [{ "name": "1\" x 1\" Sq. Pipe", "length": 4.0, "cost_per_unit": 150.0 }],
//!   "cutting": { "count": 70, "cost_per_unit": 25.0, "time_per_unit_min": 2.0 },
//!   "welding": { "count": 58, "cost_per_unit": 100.0, "time_per_unit_min": 5.0 },
//!   "labour": { "labour_count": 2, "cost_per_hour": 120.0 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Constraint, EstimateError, EstimateResult};
use crate::materials::MaterialType;
use crate::tasks::TaskType;

/// Largest accepted amount, rate or length. Keeps every product finite.
pub const MAX_AMOUNT: f64 = 1.0e12;

/// Finishing charge as a fraction of its basis when none is given
pub const DEFAULT_FINISHING_CHARGE_RATE: f64 = 0.5;

/// A length of stock consumed per frame, with its own price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSegment {
    /// Segment label (e.g. "Outer Pipe (2'x1')")
    pub name: String,
    /// Length consumed per frame, in the project's length unit
    pub length: f64,
    /// Cost per unit length
    pub cost_per_unit: f64,
}

impl MaterialSegment {
    pub fn new(name: impl Into<String>, length: f64, cost_per_unit: f64) -> Self {
        MaterialSegment {
            name: name.into(),
            length,
            cost_per_unit,
        }
    }
}

/// Count, cost and time of one task type for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskInput {
    /// Number of operations per frame
    pub count: u32,
    /// Cost per operation
    pub cost_per_unit: f64,
    /// Minutes per operation
    pub time_per_unit_min: f64,
}

impl TaskInput {
    pub fn new(count: u32, cost_per_unit: f64, time_per_unit_min: f64) -> Self {
        TaskInput {
            count,
            cost_per_unit,
            time_per_unit_min,
        }
    }

    fn validate(&self, prefix: &str) -> EstimateResult<()> {
        check_amount(&format!("{}_cost_per_unit", prefix), self.cost_per_unit)?;
        check_amount(&format!("{}_time_per_unit", prefix), self.time_per_unit_min)
    }
}

/// A task other than cutting or welding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTask {
    pub task_type: TaskType,
    #[serde(flatten)]
    pub input: TaskInput,
}

/// Crew size and hourly rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabourInput {
    /// Number of workers on the job
    pub labour_count: u32,
    /// Cost per worker-hour
    pub cost_per_hour: f64,
}

/// What a finishing charge is a fraction of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinishingBasis {
    /// Cutting + welding + other task costs
    #[default]
    Operations,
    /// Total labour cost
    Labour,
}

/// Finishing charge rate and basis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishingCharge {
    pub rate: f64,
    #[serde(default)]
    pub basis: FinishingBasis,
}

impl Default for FinishingCharge {
    fn default() -> Self {
        FinishingCharge {
            rate: DEFAULT_FINISHING_CHARGE_RATE,
            basis: FinishingBasis::Operations,
        }
    }
}

/// Helper (assistant) charge: a fraction of labour cost, or an entered amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum HelperCharge {
    LabourFraction(f64),
    Flat(f64),
}

/// Fixed per-frame charges layered on top of material, operations and labour.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AddOnInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finishing: Option<FinishingCharge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helper: Option<HelperCharge>,
    /// Flat consumables charge (gas, wire, discs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumables: Option<f64>,
    /// Flat transport fee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_charge: Option<f64>,
}

impl AddOnInput {
    pub fn with_finishing(mut self, rate: f64, basis: FinishingBasis) -> Self {
        self.finishing = Some(FinishingCharge { rate, basis });
        self
    }

    pub fn with_helper(mut self, helper: HelperCharge) -> Self {
        self.helper = Some(helper);
        self
    }

    pub fn with_consumables(mut self, amount: f64) -> Self {
        self.consumables = Some(amount);
        self
    }

    pub fn with_transport(mut self, amount: f64) -> Self {
        self.transport_charge = Some(amount);
        self
    }

    /// True when no add-on line was supplied
    pub fn is_empty(&self) -> bool {
        self.finishing.is_none()
            && self.helper.is_none()
            && self.consumables.is_none()
            && self.transport_charge.is_none()
    }

    /// True when some line is computed from labour cost
    pub fn needs_labour(&self) -> bool {
        matches!(self.helper, Some(HelperCharge::LabourFraction(_)))
            || matches!(self.finishing, Some(FinishingCharge { basis: FinishingBasis::Labour, .. }))
    }
}

/// Everything needed to estimate one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricationParameters {
    /// Material label (selects sheet rates; informational in the breakdown)
    pub material_type: MaterialType,

    /// Stock consumed per frame; at least one segment
    pub material: Vec<MaterialSegment>,

    pub cutting: TaskInput,

    pub welding: TaskInput,

    /// Additional task types, costed like cutting and welding
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_tasks: Vec<NamedTask>,

    /// Labour section; `None` means labour is not estimated at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour: Option<LabourInput>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_ons: Option<AddOnInput>,
}

impl FabricationParameters {
    /// Single-length frame with cutting and welding only.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fab_core::materials::MaterialType;
    /// use fab_core::parameters::{FabricationParameters, TaskInput};
    ///
    /// let params = FabricationParameters::new(
    ///     MaterialType::MildSteel,
    ///     4.0,
    ///     150.0,
    ///     TaskInput::new(70, 25.0, 2.0),
    ///     TaskInput::new(58, 100.0, 5.0),
    /// )
    /// .with_labour(2, 120.0);
    ///
    /// assert!(params.validate().is_ok());
    /// assert_eq!(params.material_length(), 4.0);
    /// ```
    pub fn new(
        material_type: MaterialType,
        material_length: f64,
        material_cost_per_unit: f64,
        cutting: TaskInput,
        welding: TaskInput,
    ) -> Self {
        let segment = MaterialSegment::new(material_type.display_name(), material_length, material_cost_per_unit);
        FabricationParameters {
            material_type,
            material: vec![segment],
            cutting,
            welding,
            other_tasks: Vec::new(),
            labour: None,
            add_ons: None,
        }
    }

    /// Replace the material with several independently priced segments
    pub fn with_segments(mut self, segments: Vec<MaterialSegment>) -> Self {
        self.material = segments;
        self
    }

    /// Add a task beyond cutting and welding
    pub fn with_task(mut self, task_type: TaskType, input: TaskInput) -> Self {
        self.other_tasks.push(NamedTask { task_type, input });
        self
    }

    /// Estimate labour for `labour_count` workers at `cost_per_hour`
    pub fn with_labour(mut self, labour_count: u32, cost_per_hour: f64) -> Self {
        self.labour = Some(LabourInput {
            labour_count,
            cost_per_hour,
        });
        self
    }

    pub fn with_add_ons(mut self, add_ons: AddOnInput) -> Self {
        self.add_ons = Some(add_ons);
        self
    }

    /// Total stock length per frame
    pub fn material_length(&self) -> f64 {
        self.material.iter().map(|s| s.length).sum()
    }

    /// Check every value before any arithmetic runs.
    ///
    /// Field names in errors match the form field names
    /// (`material_length`, `cut_cost_per_unit`, `labour_cost_per_hour`, ...).
    pub fn validate(&self) -> EstimateResult<()> {
        if self.material.is_empty() {
            return Err(EstimateError::missing("material_length"));
        }
        let single = self.material.len() == 1;
        for (i, segment) in self.material.iter().enumerate() {
            let length_field = segment_field(single, i, "length");
            check_amount(&length_field, segment.length)?;
            if segment.length == 0.0 {
                return Err(EstimateError::invalid_input(length_field, "0", Constraint::OutOfRange));
            }
            check_amount(&segment_field(single, i, "cost_per_unit"), segment.cost_per_unit)?;
        }

        self.cutting.validate("cut")?;
        self.welding.validate("weld")?;
        for task in &self.other_tasks {
            task.input.validate(&task.task_type.field_prefix())?;
        }

        if let Some(labour) = &self.labour {
            check_amount("labour_cost_per_hour", labour.cost_per_hour)?;
        }

        if let Some(add_ons) = &self.add_ons {
            if add_ons.needs_labour() && self.labour.is_none() {
                return Err(EstimateError::missing("labour_count"));
            }
            if let Some(finishing) = &add_ons.finishing {
                check_amount("finishing_charge_rate", finishing.rate)?;
            }
            match add_ons.helper {
                Some(HelperCharge::LabourFraction(rate)) => check_amount("helper_charge_rate", rate)?,
                Some(HelperCharge::Flat(amount)) => check_amount("helper_charge", amount)?,
                None => {}
            }
            if let Some(amount) = add_ons.consumables {
                check_amount("consumables", amount)?;
            }
            if let Some(amount) = add_ons.transport_charge {
                check_amount("transport_charge", amount)?;
            }
        }

        Ok(())
    }
}

fn segment_field(single: bool, index: usize, name: &str) -> String {
    if single {
        format!("material_{}", name)
    } else {
        format!("material[{}].{}", index, name)
    }
}

/// Reject non-finite, negative and out-of-range amounts.
pub(crate) fn check_amount(field: &str, value: f64) -> EstimateResult<()> {
    if !value.is_finite() {
        return Err(EstimateError::invalid_input(field, value.to_string(), Constraint::NonNumeric));
    }
    if value < 0.0 {
        return Err(EstimateError::invalid_input(field, value.to_string(), Constraint::Negative));
    }
    if value > MAX_AMOUNT {
        return Err(EstimateError::invalid_input(field, value.to_string(), Constraint::OutOfRange));
    }
    Ok(())
}
