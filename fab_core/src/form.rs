//! # Parameter Form
//!
//! The raw, unvalidated shape parameters arrive in: from a UI form, a JSON
//! body, CLI flags, or AI extraction merged with user edits. Every field is
//! optional and numeric fields accept either numbers or numeric text.
//!
//! [`ParameterForm::resolve`] is the single gate into the estimator:
//!
//! - missing counts and lengths are errors, never defaulted
//! - missing *rates* are looked up in a [`FabricationSheet`] when one is
//!   given (with its `Default` row as fallback), otherwise they are errors
//! - text that is not a number, fractional counts and negatives are errors
//! - the labour section exists only if labour fields were supplied
//!
//! ## Example
//!
//! ```rust
//! use fab_core::form::{FormValue, ParameterForm};
//! use fab_core::sheet::FabricationSheet;
//!
//! let form = ParameterForm {
//!     material_type: Some("Mild Steel".to_string()),
//!     material_length: Some(FormValue::from(4.0)),
//!     cut_count: Some(FormValue::from("70")),
//!     weld_count: Some(FormValue::from(58.0)),
//!     ..Default::default()
//! };
//!
//! // Rates come from the sheet's Mild Steel row
//! let params = form.resolve(Some(FabricationSheet::builtin())).unwrap();
//! assert_eq!(params.cutting.cost_per_unit, 25.0);
//!
//! // Without a sheet the first missing rate is reported
//! let err = form.resolve(None).unwrap_err();
//! assert_eq!(err.field(), Some("material_cost_per_unit"));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Constraint, EstimateError, EstimateResult};
use crate::extraction::ExtractedParameters;
use crate::format::parse_grouped_number;
use crate::materials::MaterialType;
use crate::parameters::{
    check_amount, AddOnInput, FabricationParameters, FinishingBasis, FinishingCharge, HelperCharge, LabourInput,
    MaterialSegment, NamedTask, TaskInput, DEFAULT_FINISHING_CHARGE_RATE,
};
use crate::sheet::FabricationSheet;
use crate::tasks::TaskType;

/// A numeric form field: a JSON number or text typed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    /// Read as a non-negative amount.
    pub fn parse_amount(&self, field: &str) -> EstimateResult<f64> {
        let value = match self {
            FormValue::Number(n) => *n,
            FormValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(EstimateError::missing(field));
                }
                parse_grouped_number(trimmed)
                    .ok_or_else(|| EstimateError::invalid_input(field, trimmed, Constraint::NonNumeric))?
            }
        };
        check_amount(field, value)?;
        Ok(value)
    }

    /// Read as a whole, non-negative count.
    pub fn parse_count(&self, field: &str) -> EstimateResult<u32> {
        let value = self.parse_amount(field)?;
        if value.fract() != 0.0 {
            return Err(EstimateError::invalid_input(field, value.to_string(), Constraint::NotInteger));
        }
        if value > f64::from(u32::MAX) {
            return Err(EstimateError::invalid_input(field, value.to_string(), Constraint::OutOfRange));
        }
        Ok(value as u32)
    }
}

impl From<f64> for FormValue {
    fn from(n: f64) -> Self {
        FormValue::Number(n)
    }
}

impl From<u32> for FormValue {
    fn from(n: u32) -> Self {
        FormValue::Number(f64::from(n))
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

/// One named material segment as entered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_unit: Option<FormValue>,
}

/// A task other than cutting or welding, as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskForm {
    pub task_type: TaskType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<FormValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_unit: Option<FormValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_per_unit: Option<FormValue>,
}

impl TaskForm {
    pub fn new(task_type: TaskType) -> Self {
        TaskForm {
            task_type,
            count: None,
            cost_per_unit: None,
            time_per_unit: None,
        }
    }

    fn with_overrides(self, user: &TaskForm) -> TaskForm {
        TaskForm {
            task_type: self.task_type,
            count: user.count.clone().or(self.count),
            cost_per_unit: user.cost_per_unit.clone().or(self.cost_per_unit),
            time_per_unit: user.time_per_unit.clone().or(self.time_per_unit),
        }
    }
}

/// Raw estimator input; field names match validation error field names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_length: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_cost_per_unit: Option<FormValue>,
    /// Replaces `material_length` when non-empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub material_segments: Vec<SegmentForm>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_count: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_cost_per_unit: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cut_time_per_unit: Option<FormValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub weld_count: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weld_cost_per_unit: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weld_time_per_unit: Option<FormValue>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_tasks: Vec<TaskForm>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labour_count: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labour_cost_per_hour: Option<FormValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finishing_charge_rate: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finishing_basis: Option<FinishingBasis>,
    /// Helper charge as a fraction of labour cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_charge_rate: Option<FormValue>,
    /// Helper charge as an entered amount; takes precedence over the rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_charge: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumables: Option<FormValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_charge: Option<FormValue>,
}

impl ParameterForm {
    /// Parse a form from a JSON body.
    pub fn from_json(text: &str) -> EstimateResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Layer `user` on top of `self`, field by field; user values win.
    ///
    /// A user `material_length` without user segments replaces the base
    /// segments. Repeated user task types are all kept so that
    /// [`resolve`](Self::resolve) can reject them.
    pub fn with_overrides(self, user: &ParameterForm) -> ParameterForm {
        let mut edits: Vec<&TaskForm> = user.extra_tasks.iter().collect();
        let mut extra_tasks: Vec<TaskForm> = Vec::with_capacity(self.extra_tasks.len() + edits.len());
        for base in self.extra_tasks {
            match edits.iter().position(|t| t.task_type == base.task_type) {
                Some(i) => extra_tasks.push(base.with_overrides(edits.remove(i))),
                None => extra_tasks.push(base),
            }
        }
        extra_tasks.extend(edits.into_iter().cloned());

        let material_segments = if !user.material_segments.is_empty() {
            user.material_segments.clone()
        } else if user.material_length.is_some() {
            Vec::new()
        } else {
            self.material_segments
        };

        ParameterForm {
            material_type: user.material_type.clone().or(self.material_type),
            material_length: user.material_length.clone().or(self.material_length),
            material_cost_per_unit: user.material_cost_per_unit.clone().or(self.material_cost_per_unit),
            material_segments,
            cut_count: user.cut_count.clone().or(self.cut_count),
            cut_cost_per_unit: user.cut_cost_per_unit.clone().or(self.cut_cost_per_unit),
            cut_time_per_unit: user.cut_time_per_unit.clone().or(self.cut_time_per_unit),
            weld_count: user.weld_count.clone().or(self.weld_count),
            weld_cost_per_unit: user.weld_cost_per_unit.clone().or(self.weld_cost_per_unit),
            weld_time_per_unit: user.weld_time_per_unit.clone().or(self.weld_time_per_unit),
            extra_tasks,
            labour_count: user.labour_count.clone().or(self.labour_count),
            labour_cost_per_hour: user.labour_cost_per_hour.clone().or(self.labour_cost_per_hour),
            finishing_charge_rate: user.finishing_charge_rate.clone().or(self.finishing_charge_rate),
            finishing_basis: user.finishing_basis.or(self.finishing_basis),
            helper_charge_rate: user.helper_charge_rate.clone().or(self.helper_charge_rate),
            helper_charge: user.helper_charge.clone().or(self.helper_charge),
            consumables: user.consumables.clone().or(self.consumables),
            transport_charge: user.transport_charge.clone().or(self.transport_charge),
        }
    }

    /// Layer this (user-entered) form over values from an extraction step.
    pub fn merge_extracted(&self, extracted: &ExtractedParameters) -> ParameterForm {
        extracted.to_form().with_overrides(self)
    }

    /// Validate the form and build [`FabricationParameters`].
    ///
    /// `sheet` supplies rates the form leaves blank. Pass `None` to require
    /// every rate explicitly.
    pub fn resolve(&self, sheet: Option<&FabricationSheet>) -> EstimateResult<FabricationParameters> {
        let material_type = match self.material_type.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => MaterialType::from_str_flexible(label),
            _ => return Err(EstimateError::missing("material_type")),
        };

        let material = self.resolve_material(&material_type, sheet)?;
        let cutting = resolve_task(
            "cut",
            &TaskType::Cutting,
            [&self.cut_count, &self.cut_cost_per_unit, &self.cut_time_per_unit],
            &material_type,
            sheet,
        )?;
        let welding = resolve_task(
            "weld",
            &TaskType::Welding,
            [&self.weld_count, &self.weld_cost_per_unit, &self.weld_time_per_unit],
            &material_type,
            sheet,
        )?;

        let mut other_tasks: Vec<NamedTask> = Vec::with_capacity(self.extra_tasks.len());
        for task in &self.extra_tasks {
            let prefix = task.task_type.field_prefix();
            if other_tasks.iter().any(|t| t.task_type == task.task_type) {
                return Err(EstimateError::invalid_input(
                    format!("{}_count", prefix),
                    task.task_type.display_name(),
                    Constraint::Duplicate,
                ));
            }
            let input = resolve_task(
                &prefix,
                &task.task_type,
                [&task.count, &task.cost_per_unit, &task.time_per_unit],
                &material_type,
                sheet,
            )?;
            other_tasks.push(NamedTask {
                task_type: task.task_type.clone(),
                input,
            });
        }

        let labour = match (&self.labour_count, &self.labour_cost_per_hour) {
            (None, None) => None,
            (Some(count), Some(rate)) => Some(LabourInput {
                labour_count: count.parse_count("labour_count")?,
                cost_per_hour: rate.parse_amount("labour_cost_per_hour")?,
            }),
            (Some(_), None) => return Err(EstimateError::missing("labour_cost_per_hour")),
            (None, Some(_)) => return Err(EstimateError::missing("labour_count")),
        };

        let add_ons = self.resolve_add_ons()?;

        let params = FabricationParameters {
            material_type,
            material,
            cutting,
            welding,
            other_tasks,
            labour,
            add_ons,
        };
        params.validate()?;
        Ok(params)
    }

    fn resolve_material(
        &self,
        material_type: &MaterialType,
        sheet: Option<&FabricationSheet>,
    ) -> EstimateResult<Vec<MaterialSegment>> {
        let sheet_rate = || sheet.and_then(|s| s.material_rate(material_type)).map(|r| r.rate);

        if self.material_segments.is_empty() {
            let length = required(&self.material_length, "material_length")?.parse_amount("material_length")?;
            let cost_per_unit = match &self.material_cost_per_unit {
                Some(value) => value.parse_amount("material_cost_per_unit")?,
                None => sheet_rate().ok_or_else(|| EstimateError::missing("material_cost_per_unit"))?,
            };
            return Ok(vec![MaterialSegment::new(material_type.display_name(), length, cost_per_unit)]);
        }

        let mut segments = Vec::with_capacity(self.material_segments.len());
        for (i, segment) in self.material_segments.iter().enumerate() {
            let length_field = format!("material[{}].length", i);
            let cost_field = format!("material[{}].cost_per_unit", i);
            let length = required(&segment.length, &length_field)?.parse_amount(&length_field)?;
            let cost_per_unit = match segment.cost_per_unit.as_ref().or(self.material_cost_per_unit.as_ref()) {
                Some(value) => value.parse_amount(&cost_field)?,
                None => sheet_rate().ok_or_else(|| EstimateError::missing(cost_field.clone()))?,
            };
            let name = if segment.name.trim().is_empty() {
                format!("Segment {}", i + 1)
            } else {
                segment.name.trim().to_string()
            };
            segments.push(MaterialSegment::new(name, length, cost_per_unit));
        }
        Ok(segments)
    }

    fn resolve_add_ons(&self) -> EstimateResult<Option<AddOnInput>> {
        let finishing = match (&self.finishing_charge_rate, self.finishing_basis) {
            (None, None) => None,
            (Some(rate), basis) => Some(FinishingCharge {
                rate: rate.parse_amount("finishing_charge_rate")?,
                basis: basis.unwrap_or_default(),
            }),
            (None, Some(basis)) => Some(FinishingCharge {
                rate: DEFAULT_FINISHING_CHARGE_RATE,
                basis,
            }),
        };

        let helper = match (&self.helper_charge, &self.helper_charge_rate) {
            (Some(amount), _) => Some(HelperCharge::Flat(amount.parse_amount("helper_charge")?)),
            (None, Some(rate)) => Some(HelperCharge::LabourFraction(rate.parse_amount("helper_charge_rate")?)),
            (None, None) => None,
        };

        let add_ons = AddOnInput {
            finishing,
            helper,
            consumables: optional_amount(&self.consumables, "consumables")?,
            transport_charge: optional_amount(&self.transport_charge, "transport_charge")?,
        };
        Ok(if add_ons.is_empty() { None } else { Some(add_ons) })
    }
}

fn required<'a>(value: &'a Option<FormValue>, field: &str) -> EstimateResult<&'a FormValue> {
    value.as_ref().ok_or_else(|| EstimateError::missing(field))
}

fn optional_amount(value: &Option<FormValue>, field: &str) -> EstimateResult<Option<f64>> {
    value.as_ref().map(|v| v.parse_amount(field)).transpose()
}

/// `fields` is `[count, cost_per_unit, time_per_unit]`.
fn resolve_task(
    prefix: &str,
    task_type: &TaskType,
    fields: [&Option<FormValue>; 3],
    material_type: &MaterialType,
    sheet: Option<&FabricationSheet>,
) -> EstimateResult<TaskInput> {
    let [count, cost, time] = fields;
    let count_field = format!("{}_count", prefix);
    let cost_field = format!("{}_cost_per_unit", prefix);
    let time_field = format!("{}_time_per_unit", prefix);

    let count = required(count, &count_field)?.parse_count(&count_field)?;
    let sheet_rate = sheet.and_then(|s| s.task_rate(material_type, task_type)).map(|r| r.rate);

    let cost_per_unit = match cost {
        Some(value) => value.parse_amount(&cost_field)?,
        None => sheet_rate
            .map(|r| r.cost_per_unit)
            .ok_or_else(|| EstimateError::missing(cost_field.clone()))?,
    };
    let time_per_unit_min = match time {
        Some(value) => value.parse_amount(&time_field)?,
        None => sheet_rate
            .map(|r| r.time_per_unit_min)
            .ok_or_else(|| EstimateError::missing(time_field.clone()))?,
    };

    Ok(TaskInput::new(count, cost_per_unit, time_per_unit_min))
}
