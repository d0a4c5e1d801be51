//! # Extracted Parameters
//!
//! Parameters proposed by an external extraction step (an AI reading an
//! image or a 3D model). They are untrusted: nothing here is validated
//! beyond JSON shape. The values only become estimator input after being
//! merged under the user's own entries and passed through
//! [`ParameterForm::resolve`].
//!
//! Both the snake_case names and the camelCase names the extraction flows
//! emit are accepted (`materialType`, `frameLength`, `numCuts`, ...).
//!
//! ## Example
//!
//! ```rust
//! use fab_core::extraction::ExtractedParameters;
//! use fab_core::form::{FormValue, ParameterForm};
//!
//! let extracted = ExtractedParameters::from_json(
//!     r#"{ "materialType": "Mild Steel", "frameLength": 12.0, "numCuts": 8, "numWelds": 6 }"#,
//! ).unwrap();
//!
//! // The user corrected the length
//! let user = ParameterForm {
//!     material_length: Some(FormValue::from(10.0)),
//!     ..Default::default()
//! };
//!
//! let form = user.merge_extracted(&extracted);
//! assert_eq!(form.material_length, Some(FormValue::Number(10.0)));
//! assert_eq!(form.cut_count, Some(FormValue::Number(8.0)));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::EstimateResult;
use crate::form::{FormValue, ParameterForm, TaskForm};
use crate::tasks::TaskType;

/// One `{task_type, count}` pair from the extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTask {
    #[serde(alias = "type", alias = "taskType")]
    pub task_type: TaskType,
    pub count: f64,
}

/// Raw extraction output. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedParameters {
    #[serde(alias = "materialType", alias = "material", skip_serializing_if = "Option::is_none")]
    pub material_type: Option<String>,

    #[serde(
        alias = "materialLength",
        alias = "frameLength",
        alias = "material_length_ft",
        skip_serializing_if = "Option::is_none"
    )]
    pub material_length: Option<f64>,

    #[serde(alias = "numCuts", skip_serializing_if = "Option::is_none")]
    pub num_cuts: Option<f64>,

    #[serde(alias = "numWelds", skip_serializing_if = "Option::is_none")]
    pub num_welds: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<ExtractedTask>,
}

impl ExtractedParameters {
    /// Parse the extraction step's JSON output.
    pub fn from_json(text: &str) -> EstimateResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Total count for `task_type` across the task list, if it appears there.
    fn task_count(&self, task_type: &TaskType) -> Option<f64> {
        let mut matching = self.tasks.iter().filter(|t| &t.task_type == task_type).peekable();
        matching.peek()?;
        Some(matching.map(|t| t.count).sum())
    }

    /// Convert to a form. Counts from `tasks` take precedence over
    /// `num_cuts` / `num_welds`; repeated task types are summed.
    pub fn to_form(&self) -> ParameterForm {
        let cut_count = self.task_count(&TaskType::Cutting).or(self.num_cuts);
        let weld_count = self.task_count(&TaskType::Welding).or(self.num_welds);

        let mut extra_tasks: Vec<TaskForm> = Vec::new();
        for task in &self.tasks {
            if matches!(task.task_type, TaskType::Cutting | TaskType::Welding)
                || extra_tasks.iter().any(|t| t.task_type == task.task_type)
            {
                continue;
            }
            extra_tasks.push(TaskForm {
                count: self.task_count(&task.task_type).map(FormValue::Number),
                ..TaskForm::new(task.task_type.clone())
            });
        }

        ParameterForm {
            material_type: self.material_type.clone(),
            material_length: self.material_length.map(FormValue::Number),
            cut_count: cut_count.map(FormValue::Number),
            weld_count: weld_count.map(FormValue::Number),
            extra_tasks,
            ..Default::default()
        }
    }
}
