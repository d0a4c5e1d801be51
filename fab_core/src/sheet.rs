//! # Fabrication Sheet
//!
//! The rate table that maps `(material, task type)` to a default cost and
//! time per unit, plus a material cost per unit length. It is only consulted
//! for *rate* fields the caller left blank; counts and lengths never come
//! from here.
//!
//! A sheet is immutable once built and is passed to the code that needs it.
//! Every sheet carries a `Default` row: a lookup for a material the sheet does
//! not list (or a task that material's row does not price) falls back to that
//! row and reports [`RateSource::Fallback`].
//!
//! ## File Format
//!
//! Sheets are TOML, one `[[material]]` table per row:
//!
//! ```toml
//! [[material]]
//! name = "Mild Steel"
//! cost_per_unit = 150.0
//!
//! [[material.task]]
//! task_type = "Cutting"
//! cost_per_unit = 25.0
//! time_per_unit_min = 2.0
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fab_core::materials::MaterialType;
//! use fab_core::sheet::{FabricationSheet, RateSource};
//! use fab_core::tasks::TaskType;
//!
//! let sheet = FabricationSheet::builtin();
//!
//! let weld = sheet.task_rate(&MaterialType::Aluminum, &TaskType::Welding).unwrap();
//! assert_eq!(weld.rate.cost_per_unit, 150.0);
//! assert_eq!(weld.source, RateSource::Exact);
//!
//! // Copper is not priced, so the Default row answers
//! let cut = sheet.task_rate(&MaterialType::Copper, &TaskType::Cutting).unwrap();
//! assert_eq!(cut.source, RateSource::Fallback);
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{EstimateError, EstimateResult};
use crate::materials::MaterialType;
use crate::tasks::TaskType;

/// Name of the fallback row every sheet must contain
pub const DEFAULT_ROW: &str = "Default";

static BUILTIN: Lazy<FabricationSheet> = Lazy::new(|| FabricationSheet::from_rows(builtin_rows()));

/// Cost and time for one unit of a task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskRate {
    /// Cost per operation
    pub cost_per_unit: f64,
    /// Minutes per operation
    pub time_per_unit_min: f64,
}

/// Whether a rate came from the requested material's row or the `Default` row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateSource {
    Exact,
    Fallback,
}

/// A rate together with where it was found
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLookup<T> {
    pub rate: T,
    pub source: RateSource,
}

/// One priced task within a sheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetTaskRow {
    pub task_type: TaskType,
    pub cost_per_unit: f64,
    pub time_per_unit_min: f64,
}

/// One material row of the sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetRow {
    /// Material label, matched case-insensitively
    pub name: String,

    /// Material cost per unit length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_unit: Option<f64>,

    /// Task rates for this material
    #[serde(default, rename = "task", skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<SheetTaskRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SheetFile {
    #[serde(default, rename = "material")]
    rows: Vec<SheetRow>,
}

/// Immutable `(material, task) -> rate` table with a `Default` fallback row.
#[derive(Debug, Clone, PartialEq)]
pub struct FabricationSheet {
    /// Rows in file order (kept for serialization)
    rows: Vec<SheetRow>,
    /// Lowercased material name -> row index
    index: HashMap<String, usize>,
}

impl FabricationSheet {
    /// The sheet shipped with the crate (Mild Steel, Aluminum, Default).
    pub fn builtin() -> &'static FabricationSheet {
        &BUILTIN
    }

    /// Build a sheet from rows, checking every rate and the `Default` row.
    pub fn new(rows: Vec<SheetRow>) -> EstimateResult<Self> {
        let mut seen = HashSet::new();
        for row in &rows {
            let key = normalize(&row.name);
            if key.is_empty() {
                return Err(EstimateError::sheet("material row with empty name"));
            }
            if !seen.insert(key) {
                return Err(EstimateError::sheet(format!("duplicate material row '{}'", row.name)));
            }
            if let Some(cost) = row.cost_per_unit {
                check_rate(&row.name, "cost_per_unit", cost)?;
            }
            let mut task_seen = HashSet::new();
            for task in &row.tasks {
                if !task_seen.insert(&task.task_type) {
                    return Err(EstimateError::sheet(format!(
                        "duplicate task '{}' in material row '{}'",
                        task.task_type, row.name
                    )));
                }
                check_rate(&row.name, "cost_per_unit", task.cost_per_unit)?;
                check_rate(&row.name, "time_per_unit_min", task.time_per_unit_min)?;
            }
        }
        if !seen.contains(&normalize(DEFAULT_ROW)) {
            return Err(EstimateError::sheet(format!("sheet has no '{}' row", DEFAULT_ROW)));
        }
        Ok(Self::from_rows(rows))
    }

    fn from_rows(rows: Vec<SheetRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (normalize(&row.name), i))
            .collect();
        FabricationSheet { rows, index }
    }

    /// Parse a sheet from TOML text.
    pub fn from_toml_str(text: &str) -> EstimateResult<Self> {
        let file: SheetFile = toml::from_str(text)?;
        Self::new(file.rows)
    }

    /// Load a sheet from a TOML file.
    pub fn load(path: &Path) -> EstimateResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// Serialize the sheet back to TOML.
    pub fn to_toml_string(&self) -> EstimateResult<String> {
        let file = SheetFile { rows: self.rows.clone() };
        toml::to_string_pretty(&file).map_err(|e| EstimateError::sheet(e.to_string()))
    }

    /// All rows in file order
    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    fn row(&self, name: &str) -> Option<&SheetRow> {
        self.index.get(&normalize(name)).map(|&i| &self.rows[i])
    }

    /// Material cost per unit length for `material`, falling back to `Default`.
    pub fn material_rate(&self, material: &MaterialType) -> Option<RateLookup<f64>> {
        let exact = self.row(material.display_name()).and_then(|row| row.cost_per_unit);
        if let Some(rate) = exact {
            return Some(RateLookup { rate, source: RateSource::Exact });
        }

        let rate = self.row(DEFAULT_ROW)?.cost_per_unit?;
        warn!(material = %material, "no material rate on sheet, using Default row");
        Some(RateLookup { rate, source: RateSource::Fallback })
    }

    /// Task rate for `(material, task)`, falling back to the `Default` row.
    pub fn task_rate(&self, material: &MaterialType, task: &TaskType) -> Option<RateLookup<TaskRate>> {
        if let Some(rate) = self.row(material.display_name()).and_then(|row| find_task(row, task)) {
            return Some(RateLookup { rate, source: RateSource::Exact });
        }

        let rate = find_task(self.row(DEFAULT_ROW)?, task)?;
        warn!(material = %material, task = %task, "no task rate on sheet, using Default row");
        Some(RateLookup { rate, source: RateSource::Fallback })
    }
}

impl Default for FabricationSheet {
    fn default() -> Self {
        FabricationSheet::builtin().clone()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn find_task(row: &SheetRow, task: &TaskType) -> Option<TaskRate> {
    row.tasks.iter().find(|t| &t.task_type == task).map(|t| TaskRate {
        cost_per_unit: t.cost_per_unit,
        time_per_unit_min: t.time_per_unit_min,
    })
}

fn check_rate(material: &str, name: &str, value: f64) -> EstimateResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EstimateError::sheet(format!(
            "'{}' for material '{}' must be a non-negative number, got {}",
            name, material, value
        )));
    }
    Ok(())
}

fn task_row(task_type: TaskType, time_per_unit_min: f64, cost_per_unit: f64) -> SheetTaskRow {
    SheetTaskRow {
        task_type,
        cost_per_unit,
        time_per_unit_min,
    }
}

fn builtin_rows() -> Vec<SheetRow> {
    vec![
        SheetRow {
            name: "Mild Steel".to_string(),
            cost_per_unit: Some(150.0),
            tasks: vec![
                task_row(TaskType::Cutting, 2.0, 25.0),
                task_row(TaskType::Welding, 5.0, 100.0),
                task_row(TaskType::FrameAssembly, 10.0, 120.0),
            ],
        },
        SheetRow {
            name: "Aluminum".to_string(),
            cost_per_unit: Some(250.0),
            tasks: vec![
                task_row(TaskType::Cutting, 1.5, 30.0),
                task_row(TaskType::Welding, 7.0, 150.0),
                task_row(TaskType::FrameAssembly, 12.0, 180.0),
            ],
        },
        SheetRow {
            name: DEFAULT_ROW.to_string(),
            cost_per_unit: Some(100.0),
            tasks: vec![
                task_row(TaskType::Cutting, 3.0, 20.0),
                task_row(TaskType::Welding, 6.0, 90.0),
                task_row(TaskType::FrameAssembly, 15.0, 100.0),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTOM_SHEET: &str = r#"
[[material]]
name = "Copper"
cost_per_unit = 400.0

[[material.task]]
task_type = "Cutting"
cost_per_unit = 35.0
time_per_unit_min = 2.5

[[material]]
name = "Default"
cost_per_unit = 90.0

[[material.task]]
task_type = "Welding"
cost_per_unit = 80.0
time_per_unit_min = 4.0
"#;

    #[test]
    fn test_builtin_exact_lookup() {
        let sheet = FabricationSheet::builtin();
        let material = sheet.material_rate(&MaterialType::MildSteel).unwrap();
        assert_eq!(material.rate, 150.0);
        assert_eq!(material.source, RateSource::Exact);

        let cut = sheet.task_rate(&MaterialType::MildSteel, &TaskType::Cutting).unwrap();
        assert_eq!(cut.rate.cost_per_unit, 25.0);
        assert_eq!(cut.rate.time_per_unit_min, 2.0);
    }

    #[test]
    fn test_builtin_fallback_lookup() {
        let sheet = FabricationSheet::builtin();
        let other = MaterialType::Other("Titanium".to_string());

        let material = sheet.material_rate(&other).unwrap();
        assert_eq!(material.rate, 100.0);
        assert_eq!(material.source, RateSource::Fallback);

        let weld = sheet.task_rate(&other, &TaskType::Welding).unwrap();
        assert_eq!(weld.rate.cost_per_unit, 90.0);
        assert_eq!(weld.rate.time_per_unit_min, 6.0);
        assert_eq!(weld.source, RateSource::Fallback);
    }

    #[test]
    fn test_unpriced_task_returns_none() {
        let sheet = FabricationSheet::builtin();
        let grinding = TaskType::Custom("Grinding".to_string());
        assert!(sheet.task_rate(&MaterialType::MildSteel, &grinding).is_none());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let sheet = FabricationSheet::builtin();
        let other = MaterialType::Other("ALUMINUM ".to_string());
        let rate = sheet.material_rate(&other).unwrap();
        assert_eq!(rate.rate, 250.0);
        assert_eq!(rate.source, RateSource::Exact);
    }

    #[test]
    fn test_custom_sheet_from_toml() {
        let sheet = FabricationSheet::from_toml_str(CUSTOM_SHEET).unwrap();
        assert_eq!(sheet.rows().len(), 2);

        let cut = sheet.task_rate(&MaterialType::Copper, &TaskType::Cutting).unwrap();
        assert_eq!(cut.rate.cost_per_unit, 35.0);
        assert_eq!(cut.source, RateSource::Exact);

        // Copper row has no welding rate, so Default answers
        let weld = sheet.task_rate(&MaterialType::Copper, &TaskType::Welding).unwrap();
        assert_eq!(weld.rate.cost_per_unit, 80.0);
        assert_eq!(weld.source, RateSource::Fallback);
    }

    #[test]
    fn test_sheet_requires_default_row() {
        let text = r#"
[[material]]
name = "Copper"
cost_per_unit = 400.0
"#;
        let err = FabricationSheet::from_toml_str(text).unwrap_err();
        assert_eq!(err.error_code(), "SHEET_ERROR");
    }

    #[test]
    fn test_sheet_rejects_negative_rate() {
        let text = r#"
[[material]]
name = "Default"
cost_per_unit = -1.0
"#;
        assert!(FabricationSheet::from_toml_str(text).is_err());
    }

    #[test]
    fn test_sheet_rejects_duplicate_rows() {
        let text = r#"
[[material]]
name = "Default"
cost_per_unit = 1.0

[[material]]
name = "default"
cost_per_unit = 2.0
"#;
        assert!(FabricationSheet::from_toml_str(text).is_err());
    }

    #[test]
    fn test_malformed_toml_is_sheet_error() {
        let err = FabricationSheet::from_toml_str("[[material]\nname =").unwrap_err();
        assert_eq!(err.error_code(), "SHEET_ERROR");
    }

    #[test]
    fn test_toml_roundtrip() {
        let sheet = FabricationSheet::builtin();
        let text = sheet.to_toml_string().unwrap();
        assert!(text.contains("Mild Steel"));
        assert!(text.contains("Frame Assembly"));

        let reloaded = FabricationSheet::from_toml_str(&text).unwrap();
        assert_eq!(&reloaded, sheet);
    }
}
