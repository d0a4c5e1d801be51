//! # Frame Presets
//!
//! Catalogue of standard signage frames with measured per-frame quantities.
//! A preset turns into an ordinary [`ParameterForm`], so it goes through the
//! same validation as any other input and the caller can still override
//! individual fields.
//!
//! Preset cutting and welding times are per frame. Per-unit rates are
//! derived from them: `time_per_unit = minutes / count` and
//! `cost_per_unit = time_per_unit × PRESET_LABOUR_RATE_PER_MIN`.
//!
//! ## Example
//!
//! ```rust
//! use fab_core::estimator::estimate;
//! use fab_core::presets::{find_preset, DEFAULT_PRESET_MATERIAL_COST};
//!
//! let preset = find_preset("back-lighting-frame").unwrap();
//! let params = preset.to_form(DEFAULT_PRESET_MATERIAL_COST).resolve(None).unwrap();
//! let b = estimate(&params).unwrap();
//!
//! // 3600 material + 20 cutting + 30 welding + 25 helper + 100 consumables
//! assert!((b.total_summary.grand_total_cost - 3775.0).abs() < 1e-9);
//! ```

use serde::Serialize;

use crate::errors::{EstimateError, EstimateResult};
use crate::form::{FormValue, ParameterForm, SegmentForm};
use crate::materials::MaterialType;

/// Cost of one minute of cutting or welding work
pub const PRESET_LABOUR_RATE_PER_MIN: f64 = 2.0;

/// Material cost per unit length offered before the user enters one
pub const DEFAULT_PRESET_MATERIAL_COST: f64 = 900.0;

/// A named piece of stock within a preset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresetSegment {
    pub name: &'static str,
    pub length: f64,
}

/// A standard frame with measured per-frame quantities
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FramePreset {
    /// Stable identifier (kebab-case)
    pub id: &'static str,
    pub name: &'static str,
    /// Finished frame size
    pub dimensions: &'static str,
    /// Pipe section used
    pub section: &'static str,
    pub pipe_weight_kg: f64,
    /// Total stock length per frame
    pub total_length: f64,
    /// Named pieces; empty when the frame uses one section
    pub segments: &'static [PresetSegment],
    pub cut_count: u32,
    pub weld_count: u32,
    /// Cutting minutes per frame
    pub cutting_time_min: f64,
    /// Welding minutes per frame
    pub welding_time_min: f64,
    pub helper_charge: f64,
    pub consumables: f64,
}

static PRESETS: [FramePreset; 5] = [
    FramePreset {
        id: "back-lighting-frame",
        name: "Back Lighting Frame",
        dimensions: "10' x 6'",
        section: "1\" x 1/2\" Sq. Pipe",
        pipe_weight_kg: 2.0,
        total_length: 4.0,
        segments: &[],
        cut_count: 70,
        weld_count: 58,
        cutting_time_min: 10.0,
        welding_time_min: 15.0,
        helper_charge: 25.0,
        consumables: 100.0,
    },
    FramePreset {
        id: "non-light-single-frame",
        name: "Non Light Single Frame",
        dimensions: "10' x 5'",
        section: "1\" x 1\" Sq. Pipe",
        pipe_weight_kg: 2.0,
        total_length: 2.5,
        segments: &[],
        cut_count: 20,
        weld_count: 14,
        cutting_time_min: 25.0,
        welding_time_min: 18.0,
        helper_charge: 43.0,
        consumables: 100.0,
    },
    FramePreset {
        id: "double-side-back-light-frame",
        name: "Double Side Back Light Frame",
        dimensions: "6' x 3'",
        section: "1\" x 1\" Sq. Pipe",
        pipe_weight_kg: 2.0,
        total_length: 3.0,
        segments: &[],
        cut_count: 38,
        weld_count: 44,
        cutting_time_min: 30.0,
        welding_time_min: 45.0,
        helper_charge: 75.0,
        consumables: 100.0,
    },
    FramePreset {
        id: "slim-board-backlight-frame",
        name: "Slim Board Backlight Frame",
        dimensions: "10' x 4'",
        section: "Outer: 2'x1', Inner: 1/2'x1/2' Sq. Pipe",
        pipe_weight_kg: 3.0,
        total_length: 2.25,
        segments: &[
            PresetSegment {
                name: "Outer Pipe (2'x1')",
                length: 1.5,
            },
            PresetSegment {
                name: "Inner Support Pipe (½'x½')",
                length: 0.75,
            },
        ],
        cut_count: 20,
        weld_count: 12,
        cutting_time_min: 13.0,
        welding_time_min: 18.0,
        helper_charge: 31.0,
        consumables: 100.0,
    },
    FramePreset {
        id: "non-light-box-frame",
        name: "Non Light Box Frame",
        dimensions: "6' x 4'",
        section: "1\" x 1\" Sq. Pipe",
        pipe_weight_kg: 2.0,
        total_length: 2.5,
        segments: &[],
        cut_count: 40,
        weld_count: 30,
        cutting_time_min: 25.0,
        welding_time_min: 35.0,
        helper_charge: 60.0,
        consumables: 100.0,
    },
];

/// All built-in presets, in catalogue order
pub fn all_presets() -> &'static [FramePreset] {
    &PRESETS
}

/// Look up a preset by id or by name (case-insensitive).
pub fn find_preset(id: &str) -> EstimateResult<&'static FramePreset> {
    let wanted = id.trim().to_lowercase();
    PRESETS
        .iter()
        .find(|p| p.id == wanted || p.name.to_lowercase() == wanted)
        .ok_or_else(|| EstimateError::unknown_preset(id.trim()))
}

impl FramePreset {
    /// Cutting plus welding minutes for one frame
    pub fn time_per_frame_min(&self) -> f64 {
        self.cutting_time_min + self.welding_time_min
    }

    /// Labour cost of cutting and welding for one frame
    pub fn labour_cost_per_frame(&self) -> f64 {
        self.time_per_frame_min() * PRESET_LABOUR_RATE_PER_MIN
    }

    /// Build a complete form for this frame.
    ///
    /// `material_cost_per_unit` applies to every segment.
    pub fn to_form(&self, material_cost_per_unit: f64) -> ParameterForm {
        let (cut_time, cut_cost) = per_unit(self.cutting_time_min, self.cut_count);
        let (weld_time, weld_cost) = per_unit(self.welding_time_min, self.weld_count);

        ParameterForm {
            material_type: Some(MaterialType::MildSteel.to_string()),
            material_length: Some(FormValue::Number(self.total_length)),
            material_cost_per_unit: Some(FormValue::Number(material_cost_per_unit)),
            material_segments: self
                .segments
                .iter()
                .map(|s| SegmentForm {
                    name: s.name.to_string(),
                    length: Some(FormValue::Number(s.length)),
                    cost_per_unit: None,
                })
                .collect(),
            cut_count: Some(FormValue::from(self.cut_count)),
            cut_cost_per_unit: Some(FormValue::Number(cut_cost)),
            cut_time_per_unit: Some(FormValue::Number(cut_time)),
            weld_count: Some(FormValue::from(self.weld_count)),
            weld_cost_per_unit: Some(FormValue::Number(weld_cost)),
            weld_time_per_unit: Some(FormValue::Number(weld_time)),
            helper_charge: Some(FormValue::Number(self.helper_charge)),
            consumables: Some(FormValue::Number(self.consumables)),
            ..Default::default()
        }
    }
}

/// `(time_per_unit, cost_per_unit)` from per-frame minutes
fn per_unit(minutes: f64, count: u32) -> (f64, f64) {
    if count == 0 {
        return (0.0, 0.0);
    }
    let time = minutes / f64::from(count);
    (time, time * PRESET_LABOUR_RATE_PER_MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::{estimate, estimate_batch};

    const TOL: f64 = 1e-9;

    #[test]
    fn test_catalogue() {
        assert_eq!(all_presets().len(), 5);
        for preset in all_presets() {
            let from_segments: f64 = preset.segments.iter().map(|s| s.length).sum();
            if !preset.segments.is_empty() {
                assert!((from_segments - preset.total_length).abs() < TOL, "{}", preset.id);
            }
        }
    }

    #[test]
    fn test_find_by_id_or_name() {
        assert_eq!(find_preset("non-light-box-frame").unwrap().dimensions, "6' x 4'");
        assert_eq!(find_preset("  Slim Board Backlight Frame ").unwrap().pipe_weight_kg, 3.0);
    }

    #[test]
    fn test_unknown_preset() {
        let err = find_preset("hoarding").unwrap_err();
        assert_eq!(err, EstimateError::unknown_preset("hoarding"));
        assert_eq!(err.error_code(), "UNKNOWN_PRESET");
    }

    #[test]
    fn test_every_preset_resolves_and_matches_catalogue_totals() {
        for preset in all_presets() {
            let params = preset.to_form(DEFAULT_PRESET_MATERIAL_COST).resolve(None).unwrap();
            let b = estimate(&params).unwrap();

            let ops = b.cutting_details.total_cost + b.welding_details.total_cost;
            assert!((ops - preset.labour_cost_per_frame()).abs() < TOL, "{}", preset.id);
            assert!((b.total_time_min() - preset.time_per_frame_min()).abs() < TOL, "{}", preset.id);

            let expected = preset.total_length * DEFAULT_PRESET_MATERIAL_COST
                + preset.labour_cost_per_frame()
                + preset.helper_charge
                + preset.consumables;
            assert!((b.grand_total() - expected).abs() < 1e-6, "{}", preset.id);
            assert!(b.labour_details.is_none());
        }
    }

    #[test]
    fn test_slim_board_segments() {
        let preset = find_preset("slim-board-backlight-frame").unwrap();
        let params = preset.to_form(1000.0).resolve(None).unwrap();
        assert_eq!(params.material.len(), 2);
        assert_eq!(params.material[1].name, "Inner Support Pipe (½'x½')");
        assert_eq!(params.material[1].cost_per_unit, 1000.0);

        let batch = estimate_batch(&params, 90).unwrap();
        assert!((batch.totals.material_usage.total_required - 202.5).abs() < TOL);
    }

    #[test]
    fn test_user_overrides_preset_field() {
        let preset = find_preset("back-lighting-frame").unwrap();
        let user = ParameterForm {
            consumables: Some("150".into()),
            ..Default::default()
        };
        let params = preset.to_form(900.0).with_overrides(&user).resolve(None).unwrap();
        assert_eq!(params.add_ons.unwrap().consumables, Some(150.0));
    }
}
