//! # Text Report
//!
//! Plain-text summary of a [`BatchEstimate`], one total line per cost item,
//! each followed by how it was derived (`(₹1,750.00/frame × 3 frames)`).
//!
//! ## Example
//!
//! ```rust
//! use fab_core::estimator::estimate_batch;
//! use fab_core::materials::MaterialType;
//! use fab_core::parameters::{FabricationParameters, TaskInput};
//! use fab_core::report::{render_text_report, ReportOptions};
//!
//! let params = FabricationParameters::new(
//!     MaterialType::MildSteel,
//!     4.0,
//!     150.0,
//!     TaskInput::new(70, 25.0, 2.0),
//!     TaskInput::new(58, 100.0, 5.0),
//! );
//! let batch = estimate_batch(&params, 3).unwrap();
//!
//! let text = render_text_report(&batch, &ReportOptions::new("Back Lighting Frame"));
//! assert!(text.contains("Grand Total Cost: ₹24,450.00"));
//! assert!(text.contains("(₹8,150.00/frame × 3 frames)"));
//! ```

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::estimator::BatchEstimate;
use crate::format::{format_currency, format_minutes, format_quantity, format_rate, CurrencyFormat};

/// Presentation settings for [`render_text_report`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Project or frame name
    pub title: String,
    /// Optional subtitle, e.g. frame dimensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    /// Label for material length; never converted
    pub length_unit: String,
    pub currency: CurrencyFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl ReportOptions {
    pub fn new(title: impl Into<String>) -> Self {
        ReportOptions {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_dimensions(mut self, dimensions: impl Into<String>) -> Self {
        self.dimensions = Some(dimensions.into());
        self
    }

    pub fn with_currency(mut self, currency: CurrencyFormat) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_length_unit(mut self, unit: impl Into<String>) -> Self {
        self.length_unit = unit.into();
        self
    }

    /// Stamp the report with the current time
    pub fn stamped_now(mut self) -> Self {
        self.generated_at = Some(Utc::now());
        self
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            title: "Fabrication Estimate".to_string(),
            dimensions: None,
            length_unit: "ft".to_string(),
            currency: CurrencyFormat::default(),
            generated_at: None,
        }
    }
}

/// `"1 frame"` / `"3 frames"`
fn frames_label(n: u32) -> String {
    if n == 1 {
        "1 frame".to_string()
    } else {
        format!("{} frames", n)
    }
}

struct ReportWriter<'a> {
    out: String,
    options: &'a ReportOptions,
    frames: String,
}

impl ReportWriter<'_> {
    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Total line plus its derivation on the next line
    fn detail(&mut self, total: String, derivation: String) {
        let _ = writeln!(self.out, "{}", total);
        let _ = writeln!(self.out, "    ({})", derivation);
    }

    fn money(&self, amount: f64) -> String {
        format_currency(amount, &self.options.currency)
    }

    /// Cost line derived as `per-frame × N frames`
    fn cost_line(&mut self, label: &str, per_frame: f64, total: f64) {
        let total_text = format!("Total {}: {}", label, self.money(total));
        let derivation = format!("{}/frame × {}", self.money(per_frame), self.frames);
        self.detail(total_text, derivation);
    }
}

/// Render the batch as plain text.
pub fn render_text_report(batch: &BatchEstimate, options: &ReportOptions) -> String {
    let per = &batch.per_frame;
    let all = &batch.totals;
    let unit = options.length_unit.as_str();

    let mut w = ReportWriter {
        out: String::new(),
        options,
        frames: frames_label(batch.frame_count),
    };

    w.line("Fabrication Project Summary");
    w.line(&"=".repeat(40));
    match &options.dimensions {
        Some(dims) => w.line(&format!("Project: {} ({})", options.title, dims)),
        None => w.line(&format!("Project: {}", options.title)),
    }
    w.line(&format!("Material: {}", per.material_type));
    w.line(&format!("Number of Frames: {}", batch.frame_count));
    if let Some(at) = options.generated_at {
        w.line(&format!("Generated: {}", at.format("%Y-%m-%d %H:%M UTC")));
    }
    w.line("");

    let header_frames = w.frames.to_uppercase();
    w.line(&format!("--- TOTAL ESTIMATE FOR {} ---", header_frames));

    // Lengths
    let segments = &per.material_usage.segments;
    if segments.len() > 1 {
        for (seg, seg_total) in segments.iter().zip(&all.material_usage.segments) {
            let frames = w.frames.clone();
            w.detail(
                format!("Total {} Length: {} {}", seg.name, format_quantity(seg_total.length), unit),
                format!("{} {}/frame × {}", format_quantity(seg.length), unit, frames),
            );
        }
    }
    let frames = w.frames.clone();
    w.detail(
        format!(
            "Total Material Length: {} {}",
            format_quantity(all.material_usage.total_required),
            unit
        ),
        format!("{} {}/frame × {}", format_quantity(per.material_usage.total_required), unit, frames),
    );
    w.line("");

    // Material cost, per segment
    for (seg, seg_total) in segments.iter().zip(&all.material_usage.segments) {
        let rate = if seg.length > 0.0 { seg.cost / seg.length } else { 0.0 };
        let label = if segments.len() > 1 {
            seg.name.clone()
        } else {
            "Material".to_string()
        };
        let total = w.money(seg_total.cost);
        let derivation = format!(
            "{} {} × {}/{} × {}",
            format_quantity(seg.length),
            unit,
            format_rate(rate, &options.currency),
            unit,
            frames
        );
        w.detail(format!("Total {} Cost: {}", label, total), derivation);
    }
    if segments.len() > 1 {
        w.cost_line(
            "Material Cost",
            per.material_usage.total_cost,
            all.material_usage.total_cost,
        );
    }

    w.cost_line("Cutting Cost", per.cutting_details.total_cost, all.cutting_details.total_cost);
    w.cost_line("Welding Cost", per.welding_details.total_cost, all.welding_details.total_cost);
    for (task, task_total) in per.other_tasks.iter().zip(&all.other_tasks) {
        let label = format!("{} Cost", task.task_type);
        w.cost_line(&label, task.details.total_cost, task_total.details.total_cost);
    }

    if let (Some(labour), Some(labour_total)) = (per.labour_details, all.labour_details) {
        w.cost_line("Labour Cost", labour.total_cost, labour_total.total_cost);
        w.line(&format!(
            "    ({} labour hours in total)",
            format_quantity(labour_total.total_hours)
        ));
    }

    if let (Some(add), Some(add_total)) = (per.add_on_details, all.add_on_details) {
        let lines = [
            ("Finishing Charge", add.finishing_cost, add_total.finishing_cost),
            ("Helper Charge", add.helper_charge, add_total.helper_charge),
            ("Consumables", add.consumables_cost, add_total.consumables_cost),
            ("Transport", add.transport_cost, add_total.transport_cost),
        ];
        for (label, one, total) in lines {
            if let (Some(one), Some(total)) = (one, total) {
                w.cost_line(label, one, total);
            }
        }
    }

    w.line("");
    w.line(&"-".repeat(40));
    let grand = w.money(all.total_summary.grand_total_cost);
    let grand_per = w.money(per.total_summary.grand_total_cost);
    w.detail(
        format!("Grand Total Cost: {}", grand),
        format!("{}/frame × {}", grand_per, frames),
    );
    w.detail(
        format!(
            "Grand Total Time: {}",
            format_minutes(all.total_summary.total_fabrication_time_min)
        ),
        format!(
            "{}/frame × {}",
            format_minutes(per.total_summary.total_fabrication_time_min),
            frames
        ),
    );

    w.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::estimate_batch;
    use crate::materials::MaterialType;
    use crate::parameters::{AddOnInput, FabricationParameters, HelperCharge, MaterialSegment, TaskInput};
    use crate::tasks::TaskType;
    use chrono::TimeZone;

    fn reference_params() -> FabricationParameters {
        FabricationParameters::new(
            MaterialType::MildSteel,
            4.0,
            150.0,
            TaskInput::new(70, 25.0, 2.0),
            TaskInput::new(58, 100.0, 5.0),
        )
    }

    #[test]
    fn test_reference_batch_lines() {
        let batch = estimate_batch(&reference_params(), 3).unwrap();
        let text = render_text_report(&batch, &ReportOptions::new("Back Lighting Frame").with_dimensions("10' x 6'"));

        assert!(text.contains("Project: Back Lighting Frame (10' x 6')"));
        assert!(text.contains("Number of Frames: 3"));
        assert!(text.contains("--- TOTAL ESTIMATE FOR 3 FRAMES ---"));
        assert!(text.contains("Total Material Length: 12 ft"));
        assert!(text.contains("(4 ft/frame × 3 frames)"));
        assert!(text.contains("Total Material Cost: ₹1,800.00"));
        assert!(text.contains("(4 ft × ₹150/ft × 3 frames)"));
        assert!(text.contains("Total Cutting Cost: ₹5,250.00"));
        assert!(text.contains("(₹1,750.00/frame × 3 frames)"));
        assert!(text.contains("Total Welding Cost: ₹17,400.00"));
        assert!(text.contains("Grand Total Cost: ₹24,450.00"));
        assert!(text.contains("Grand Total Time: 21h 30m"));
        assert!(text.contains("(7h 10m/frame × 3 frames)"));
    }

    #[test]
    fn test_single_frame_wording() {
        let batch = estimate_batch(&reference_params(), 1).unwrap();
        let text = render_text_report(&batch, &ReportOptions::default());
        assert!(text.contains("× 1 frame)"));
        assert!(!text.contains("frames)"));
        assert!(text.contains("FOR 1 FRAME ---"));
    }

    #[test]
    fn test_optional_sections_only_when_present() {
        let batch = estimate_batch(&reference_params(), 2).unwrap();
        let text = render_text_report(&batch, &ReportOptions::default());
        assert!(!text.contains("Labour"));
        assert!(!text.contains("Helper"));
        assert!(!text.contains("Generated"));

        let params = reference_params()
            .with_task(TaskType::FrameAssembly, TaskInput::new(1, 120.0, 10.0))
            .with_labour(1, 60.0)
            .with_add_ons(
                AddOnInput::default()
                    .with_helper(HelperCharge::Flat(25.0))
                    .with_consumables(100.0),
            );
        let batch = estimate_batch(&params, 2).unwrap();
        let text = render_text_report(&batch, &ReportOptions::default());
        assert!(text.contains("Total Frame Assembly Cost: ₹240.00"));
        assert!(text.contains("Total Labour Cost:"));
        assert!(text.contains("Total Helper Charge: ₹50.00"));
        assert!(text.contains("(₹25.00/frame × 2 frames)"));
        assert!(text.contains("Total Consumables: ₹200.00"));
        assert!(!text.contains("Transport"));
    }

    #[test]
    fn test_segment_lines() {
        let params = reference_params().with_segments(vec![
            MaterialSegment::new("Outer Pipe", 1.5, 900.0),
            MaterialSegment::new("Inner Support Pipe", 0.75, 900.0),
        ]);
        let batch = estimate_batch(&params, 4).unwrap();
        let text = render_text_report(&batch, &ReportOptions::default());
        assert!(text.contains("Total Outer Pipe Length: 6 ft"));
        assert!(text.contains("Total Inner Support Pipe Length: 3 ft"));
        assert!(text.contains("Total Material Length: 9 ft"));
        assert!(text.contains("Total Outer Pipe Cost: ₹5,400.00"));
        assert!(text.contains("(0.75 ft × ₹900/ft × 4 frames)"));
    }

    #[test]
    fn test_generated_at_and_units() {
        let batch = estimate_batch(&reference_params(), 1).unwrap();
        let mut options = ReportOptions::new("Test").with_length_unit("m");
        options.generated_at = Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
        let text = render_text_report(&batch, &options);
        assert!(text.contains("Generated: 2025-03-01 09:30 UTC"));
        assert!(text.contains("Total Material Length: 4 m"));
    }
}
