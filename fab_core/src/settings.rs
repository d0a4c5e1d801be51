//! # Estimator Settings
//!
//! Shop-level defaults read from a TOML file. Every field has a default, so
//! an empty file (or no file) is valid.
//!
//! ```toml
//! currency_symbol = "₹"
//! number_locale = "en-IN"
//! length_unit = "ft"
//! default_frame_count = 1
//! default_finishing_charge_rate = 0.5
//! sheet_path = "fabrication_sheet.toml"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fab_core::format::NumberLocale;
//! use fab_core::settings::EstimatorSettings;
//!
//! let settings = EstimatorSettings::from_toml_str("currency_symbol = \"$\"\nnumber_locale = \"en-US\"").unwrap();
//! assert_eq!(settings.currency().locale, NumberLocale::EnUs);
//! assert_eq!(settings.length_unit, "ft");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Constraint, EstimateError, EstimateResult};
use crate::form::{FormValue, ParameterForm};
use crate::format::{CurrencyFormat, NumberLocale};
use crate::parameters::{check_amount, DEFAULT_FINISHING_CHARGE_RATE};
use crate::report::ReportOptions;
use crate::sheet::FabricationSheet;

/// Shop-level defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    pub currency_symbol: String,

    pub number_locale: NumberLocale,

    /// Label for material length in reports; values are never converted
    pub length_unit: String,

    /// Frames estimated when the caller does not say
    pub default_frame_count: u32,

    /// Finishing rate used when a finishing basis is chosen without a rate
    pub default_finishing_charge_rate: f64,

    /// Rate sheet to use instead of the built-in one. Relative paths are
    /// resolved against the settings file's directory by [`load`](Self::load).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_path: Option<PathBuf>,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        EstimatorSettings {
            currency_symbol: "₹".to_string(),
            number_locale: NumberLocale::EnIn,
            length_unit: "ft".to_string(),
            default_frame_count: 1,
            default_finishing_charge_rate: DEFAULT_FINISHING_CHARGE_RATE,
            sheet_path: None,
        }
    }
}

impl EstimatorSettings {
    /// Parse settings from TOML text and check them.
    pub fn from_toml_str(text: &str) -> EstimateResult<Self> {
        let settings: EstimatorSettings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> EstimateResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| EstimateError::file_error("read", path.display().to_string(), e.to_string()))?;
        let mut settings = Self::from_toml_str(&text)?;

        if let Some(sheet) = settings.sheet_path.take() {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            settings.sheet_path = Some(if sheet.is_relative() { dir.join(sheet) } else { sheet });
        }

        debug!(path = %path.display(), "loaded estimator settings");
        Ok(settings)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> EstimateResult<String> {
        toml::to_string_pretty(self).map_err(|e| EstimateError::sheet(e.to_string()))
    }

    pub fn validate(&self) -> EstimateResult<()> {
        if self.default_frame_count < 1 {
            return Err(EstimateError::invalid_input(
                "default_frame_count",
                self.default_frame_count.to_string(),
                Constraint::LessThanOne,
            ));
        }
        check_amount("default_finishing_charge_rate", self.default_finishing_charge_rate)?;
        Ok(())
    }

    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency_symbol.clone(), self.number_locale)
    }

    /// Report options carrying this shop's currency and length unit
    pub fn report_options(&self, title: impl Into<String>) -> ReportOptions {
        ReportOptions::new(title)
            .with_currency(self.currency())
            .with_length_unit(self.length_unit.clone())
    }

    /// Fill form fields this shop configures defaults for.
    ///
    /// Only the finishing rate is affected, and only when the form chose a
    /// finishing basis without a rate.
    pub fn apply_defaults(&self, mut form: ParameterForm) -> ParameterForm {
        if form.finishing_basis.is_some() && form.finishing_charge_rate.is_none() {
            form.finishing_charge_rate = Some(FormValue::Number(self.default_finishing_charge_rate));
        }
        form
    }

    /// The configured rate sheet, or the built-in one.
    pub fn load_sheet(&self) -> EstimateResult<FabricationSheet> {
        match &self.sheet_path {
            Some(path) => FabricationSheet::load(path),
            None => Ok(FabricationSheet::builtin().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::FinishingBasis;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fab_core_test_{}", name))
    }

    #[test]
    fn test_defaults() {
        let settings = EstimatorSettings::default();
        assert_eq!(settings.currency(), CurrencyFormat::default());
        assert_eq!(settings.default_frame_count, 1);
        assert_eq!(settings.default_finishing_charge_rate, 0.5);
        assert!(settings.sheet_path.is_none());
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(EstimatorSettings::from_toml_str("").unwrap(), EstimatorSettings::default());
    }

    #[test]
    fn test_partial_file() {
        let settings = EstimatorSettings::from_toml_str("length_unit = \"m\"\ndefault_frame_count = 90").unwrap();
        assert_eq!(settings.length_unit, "m");
        assert_eq!(settings.default_frame_count, 90);
        assert_eq!(settings.currency_symbol, "₹");
    }

    #[test]
    fn test_rejects_zero_frame_count() {
        let err = EstimatorSettings::from_toml_str("default_frame_count = 0").unwrap_err();
        assert_eq!(err.field(), Some("default_frame_count"));
        assert_eq!(err.constraint(), Some(Constraint::LessThanOne));
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = EstimatorSettings::from_toml_str("number_locale = \"fr-FR\"").unwrap_err();
        assert_eq!(err.error_code(), "SHEET_ERROR");
    }

    #[test]
    fn test_toml_roundtrip() {
        let settings = EstimatorSettings {
            currency_symbol: "$".to_string(),
            number_locale: NumberLocale::EnUs,
            sheet_path: Some(PathBuf::from("rates.toml")),
            ..Default::default()
        };
        let text = settings.to_toml_string().unwrap();
        assert_eq!(EstimatorSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_load_resolves_relative_sheet_path() {
        let dir = temp_path("settings_dir");
        fs::create_dir_all(&dir).unwrap();
        let settings_path = dir.join("estimator.toml");
        fs::write(&settings_path, "sheet_path = \"rates.toml\"\n").unwrap();
        fs::write(dir.join("rates.toml"), FabricationSheet::builtin().to_toml_string().unwrap()).unwrap();

        let settings = EstimatorSettings::load(&settings_path).unwrap();
        assert_eq!(settings.sheet_path, Some(dir.join("rates.toml")));
        assert_eq!(&settings.load_sheet().unwrap(), FabricationSheet::builtin());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = EstimatorSettings::load(&temp_path("does_not_exist.toml")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_apply_defaults_fills_finishing_rate_only_when_basis_chosen() {
        let settings = EstimatorSettings {
            default_finishing_charge_rate: 0.2,
            ..Default::default()
        };

        let untouched = settings.apply_defaults(ParameterForm::default());
        assert!(untouched.finishing_charge_rate.is_none());

        let form = ParameterForm {
            finishing_basis: Some(FinishingBasis::Operations),
            ..Default::default()
        };
        let filled = settings.apply_defaults(form);
        assert_eq!(filled.finishing_charge_rate, Some(FormValue::Number(0.2)));

        let form = ParameterForm {
            finishing_basis: Some(FinishingBasis::Operations),
            finishing_charge_rate: Some("0.3".into()),
            ..Default::default()
        };
        let kept = settings.apply_defaults(form);
        assert_eq!(kept.finishing_charge_rate, Some(FormValue::Text("0.3".to_string())));
    }

    #[test]
    fn test_report_options_carry_shop_format() {
        let settings = EstimatorSettings::from_toml_str("currency_symbol = \"$\"\nlength_unit = \"m\"").unwrap();
        let options = settings.report_options("Gate");
        assert_eq!(options.title, "Gate");
        assert_eq!(options.length_unit, "m");
        assert_eq!(options.currency.symbol, "$");
    }
}
