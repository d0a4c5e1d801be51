//! # Materials
//!
//! Material labels for fabricated frames. The label is informational in a
//! breakdown; its only effect on arithmetic is choosing which row of the
//! [`FabricationSheet`](crate::sheet::FabricationSheet) supplies default
//! rates when the caller did not enter them.
//!
//! Labels coming from forms or AI extraction are free text, so parsing never
//! fails: anything unrecognised is kept verbatim as [`MaterialType::Other`]
//! and will resolve to the sheet's `Default` row.
//!
//! ## Example
//!
//! ```rust
//! use fab_core::materials::MaterialType;
//!
//! assert_eq!(MaterialType::from_str_flexible("mild-steel"), MaterialType::MildSteel);
//! assert_eq!(MaterialType::from_str_flexible("Carbon Fibre"), MaterialType::CarbonFiber);
//! assert_eq!(
//!     MaterialType::from_str_flexible("Galvanised Iron"),
//!     MaterialType::Other("Galvanised Iron".to_string())
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Frame material
///
/// Serializes as its display label (e.g. `"Mild Steel"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaterialType {
    Steel,
    MildSteel,
    Aluminum,
    Copper,
    Plastic,
    CarbonFiber,
    /// Any label not in the list above, kept as entered
    Other(String),
}

impl MaterialType {
    /// Known material variants for UI selection
    pub const KNOWN: [MaterialType; 6] = [
        MaterialType::Steel,
        MaterialType::MildSteel,
        MaterialType::Aluminum,
        MaterialType::Copper,
        MaterialType::Plastic,
        MaterialType::CarbonFiber,
    ];

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_uppercase().replace(['-', '_'], " ").as_str() {
            "STEEL" => MaterialType::Steel,
            "MILD STEEL" | "MS" => MaterialType::MildSteel,
            "ALUMINUM" | "ALUMINIUM" | "AL" => MaterialType::Aluminum,
            "COPPER" | "CU" => MaterialType::Copper,
            "PLASTIC" => MaterialType::Plastic,
            "CARBON FIBER" | "CARBON FIBRE" | "CFRP" => MaterialType::CarbonFiber,
            _ => MaterialType::Other(trimmed.to_string()),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            MaterialType::Steel => "Steel",
            MaterialType::MildSteel => "Mild Steel",
            MaterialType::Aluminum => "Aluminum",
            MaterialType::Copper => "Copper",
            MaterialType::Plastic => "Plastic",
            MaterialType::CarbonFiber => "Carbon Fiber",
            MaterialType::Other(label) => label,
        }
    }
}

impl Default for MaterialType {
    fn default() -> Self {
        MaterialType::MildSteel
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<String> for MaterialType {
    fn from(s: String) -> Self {
        MaterialType::from_str_flexible(&s)
    }
}

impl From<&str> for MaterialType {
    fn from(s: &str) -> Self {
        MaterialType::from_str_flexible(s)
    }
}

impl From<MaterialType> for String {
    fn from(m: MaterialType) -> Self {
        m.display_name().to_string()
    }
}
