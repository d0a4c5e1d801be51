//! # Fabrication Tasks
//!
//! Every fabrication operation has the same shape: a count, a cost per unit
//! and a time per unit. Cutting and welding always appear in a breakdown;
//! any other task type (frame assembly, grinding, drilling, ...) is optional
//! and is costed exactly the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of fabrication operation
///
/// Serializes as its display label (e.g. `"Frame Assembly"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskType {
    Cutting,
    Welding,
    FrameAssembly,
    /// Any other operation, kept as entered
    Custom(String),
}

impl TaskType {
    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_uppercase().replace(['-', '_'], " ").as_str() {
            "CUTTING" | "CUT" | "CUTS" => TaskType::Cutting,
            "WELDING" | "WELD" | "WELDS" | "WELD JOINTS" => TaskType::Welding,
            "FRAME ASSEMBLY" | "ASSEMBLY" => TaskType::FrameAssembly,
            _ => TaskType::Custom(trimmed.to_string()),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            TaskType::Cutting => "Cutting",
            TaskType::Welding => "Welding",
            TaskType::FrameAssembly => "Frame Assembly",
            TaskType::Custom(label) => label,
        }
    }

    /// Snake-case field prefix used when naming inputs in errors
    /// (e.g. `"frame_assembly"` for `frame_assembly_count`).
    pub fn field_prefix(&self) -> String {
        self.display_name().trim().to_lowercase().replace([' ', '-'], "_")
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl From<String> for TaskType {
    fn from(s: String) -> Self {
        TaskType::from_str_flexible(&s)
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        TaskType::from_str_flexible(s)
    }
}

impl From<TaskType> for String {
    fn from(t: TaskType) -> Self {
        t.display_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flexible_parsing() {
        assert_eq!(TaskType::from_str_flexible("cuts"), TaskType::Cutting);
        assert_eq!(TaskType::from_str_flexible("Weld Joints"), TaskType::Welding);
        assert_eq!(TaskType::from_str_flexible("frame_assembly"), TaskType::FrameAssembly);
        assert_eq!(
            TaskType::from_str_flexible("Grinding"),
            TaskType::Custom("Grinding".to_string())
        );
    }

    #[test]
    fn test_field_prefix() {
        assert_eq!(TaskType::FrameAssembly.field_prefix(), "frame_assembly");
        assert_eq!(TaskType::Custom("Powder Coat".to_string()).field_prefix(), "powder_coat");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TaskType::FrameAssembly).unwrap();
        assert_eq!(json, "\"Frame Assembly\"");
        let roundtrip: TaskType = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, TaskType::FrameAssembly);
    }
}
