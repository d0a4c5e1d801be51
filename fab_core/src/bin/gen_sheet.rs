//! Write the built-in fabrication sheet as an editable TOML template.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-sheet            # writes ./fabrication_sheet.toml
//! cargo run --bin gen-sheet -- out.toml
//! ```

use std::fs;
use std::path::PathBuf;

use fab_core::sheet::FabricationSheet;

fn main() {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fabrication_sheet.toml"));

    println!("Generating fabrication sheet...");

    let toml = match FabricationSheet::builtin().to_toml_string() {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error serializing sheet: {}", e);
            std::process::exit(1);
        }
    };

    match fs::write(&output_path, &toml) {
        Ok(()) => {
            println!("Successfully wrote {} bytes to {}", toml.len(), output_path.display());
        }
        Err(e) => {
            eprintln!("Error writing file: {}", e);
            std::process::exit(1);
        }
    }
}
