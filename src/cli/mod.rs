//! Command-line interface module
//!
//! This module contains the implementations for the CLI subcommands.

pub mod analyze;
pub mod refine;

/// Common CLI utilities
pub mod utils {
    use crate::error::{Error, Result};
    use oxc_span::SourceType;
    use std::path::Path;

    /// Read a source file into a string
    pub fn read_source(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    /// Source type from the file extension, plain modules otherwise
    pub fn source_type_for(path: &Path) -> SourceType {
        SourceType::from_path(path).unwrap_or_else(|_| SourceType::mjs())
    }

    /// Write output to file or stdout
    pub fn write_output(content: &str, output_path: Option<&Path>) -> Result<()> {
        match output_path {
            Some(path) => std::fs::write(path, content).map_err(|e| {
                Error::Io(format!("Failed to write output to {}: {}", path.display(), e))
            }),
            None => {
                print!("{}", content);
                Ok(())
            }
        }
    }
}
