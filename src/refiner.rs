//! Source-to-source refinement pipeline
//!
//! Parses JavaScript with `oxc_parser`, runs reachability-based refinement to
//! a fixpoint and prints the result with `oxc_codegen`.

use crate::error::{Error, Result};
use crate::refine::{refine_to_fixpoint, scan_cascades, CascadeReport, RefineOptions, RefinementStats};
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Refined source and what the refinement did
#[derive(Debug, Clone)]
pub struct RefineOutput {
    pub code: String,
    pub stats: RefinementStats,
}

/// Main refiner struct
pub struct Refiner {
    options: RefineOptions,
}

impl Refiner {
    /// Create a refiner with the given options
    pub fn new(options: RefineOptions) -> Self {
        Self { options }
    }

    /// Options every run of this refiner uses
    pub fn options(&self) -> &RefineOptions {
        &self.options
    }

    /// Refine `source` and print the resulting program
    pub fn refine_source(&self, source: &str, source_type: SourceType) -> Result<RefineOutput> {
        let allocator = Allocator::default();
        let mut program = parse_program(&allocator, source, source_type)?;

        let stats = refine_to_fixpoint(&allocator, &mut program, &self.options)?;
        log::debug!("Refinement finished: {:?}", stats);

        let code = Codegen::new().build(&program).code;
        Ok(RefineOutput { code, stats })
    }

    /// List the cascades refinement would build in `source`
    pub fn analyze_source(&self, source: &str, source_type: SourceType) -> Result<Vec<CascadeReport>> {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, source, source_type)?;
        scan_cascades(&program, &self.options)
    }
}

impl Default for Refiner {
    fn default() -> Self {
        Self::new(RefineOptions::default())
    }
}

/// Parse `source`, failing on the first syntax error
pub fn parse_program<'a>(
    allocator: &'a Allocator,
    source: &'a str,
    source_type: SourceType,
) -> Result<Program<'a>> {
    let parsed = Parser::new(allocator, source, source_type).parse();
    if let Some(error) = parsed.errors.first() {
        return Err(Error::parse(error.to_string()));
    }
    if parsed.panicked {
        return Err(Error::parse("parser gave up on the input"));
    }
    Ok(parsed.program)
}

/// 1-based line number of a byte offset in `source`
pub fn line_number(source: &str, offset: u32) -> usize {
    let end = (offset as usize).min(source.len());
    source.as_bytes()[..end].iter().filter(|&&byte| byte == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_is_reported() {
        let refiner = Refiner::default();
        let result = refiner.refine_source("if (x == 1 {", SourceType::mjs());
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_options_are_kept() {
        let options = RefineOptions::from_cli(Some(50), Some(2), true, true);
        let refiner = Refiner::new(options.clone());
        assert_eq!(refiner.options(), &options);
        assert_eq!(Refiner::default().options(), &RefineOptions::default());
    }

    #[test]
    fn test_line_number() {
        let source = "a();\nb();\nc();";
        assert_eq!(line_number(source, 0), 1);
        assert_eq!(line_number(source, 5), 2);
        assert_eq!(line_number(source, 10), 3);
        assert_eq!(line_number(source, 999), 3);
    }
}
