use super::utils::{read_source, source_type_for};
use crate::error::Result;
use crate::refine::RefineOptions;
use crate::refiner::{line_number, Refiner};
use std::path::Path;

/// Run the analyze subcommand
pub fn analyze(input: &Path, timeout_ms: Option<u64>, single_run: bool) -> Result<()> {
    let source = read_source(input)?;
    let options = RefineOptions::from_cli(timeout_ms, None, single_run, false);
    let reports = Refiner::new(options).analyze_source(&source, source_type_for(input))?;

    println!("Found {} else-if cascade(s) in {}", reports.len(), input.display());
    for (i, report) in reports.iter().enumerate() {
        let lines: Vec<String> = report
            .members
            .iter()
            .map(|span| line_number(&source, span.start).to_string())
            .collect();
        println!(
            "  Cascade {}: {} statements at lines {}{}",
            i,
            report.members.len(),
            lines.join(", "),
            if report.exhaustive { " (exhaustive)" } else { "" }
        );
    }
    Ok(())
}
