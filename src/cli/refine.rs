use super::utils::{read_source, source_type_for, write_output};
use crate::error::{Error, Result};
use crate::refine::RefineOptions;
use crate::refiner::Refiner;
use std::path::PathBuf;

/// Arguments for the refine command
#[derive(Debug, Clone)]
pub struct RefineArgs {
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub max_iterations: Option<usize>,
    pub single_run: bool,
    pub keep_exhaustive_guard: bool,
    pub print_stats: bool,
}

impl RefineArgs {
    /// Convert to RefineOptions
    pub fn to_options(&self) -> RefineOptions {
        RefineOptions::from_cli(
            self.timeout_ms,
            self.max_iterations,
            self.single_run,
            self.keep_exhaustive_guard,
        )
    }
}

/// Run the refine subcommand
pub fn refine(args: &RefineArgs) -> Result<()> {
    let source = read_source(&args.input_path)?;
    let refiner = Refiner::new(args.to_options());
    log::debug!("Refining {} with {:?}", args.input_path.display(), refiner.options());

    let output = refiner.refine_source(&source, source_type_for(&args.input_path))?;

    if args.print_stats {
        let stats = serde_json::to_string_pretty(&output.stats)
            .map_err(|e| Error::internal(format!("Failed to serialize stats: {}", e)))?;
        eprintln!("{}", stats);
    }

    write_output(&output.code, args.output_path.as_deref())?;
    if let Some(path) = &args.output_path {
        log::info!("Refined code written to: {}", path.display());
    }
    Ok(())
}
