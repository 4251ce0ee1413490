use clap::{Parser, Subcommand};
use miette::{miette, Result};
use std::path::PathBuf;

use elif_refine::cli;

#[derive(Parser)]
#[command(name = "elif-refine")]
#[command(about = "Collapse independent if statements into else-if cascades")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Refine a JavaScript file and print the result
    Refine {
        /// Input JavaScript/TypeScript file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Time budget of a single proof in milliseconds (0 disables the limit)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Maximum number of refinement passes
        #[arg(long)]
        max_iterations: Option<usize>,

        /// Only collapse the last run found in each block
        #[arg(long)]
        single_run: bool,

        /// Keep the last guard of exhaustive cascades instead of a plain else
        #[arg(long)]
        keep_exhaustive_guard: bool,

        /// Print refinement statistics as JSON on stderr
        #[arg(long)]
        stats: bool,
    },

    /// List the cascades refinement would build, without rewriting
    Analyze {
        /// Input JavaScript/TypeScript file
        input: PathBuf,

        /// Time budget of a single proof in milliseconds (0 disables the limit)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Only report the last run found in each block
        #[arg(long)]
        single_run: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Refine {
            input,
            output,
            timeout_ms,
            max_iterations,
            single_run,
            keep_exhaustive_guard,
            stats,
        } => {
            let args = cli::refine::RefineArgs {
                input_path: input,
                output_path: output,
                timeout_ms,
                max_iterations,
                single_run,
                keep_exhaustive_guard,
                print_stats: stats,
            };
            cli::refine::refine(&args).map_err(|e| miette!("{}", e))
        }
        Commands::Analyze {
            input,
            timeout_ms,
            single_run,
        } => cli::analyze::analyze(&input, timeout_ms, single_run).map_err(|e| miette!("{}", e)),
    }
}
