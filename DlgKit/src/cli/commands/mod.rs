use std::path::PathBuf;
use std::str::FromStr;

use clap::Subcommand;

/// Node handle argument for commands that take one
///
/// Accepts a bare arena index like `12` or a tagged form like `e12`/`r12`
/// as printed by `inspect`.
#[derive(Debug, Clone, Copy)]
pub struct NodeArg(pub u32);

impl FromStr for NodeArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim_start_matches(['n', 'N', 'e', 'E', 'r', 'R']);
        digits.parse::<u32>().map(NodeArg).map_err(|_| {
            format!("Invalid node handle '{s}'. Use a number like 12 or a tagged form like e12")
        })
    }
}

pub mod export;
pub mod inspect;
pub mod paths;
pub mod stats;
pub mod validate;

#[derive(Subcommand)]
pub enum Commands {
    /// Print a dialogue tree
    Inspect {
        /// Dialogue file (.dlg.json)
        source: PathBuf,

        /// Maximum tree depth to print
        #[arg(short, long, default_value_t = 12)]
        depth: usize,
    },

    /// Show dialogue statistics
    Stats {
        /// Dialogue files
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },

    /// Check dialogue file integrity
    Validate {
        /// Dialogue file, or a directory with --recursive
        source: PathBuf,

        /// Walk a directory and validate every dialogue file in parallel
        #[arg(short, long)]
        recursive: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Export a dialogue to HTML
    Export {
        /// Dialogue file
        source: PathBuf,

        /// Output HTML file (defaults to the source path with .html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List every root path to a node
    Paths {
        /// Dialogue file
        source: PathBuf,

        /// Node handle, like 12 or e12
        node: NodeArg,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { source, depth } => inspect::execute(source, *depth),
            Commands::Stats { sources } => stats::execute(sources),
            Commands::Validate {
                source,
                recursive,
                quiet,
            } => validate::execute(source, *recursive, *quiet),
            Commands::Export { source, output } => export::execute(source, output.as_deref()),
            Commands::Paths { source, node } => paths::execute(source, node.0),
        }
    }
}
