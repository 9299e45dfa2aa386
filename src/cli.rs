use clap::{Parser, Subcommand, Args as ClapArgs};
use std::path::PathBuf;

/// Command-line arguments for the project collector.
///
/// The project is described by a JSON manifest standing in for the live
/// editor document: its file path, its items and their asset references.
#[derive(Parser, Debug)]
#[clap(name = "project-collector", about = "Collect a project with its fonts and footage into one archive")]
pub struct Args {
    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration YAML file
    #[clap(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collect the project into `{output}/{project name}.zip`
    Collect(CollectOpts),

    /// Print the fonts and footage the project references as JSON
    Inventory {
        /// Project manifest
        #[clap(short, long)]
        manifest: PathBuf,
    },

    /// Create a default configuration file
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = "collector.yaml")]
        path: PathBuf,
    },
}

/// Options for the collect subcommand.
#[derive(ClapArgs, Debug)]
pub struct CollectOpts {
    /// Project manifest
    #[clap(short, long)]
    pub manifest: PathBuf,

    /// Directory for the archive (default: system temp directory)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Maximum number of concurrent file copies
    #[clap(long)]
    pub concurrency: Option<usize>,

    /// Accept fonts without checking the names inside the font files
    #[clap(long)]
    pub skip_font_check: bool,
}
