use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode, ColorChoice};

use project_collector::cli::{Args, CollectOpts, Commands};
use project_collector::config::{
    apply_env_overrides, expand_env_vars, load_or_create_config, CollectionConfig,
};
use project_collector::host::ManifestDocument;
use project_collector::inventory;
use project_collector::orchestrator::collect_project;
use project_collector::utils::summary;

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.verbose)?;

    match &args.command {
        Commands::Collect(opts) => run_collect(&args, opts),
        Commands::Inventory { manifest } => run_inventory(manifest),
        Commands::InitConfig { path } => {
            info!("Creating default configuration file at {}", path.display());
            CollectionConfig::default().save_to_yaml_file(path)?;
            info!("Configuration created successfully");
            Ok(())
        }
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

/// Load configuration, then let the environment and the command line override it
fn load_and_process_config(args: &Args, opts: &CollectOpts) -> Result<CollectionConfig> {
    let mut config = load_or_create_config(args.config.as_deref())?;
    apply_env_overrides(&mut config)?;

    if let Some(output) = &opts.output {
        config.output_dir = Some(PathBuf::from(expand_env_vars(output)));
    }
    if let Some(concurrency) = opts.concurrency {
        config.copy_concurrency = concurrency;
    }
    if opts.skip_font_check {
        config.verify_font_names = false;
    }
    Ok(config)
}

fn run_collect(args: &Args, opts: &CollectOpts) -> Result<()> {
    let config = load_and_process_config(args, opts)?;
    let document = ManifestDocument::open(&opts.manifest)?;

    info!("Collecting project described by {}", opts.manifest.display());
    let report = collect_project(&document, &config)?;

    println!("{}", summary::create_collection_summary(&report)?);
    info!("Project collected to {}", report.archive_path.display());
    Ok(())
}

fn run_inventory(manifest: &PathBuf) -> Result<()> {
    let document = ManifestDocument::open(manifest)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let assets = runtime.block_on(inventory::collect(&document))?;
    let json = serde_json::to_string_pretty(&assets)
        .context("Failed to serialize inventory")?;
    println!("{}", json);
    Ok(())
}
