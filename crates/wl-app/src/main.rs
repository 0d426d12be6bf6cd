use anyhow::Result;
use clap::Parser;
use wl_app::{cli, pipeline};

fn main() -> Result<()> {
    // 1. Parse CLI
    let cli = cli::Cli::parse();

    // 2. Logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Config file, then CLI overrides
    let mut config = pipeline::resolve_config(&cli)?;
    cli.apply_overrides(&mut config);

    // 4. Load, analyze, map, write
    let written = pipeline::run(&config)?;

    println!(
        "LED animation data generated: {written} records saved to {}",
        config.output_path.display()
    );
    Ok(())
}
