//! `waffles`: generate Digital Elevation Models from scattered sources.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use waffles_runner::{run, Cli};

fn main() {
    let cli = Cli::parse();
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if cli.modules {
        let registry = waffles_modules::ModuleRegistry::builtin();
        for (name, describe) in registry.describe_all() {
            println!("{name:<12} {describe}");
        }
        return;
    }

    if let Err(e) = try_main(&cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn try_main(cli: &Cli) -> waffles_runner::Result<()> {
    let config = cli.to_config()?;
    if let Some(path) = &cli.save_config {
        config.save(path)?;
    }
    for path in run(&config)? {
        println!("{}", path.display());
    }
    Ok(())
}
