mod config;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gwmp_json::encode;
use gwmp_json::fixtures::{hex_dump, write_fixture, Scenario};

#[derive(Parser)]
#[command(name = "gwmp-fixtures")]
#[command(about = "Generate golden packet-forwarder JSON fixtures (rxpk, stat, txpk)")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Output directory (overrides the config file)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Scenarios to generate (default: all)
    #[arg(short, long, value_enum)]
    scenario: Vec<Scenario>,

    /// Print the encoded messages without writing files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config from {:?}: {}", cli.config, e);
        eprintln!("Using default configuration");
        config::Config::default()
    });

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("gwmp-fixtures v{}", env!("CARGO_PKG_VERSION"));

    let out_dir = cli.out_dir.unwrap_or(config.fixtures.out_dir);
    let scenarios = if cli.scenario.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        cli.scenario
    };

    for scenario in scenarios {
        let payload = scenario.build()?;
        let encoded = encode(&payload)?;

        println!("{}:       {}", scenario.label(), String::from_utf8_lossy(&encoded));
        println!("Raw {}:      {}", scenario.label(), hex_dump(&encoded));
        println!();

        if cli.dry_run {
            info!("Dry run: not writing {}", scenario.file_name());
            continue;
        }
        write_fixture(&out_dir, scenario, &encoded).await?;
    }

    info!("Done.");
    Ok(())
}
