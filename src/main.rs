use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use strata::cache::from_settings;
use strata::config::Settings;

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Overlay file-system resolution cache with live change tracking")]
struct Cli {
    /// Overlay root directories, highest precedence first (overrides config)
    #[arg(short, long = "root", global = true)]
    roots: Vec<PathBuf>,

    /// Name of the indexed subtree under each root (overrides config)
    #[arg(long, global = true)]
    subtree: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every file providing a resource, highest precedence first
    Overlays {
        /// Resource name, e.g. x/y.txt
        name: String,
    },

    /// Resolve a resource to its highest-precedence file
    Resolve {
        /// Resource name, e.g. x/y.txt
        name: String,
    },

    /// Watch the roots and print change batches as they arrive
    Watch {
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to load configuration")?;
    if !cli.roots.is_empty() {
        settings.roots = cli.roots.clone();
    }
    if let Some(subtree) = &cli.subtree {
        settings.indexed_subtree = subtree.clone();
    }

    strata::logging::init_with_config(&settings.logging);

    anyhow::ensure!(
        !settings.roots.is_empty(),
        "no overlay roots configured; pass --root or set `roots` in strata.toml"
    );

    let cache = from_settings(&settings);

    match cli.command {
        Commands::Overlays { name } => {
            for path in cache.path_overlays(&name)? {
                println!("{}", path.display());
            }
        }
        Commands::Resolve { name } => match cache.resolve_file(&name)? {
            Some(path) => println!("{}", path.display()),
            None => {
                eprintln!("{name}: no overlay provides this resource");
                std::process::exit(1);
            }
        },
        Commands::Watch { interval_ms } => {
            let mut updates = cache.get_updates();
            println!("watching; + created, ~ changed, - deleted");
            loop {
                cache.fetch_updates();
                for batch in updates.by_ref() {
                    for path in batch.creations() {
                        println!("+ {}", path.display());
                    }
                    for path in batch.changes() {
                        println!("~ {}", path.display());
                    }
                    for path in batch.deletions() {
                        println!("- {}", path.display());
                    }
                }
                std::thread::sleep(Duration::from_millis(interval_ms));
            }
        }
    }

    Ok(())
}
