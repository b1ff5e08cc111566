use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Choose global and local keys for a cost table
    Spell(cmd::spell::SpellArgs),
    /// Print the key distance matrix of a catalog
    Distances(cmd::distances::DistancesArgs),
    /// Compare the two exhaustive strategies on random tables
    Verify(cmd::verify::VerifyArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Initializing pitchspell...");

    let result = match cli.command {
        Commands::Spell(args) => cmd::spell::run(args),
        Commands::Distances(args) => cmd::distances::run(args),
        Commands::Verify(args) => cmd::verify::run(args),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
