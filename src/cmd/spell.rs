use crate::reports;
use clap::Args;
use pitchspell::config::{Config, EngineOptions};
use pitchspell::cost::{AccidCost, AccidDistLex, AccidDistSum, Cost, CostType, ParseCost};
use pitchspell::table::loader::load_columns;
use pitchspell::{SpellResult, Speller, SpellingTable, TonalityCatalog};
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SpellArgs {
    #[command(flatten)]
    pub config: Config,

    /// CSV cost table: one record per bar, one field per catalog key
    #[arg(short, long)]
    pub input: String,

    /// Print the outcome as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Number of keys shown in the row cost table
    #[arg(long, default_value_t = 12)]
    pub top: usize,
}

pub fn run(args: SpellArgs) -> SpellResult<()> {
    match args.config.input.cost_type {
        CostType::Accid => spell::<AccidCost>(&args),
        CostType::AdLex => spell::<AccidDistLex>(&args),
        CostType::AdPlus => spell::<AccidDistSum>(&args),
    }
}

fn spell<C: Cost + ParseCost>(args: &SpellArgs) -> SpellResult<()> {
    let mut catalog = TonalityCatalog::preset(args.config.engine.catalog)?;
    info!(
        "🎼 Catalog: {} keys, strategy {}, costs {}",
        catalog.len(),
        args.config.engine.strategy,
        args.config.input.cost_type
    );

    let columns = load_columns::<C>(&args.input, catalog.len(), args.config.input.header)?;
    let mut table = SpellingTable::new(columns, &catalog)?;

    let speller = Speller::new(EngineOptions::from(&args.config));
    let outcome = speller.run(&mut table, &mut catalog)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    reports::print_row_costs(&table, &catalog, args.top)?;
    reports::print_grid(&outcome.grid, &catalog)?;
    reports::print_outcome(&outcome, &catalog);
    Ok(())
}
