use crate::reports;
use clap::Args;
use pitchspell::cost::AccidCost;
use pitchspell::verifier::{cross_check, CrossCheck};
use pitchspell::{CostColumn, SpellError, SpellResult, SpellingTable, TonalityCatalog};
use tracing::{info, warn};

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    #[arg(long, default_value_t = 30)]
    pub catalog: usize,

    #[arg(short, long, default_value_t = 20)]
    pub rounds: usize,

    #[arg(short, long, default_value_t = 8)]
    pub bars: usize,

    /// Percent of bars without notes
    #[arg(long, default_value_t = 20)]
    pub empty_rate: u32,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

fn random_column(rng: &mut fastrand::Rng, keys: usize, empty_rate: u32) -> CostColumn<AccidCost> {
    if rng.u32(0..100) < empty_rate {
        return CostColumn::empty(keys);
    }
    CostColumn::new(
        (0..keys)
            .map(|_| {
                if rng.u8(0..10) == 0 {
                    None
                } else {
                    Some(AccidCost::new(rng.u32(0..8)))
                }
            })
            .collect(),
    )
}

pub fn run(args: VerifyArgs) -> SpellResult<()> {
    let catalog = TonalityCatalog::preset(args.catalog)?;
    let mut rng = match args.seed {
        Some(s) => fastrand::Rng::with_seed(s),
        None => fastrand::Rng::new(),
    };
    info!(
        "🔎 Cross-checking {} random table(s), {} bars, {} keys",
        args.rounds,
        args.bars,
        catalog.len()
    );

    let mut checks: Vec<CrossCheck> = Vec::with_capacity(args.rounds);
    for _ in 0..args.rounds {
        let columns = (0..args.bars)
            .map(|_| random_column(&mut rng, catalog.len(), args.empty_rate))
            .collect();
        let table = SpellingTable::new(columns, &catalog)?;
        let global = if catalog.is_empty() || rng.bool() {
            None
        } else {
            Some(rng.usize(0..catalog.len()))
        };
        checks.push(cross_check(&table, &catalog, global)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
    } else {
        reports::print_cross_checks(&checks);
    }

    let failed = checks.iter().filter(|c| !c.agrees()).count();
    if failed > 0 {
        warn!("❌ {} of {} round(s) disagree", failed, checks.len());
        return Err(SpellError::Validation(format!(
            "{} cross-check mismatch(es)",
            failed
        )));
    }
    info!("✅ All {} round(s) agree", checks.len());
    Ok(())
}
