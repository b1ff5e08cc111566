use crate::reports;
use clap::Args;
use pitchspell::{SpellResult, TonalityCatalog};
use serde::Serialize;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct DistancesArgs {
    /// Preset catalog size
    #[arg(long, default_value_t = 30)]
    pub catalog: usize,

    /// Show ranks instead of raw distances
    #[arg(long, default_value_t = false)]
    pub ranks: bool,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Serialize)]
struct Matrix {
    keys: Vec<String>,
    ranks: bool,
    values: Vec<Vec<usize>>,
}

pub fn run(args: DistancesArgs) -> SpellResult<()> {
    let catalog = TonalityCatalog::preset(args.catalog)?;
    info!(
        "📐 {} matrix, {} keys ({:?} family)",
        if args.ranks { "Rank" } else { "Distance" },
        catalog.len(),
        catalog.family()
    );

    if !args.json {
        return reports::print_matrix(&catalog, args.ranks);
    }

    let n = catalog.len();
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        let row = (0..n)
            .map(|j| {
                if args.ranks {
                    catalog.rank(i, j)
                } else {
                    catalog.distance(i, j).map(|d| d as usize)
                }
            })
            .collect::<SpellResult<Vec<usize>>>()?;
        values.push(row);
    }
    let matrix = Matrix {
        keys: catalog.keys().map(|k| k.to_string()).collect(),
        ranks: args.ranks,
        values,
    };
    println!("{}", serde_json::to_string_pretty(&matrix)?);
    Ok(())
}
