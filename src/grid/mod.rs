pub mod exhaustive_dp;
pub mod exhaustive_search;
pub mod greedy_best;
pub mod greedy_rank;
pub mod tiebreak;

pub use exhaustive_dp::ExhaustiveDp;
pub use exhaustive_search::ExhaustiveSearch;
pub use greedy_best::GreedyBest;
pub use greedy_rank::GreedyRank;

use crate::catalog::TonalityCatalog;
use crate::error::{check_index, SpellError, SpellResult};
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use rayon::prelude::*;
use serde::Serialize;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, warn};

/// Algorithms assigning a local key to every bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum GridStrategy {
    /// Bar by bar, best cost with tie-breaks.
    GreedyBest,
    /// Bar by bar, sum of ranks.
    GreedyRank,
    /// Best path, table filling.
    ExhaustiveDp,
    /// Best path, priority queue search.
    ExhaustiveSearch,
}

/// One row of local keys, for an assumed global key (or none).
pub trait GridBuilder: Sync {
    fn build_row<V: SpellingVector>(
        &self,
        table: &SpellingTable<V>,
        catalog: &TonalityCatalog,
        global: Option<usize>,
    ) -> SpellResult<Vec<KeyIndex>>;
}

/// Local keys per (global candidate, bar). A modal grid has a single row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalTonalityGrid {
    strategy: GridStrategy,
    modal: bool,
    bars: usize,
    rows: Vec<Vec<KeyIndex>>,
}

impl LocalTonalityGrid {
    fn unset(strategy: GridStrategy, modal: bool, rows: usize, bars: usize) -> Self {
        Self {
            strategy,
            modal,
            bars,
            rows: vec![vec![KeyIndex::Unset; bars]; rows],
        }
    }

    pub fn strategy(&self) -> GridStrategy {
        self.strategy
    }

    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn bars(&self) -> usize {
        self.bars
    }

    /// Number of rows: catalog size, or 1 for a modal grid.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, global: usize) -> SpellResult<&[KeyIndex]> {
        check_index(global, self.rows.len())?;
        Ok(&self.rows[global])
    }

    /// Local key at a bar, assuming the global key of row `global`.
    pub fn local(&self, global: usize, bar: usize) -> SpellResult<KeyIndex> {
        let row = self.row(global)?;
        check_index(bar, row.len())?;
        Ok(row[bar])
    }
}

/// Runs a strategy for every key currently eligible as global.
pub fn build<V: SpellingVector>(
    strategy: GridStrategy,
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
) -> SpellResult<LocalTonalityGrid> {
    check_shape(table, catalog)?;
    let mut grid = LocalTonalityGrid::unset(strategy, false, catalog.len(), table.bars());
    if is_degenerate(table, catalog) {
        return Ok(grid);
    }

    let globals = catalog.eligible_indices();
    debug!("Grid {}: {} global candidate row(s)", strategy, globals.len());

    let rows = globals
        .par_iter()
        .map(|&g| dispatch(strategy, table, catalog, Some(g)).map(|row| (g, row)))
        .collect::<SpellResult<Vec<_>>>()?;
    for (g, row) in rows {
        grid.rows[g] = row;
    }
    Ok(grid)
}

/// Single row with no assumed global key.
pub fn build_modal<V: SpellingVector>(
    strategy: GridStrategy,
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
) -> SpellResult<LocalTonalityGrid> {
    check_shape(table, catalog)?;
    let mut grid = LocalTonalityGrid::unset(strategy, true, 1, table.bars());
    if is_degenerate(table, catalog) {
        return Ok(grid);
    }
    grid.rows[0] = dispatch(strategy, table, catalog, None)?;
    Ok(grid)
}

fn dispatch<V: SpellingVector>(
    strategy: GridStrategy,
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
    global: Option<usize>,
) -> SpellResult<Vec<KeyIndex>> {
    match strategy {
        GridStrategy::GreedyBest => GreedyBest.build_row(table, catalog, global),
        GridStrategy::GreedyRank => GreedyRank.build_row(table, catalog, global),
        GridStrategy::ExhaustiveDp => ExhaustiveDp.build_row(table, catalog, global),
        GridStrategy::ExhaustiveSearch => ExhaustiveSearch.build_row(table, catalog, global),
    }
}

fn check_shape<V: SpellingVector>(
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
) -> SpellResult<()> {
    if !catalog.is_closed() {
        return Err(SpellError::CatalogOpen);
    }
    if table.keys() != catalog.len() {
        return Err(SpellError::Validation(format!(
            "table has {} rows, catalog has {} keys",
            table.keys(),
            catalog.len()
        )));
    }
    Ok(())
}

/// No keys or no bars: nothing to compute.
pub(crate) fn is_degenerate<V: SpellingVector>(
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
) -> bool {
    if catalog.is_empty() {
        warn!("Grid computation: no keys, the grid is empty");
        return true;
    }
    if table.bars() == 0 {
        warn!("Grid computation: no bars, the grid is empty");
        return true;
    }
    false
}

/// Rank of every bag cost per bar, `None` for bars without notes.
pub(crate) fn local_ranks<V: SpellingVector>(table: &SpellingTable<V>) -> Vec<Option<Vec<usize>>> {
    table
        .columns()
        .iter()
        .map(|col| {
            if col.is_empty() {
                None
            } else {
                Some(col.dense_cost_ranks())
            }
        })
        .collect()
}

pub(crate) fn first_nonempty(ranks: &[Option<Vec<usize>>]) -> Option<usize> {
    ranks.iter().position(Option::is_some)
}

/// Bars before `start` take the key chosen at `start`.
pub(crate) fn backfill(row: &mut [KeyIndex], start: usize) {
    if let Some(&first) = row.get(start) {
        for cell in row.iter_mut().take(start) {
            *cell = first;
        }
    }
}

/// Total cost of a row under the exhaustive strategies' objective:
/// transition rank plus local rank per bar, from the global key (if any).
/// Empty bars cost the transition only.
pub fn path_cost<V: SpellingVector>(
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
    global: Option<usize>,
    row: &[KeyIndex],
) -> SpellResult<u64> {
    if row.len() != table.bars() {
        return Err(SpellError::Validation(format!(
            "row has {} bars, table has {}",
            row.len(),
            table.bars()
        )));
    }
    let ranks = local_ranks(table);
    let start = match global {
        Some(_) => 0,
        None => first_nonempty(&ranks).unwrap_or(table.bars()),
    };

    let mut prev = global;
    let mut total = 0u64;
    for (j, cell) in row.iter().enumerate().skip(start) {
        let k = cell.index().ok_or_else(|| {
            SpellError::Validation(format!("bar {} has no local key ({})", j, cell))
        })?;
        if let Some(p) = prev {
            total += catalog.rank(p, k)? as u64;
        }
        if let Some(local) = &ranks[j] {
            total += local[k] as u64;
        }
        prev = Some(k);
    }
    Ok(total)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::catalog::TonalityCatalog;
    use crate::cost::AccidCost;
    use crate::table::{CostColumn, SpellingTable};
    use crate::ton::{Key, Mode};

    /// C, G and D major, distance = signature difference.
    /// Rank rows: C [0,1,2], G [1,0,1], D [2,1,0].
    pub fn line_catalog() -> TonalityCatalog {
        let mut cat = TonalityCatalog::new();
        for s in [2, 0, 1] {
            cat.add(Key::new(s, Mode::Major).unwrap(), true).unwrap();
        }
        cat.close_with(|a, b| Ok((a.signature() - b.signature()).unsigned_abs() as u32))
            .unwrap();
        cat
    }

    pub fn table(
        cat: &TonalityCatalog,
        bars: &[Option<[u32; 3]>],
    ) -> SpellingTable<CostColumn<AccidCost>> {
        let cols = bars
            .iter()
            .map(|b| match b {
                Some(costs) => {
                    CostColumn::from_costs(costs.iter().map(|&c| AccidCost::new(c)).collect())
                }
                None => CostColumn::empty(3),
            })
            .collect();
        SpellingTable::new(cols, cat).unwrap()
    }
}
