use super::{backfill, tiebreak, GridBuilder};
use crate::catalog::TonalityCatalog;
use crate::error::SpellResult;
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use tracing::{trace, warn};

/// Bar by bar: the cheapest keys of each bar, then tie-breaks against
/// the previous bar's choice and the global key. A strictly cheaper key
/// always wins over a closer one.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyBest;

impl GridBuilder for GreedyBest {
    fn build_row<V: SpellingVector>(
        &self,
        table: &SpellingTable<V>,
        catalog: &TonalityCatalog,
        global: Option<usize>,
    ) -> SpellResult<Vec<KeyIndex>> {
        let mut row = vec![KeyIndex::Unset; table.bars()];
        if super::is_degenerate(table, catalog) {
            return Ok(row);
        }

        let mut previous = global;
        let mut first_choice = None;
        for (j, col) in table.columns().iter().enumerate() {
            let cands = col.cost_tied_minimum(0.0);
            // empty bar: keep the previous local key
            let Some(pick) = tiebreak::break_ties(catalog, &cands, previous, global)? else {
                row[j] = previous.map_or(KeyIndex::Unset, KeyIndex::Valid);
                continue;
            };
            trace!("GreedyBest bar {}: {} candidate(s), picked {}", j, cands.len(), pick);
            row[j] = KeyIndex::Valid(pick);
            previous = Some(pick);
            first_choice.get_or_insert(j);
        }

        if global.is_none() {
            match first_choice {
                Some(start) => backfill(&mut row, start),
                None => {
                    warn!("GreedyBest: every bar is empty, no local key");
                    row.fill(KeyIndex::Failed);
                }
            }
        }
        Ok(row)
    }
}
