use super::{backfill, tiebreak, GridBuilder};
use crate::catalog::TonalityCatalog;
use crate::error::SpellResult;
use crate::rank;
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use tracing::{trace, warn};

/// Bar by bar: minimal sum of three ranks (bag cost, distance to the
/// previous choice, distance to the global key).
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRank;

impl GreedyRank {
    fn select(
        &self,
        catalog: &TonalityCatalog,
        cost_ranks: &[usize],
        previous: Option<usize>,
        global: Option<usize>,
    ) -> SpellResult<Option<usize>> {
        let mut sums = cost_ranks.to_vec();
        for anchor in [previous, global].into_iter().flatten() {
            let ranks = catalog.rank_row(anchor)?;
            for (s, r) in sums.iter_mut().zip(ranks) {
                *s += r;
            }
        }

        let best = rank::argmin_set(&sums);
        let filtered = prefer_tonal(catalog, &best)?;
        tiebreak::break_ties(catalog, &filtered, previous, global)
    }
}

/// Major/minor candidates first, then the other non-blues candidates
/// whose signature no major/minor candidate has. Blues candidates are
/// dropped unless nothing else is left.
fn prefer_tonal(catalog: &TonalityCatalog, cands: &[usize]) -> SpellResult<Vec<usize>> {
    let mut tonal = Vec::new();
    let mut signatures = Vec::new();
    for &c in cands {
        let key = catalog.key(c)?;
        if key.is_tonal() {
            tonal.push(c);
            signatures.push(key.signature());
        }
    }

    let mut kept = tonal;
    for &c in cands {
        let key = catalog.key(c)?;
        let uncovered = !signatures.contains(&key.signature());
        if !key.is_tonal() && !key.mode().is_blues() && uncovered {
            kept.push(c);
        }
    }

    if kept.is_empty() && !cands.is_empty() {
        warn!("GreedyRank: only blues candidates, keeping all {}", cands.len());
        return Ok(cands.to_vec());
    }
    Ok(kept)
}

impl GridBuilder for GreedyRank {
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
            if col.is_empty() {
                row[j] = previous.map_or(KeyIndex::Unset, KeyIndex::Valid);
                continue;
            }
            match self.select(catalog, &col.dense_cost_ranks(), previous, global)? {
                Some(pick) => {
                    trace!("GreedyRank bar {}: picked {}", j, pick);
                    row[j] = KeyIndex::Valid(pick);
                    previous = Some(pick);
                    first_choice.get_or_insert(j);
                }
                None => {
                    warn!("GreedyRank bar {}: no candidate left", j);
                    row[j] = KeyIndex::Failed;
                }
            }
        }

        if global.is_none() {
            match first_choice {
                Some(start) => backfill(&mut row, start),
                None => {
                    warn!("GreedyRank: every bar is empty, no local key");
                    row.fill(KeyIndex::Failed);
                }
            }
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::AccidCost;
    use crate::table::CostColumn;
    use crate::ton::{Key, Mode};

    fn idx(cat: &TonalityCatalog, s: i8, m: Mode) -> usize {
        cat.find(&Key::new(s, m).unwrap()).unwrap()
    }

    #[test]
    fn rank_sum_balances_cost_and_proximity() {
        let cat = TonalityCatalog::preset(30).unwrap();
        let c = idx(&cat, 0, Mode::Major);
        let fs = idx(&cat, 6, Mode::Major);
        // F# major is cheapest but far from C; C is second cheapest
        let mut costs = vec![AccidCost::new(9); 30];
        costs[fs] = AccidCost::new(0);
        costs[c] = AccidCost::new(1);
        let table = SpellingTable::new(vec![CostColumn::from_costs(costs)], &cat).unwrap();
        let row = GreedyRank.build_row(&table, &cat, Some(c)).unwrap();
        assert_eq!(row, vec![KeyIndex::Valid(c)]);
    }

    #[test]
    fn tonal_candidates_win_over_modes() {
        let cat = TonalityCatalog::preset(135).unwrap();
        let d_dor = idx(&cat, 0, Mode::Dorian);
        let c_maj = idx(&cat, 0, Mode::Major);
        let picked = prefer_tonal(&cat, &[d_dor, c_maj]).unwrap();
        assert_eq!(picked, vec![c_maj]);
        let modal_only = prefer_tonal(&cat, &[d_dor]).unwrap();
        assert_eq!(modal_only, vec![d_dor]);
    }

    #[test]
    fn modes_with_a_new_signature_join_the_tonal_candidates() {
        let cat = TonalityCatalog::preset(135).unwrap();
        let c_maj = idx(&cat, 0, Mode::Major);
        let a_min = idx(&cat, 0, Mode::Minor);
        let d_dor = idx(&cat, 0, Mode::Dorian);
        let dorian_a = idx(&cat, 3, Mode::Dorian);
        let melodic_a = idx(&cat, 3, Mode::MinorMelodic);
        let picked = prefer_tonal(&cat, &[dorian_a, c_maj, d_dor, a_min, melodic_a]).unwrap();
        assert_eq!(picked, vec![c_maj, a_min, dorian_a, melodic_a]);
    }

    #[test]
    fn blues_candidates_are_dropped() {
        let cat = TonalityCatalog::preset(165).unwrap();
        let c_maj = idx(&cat, 0, Mode::Major);
        let blues_d = idx(&cat, 2, Mode::MajorBlues);
        assert_eq!(prefer_tonal(&cat, &[blues_d, c_maj]).unwrap(), vec![c_maj]);
        // nothing else left: keep them
        assert_eq!(prefer_tonal(&cat, &[blues_d]).unwrap(), vec![blues_d]);
    }

    #[test]
    fn empty_bar_keeps_previous() {
        let cat = TonalityCatalog::preset(26).unwrap();
        let mut costs = vec![AccidCost::new(4); 26];
        costs[9] = AccidCost::new(0);
        let cols = vec![CostColumn::from_costs(costs), CostColumn::empty(26)];
        let table = SpellingTable::new(cols, &cat).unwrap();
        let row = GreedyRank.build_row(&table, &cat, None).unwrap();
        assert_eq!(row, vec![KeyIndex::Valid(9), KeyIndex::Valid(9)]);
    }
}
