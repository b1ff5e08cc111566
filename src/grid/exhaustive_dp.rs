use super::{backfill, first_nonempty, local_ranks, GridBuilder};
use crate::catalog::TonalityCatalog;
use crate::error::{check_index, SpellResult};
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use tracing::{debug, error, warn};

const UNREACHABLE: u64 = u64::MAX;

/// Best path through the bars, by filling a cost table column by column.
///
/// A path pays, at every bar, the rank of its key seen from the previous
/// key (the global key before the first bar) plus the rank of the bar's
/// bag cost for that key. Bars without notes keep the key for free.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveDp;

impl ExhaustiveDp {
    /// Costs of the first column when the path starts from a global key.
    fn seed_from_global(
        catalog: &TonalityCatalog,
        global: usize,
        local: Option<&[usize]>,
    ) -> SpellResult<Vec<u64>> {
        let n = catalog.len();
        match local {
            None => {
                let mut cost = vec![UNREACHABLE; n];
                cost[global] = 0;
                Ok(cost)
            }
            Some(local) => {
                let from_global = catalog.rank_row(global)?;
                Ok((0..n)
                    .map(|k| from_global[k] as u64 + local[k] as u64)
                    .collect())
            }
        }
    }

    /// One transition: best predecessor for every key of a bar with notes.
    /// Ties go to the cheapest predecessor, then to the smallest index.
    fn step(
        catalog: &TonalityCatalog,
        prev: &[u64],
        local: &[usize],
    ) -> SpellResult<(Vec<u64>, Vec<usize>)> {
        let n = prev.len();
        let mut cost = vec![UNREACHABLE; n];
        let mut pred = vec![0usize; n];
        for (kp, &base) in prev.iter().enumerate() {
            if base == UNREACHABLE {
                continue;
            }
            let ranks = catalog.rank_row(kp)?;
            for k in 0..n {
                let total = base + ranks[k] as u64 + local[k] as u64;
                let better = total < cost[k] || (total == cost[k] && base < prev[pred[k]]);
                if better {
                    cost[k] = total;
                    pred[k] = kp;
                }
            }
        }
        Ok((cost, pred))
    }
}

impl GridBuilder for ExhaustiveDp {
    fn build_row<V: SpellingVector>(
        &self,
        table: &SpellingTable<V>,
        catalog: &TonalityCatalog,
        global: Option<usize>,
    ) -> SpellResult<Vec<KeyIndex>> {
        let bars = table.bars();
        let mut row = vec![KeyIndex::Unset; bars];
        if super::is_degenerate(table, catalog) {
            return Ok(row);
        }
        let n = catalog.len();
        let ranks = local_ranks(table);

        let (start, mut cost) = match global {
            Some(g) => {
                check_index(g, n)?;
                (0, Self::seed_from_global(catalog, g, ranks[0].as_deref())?)
            }
            None => match first_nonempty(&ranks) {
                Some(s) => {
                    let local = ranks[s].as_deref().unwrap_or_default();
                    (s, local.iter().map(|&r| r as u64).collect())
                }
                None => {
                    warn!("ExhaustiveDp: every bar is empty, no local key");
                    row.fill(KeyIndex::Failed);
                    return Ok(row);
                }
            },
        };

        // preds[j - start - 1][k]: key at bar j-1 on the best path to k at bar j
        let mut preds: Vec<Vec<usize>> = Vec::with_capacity(bars - start);
        for local in ranks.iter().skip(start + 1) {
            match local {
                None => preds.push((0..n).collect()),
                Some(local) => {
                    let (next, pred) = Self::step(catalog, &cost, local)?;
                    cost = next;
                    preds.push(pred);
                }
            }
        }

        let Some(min) = cost.iter().copied().filter(|&c| c != UNREACHABLE).min() else {
            error!("ExhaustiveDp: no path reaches the last bar");
            row.fill(KeyIndex::Failed);
            return Ok(row);
        };
        let winners: Vec<usize> = (0..n).filter(|&k| cost[k] == min).collect();
        if winners.len() > 1 {
            debug!(
                "ExhaustiveDp: {} best paths of cost {}, keeping key {}",
                winners.len(),
                min,
                winners[0]
            );
        }

        let mut k = winners[0];
        row[bars - 1] = KeyIndex::Valid(k);
        for j in (start + 1..bars).rev() {
            k = preds[j - start - 1][k];
            row[j - 1] = KeyIndex::Valid(k);
        }
        backfill(&mut row, start);
        Ok(row)
    }
}
