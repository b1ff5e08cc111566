use super::{backfill, first_nonempty, local_ranks, GridBuilder};
use crate::catalog::TonalityCatalog;
use crate::error::{check_index, SpellResult};
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::{debug, error, warn};

/// Best path through the bars, by uniform-cost search over (key, bar)
/// states. Same objective as [`super::ExhaustiveDp`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSearch;

/// A key at a bar, reached at some cost. States live in an arena and
/// point to their predecessor by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridState {
    key: usize,
    bar: usize,
    cost: u64,
    predecessor: Option<usize>,
}

/// Heap entry: cheapest first, then deepest bar, then smallest key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frontier {
    cost: u64,
    bar: usize,
    key: usize,
    state: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap pops the greatest
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.bar.cmp(&other.bar))
            .then_with(|| other.key.cmp(&self.key))
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Search {
    states: Vec<GridState>,
    heap: BinaryHeap<Frontier>,
    visited: Vec<Vec<bool>>,
}

impl Search {
    fn new(keys: usize, bars: usize) -> Self {
        Self {
            states: Vec::new(),
            heap: BinaryHeap::new(),
            visited: vec![vec![false; bars]; keys],
        }
    }

    fn record(&mut self, state: GridState) -> usize {
        self.states.push(state);
        self.states.len() - 1
    }

    fn push(&mut self, state: GridState) {
        let id = self.record(state);
        self.heap.push(Frontier {
            cost: state.cost,
            bar: state.bar,
            key: state.key,
            state: id,
        });
    }

    /// Key per bar along the predecessor chain ending at `last`.
    fn walk(&self, last: usize, row: &mut [KeyIndex]) {
        let mut cursor = Some(last);
        while let Some(id) = cursor {
            let st = &self.states[id];
            row[st.bar] = KeyIndex::Valid(st.key);
            cursor = st.predecessor;
        }
    }
}

impl GridBuilder for ExhaustiveSearch {
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
        let last = bars - 1;
        let ranks = local_ranks(table);
        let mut search = Search::new(n, bars);

        let start = match global {
            Some(g) => {
                check_index(g, n)?;
                match &ranks[0] {
                    None => search.push(GridState { key: g, bar: 0, cost: 0, predecessor: None }),
                    Some(local) => {
                        let from_global = catalog.rank_row(g)?;
                        for k in 0..n {
                            let cost = from_global[k] as u64 + local[k] as u64;
                            search.push(GridState { key: k, bar: 0, cost, predecessor: None });
                        }
                    }
                }
                0
            }
            None => {
                let Some(s) = first_nonempty(&ranks) else {
                    warn!("ExhaustiveSearch: every bar is empty, no local key");
                    row.fill(KeyIndex::Failed);
                    return Ok(row);
                };
                if let Some(local) = &ranks[s] {
                    for (k, &r) in local.iter().enumerate() {
                        search.push(GridState {
                            key: k,
                            bar: s,
                            cost: r as u64,
                            predecessor: None,
                        });
                    }
                }
                s
            }
        };

        let mut best: Option<u64> = None;
        let mut winners: Vec<usize> = Vec::new();
        let mut expanded = 0usize;

        'pop: while let Some(top) = search.heap.pop() {
            let st = search.states[top.state];
            if best.is_some_and(|b| st.cost > b) {
                break;
            }
            if search.visited[st.key][st.bar] {
                continue;
            }
            search.visited[st.key][st.bar] = true;
            if st.bar == last {
                best.get_or_insert(st.cost);
                winners.push(top.state);
                continue;
            }
            expanded += 1;

            // bars without notes: same key, same cost
            let mut from = top.state;
            let mut bar = st.bar + 1;
            while ranks[bar].is_none() {
                let chained = GridState {
                    key: st.key,
                    bar,
                    cost: st.cost,
                    predecessor: Some(from),
                };
                if bar == last {
                    search.push(chained);
                    continue 'pop;
                }
                if search.visited[st.key][bar] {
                    continue 'pop;
                }
                search.visited[st.key][bar] = true;
                from = search.record(chained);
                bar += 1;
            }

            if let Some(local) = &ranks[bar] {
                let from_key = catalog.rank_row(st.key)?;
                for k in 0..n {
                    if search.visited[k][bar] {
                        continue;
                    }
                    let cost = st.cost + from_key[k] as u64 + local[k] as u64;
                    search.push(GridState { key: k, bar, cost, predecessor: Some(from) });
                }
            }
        }

        let Some(&winner) = winners.first() else {
            error!("ExhaustiveSearch: no path reaches the last bar");
            row.fill(KeyIndex::Failed);
            return Ok(row);
        };
        debug!(
            "ExhaustiveSearch: cost {:?}, {} states expanded, {} created",
            best,
            expanded,
            search.states.len()
        );
        if winners.len() > 1 {
            warn!(
                "ExhaustiveSearch: {} best paths of equal cost, keeping the first",
                winners.len()
            );
        }

        search.walk(winner, &mut row);
        backfill(&mut row, start);
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::fixtures::{line_catalog, table};
    use crate::grid::{path_cost, ExhaustiveDp};

    fn valid(keys: &[usize]) -> Vec<KeyIndex> {
        keys.iter().map(|&k| KeyIndex::Valid(k)).collect()
    }

    #[test]
    fn heap_pops_cheapest_then_deepest() {
        let mut heap = BinaryHeap::new();
        heap.push(Frontier { cost: 3, bar: 0, key: 0, state: 0 });
        heap.push(Frontier { cost: 1, bar: 0, key: 2, state: 1 });
        heap.push(Frontier { cost: 1, bar: 2, key: 5, state: 2 });
        heap.push(Frontier { cost: 1, bar: 2, key: 1, state: 3 });
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop()).map(|f| f.state).collect();
        assert_eq!(order, vec![3, 2, 1, 0]);
    }

    #[test]
    fn finds_the_cheapest_path() {
        let cat = line_catalog();
        let t = table(&cat, &[Some([2, 1, 0]), Some([0, 1, 2])]);
        let row = ExhaustiveSearch.build_row(&t, &cat, Some(0)).unwrap();
        assert_eq!(row, valid(&[0, 0]));
    }

    #[test]
    fn agrees_with_table_filling_on_cost() {
        let cat = line_catalog();
        let bars = [
            None,
            Some([2, 1, 0]),
            None,
            Some([0, 1, 2]),
            Some([1, 0, 1]),
            None,
        ];
        let t = table(&cat, &bars);
        for global in [None, Some(0), Some(1), Some(2)] {
            let search = ExhaustiveSearch.build_row(&t, &cat, global).unwrap();
            let dp = ExhaustiveDp.build_row(&t, &cat, global).unwrap();
            assert!(search.iter().all(KeyIndex::is_valid));
            assert_eq!(
                path_cost(&t, &cat, global, &search).unwrap(),
                path_cost(&t, &cat, global, &dp).unwrap(),
                "global {:?}",
                global
            );
        }
    }

    #[test]
    fn single_empty_bar_with_global() {
        let cat = line_catalog();
        let t = table(&cat, &[None]);
        assert_eq!(ExhaustiveSearch.build_row(&t, &cat, Some(2)).unwrap(), valid(&[2]));
        assert_eq!(
            ExhaustiveSearch.build_row(&t, &cat, None).unwrap(),
            vec![KeyIndex::Failed]
        );
    }

    #[test]
    fn trailing_empty_bars_are_filled() {
        let cat = line_catalog();
        let t = table(&cat, &[Some([3, 3, 0]), None, None]);
        let row = ExhaustiveSearch.build_row(&t, &cat, None).unwrap();
        assert_eq!(row, valid(&[2, 2, 2]));
    }
}
