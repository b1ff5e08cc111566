pub mod column;
pub mod loader;

pub use column::CostColumn;

use crate::catalog::TonalityCatalog;
use crate::cost::Cost;
use crate::error::{check_index, SpellError, SpellResult};
use crate::grid::LocalTonalityGrid;
use crate::rank;
use crate::ton::KeyIndex;
use std::cmp::Ordering;
use tracing::{debug, error, info, warn};

/// Per-bar source of spelling costs, one bag per catalog key.
pub trait SpellingVector: Send + Sync {
    type Cost: Cost;

    /// Number of bags (one per catalog key).
    fn size(&self) -> usize;

    /// The bar has no notes.
    fn is_empty(&self) -> bool;

    /// Cost of the best bag for a key, `None` when the bag is empty.
    fn bag_cost(&self, key: usize) -> Option<&Self::Cost>;

    /// Materializes the best spelling of the bar under the given key.
    fn rename(&mut self, key: usize) -> bool;

    /// Rank of every bag cost, ties sharing the smallest rank.
    /// Empty bags rank after every non-empty one.
    fn dense_cost_ranks(&self) -> Vec<usize> {
        rank::ranks_by(self.size(), |a, b| {
            match (self.bag_cost(a), self.bag_cost(b)) {
                (Some(ca), Some(cb)) => ca.compare(cb),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
    }

    fn min_cost(&self) -> Option<&Self::Cost> {
        (0..self.size())
            .filter_map(|i| self.bag_cost(i))
            .min_by(|a, b| a.compare(b))
    }

    /// Keys whose cost is the minimum, or within `tolerance` percent of it.
    fn cost_tied_minimum(&self, tolerance: f64) -> Vec<usize> {
        let Some(min) = self.min_cost() else {
            return Vec::new();
        };
        (0..self.size())
            .filter(|&i| {
                self.bag_cost(i)
                    .is_some_and(|c| c.within(min, tolerance))
            })
            .collect()
    }
}

/// One column per bar, one row per catalog key.
#[derive(Debug, Clone)]
pub struct SpellingTable<V: SpellingVector> {
    columns: Vec<V>,
    /// `None` for a key with no spelling in some bar that has notes.
    row_costs: Vec<Option<V::Cost>>,
}

impl<V: SpellingVector> SpellingTable<V> {
    pub fn new(columns: Vec<V>, catalog: &TonalityCatalog) -> SpellResult<Self> {
        if !catalog.is_closed() {
            return Err(SpellError::CatalogOpen);
        }
        if let Some((j, col)) = columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.size() != catalog.len())
        {
            return Err(SpellError::Validation(format!(
                "bar {} has {} bags, catalog has {} keys",
                j,
                col.size(),
                catalog.len()
            )));
        }

        let row_costs = (0..catalog.len())
            .map(|i| {
                let mut total = V::Cost::zero();
                for col in columns.iter().filter(|c| !c.is_empty()) {
                    total.add(col.bag_cost(i)?);
                }
                Some(total)
            })
            .collect();

        debug!("Spelling table: {} bars x {} keys", columns.len(), catalog.len());
        Ok(Self { columns, row_costs })
    }

    pub fn bars(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows (catalog keys).
    pub fn keys(&self) -> usize {
        self.row_costs.len()
    }

    pub fn column(&self, j: usize) -> SpellResult<&V> {
        check_index(j, self.columns.len())?;
        Ok(&self.columns[j])
    }

    pub fn columns(&self) -> &[V] {
        &self.columns
    }

    /// Sum of the best bag costs of a key over all bars, `None` when the
    /// key cannot spell one of the bars.
    pub fn row_cost(&self, i: usize) -> SpellResult<Option<&V::Cost>> {
        check_index(i, self.row_costs.len())?;
        Ok(self.row_costs[i].as_ref())
    }

    /// Sum of the bag costs of the local keys of a grid row. `None` when
    /// a bar with notes has no usable local key.
    pub fn grid_row_cost(&self, locals: &[KeyIndex]) -> Option<V::Cost> {
        if locals.len() != self.bars() {
            return None;
        }
        let mut total = V::Cost::zero();
        for (col, local) in self.columns.iter().zip(locals) {
            if col.is_empty() {
                continue;
            }
            total.add(col.bag_cost(local.index()?)?);
        }
        Some(total)
    }

    /// Marks as eligible every key whose row cost is minimal, or within
    /// `tolerance` percent of the minimum. With `refine`, only keys that
    /// are currently eligible compete. Keys without a row cost never do.
    /// Returns the number selected.
    pub fn select_global_candidates(
        &self,
        catalog: &mut TonalityCatalog,
        tolerance: f64,
        refine: bool,
    ) -> SpellResult<usize> {
        self.check_catalog(catalog)?;
        self.select_by(catalog, &self.row_costs, tolerance, refine, "Global selection")
    }

    /// Second selection among the current candidates, each one scored by
    /// the bag costs of the local keys its grid row assigns.
    pub fn refine_global_candidates(
        &self,
        catalog: &mut TonalityCatalog,
        grid: &LocalTonalityGrid,
        tolerance: f64,
    ) -> SpellResult<usize> {
        self.check_catalog(catalog)?;
        if grid.is_modal() || grid.rows() != self.keys() || grid.bars() != self.bars() {
            return Err(SpellError::Validation(format!(
                "grid of {} row(s) x {} bar(s) cannot refine a table of {} keys x {} bars",
                grid.rows(),
                grid.bars(),
                self.keys(),
                self.bars()
            )));
        }
        let costs = (0..self.keys())
            .map(|g| grid.row(g).map(|row| self.grid_row_cost(row)))
            .collect::<SpellResult<Vec<_>>>()?;
        self.select_by(catalog, &costs, tolerance, true, "Grid refinement")
    }

    fn check_catalog(&self, catalog: &TonalityCatalog) -> SpellResult<()> {
        if catalog.len() != self.keys() {
            return Err(SpellError::Validation(format!(
                "catalog has {} keys, table has {} rows",
                catalog.len(),
                self.keys()
            )));
        }
        Ok(())
    }

    fn select_by(
        &self,
        catalog: &mut TonalityCatalog,
        costs: &[Option<V::Cost>],
        tolerance: f64,
        refine: bool,
        stage: &str,
    ) -> SpellResult<usize> {
        let domain: Vec<bool> = (0..self.keys())
            .map(|i| -> SpellResult<bool> {
                Ok(costs[i].is_some() && (!refine || catalog.is_global_eligible(i)?))
            })
            .collect::<SpellResult<_>>()?;

        let best = (0..self.keys())
            .filter(|&i| domain[i])
            .filter_map(|i| costs[i].as_ref().map(|c| (i, c)))
            .min_by(|(_, a), (_, b)| a.compare(b));
        let Some((best, min)) = best else {
            warn!("{}: no key to select from", stage);
            catalog.clear_all_eligibility()?;
            return Ok(0);
        };

        let mut count = 0;
        for i in 0..self.keys() {
            let keep = domain[i]
                && (tolerance >= 100.0
                    || costs[i].as_ref().is_some_and(|c| c.within(min, tolerance)));
            if keep {
                catalog.set_global_eligible(i)?;
                count += 1;
            } else {
                catalog.clear_global_eligible(i)?;
            }
        }

        info!(
            "{}: {} candidate(s), best cost {} ({})",
            stage,
            count,
            min,
            catalog.key(best)?
        );
        Ok(count)
    }

    /// Collapses the eligible keys to the first one in catalog order.
    pub fn select_single_global(&self, catalog: &mut TonalityCatalog) -> SpellResult<bool> {
        let done = catalog.select_best_eligible()?;
        if !done {
            warn!("Global selection: no eligible key left");
        }
        Ok(done)
    }

    /// Asks every bar to spell itself under the given global key.
    pub fn rename(&mut self, global: KeyIndex) -> bool {
        let g = match global {
            KeyIndex::Valid(g) if g < self.keys() => g,
            other => {
                error!("Cannot rename with global key {}", other);
                return false;
            }
        };
        let mut status = true;
        for (j, col) in self.columns.iter_mut().enumerate() {
            if !col.rename(g) {
                warn!("Renaming failed at bar {}", j);
                status = false;
            }
        }
        status
    }
}
