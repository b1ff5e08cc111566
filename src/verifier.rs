use crate::catalog::TonalityCatalog;
use crate::error::SpellResult;
use crate::grid::{path_cost, ExhaustiveDp, ExhaustiveSearch, GridBuilder};
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use serde::Serialize;
use tracing::{info, warn};

/// Costs of the two exhaustive strategies on one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCheck {
    pub global: Option<usize>,
    pub dp_row: Vec<KeyIndex>,
    pub search_row: Vec<KeyIndex>,
    /// `None` when the row has no complete path.
    pub dp_cost: Option<u64>,
    pub search_cost: Option<u64>,
}

impl CrossCheck {
    pub fn agrees(&self) -> bool {
        self.dp_cost == self.search_cost
    }
}

fn cost_of<V: SpellingVector>(
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
    global: Option<usize>,
    row: &[KeyIndex],
) -> SpellResult<Option<u64>> {
    if row.iter().any(|k| !k.is_valid()) {
        return Ok(None);
    }
    path_cost(table, catalog, global, row).map(Some)
}

/// Runs table filling and priority search on the same row and compares
/// the total costs of the paths they return.
pub fn cross_check<V: SpellingVector>(
    table: &SpellingTable<V>,
    catalog: &TonalityCatalog,
    global: Option<usize>,
) -> SpellResult<CrossCheck> {
    let dp_row = ExhaustiveDp.build_row(table, catalog, global)?;
    let search_row = ExhaustiveSearch.build_row(table, catalog, global)?;
    let check = CrossCheck {
        global,
        dp_cost: cost_of(table, catalog, global, &dp_row)?,
        search_cost: cost_of(table, catalog, global, &search_row)?,
        dp_row,
        search_row,
    };

    if check.agrees() {
        info!("Cross-check passed. Cost: {:?}", check.dp_cost);
    } else {
        warn!(
            "Cross-check mismatch. DP: {:?}, Search: {:?}",
            check.dp_cost, check.search_cost
        );
    }
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::fixtures::{line_catalog, table};

    #[test]
    fn exhaustive_strategies_agree() {
        let cat = line_catalog();
        let t = table(&cat, &[Some([1, 2, 0]), None, Some([0, 0, 3]), Some([2, 1, 1])]);
        for global in [None, Some(0), Some(2)] {
            let check = cross_check(&t, &cat, global).unwrap();
            assert!(check.agrees(), "{:?}", check);
            assert!(check.dp_cost.is_some());
        }
    }

    #[test]
    fn failed_rows_have_no_cost() {
        let cat = line_catalog();
        let t = table(&cat, &[None]);
        let check = cross_check(&t, &cat, None).unwrap();
        assert_eq!(check.dp_cost, None);
        assert!(check.agrees());
    }
}
