#![allow(dead_code)]

use pitchspell::cost::AccidCost;
use pitchspell::{CostColumn, Key, Mode, SpellingTable, TonalityCatalog};

pub fn key(signature: i8, mode: Mode) -> Key {
    Key::new(signature, mode).unwrap()
}

pub fn index_of(catalog: &TonalityCatalog, signature: i8, mode: Mode) -> usize {
    catalog
        .find(&key(signature, mode))
        .unwrap_or_else(|| panic!("{} {:?} not in catalog", signature, mode))
}

/// Three major keys (C, G, D in catalog order) on a directed cycle:
/// C to G, G to D and D to C at distance 1, the reverse steps at 2.
/// Rank rows: C [0,1,2], G [2,0,1], D [1,2,0].
pub fn cycle_catalog() -> TonalityCatalog {
    let mut cat = TonalityCatalog::new();
    for s in [0, 1, 2] {
        cat.add(key(s, Mode::Major), true).unwrap();
    }
    cat.close_with(|a, b| {
        Ok(match (b.signature() - a.signature()).rem_euclid(3) {
            0 => 0,
            1 => 1,
            _ => 2,
        })
    })
    .unwrap();
    cat
}

/// Builder for accidental-count cost tables.
pub struct TableBuilder {
    keys: usize,
    columns: Vec<CostColumn<AccidCost>>,
}

impl TableBuilder {
    pub fn new(keys: usize) -> Self {
        Self {
            keys,
            columns: Vec::new(),
        }
    }

    /// One cost per key.
    pub fn bar(mut self, costs: &[u32]) -> Self {
        assert_eq!(costs.len(), self.keys, "bar width");
        self.columns.push(CostColumn::from_costs(
            costs.iter().map(|&c| AccidCost::new(c)).collect(),
        ));
        self
    }

    /// `low` for the listed keys, `high` for every other key.
    pub fn favour(mut self, cheap: &[usize], low: u32, high: u32) -> Self {
        self.columns.push(CostColumn::from_costs(
            (0..self.keys)
                .map(|k| AccidCost::new(if cheap.contains(&k) { low } else { high }))
                .collect(),
        ));
        self
    }

    pub fn empty(mut self) -> Self {
        self.columns.push(CostColumn::empty(self.keys));
        self
    }

    pub fn build(self, catalog: &TonalityCatalog) -> SpellingTable<CostColumn<AccidCost>> {
        SpellingTable::new(self.columns, catalog).unwrap()
    }
}
