use crate::error::{check_index, SpellError, SpellResult};
use crate::rank;
use crate::ton::{DistanceFamily, Key, KeyDistanceTable, KeyIndex, Mode};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: Key,
    pub global: bool,
}

/// Ordered collection of candidate keys.
///
/// A catalog is filled while open, then closed once: closing sorts the
/// keys, computes representatives and the rank matrix, and freezes the
/// key list. Global eligibility flags stay mutable after close and can
/// be restored to their close-time values.
#[derive(Debug, Clone, Default)]
pub struct TonalityCatalog {
    entries: Vec<CatalogEntry>,
    closed: bool,
    family: Option<DistanceFamily>,
    snapshot: Vec<bool>,
    repr_tonal: Vec<usize>,
    repr_modal: Vec<usize>,
    dist: Vec<Vec<u32>>,
    ranks: Vec<Vec<usize>>,
}

impl TonalityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard catalogs, closed, every key eligible as global.
    ///
    /// Sizes: 0, 25 (major -4..7, minor -6..6), 26 (major and minor
    /// -6..6), 30 (major and minor -7..7), 104 (eight modes -6..6),
    /// 135 (nine modes -7..7), 165 (eleven modes -7..7).
    pub fn preset(size: usize) -> SpellResult<Self> {
        let mut catalog = Self::new();
        let mut push_range = |mode: Mode, from: i8, to: i8| -> SpellResult<()> {
            for s in from..=to {
                catalog.add(Key::new(s, mode)?, true)?;
            }
            Ok(())
        };
        match size {
            0 => {}
            25 => {
                push_range(Mode::Major, -4, 7)?;
                push_range(Mode::Minor, -6, 6)?;
            }
            26 => {
                push_range(Mode::Major, -6, 6)?;
                push_range(Mode::Minor, -6, 6)?;
            }
            30 => {
                for mode in DistanceFamily::Tonal.modes() {
                    push_range(*mode, -7, 7)?;
                }
            }
            104 => {
                for mode in [
                    Mode::Major,
                    Mode::Minor,
                    Mode::Dorian,
                    Mode::Phrygian,
                    Mode::Lydian,
                    Mode::Mixolydian,
                    Mode::Aeolian,
                    Mode::Locrian,
                ] {
                    push_range(mode, -6, 6)?;
                }
            }
            135 => {
                for mode in DistanceFamily::Modal.modes() {
                    push_range(*mode, -7, 7)?;
                }
            }
            165 => {
                for mode in DistanceFamily::BluesModal.modes() {
                    push_range(*mode, -7, 7)?;
                }
            }
            other => {
                return Err(SpellError::Config(format!(
                    "no preset catalog of size {} (expected 0, 25, 26, 30, 104, 135 or 165)",
                    other
                )))
            }
        }
        catalog.close()?;
        Ok(catalog)
    }

    pub fn add(&mut self, key: Key, global: bool) -> SpellResult<()> {
        if self.closed {
            return Err(SpellError::CatalogClosed);
        }
        self.entries.push(CatalogEntry { key, global });
        Ok(())
    }

    /// Closes with distances from the precomputed family tables.
    pub fn close(&mut self) -> SpellResult<()> {
        if self.closed {
            warn!("Catalog: already closed, close ignored");
            return Ok(());
        }
        let family = DistanceFamily::covering(self.entries.iter().map(|e| &e.key))?;
        let table = KeyDistanceTable::shared(family)?;
        self.family = Some(family);
        self.close_with(|a, b| table.distance(a, b))
    }

    /// Closes with an arbitrary distance between keys.
    pub fn close_with<F>(&mut self, distance: F) -> SpellResult<()>
    where
        F: Fn(&Key, &Key) -> SpellResult<u32>,
    {
        if self.closed {
            warn!("Catalog: already closed, close ignored");
            return Ok(());
        }

        // stable: duplicates keep their insertion order
        self.entries.sort_by(|a, b| a.key.cmp(&b.key));
        self.snapshot = self.entries.iter().map(|e| e.global).collect();

        let n = self.entries.len();
        self.repr_tonal = Vec::with_capacity(n);
        self.repr_modal = Vec::with_capacity(n);
        for i in 0..n {
            let key = self.entries[i].key;
            let tonal = (0..i)
                .find(|&j| self.entries[j].key.tonal_equivalent(&key))
                .map_or(i, |j| self.repr_tonal[j]);
            let modal = (0..i)
                .find(|&j| self.entries[j].key.modal_equivalent(&key))
                .map_or(i, |j| self.repr_modal[j]);
            self.repr_tonal.push(tonal);
            self.repr_modal.push(modal);
        }

        let mut dist = Vec::with_capacity(n);
        for a in &self.entries {
            let row = self
                .entries
                .iter()
                .map(|b| distance(&a.key, &b.key))
                .collect::<SpellResult<Vec<u32>>>()?;
            dist.push(row);
        }
        self.ranks = dist.par_iter().map(|row| rank::ranks(row)).collect();
        self.dist = dist;
        self.closed = true;

        debug!(
            "Catalog closed: {} keys, {} eligible as global",
            n,
            self.eligible_count()
        );
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn require_closed(&self) -> SpellResult<()> {
        if self.closed {
            Ok(())
        } else {
            Err(SpellError::CatalogOpen)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Family of the distance tables in use, when closed with `close`.
    pub fn family(&self) -> Option<DistanceFamily> {
        self.family
    }

    pub fn key(&self, i: usize) -> SpellResult<Key> {
        check_index(i, self.len())?;
        Ok(self.entries[i].key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.iter().map(|e| &e.key)
    }

    pub fn find(&self, key: &Key) -> Option<usize> {
        self.entries.iter().position(|e| e.key == *key)
    }

    pub fn enharmonic(&self, i: usize) -> SpellResult<Option<usize>> {
        let key = self.key(i)?;
        Ok(key.enharmonic().and_then(|k| self.find(&k)))
    }

    /// First key of the catalog equivalent to key `i`.
    pub fn representative(&self, i: usize, tonal: bool) -> SpellResult<usize> {
        self.require_closed()?;
        check_index(i, self.len())?;
        Ok(if tonal {
            self.repr_tonal[i]
        } else {
            self.repr_modal[i]
        })
    }

    pub fn distance(&self, i: usize, j: usize) -> SpellResult<u32> {
        self.require_closed()?;
        check_index(i, self.len())?;
        check_index(j, self.len())?;
        Ok(self.dist[i][j])
    }

    /// Rank of key `j` among all keys ordered by distance to key `i`.
    pub fn rank(&self, i: usize, j: usize) -> SpellResult<usize> {
        let row = self.rank_row(i)?;
        check_index(j, row.len())?;
        Ok(row[j])
    }

    pub fn rank_row(&self, i: usize) -> SpellResult<&[usize]> {
        self.require_closed()?;
        check_index(i, self.len())?;
        Ok(&self.ranks[i])
    }

    pub fn is_global_eligible(&self, i: usize) -> SpellResult<bool> {
        check_index(i, self.len())?;
        Ok(self.entries[i].global)
    }

    pub fn set_global_eligible(&mut self, i: usize) -> SpellResult<()> {
        self.set_global(i, true)
    }

    pub fn clear_global_eligible(&mut self, i: usize) -> SpellResult<()> {
        self.set_global(i, false)
    }

    fn set_global(&mut self, i: usize, flag: bool) -> SpellResult<()> {
        self.require_closed()?;
        check_index(i, self.len())?;
        self.entries[i].global = flag;
        Ok(())
    }

    pub fn clear_all_eligibility(&mut self) -> SpellResult<()> {
        self.require_closed()?;
        for e in &mut self.entries {
            e.global = false;
        }
        Ok(())
    }

    /// Restores the eligibility flags as they were at close time.
    pub fn reset_global_eligibility(&mut self) -> SpellResult<()> {
        self.require_closed()?;
        for (e, flag) in self.entries.iter_mut().zip(&self.snapshot) {
            e.global = *flag;
        }
        Ok(())
    }

    pub fn eligible_count(&self) -> usize {
        self.entries.iter().filter(|e| e.global).count()
    }

    pub fn eligible_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.global)
            .map(|(i, _)| i)
            .collect()
    }

    /// Smallest eligible key in the catalog order, or `Unset`.
    pub fn best_eligible(&self) -> SpellResult<KeyIndex> {
        self.require_closed()?;
        Ok(self
            .entries
            .iter()
            .position(|e| e.global)
            .map_or(KeyIndex::Unset, KeyIndex::Valid))
    }

    /// Keeps only the best eligible key. False when none is eligible.
    pub fn select_best_eligible(&mut self) -> SpellResult<bool> {
        match self.best_eligible()? {
            KeyIndex::Valid(best) => {
                for (i, e) in self.entries.iter_mut().enumerate() {
                    e.global = i == best;
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: i8, m: Mode) -> Key {
        Key::new(s, m).unwrap()
    }

    #[test]
    fn close_sorts_by_signature_magnitude_then_mode() {
        let cat = TonalityCatalog::preset(30).unwrap();
        let first: Vec<Key> = cat.keys().take(8).copied().collect();
        assert_eq!(
            first,
            vec![
                key(0, Mode::Major),
                key(0, Mode::Minor),
                key(-1, Mode::Major),
                key(1, Mode::Major),
                key(-1, Mode::Minor),
                key(1, Mode::Minor),
                key(-2, Mode::Major),
                key(2, Mode::Major),
            ]
        );
    }

    #[test]
    fn add_after_close_is_rejected() {
        let mut cat = TonalityCatalog::preset(26).unwrap();
        assert!(matches!(
            cat.add(key(0, Mode::Major), true),
            Err(SpellError::CatalogClosed)
        ));
    }

    #[test]
    fn rank_requires_a_closed_catalog() {
        let mut cat = TonalityCatalog::new();
        cat.add(key(0, Mode::Major), true).unwrap();
        assert!(matches!(cat.rank(0, 0), Err(SpellError::CatalogOpen)));
        cat.close().unwrap();
        assert_eq!(cat.rank(0, 0).unwrap(), 0);
    }

    #[test]
    fn representatives() {
        let cat = TonalityCatalog::preset(135).unwrap();
        let d = cat.find(&key(2, Mode::Dorian)).unwrap();
        let maj = cat.find(&key(2, Mode::Major)).unwrap();
        assert_eq!(cat.representative(d, true).unwrap(), maj);
        assert_eq!(cat.representative(d, false).unwrap(), d);
    }

    #[test]
    fn modal_representative_merges_ionian_with_major() {
        let mut cat = TonalityCatalog::new();
        cat.add(key(1, Mode::Ionian), true).unwrap();
        cat.add(key(1, Mode::Major), true).unwrap();
        cat.close().unwrap();
        // Major sorts first
        assert_eq!(cat.key(0).unwrap().mode(), Mode::Major);
        assert_eq!(cat.representative(1, false).unwrap(), 0);
    }

    #[test]
    fn best_eligible_and_collapse() {
        let mut cat = TonalityCatalog::preset(30).unwrap();
        cat.clear_all_eligibility().unwrap();
        assert_eq!(cat.best_eligible().unwrap(), KeyIndex::Unset);
        cat.set_global_eligible(6).unwrap();
        cat.set_global_eligible(10).unwrap();
        assert_eq!(cat.eligible_count(), 2);
        assert_eq!(cat.best_eligible().unwrap(), KeyIndex::Valid(6));
        assert!(cat.select_best_eligible().unwrap());
        assert_eq!(cat.eligible_indices(), vec![6]);
        // already collapsed: unchanged
        assert!(cat.select_best_eligible().unwrap());
        assert_eq!(cat.eligible_indices(), vec![6]);
        cat.reset_global_eligibility().unwrap();
        assert_eq!(cat.eligible_count(), 30);
    }

    #[test]
    fn unknown_preset_is_a_config_error() {
        assert!(matches!(
            TonalityCatalog::preset(12),
            Err(SpellError::Config(_))
        ));
    }
}
