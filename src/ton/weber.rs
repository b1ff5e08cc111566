use super::{Key, Mode, MAX_SIGNATURE, MIN_SIGNATURE};
use crate::error::{check_index, SpellError, SpellResult};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::OnceLock;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

/// Number of signatures per mode block (-7..=7).
pub const BLOCK: usize = 15;

const UNREACHED: u32 = u32::MAX;

const TONAL_MODES: [Mode; 2] = [Mode::Major, Mode::Minor];

const MODAL_MODES: [Mode; 9] = [
    Mode::Major,
    Mode::Minor,
    Mode::MinorMelodic,
    Mode::Dorian,
    Mode::Phrygian,
    Mode::Lydian,
    Mode::Mixolydian,
    Mode::Aeolian,
    Mode::Locrian,
];

const BLUES_MODAL_MODES: [Mode; 11] = [
    Mode::Major,
    Mode::Minor,
    Mode::MinorMelodic,
    Mode::Dorian,
    Mode::Phrygian,
    Mode::Lydian,
    Mode::Mixolydian,
    Mode::Aeolian,
    Mode::Locrian,
    Mode::MajorBlues,
    Mode::MinorBlues,
];

// Neighbour relations as (target mode, signature delta).
// Order: up a fifth, relative/parallel links, down a fifth, then modal links.
const MAJOR_LINKS: [(Mode, i8); 4] = [
    (Mode::Major, 1),
    (Mode::Minor, -3),
    (Mode::Minor, 0),
    (Mode::Major, -1),
];
const MAJOR_MODAL_LINKS: [(Mode, i8); 4] = [
    (Mode::Lydian, -1),
    (Mode::Mixolydian, 1),
    (Mode::Aeolian, 0),
    (Mode::MinorMelodic, 0),
];
const MINOR_LINKS: [(Mode, i8); 4] = [
    (Mode::Minor, 1),
    (Mode::Major, 0),
    (Mode::Major, 3),
    (Mode::Minor, -1),
];
const MINOR_MODAL_LINKS: [(Mode, i8); 4] = [
    (Mode::Dorian, -1),
    (Mode::Phrygian, 1),
    (Mode::MinorMelodic, 0),
    (Mode::Aeolian, 0),
];
const MELODIC_LINKS: [(Mode, i8); 8] = [
    (Mode::MinorMelodic, 1),
    (Mode::Major, 0),
    (Mode::Major, 3),
    (Mode::MinorMelodic, -1),
    (Mode::Dorian, -1),
    (Mode::Phrygian, 1),
    (Mode::Minor, 0),
    (Mode::Aeolian, 0),
];
const DORIAN_LINKS: [(Mode, i8); 8] = [
    (Mode::Dorian, 1),
    (Mode::Lydian, 0),
    (Mode::Lydian, 3),
    (Mode::Dorian, -1),
    (Mode::Mixolydian, 2),
    (Mode::Minor, 1),
    (Mode::MinorMelodic, 1),
    (Mode::Aeolian, 1),
];
const PHRYGIAN_LINKS: [(Mode, i8); 8] = [
    (Mode::Phrygian, 1),
    (Mode::Mixolydian, 0),
    (Mode::Mixolydian, 3),
    (Mode::Phrygian, -1),
    (Mode::Minor, -1),
    (Mode::Locrian, 1),
    (Mode::MinorMelodic, -1),
    (Mode::Aeolian, -1),
];
const LYDIAN_LINKS: [(Mode, i8); 5] = [
    (Mode::Lydian, 1),
    (Mode::Dorian, 0),
    (Mode::Dorian, -3),
    (Mode::Lydian, -1),
    (Mode::Major, 1),
];
const MIXOLYDIAN_LINKS: [(Mode, i8); 6] = [
    (Mode::Mixolydian, 1),
    (Mode::Phrygian, 0),
    (Mode::Phrygian, -3),
    (Mode::Mixolydian, -1),
    (Mode::Dorian, -2),
    (Mode::Major, -1),
];
const AEOLIAN_LINKS: [(Mode, i8); 8] = [
    (Mode::Aeolian, 1),
    (Mode::Major, 0),
    (Mode::Major, 3),
    (Mode::Aeolian, -1),
    (Mode::Dorian, -1),
    (Mode::Phrygian, 1),
    (Mode::Minor, 0),
    (Mode::MinorMelodic, 0),
];
const LOCRIAN_LINKS: [(Mode, i8); 5] = [
    (Mode::Locrian, 1),
    (Mode::Dorian, -3),
    (Mode::Dorian, 0),
    (Mode::Locrian, -1),
    (Mode::Phrygian, -1),
];
const MAJOR_BLUES_LINKS: [(Mode, i8); 4] = [
    (Mode::MajorBlues, 1),
    (Mode::Major, 0),
    (Mode::MinorBlues, 0),
    (Mode::MajorBlues, -1),
];
const MINOR_BLUES_LINKS: [(Mode, i8); 4] = [
    (Mode::MinorBlues, 1),
    (Mode::Minor, 0),
    (Mode::MajorBlues, 0),
    (Mode::MinorBlues, -1),
];

/// Families of keys with a precomputed distance table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DistanceFamily {
    /// Major and harmonic minor, 30 keys.
    Tonal,
    /// Nine modes, 135 keys.
    Modal,
    /// Nine modes plus major and minor blues, 165 keys.
    BluesModal,
}

impl DistanceFamily {
    pub fn modes(&self) -> &'static [Mode] {
        match self {
            Self::Tonal => &TONAL_MODES,
            Self::Modal => &MODAL_MODES,
            Self::BluesModal => &BLUES_MODAL_MODES,
        }
    }

    pub fn size(&self) -> usize {
        self.modes().len() * BLOCK
    }

    fn block(&self, mode: Mode) -> Option<usize> {
        let class = mode.scale_class();
        self.modes().iter().position(|m| *m == class)
    }

    /// Position of a key in this family's table.
    pub fn index(&self, key: &Key) -> Option<usize> {
        let block = self.block(key.mode())?;
        Some(block * BLOCK + (key.signature() - MIN_SIGNATURE) as usize)
    }

    pub fn key(&self, index: usize) -> Option<Key> {
        let mode = *self.modes().get(index / BLOCK)?;
        let signature = (index % BLOCK) as i8 + MIN_SIGNATURE;
        Key::new(signature, mode).ok()
    }

    /// Smallest family containing every given key.
    pub fn covering<'a, I>(keys: I) -> SpellResult<DistanceFamily>
    where
        I: IntoIterator<Item = &'a Key>,
    {
        let mut family = Self::Tonal;
        for key in keys {
            let fit = [Self::Tonal, Self::Modal, Self::BluesModal]
                .into_iter()
                .find(|f| f.index(key).is_some())
                .ok_or_else(|| SpellError::KeyNotInFamily(key.to_string()))?;
            family = family.max(fit);
        }
        Ok(family)
    }

    fn links(&self, mode: Mode) -> Vec<(Mode, i8)> {
        let modal = *self != Self::Tonal;
        let blues = *self == Self::BluesModal;
        let mut links = Vec::with_capacity(10);
        match mode {
            Mode::Major => {
                links.extend_from_slice(&MAJOR_LINKS);
                if modal {
                    links.extend_from_slice(&MAJOR_MODAL_LINKS);
                }
                if blues {
                    links.push((Mode::MajorBlues, 0));
                }
            }
            Mode::Minor => {
                links.extend_from_slice(&MINOR_LINKS);
                if modal {
                    links.extend_from_slice(&MINOR_MODAL_LINKS);
                }
                if blues {
                    links.push((Mode::MinorBlues, 0));
                }
            }
            Mode::MinorMelodic => links.extend_from_slice(&MELODIC_LINKS),
            Mode::Dorian => links.extend_from_slice(&DORIAN_LINKS),
            Mode::Phrygian => links.extend_from_slice(&PHRYGIAN_LINKS),
            Mode::Lydian => links.extend_from_slice(&LYDIAN_LINKS),
            Mode::Mixolydian => links.extend_from_slice(&MIXOLYDIAN_LINKS),
            Mode::Aeolian => links.extend_from_slice(&AEOLIAN_LINKS),
            Mode::Locrian => links.extend_from_slice(&LOCRIAN_LINKS),
            Mode::MajorBlues => links.extend_from_slice(&MAJOR_BLUES_LINKS),
            Mode::MinorBlues => links.extend_from_slice(&MINOR_BLUES_LINKS),
            Mode::Ionian | Mode::MinorNatural | Mode::Undefined => {}
        }
        links
    }

    /// Table indices of the neighbours of the key at `index`.
    /// Links leaving the signature range or the family are dropped.
    pub fn neighbours(&self, index: usize) -> Vec<usize> {
        let Some(key) = self.key(index) else {
            return Vec::new();
        };
        self.links(key.mode())
            .into_iter()
            .filter_map(|(mode, delta)| {
                let signature = key.signature() + delta;
                if !(MIN_SIGNATURE..=MAX_SIGNATURE).contains(&signature) {
                    return None;
                }
                let block = self.block(mode)?;
                Some(block * BLOCK + (signature - MIN_SIGNATURE) as usize)
            })
            .collect()
    }
}

/// All-pairs distances between the keys of one family, in unit steps
/// along the neighbour graph.
#[derive(Debug, Clone)]
pub struct KeyDistanceTable {
    family: DistanceFamily,
    dist: Vec<Vec<u32>>,
}

static TONAL_TABLE: OnceLock<Result<KeyDistanceTable, (usize, usize)>> = OnceLock::new();
static MODAL_TABLE: OnceLock<Result<KeyDistanceTable, (usize, usize)>> = OnceLock::new();
static BLUES_TABLE: OnceLock<Result<KeyDistanceTable, (usize, usize)>> = OnceLock::new();

impl KeyDistanceTable {
    /// Computes the table of a family. Fails if some pair is unreached.
    pub fn build(family: DistanceFamily) -> SpellResult<Self> {
        Self::compute(family).map_err(|(from, to)| SpellError::UnreachedDistance {
            family: family.to_string(),
            from,
            to,
        })
    }

    /// Process-wide table of a family, computed on first use.
    pub fn shared(family: DistanceFamily) -> SpellResult<&'static Self> {
        let cell = match family {
            DistanceFamily::Tonal => &TONAL_TABLE,
            DistanceFamily::Modal => &MODAL_TABLE,
            DistanceFamily::BluesModal => &BLUES_TABLE,
        };
        cell.get_or_init(|| Self::compute(family))
            .as_ref()
            .map_err(|&(from, to)| SpellError::UnreachedDistance {
                family: family.to_string(),
                from,
                to,
            })
    }

    fn compute(family: DistanceFamily) -> Result<Self, (usize, usize)> {
        let n = family.size();
        debug!("Computing {} distance table ({} keys)", family, n);

        let dist: Vec<Vec<u32>> = (0..n)
            .into_par_iter()
            .map(|i| Self::relax_row(family, i))
            .collect();

        let table = Self { family, dist };
        table.self_check()?;
        Ok(table)
    }

    // Unit-weight relaxation from key i: extract the closest unvisited
    // key, then improve its neighbours.
    fn relax_row(family: DistanceFamily, i: usize) -> Vec<u32> {
        let n = family.size();
        let mut row = vec![UNREACHED; n];
        let mut visited = vec![false; n];
        row[i] = 0;

        // enharmonic twin of i counts as the same key
        if let Some(twin) = family
            .key(i)
            .and_then(|k| k.enharmonic())
            .and_then(|k| family.index(&k))
        {
            row[twin] = 0;
        }

        loop {
            let next = (0..n)
                .filter(|&k| !visited[k] && row[k] != UNREACHED)
                .min_by_key(|&k| (row[k], k));
            let Some(k) = next else { break };
            visited[k] = true;

            let step = row[k] + 1;
            for nb in family.neighbours(k) {
                if step < row[nb] {
                    row[nb] = step;
                }
            }
        }
        row
    }

    fn self_check(&self) -> Result<(), (usize, usize)> {
        for (i, row) in self.dist.iter().enumerate() {
            if let Some(j) = row.iter().position(|&d| d == UNREACHED) {
                return Err((i, j));
            }
        }
        Ok(())
    }

    pub fn family(&self) -> DistanceFamily {
        self.family
    }

    pub fn size(&self) -> usize {
        self.dist.len()
    }

    /// Distance between two table positions.
    pub fn distance_at(&self, i: usize, j: usize) -> SpellResult<u32> {
        check_index(i, self.size())?;
        check_index(j, self.size())?;
        Ok(self.dist[i][j])
    }

    pub fn distance(&self, from: &Key, to: &Key) -> SpellResult<u32> {
        let i = self
            .family
            .index(from)
            .ok_or_else(|| SpellError::KeyNotInFamily(from.to_string()))?;
        let j = self
            .family
            .index(to)
            .ok_or_else(|| SpellError::KeyNotInFamily(to.to_string()))?;
        Ok(self.dist[i][j])
    }

    pub fn row(&self, i: usize) -> SpellResult<&[u32]> {
        check_index(i, self.size())?;
        Ok(&self.dist[i])
    }
}
