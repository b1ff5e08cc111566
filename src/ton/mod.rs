pub mod mode;
pub mod weber;

pub use mode::Mode;
pub use weber::{DistanceFamily, KeyDistanceTable};

use crate::error::{SpellError, SpellResult};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

pub const MIN_SIGNATURE: i8 = -7;
pub const MAX_SIGNATURE: i8 = 7;

const LETTERS: [char; 7] = ['F', 'C', 'G', 'D', 'A', 'E', 'B'];

/// A candidate tonal center: key signature (in fifths) and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Key {
    signature: i8,
    mode: Mode,
}

impl Key {
    pub fn new(signature: i8, mode: Mode) -> SpellResult<Self> {
        if !(MIN_SIGNATURE..=MAX_SIGNATURE).contains(&signature) {
            return Err(SpellError::Validation(format!(
                "key signature {} outside {}..={}",
                signature, MIN_SIGNATURE, MAX_SIGNATURE
            )));
        }
        Ok(Self { signature, mode })
    }

    pub fn signature(&self) -> i8 {
        self.signature
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_tonal(&self) -> bool {
        self.mode.is_tonal()
    }

    /// Position of the tonic on the line of fifths (C = 0).
    pub fn tonic_fifth(&self) -> i8 {
        self.signature + self.mode.tonic_offset()
    }

    /// Tonic letter with its accidentals, e.g. "F#" or "Bb".
    pub fn tonic_name(&self) -> String {
        let f = i32::from(self.tonic_fifth()) + 1;
        let letter = LETTERS[f.rem_euclid(7) as usize];
        let alter = f.div_euclid(7);
        let mut name = letter.to_string();
        if alter > 0 {
            name.push_str(&"#".repeat(alter as usize));
        } else {
            name.push_str(&"b".repeat(alter.unsigned_abs() as usize));
        }
        name
    }

    /// Same mode, enharmonic signature (e.g. 7 sharps vs 5 flats).
    pub fn enharmonic(&self) -> Option<Key> {
        let other = if self.signature >= 5 {
            self.signature - 12
        } else if self.signature <= -5 {
            self.signature + 12
        } else {
            return None;
        };
        Key::new(other, self.mode).ok()
    }

    /// Same signature; the starting accidentals of a spelling only
    /// depend on it.
    pub fn tonal_equivalent(&self, other: &Key) -> bool {
        self.signature == other.signature
    }

    /// Same signature and same scale collection.
    pub fn modal_equivalent(&self, other: &Key) -> bool {
        self.signature == other.signature && self.mode.scale_class() == other.mode.scale_class()
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signature
            .unsigned_abs()
            .cmp(&other.signature.unsigned_abs())
            .then(self.mode.cmp(&other.mode))
            .then(self.signature.cmp(&other.signature))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.tonic_name(), self.mode, self.signature)
    }
}

/// Catalog index of a key, or one of the two out-of-band states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyIndex {
    Valid(usize),
    /// Not computed yet.
    #[default]
    Unset,
    /// Computed, without a valid result.
    Failed,
}

impl KeyIndex {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Valid(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl From<usize> for KeyIndex {
    fn from(i: usize) -> Self {
        Self::Valid(i)
    }
}

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(i) => write!(f, "{}", i),
            Self::Unset => write!(f, "-"),
            Self::Failed => write!(f, "!"),
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
    fn tonic_names_follow_the_line_of_fifths() {
        assert_eq!(key(0, Mode::Major).tonic_name(), "C");
        assert_eq!(key(0, Mode::Minor).tonic_name(), "A");
        assert_eq!(key(3, Mode::Minor).tonic_name(), "F#");
        assert_eq!(key(-2, Mode::Major).tonic_name(), "Bb");
        assert_eq!(key(-7, Mode::Major).tonic_name(), "Cb");
        assert_eq!(key(7, Mode::Minor).tonic_name(), "A#");
        assert_eq!(key(0, Mode::Dorian).tonic_name(), "D");
        assert_eq!(key(0, Mode::Locrian).tonic_name(), "B");
        assert_eq!(key(0, Mode::Lydian).tonic_name(), "F");
    }

    #[test]
    fn display_shows_tonic_mode_and_signature() {
        assert_eq!(key(3, Mode::Minor).to_string(), "F# minor (3)");
    }

    #[test]
    fn signature_out_of_range_is_rejected() {
        assert!(Key::new(8, Mode::Major).is_err());
        assert!(Key::new(-8, Mode::Minor).is_err());
    }

    #[test]
    fn total_order_groups_by_signature_magnitude() {
        let mut keys = vec![
            key(1, Mode::Minor),
            key(-1, Mode::Major),
            key(0, Mode::Minor),
            key(1, Mode::Major),
            key(0, Mode::Major),
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                key(0, Mode::Major),
                key(0, Mode::Minor),
                key(-1, Mode::Major),
                key(1, Mode::Major),
                key(1, Mode::Minor),
            ]
        );
    }

    #[test]
    fn enharmonic_pairs() {
        assert_eq!(key(7, Mode::Major).enharmonic(), Some(key(-5, Mode::Major)));
        assert_eq!(key(-6, Mode::Minor).enharmonic(), Some(key(6, Mode::Minor)));
        assert_eq!(key(2, Mode::Major).enharmonic(), None);
    }

    #[test]
    fn sentinels_are_not_valid_indices() {
        assert_eq!(KeyIndex::Valid(3).index(), Some(3));
        assert_eq!(KeyIndex::Unset.index(), None);
        assert!(!KeyIndex::Failed.is_valid());
        assert_eq!(KeyIndex::default(), KeyIndex::Unset);
    }
}
