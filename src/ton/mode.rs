use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Mode of a key. Declaration order is the tie-break order used when
/// keys with the same signature magnitude are sorted.
#[derive(
    Debug,
    Clone,
    Copy,
    EnumIter,
    EnumString,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Major,
    Ionian,
    /// Harmonic minor.
    Minor,
    MinorMelodic,
    MajorBlues,
    MinorBlues,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    MinorNatural,
    Locrian,
    Undefined,
}

impl Mode {
    /// Offset, on the line of fifths, from the signature to the tonic.
    pub fn tonic_offset(&self) -> i8 {
        match self {
            Self::Major | Self::Ionian | Self::MajorBlues => 0,
            Self::Minor
            | Self::MinorMelodic
            | Self::MinorNatural
            | Self::Aeolian
            | Self::MinorBlues => 3,
            Self::Dorian => 2,
            Self::Phrygian => 4,
            Self::Lydian => -1,
            Self::Mixolydian => 1,
            Self::Locrian => 5,
            Self::Undefined => 0,
        }
    }

    /// Plain major or harmonic minor.
    pub fn is_tonal(&self) -> bool {
        matches!(self, Self::Major | Self::Minor)
    }

    pub fn is_blues(&self) -> bool {
        matches!(self, Self::MajorBlues | Self::MinorBlues)
    }

    /// Modes sharing one scale collection collapse to the same class.
    pub fn scale_class(&self) -> Mode {
        match self {
            Self::Ionian => Self::Major,
            Self::MinorNatural => Self::Aeolian,
            other => *other,
        }
    }

    pub fn all_defined() -> Vec<Mode> {
        Mode::iter().filter(|m| *m != Mode::Undefined).collect()
    }
}
