pub mod catalog;
pub mod config;
pub mod cost;
pub mod error;
pub mod grid;
pub mod pipeline;
pub mod rank;
pub mod table;
pub mod ton;
pub mod verifier;
// cmd and reports belong to the binary (main.rs)

pub use catalog::TonalityCatalog;
pub use error::{SpellError, SpellResult};
pub use grid::{GridStrategy, LocalTonalityGrid};
pub use pipeline::{SpellOutcome, Speller};
pub use table::{CostColumn, SpellingTable, SpellingVector};
pub use ton::{DistanceFamily, Key, KeyDistanceTable, KeyIndex, Mode};
