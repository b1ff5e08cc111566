use crate::catalog::TonalityCatalog;
use crate::config::EngineOptions;
use crate::error::SpellResult;
use crate::grid::{self, GridStrategy, LocalTonalityGrid};
use crate::table::{SpellingTable, SpellingVector};
use crate::ton::KeyIndex;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of a full spelling pass.
#[derive(Debug, Clone, Serialize)]
pub struct SpellOutcome {
    pub strategy: GridStrategy,
    /// Chosen global key.
    pub global: KeyIndex,
    /// Global candidates kept by the selection, before the final pick.
    pub candidates: Vec<usize>,
    /// Local key per bar under the chosen global (or the modal row).
    pub locals: Vec<KeyIndex>,
    /// Every bar accepted the renaming.
    pub renamed: bool,
    pub grid: LocalTonalityGrid,
}

/// Runs global selection, grid construction and renaming in sequence.
#[derive(Debug, Clone, Default)]
pub struct Speller {
    options: EngineOptions,
}

impl Speller {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn run<V: SpellingVector>(
        &self,
        table: &mut SpellingTable<V>,
        catalog: &mut TonalityCatalog,
    ) -> SpellResult<SpellOutcome> {
        let opts = &self.options;
        let found = table.select_global_candidates(catalog, opts.global_tolerance, false)?;
        info!("🎯 {} global candidate(s) at {}% tolerance", found, opts.global_tolerance);

        let grid = if opts.modal {
            grid::build_modal(opts.strategy, table, catalog)?
        } else {
            grid::build(opts.strategy, table, catalog)?
        };
        debug!("Grid built: {} row(s) x {} bar(s)", grid.rows(), grid.bars());

        if opts.refine {
            if grid.is_modal() {
                warn!("Modal grid has no global rows, refinement skipped");
            } else {
                let kept = table.refine_global_candidates(catalog, &grid, opts.global_tolerance)?;
                info!("🔍 Refined global candidates: {} -> {}", found, kept);
            }
        }
        let candidates = catalog.eligible_indices();

        table.select_single_global(catalog)?;
        let global = catalog.best_eligible()?;

        let locals = match (grid.is_modal(), global) {
            (true, _) => grid.row(0)?.to_vec(),
            (false, KeyIndex::Valid(g)) => grid.row(g)?.to_vec(),
            (false, _) => {
                warn!("No global key selected, local keys left unset");
                vec![KeyIndex::Unset; table.bars()]
            }
        };

        let renamed = table.rename(global);
        match global.index() {
            Some(g) => info!("✅ Global key: {}", catalog.key(g)?),
            None => warn!("⚠️  No global key"),
        }

        Ok(SpellOutcome {
            strategy: opts.strategy,
            global,
            candidates,
            locals,
            renamed,
            grid,
        })
    }
}
