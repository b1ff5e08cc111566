use crate::cost::CostType;
use crate::grid::GridStrategy;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Config {
    #[command(flatten)]
    pub engine: EngineParams,
    #[command(flatten)]
    pub input: InputParams,
}

#[derive(Args, Debug, Clone)]
pub struct EngineParams {
    /// greedy-best, greedy-rank, exhaustive-dp or exhaustive-search
    #[arg(long, default_value_t = GridStrategy::ExhaustiveDp)]
    pub strategy: GridStrategy,

    /// Preset catalog size: 0, 25, 26, 30, 104, 135 or 165
    #[arg(long, default_value_t = 30)]
    pub catalog: usize,

    /// Percent above the best row cost still accepted as global candidate
    #[arg(long, default_value_t = 0.0)]
    pub global_tolerance: f64,

    /// One row with no assumed global key
    #[arg(long, default_value_t = false)]
    pub modal: bool,

    /// Second global selection among the first candidates
    #[arg(long, default_value_t = false)]
    pub refine: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InputParams {
    #[arg(long, default_value_t = CostType::Accid)]
    pub cost_type: CostType,

    /// First CSV record holds key names
    #[arg(long, default_value_t = false)]
    pub header: bool,
}

/// Engine settings, independent of the command line.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub strategy: GridStrategy,
    pub global_tolerance: f64,
    pub modal: bool,
    pub refine: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            strategy: GridStrategy::ExhaustiveDp,
            global_tolerance: 0.0,
            modal: false,
            refine: false,
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            strategy: cfg.engine.strategy,
            global_tolerance: cfg.engine.global_tolerance,
            modal: cfg.engine.modal,
            refine: cfg.engine.refine,
        }
    }
}
