use crate::error::{CoreError, Result};
use crate::eval::EvalMode;
use crate::search::history::HistoryLayout;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Divisor shared by every history weight.
pub const HISTORY_WEIGHT_SCALE: i32 = 1024;
/// Divisor of the material-phase rescale.
pub const EVAL_NORMALIZATION: i32 = 32_768;

fn check(name: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::OutOfRange { name, value, min, max })
    }
}

/// Per-component multipliers for the quiet-move history score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryWeights {
    pub quiet: i32,
    pub cont1: i32,
    pub cont2: i32,
    pub cont4: i32,
    pub pawn: i32,
}

impl Default for HistoryWeights {
    fn default() -> Self {
        Self { quiet: 984, cont1: 1192, cont2: 949, cont4: 969, pawn: 1047 }
    }
}

impl HistoryWeights {
    pub const MAX: i32 = 2048;

    pub fn validate(&self) -> Result<()> {
        let max = Self::MAX as i64;
        check("history.quiet", self.quiet as i64, 0, max)?;
        check("history.cont1", self.cont1 as i64, 0, max)?;
        check("history.cont2", self.cont2 as i64, 0, max)?;
        check("history.cont4", self.cont4 as i64, 0, max)?;
        check("history.pawn", self.pawn as i64, 0, max)
    }
}

/// Bonus/malus sizes fed to the history tables after a cutoff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusParams {
    pub scale: i32,
    pub offset: i32,
    pub max: i32,
}

impl Default for BonusParams {
    fn default() -> Self {
        Self { scale: 300, offset: 250, max: 2500 }
    }
}

impl BonusParams {
    pub fn validate(&self) -> Result<()> {
        check("bonus.scale", self.scale as i64, 1, 1024)?;
        check("bonus.offset", self.offset as i64, 0, 1024)?;
        check("bonus.max", self.max as i64, 1, crate::search::history::HISTORY_MAX as i64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    pub material_scale_base: i32,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self { material_scale_base: 26_909 }
    }
}

impl EvalParams {
    pub fn validate(&self) -> Result<()> {
        check("eval.material_scale_base", self.material_scale_base as i64, 10_000, 32_768)
    }
}

/// Everything a worker or the shared table needs at construction time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub hash_mb: usize,
    pub threads: usize,
    pub history_layout: HistoryLayout,
    pub eval_mode: EvalMode,
    pub history: HistoryWeights,
    pub bonus: BonusParams,
    pub eval: EvalParams,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            threads: 1,
            history_layout: HistoryLayout::Segmented,
            eval_mode: EvalMode::Scaled,
            history: HistoryWeights::default(),
            bonus: BonusParams::default(),
            eval: EvalParams::default(),
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<()> {
        check("hash_mb", self.hash_mb as i64, 1, 1 << 20)?;
        check("threads", self.threads as i64, 1, 1024)?;
        self.history.validate()?;
        self.bonus.validate()?;
        self.eval.validate()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        log::debug!("loaded core config: {:?}", cfg);
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(&path)?;
        log::info!("reading core config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }
}
