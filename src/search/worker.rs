use crate::board::Position;
use crate::error::Result;
use crate::eval::{self, EvalCache, EvalMode, NetworkOracle};
use crate::search::history::{self, MoveHistory};
use crate::search::params::{CoreConfig, EvalParams};
use crate::search::stack::SearchStack;
use crate::search::tt::Tt;
use std::sync::Arc;

/// Everything one search thread owns exclusively.
pub struct WorkerContext {
    pub id: usize,
    pub eval_cache: EvalCache,
    pub history: Box<dyn MoveHistory>,
    pub stack: SearchStack,
    eval_params: EvalParams,
    eval_mode: EvalMode,
}

impl WorkerContext {
    pub fn new(id: usize, config: &CoreConfig) -> Self {
        Self {
            id,
            eval_cache: EvalCache::new(),
            history: history::build(config.history_layout, config.history),
            stack: SearchStack::new(),
            eval_params: config.eval,
            eval_mode: config.eval_mode,
        }
    }

    pub fn evaluate<O: NetworkOracle + ?Sized>(&mut self, pos: &Position, oracle: &O) -> i32 {
        eval::evaluate(pos, &mut self.eval_cache, oracle, &self.eval_params, self.eval_mode)
    }

    /// Fresh start for a new root search; learned tables are kept.
    pub fn new_search(&mut self) {
        self.stack.reset();
    }

    /// Forget everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.history.clear();
        self.eval_cache.clear();
        self.stack.reset();
        log::debug!("worker {}: reset for new game", self.id);
    }
}

/// The shared table plus the configuration workers are built from.
pub struct SearchCore {
    config: CoreConfig,
    tt: Arc<Tt>,
}

impl SearchCore {
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let tt = Arc::new(Tt::with_capacity_mb(config.hash_mb));
        log::info!(
            "search core: {} MiB table, {} threads, {:?} history, {:?} eval",
            config.hash_mb, config.threads, config.history_layout, config.eval_mode
        );
        Ok(Self { config, tt })
    }

    pub fn config(&self) -> &CoreConfig { &self.config }

    pub fn tt(&self) -> &Arc<Tt> { &self.tt }

    pub fn worker(&self, id: usize) -> WorkerContext {
        WorkerContext::new(id, &self.config)
    }

    pub fn workers(&self) -> Vec<WorkerContext> {
        (0..self.config.threads).map(|id| self.worker(id)).collect()
    }

    pub fn new_search(&self) {
        self.tt.age();
    }

    pub fn new_game(&self, workers: &mut [WorkerContext]) -> Result<()> {
        self.tt.clear(self.config.threads)?;
        for w in workers {
            w.new_game();
        }
        Ok(())
    }
}
