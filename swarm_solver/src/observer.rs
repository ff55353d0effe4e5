use std::{
    cell::RefCell,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Snapshot handed to observers after each completed iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationInfo {
    pub iteration: usize,
    pub best_cost: f64,
    pub mean_personal_best_cost: f64,
    pub inertia: f64,
    pub improved: bool,
}

/// Per-iteration hook, called after each update step (iterations start at
/// 1). Any `FnMut(usize, f64)` closure receiving
/// `(iteration, best_cost_so_far)` is an observer.
pub trait IterationObserver {
    fn observe_iter(&mut self, info: &IterationInfo);
}

impl<F> IterationObserver for F
where
    F: FnMut(usize, f64),
{
    fn observe_iter(&mut self, info: &IterationInfo) {
        self(info.iteration, info.best_cost)
    }
}

/// Records the best cost after every update step, so it holds one entry
/// less than `SwarmHistory::best_cost`. Clones share the same history, so
/// keep a clone to read it back after the run.
#[derive(Clone, Default)]
pub struct CostHistory {
    cost_history: Rc<RefCell<Vec<f64>>>,
}

impl CostHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cost_history(&self) -> Vec<f64> {
        self.cost_history.borrow().clone()
    }

    pub fn observe_cost(&self, cost: f64) {
        self.cost_history.borrow_mut().push(cost);
    }
}

impl IterationObserver for CostHistory {
    fn observe_iter(&mut self, info: &IterationInfo) {
        self.observe_cost(info.best_cost);
    }
}

/// Thread-safe stop request, honored at the next iteration boundary.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
