use nalgebra::DMatrix;

/// Per-iteration diagnostics of a run. Entry 0 is the seeding evaluation,
/// entry `t` the state after step `t`.
///
/// Kept by the optimizer across a failed run, so the trajectory up to the
/// last successful iteration stays inspectable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwarmHistory {
    /// Global-best cost.
    pub best_cost: Vec<f64>,
    /// Mean of the finite personal-best costs.
    pub mean_personal_best_cost: Vec<f64>,
    /// Mean of the finite costs in the batch just evaluated.
    pub mean_batch_cost: Vec<f64>,
    /// Position snapshots, only when recording is enabled.
    pub positions: Vec<DMatrix<f64>>,
}

impl SwarmHistory {
    pub fn len(&self) -> usize {
        self.best_cost.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_cost.is_empty()
    }

    pub fn last_best_cost(&self) -> Option<f64> {
        self.best_cost.last().copied()
    }

    pub(crate) fn clear(&mut self) {
        self.best_cost.clear();
        self.mean_personal_best_cost.clear();
        self.mean_batch_cost.clear();
        self.positions.clear();
    }
}
