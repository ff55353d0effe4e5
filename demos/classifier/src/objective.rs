use nalgebra::{DMatrix, DVector};
use swarm_solver::prelude::{BatchObjective, argmin::core::Error};

use crate::{dataset::Dataset, network::Network};

/// Scores each particle as a full set of network weights by its training
/// loss.
pub struct ClassifierObjective {
    pub network: Network,
    pub dataset: Dataset,
}

impl ClassifierObjective {
    /// Fails if the dataset's feature width or labels do not fit the network.
    pub fn new(network: Network, dataset: Dataset) -> anyhow::Result<Self> {
        network.check_dataset(&dataset)?;
        Ok(Self { network, dataset })
    }

    pub fn n_params(&self) -> usize {
        self.network.n_params()
    }
}

impl BatchObjective for ClassifierObjective {
    fn evaluate(&mut self, positions: &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        let mut costs = DVector::zeros(positions.nrows());
        let mut params = Vec::with_capacity(positions.ncols());
        for (i, row) in positions.row_iter().enumerate() {
            params.clear();
            params.extend(row.iter().copied());
            costs[i] = self.network.nll_loss(&params, &self.dataset)?;
        }
        Ok(costs)
    }
}
