//! The objective contract consumed by the optimizer, and adapters that turn
//! per-row functions and `argmin` cost functions into batch objectives.

pub mod benchmarks;

use anyhow::bail;
use argmin::core::{CostFunction, Error};
use nalgebra::{DMatrix, DVector};

/// A black-box objective scored on a whole swarm at once.
///
/// `positions` is `n_particles × dimensions`; the result must hold one cost
/// per row, in row order. Implementations must not assume they are called
/// with the same positions twice, and may be arbitrarily expensive. Returning
/// an error aborts the run at the current iteration.
pub trait BatchObjective {
    fn evaluate(&mut self, positions: &DMatrix<f64>) -> Result<DVector<f64>, Error>;
}

impl<F> BatchObjective for F
where
    F: FnMut(&DMatrix<f64>) -> Result<DVector<f64>, Error>,
{
    fn evaluate(&mut self, positions: &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        self(positions)
    }
}

/// Scores each particle independently with a function of one position.
pub struct RowWise<F> {
    f: F,
    row: Vec<f64>,
}

impl<F> RowWise<F>
where
    F: FnMut(&[f64]) -> f64,
{
    pub fn new(f: F) -> Self {
        Self { f, row: Vec::new() }
    }
}

impl<F> BatchObjective for RowWise<F>
where
    F: FnMut(&[f64]) -> f64,
{
    fn evaluate(&mut self, positions: &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        let n = positions.nrows();
        let mut costs = DVector::zeros(n);
        for i in 0..n {
            self.row.clear();
            self.row.extend(positions.row(i).iter().copied());
            costs[i] = (self.f)(&self.row);
        }
        Ok(costs)
    }
}

/// Adapts any `argmin` cost function over `DVector<f64>` parameters.
///
/// The first failing row fails the whole batch.
pub struct ArgminCost<C>(pub C);

impl<C> BatchObjective for ArgminCost<C>
where
    C: CostFunction<Param = DVector<f64>, Output = f64>,
{
    fn evaluate(&mut self, positions: &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        let n = positions.nrows();
        let mut costs = DVector::zeros(n);
        for i in 0..n {
            let param: DVector<f64> = positions.row(i).transpose();
            costs[i] = match self.0.cost(&param) {
                Ok(cost) => cost,
                Err(err) => bail!("cost function failed on particle {i}: {err}"),
            };
        }
        Ok(costs)
    }
}

/// Like [`RowWise`], but scores rows on the rayon thread pool. Costs come back
/// in row order regardless of scheduling.
#[cfg(feature = "rayon")]
pub struct ParallelRowWise<F> {
    f: F,
}

#[cfg(feature = "rayon")]
impl<F> ParallelRowWise<F>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[cfg(feature = "rayon")]
impl<F> BatchObjective for ParallelRowWise<F>
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    fn evaluate(&mut self, positions: &DMatrix<f64>) -> Result<DVector<f64>, Error> {
        use rayon::prelude::*;

        let rows: Vec<Vec<f64>> = (0..positions.nrows())
            .map(|i| positions.row(i).iter().copied().collect())
            .collect();
        let f = &self.f;
        let costs: Vec<f64> = rows.par_iter().map(|row| f(row)).collect();
        Ok(DVector::from_vec(costs))
    }
}
