use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::prelude::*;

/// One scored batch, aligned with particle order.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchCosts {
    pub costs: DVector<f64>,
    /// Rows whose raw cost was NaN or infinite and was replaced by `+inf`.
    pub anomalies: Vec<usize>,
}

/// Calls the objective once per iteration on the full position matrix and
/// checks what comes back.
///
/// A failing objective, or one that returns the wrong number of costs, fails
/// the iteration. Non-finite costs are not failures: they are logged and
/// replaced by `+inf`, so they rank below every finite cost.
pub struct Evaluator<'a, O: BatchObjective + ?Sized> {
    objective: &'a mut O,
    evaluations: usize,
}

impl<'a, O: BatchObjective + ?Sized> Evaluator<'a, O> {
    pub fn new(objective: &'a mut O) -> Self {
        Self {
            objective,
            evaluations: 0,
        }
    }

    /// Number of positions scored so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn evaluate(
        &mut self,
        positions: &DMatrix<f64>,
        iteration: usize,
    ) -> Result<BatchCosts, PsoError> {
        let expected = positions.nrows();
        let mut costs = self
            .objective
            .evaluate(positions)
            .map_err(|source| PsoError::Evaluation {
                iteration,
                source: source.into(),
            })?;

        if costs.len() != expected {
            return Err(PsoError::BatchShape {
                iteration,
                expected,
                got: costs.len(),
            });
        }
        self.evaluations += expected;

        let mut anomalies = Vec::new();
        for (i, cost) in costs.iter_mut().enumerate() {
            if !cost.is_finite() {
                warn!(
                    "iteration {}: particle {} returned non-finite cost {}; treating as +inf",
                    iteration, i, cost
                );
                *cost = f64::INFINITY;
                anomalies.push(i);
            }
        }

        Ok(BatchCosts { costs, anomalies })
    }
}
