use nalgebra::DMatrix;
use rand::Rng;

use crate::prelude::*;

/// What to do with a coordinate that left its `[lower, upper]` interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryStrategy {
    /// Clamp to the nearest bound and zero that velocity component.
    #[default]
    Nearest,
    /// Mirror the overshoot back into the interval and reverse that velocity
    /// component.
    Reflective,
    /// Wrap around, treating the interval as periodic. Velocity is kept.
    Periodic,
    /// Redraw the coordinate uniformly in the interval and zero that velocity
    /// component.
    Random,
}

/// Enforces the configured bounds after every position update. A no-op when
/// no bounds are configured.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryHandler {
    bounds: Option<Bounds>,
    strategy: BoundaryStrategy,
}

impl BoundaryHandler {
    pub fn new(bounds: Option<Bounds>, strategy: BoundaryStrategy) -> Self {
        Self { bounds, strategy }
    }

    pub fn from_config(config: &PsoConfig) -> Self {
        Self::new(config.bounds().cloned(), config.boundary_strategy())
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    /// Brings every coordinate back inside the bounds, visiting particles in
    /// row-major order. Returns the number of coordinates that were out of
    /// range.
    ///
    /// `Random` draws one uniform value per offending coordinate in that
    /// order; the other strategies consume nothing from `rng`.
    pub fn apply<R: Rng>(
        &self,
        positions: &mut DMatrix<f64>,
        velocities: &mut DMatrix<f64>,
        rng: &mut R,
    ) -> usize {
        let Some(bounds) = &self.bounds else {
            return 0;
        };

        let mut n_violations = 0;
        let (n, d) = positions.shape();
        for i in 0..n {
            for j in 0..d {
                let (lo, hi) = (bounds.lower[j], bounds.upper[j]);
                let x = positions[(i, j)];
                if lo <= x && x <= hi {
                    continue;
                }
                n_violations += 1;

                let (x, v) = if x.is_nan() {
                    (0.5 * (lo + hi), 0.0)
                } else if hi - lo <= 0.0 || !x.is_finite() {
                    (x.clamp(lo, hi), 0.0)
                } else {
                    let v = velocities[(i, j)];
                    match self.strategy {
                        BoundaryStrategy::Nearest => (x.clamp(lo, hi), 0.0),
                        BoundaryStrategy::Reflective => (reflect(x, lo, hi), -v),
                        BoundaryStrategy::Periodic => {
                            (lo + (x - lo).rem_euclid(hi - lo), v)
                        }
                        BoundaryStrategy::Random => {
                            (lo + (hi - lo) * rng.random::<f64>(), 0.0)
                        }
                    }
                };

                // rounding in the wrap/reflect arithmetic can land a hair outside
                positions[(i, j)] = x.clamp(lo, hi);
                velocities[(i, j)] = v;
            }
        }
        n_violations
    }
}

/// Folds `x` into `[lo, hi]` as if bouncing between the two walls.
fn reflect(x: f64, lo: f64, hi: f64) -> f64 {
    let width = hi - lo;
    let y = (x - lo).rem_euclid(2.0 * width);
    if y > width {
        lo + 2.0 * width - y
    } else {
        lo + y
    }
}
