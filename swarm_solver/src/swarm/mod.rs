use nalgebra::{DMatrix, DVector};
use rand::Rng;

use crate::prelude::*;

/// The best position found by any particle so far, and its cost.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalBest {
    pub position: DVector<f64>,
    pub cost: f64,
}

/// What changed after a batch of costs was reported to the swarm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ReportOutcome {
    /// Number of particles whose personal best improved.
    pub personal_improvements: usize,
    /// Whether the global best moved.
    pub global_improved: bool,
}

/// Population state of one optimization run.
///
/// Particles are rows: row `i` of every matrix belongs to particle `i`, and
/// every matrix is `n_particles × dimensions`. Personal and global bests are
/// written only by [`Swarm::report_costs`].
#[derive(Clone, Debug)]
pub struct Swarm {
    positions: DMatrix<f64>,
    velocities: DMatrix<f64>,
    personal_best: DMatrix<f64>,
    personal_best_costs: DVector<f64>,
    global_best: Option<GlobalBest>,
}

/// Mutable kinematic state handed to the update rule and boundary handler,
/// with read-only access to the attractors.
pub struct SwarmKinematics<'a> {
    pub positions: &'a mut DMatrix<f64>,
    pub velocities: &'a mut DMatrix<f64>,
    pub personal_best: &'a DMatrix<f64>,
    pub global_best: &'a DVector<f64>,
}

impl Swarm {
    /// Creates a swarm from explicit initial positions and velocities.
    ///
    /// Personal bests start at the initial positions with cost `+inf`; the
    /// global best is undefined until the first batch of costs is reported.
    pub fn new(positions: DMatrix<f64>, velocities: DMatrix<f64>) -> Self {
        debug_assert!(
            positions.shape() == velocities.shape(),
            "positions shape {:?} does not match velocities shape {:?}",
            positions.shape(),
            velocities.shape()
        );
        let n_particles = positions.nrows();
        Self {
            personal_best: positions.clone(),
            personal_best_costs: DVector::from_element(n_particles, f64::INFINITY),
            positions,
            velocities,
            global_best: None,
        }
    }

    /// Draws a random swarm for `config`.
    ///
    /// Positions are drawn first, row-major (particle then dimension),
    /// uniformly within the bounds if configured, else within the init range.
    /// Velocities follow in the same order: uniform in the velocity clamp
    /// range if configured, else zero (no draws).
    pub fn random<R: Rng>(config: &PsoConfig, rng: &mut R) -> Self {
        let (n, d) = (config.n_particles(), config.dimensions());
        let (init_lo, init_hi) = config.init_range();

        let mut positions = DMatrix::zeros(n, d);
        for i in 0..n {
            for j in 0..d {
                let (lo, hi) = match config.bounds() {
                    Some(bounds) => (bounds.lower[j], bounds.upper[j]),
                    None => (init_lo, init_hi),
                };
                positions[(i, j)] = uniform(rng, lo, hi);
            }
        }

        let velocities = initial_velocities(config, rng);
        Self::new(positions, velocities)
    }

    /// Starts from caller-supplied positions (`n_particles × dimensions`,
    /// inside the bounds if any). Velocities are drawn as in [`Swarm::random`].
    pub fn with_positions<R: Rng>(
        config: &PsoConfig,
        positions: DMatrix<f64>,
        rng: &mut R,
    ) -> Result<Self, PsoError> {
        let expected = (config.n_particles(), config.dimensions());
        if positions.shape() != expected {
            return Err(PsoError::InitialPositionsShape {
                expected,
                got: positions.shape(),
            });
        }
        if let Some(bounds) = config.bounds() {
            for i in 0..positions.nrows() {
                for j in 0..positions.ncols() {
                    let x = positions[(i, j)];
                    if !(bounds.lower[j] <= x && x <= bounds.upper[j]) {
                        return Err(PsoError::InitialPositionOutOfBounds {
                            particle: i,
                            dim: j,
                        });
                    }
                }
            }
        }
        let velocities = initial_velocities(config, rng);
        Ok(Self::new(positions, velocities))
    }

    pub fn n_particles(&self) -> usize {
        self.positions.nrows()
    }

    pub fn dimensions(&self) -> usize {
        self.positions.ncols()
    }

    pub fn positions(&self) -> &DMatrix<f64> {
        &self.positions
    }

    pub fn velocities(&self) -> &DMatrix<f64> {
        &self.velocities
    }

    pub fn personal_best(&self) -> &DMatrix<f64> {
        &self.personal_best
    }

    pub fn personal_best_costs(&self) -> &DVector<f64> {
        &self.personal_best_costs
    }

    pub fn global_best(&self) -> Option<&GlobalBest> {
        self.global_best.as_ref()
    }

    /// Global-best cost, `+inf` before the first report.
    pub fn global_best_cost(&self) -> f64 {
        self.global_best
            .as_ref()
            .map_or(f64::INFINITY, |best| best.cost)
    }

    /// Mean over the finite personal-best costs; `+inf` if there are none.
    pub fn mean_personal_best_cost(&self) -> f64 {
        finite_mean(self.personal_best_costs.iter())
    }

    /// Records one batch of costs, aligned with particle order.
    ///
    /// A personal best moves only on a strictly lower cost, and so does the
    /// global best; ties keep the incumbent. The batch minimum is found
    /// serially (lowest index wins) before the single global-best write.
    /// Non-finite costs are treated as `+inf` and so never become a best
    /// while a finite cost exists.
    pub fn report_costs(&mut self, costs: &DVector<f64>) -> ReportOutcome {
        debug_assert!(
            costs.len() == self.n_particles(),
            "cost vector length ({}) does not match number of particles ({})",
            costs.len(),
            self.n_particles()
        );

        let mut outcome = ReportOutcome::default();

        for (i, &cost) in costs.iter().enumerate() {
            let cost = if cost.is_finite() { cost } else { f64::INFINITY };
            if cost < self.personal_best_costs[i] {
                self.personal_best_costs[i] = cost;
                self.personal_best.set_row(i, &self.positions.row(i));
                outcome.personal_improvements += 1;
            }
        }

        let mut best_idx = 0;
        for i in 1..self.n_particles() {
            if self.personal_best_costs[i] < self.personal_best_costs[best_idx] {
                best_idx = i;
            }
        }
        let batch_best_cost = self.personal_best_costs[best_idx];

        let replace = match &self.global_best {
            None => true,
            Some(incumbent) => batch_best_cost < incumbent.cost,
        };
        if replace {
            self.global_best = Some(GlobalBest {
                position: self.personal_best.row(best_idx).transpose(),
                cost: batch_best_cost,
            });
            outcome.global_improved = true;
        }

        outcome
    }

    /// Splits the swarm for an update step. `None` until a batch of costs
    /// has been reported, since there is no global best to move towards.
    pub fn kinematics_mut(&mut self) -> Option<SwarmKinematics<'_>> {
        let global_best = self.global_best.as_ref()?;
        Some(SwarmKinematics {
            positions: &mut self.positions,
            velocities: &mut self.velocities,
            personal_best: &self.personal_best,
            global_best: &global_best.position,
        })
    }
}

/// Uniform in the velocity clamp range, row-major; zero without a clamp.
fn initial_velocities<R: Rng>(config: &PsoConfig, rng: &mut R) -> DMatrix<f64> {
    let (n, d) = (config.n_particles(), config.dimensions());
    let mut velocities = DMatrix::zeros(n, d);
    if let Some(clamp) = config.velocity_clamp() {
        for i in 0..n {
            for j in 0..d {
                velocities[(i, j)] = uniform(rng, clamp.min, clamp.max);
            }
        }
    }
    velocities
}

#[inline]
fn uniform<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.random::<f64>()
}

/// Mean of the finite values, `+inf` when there are none.
pub(crate) fn finite_mean<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values
        .filter(|c| c.is_finite())
        .fold((0.0, 0usize), |(sum, count), c| (sum + c, count + 1));
    if count == 0 {
        f64::INFINITY
    } else {
        sum / count as f64
    }
}
