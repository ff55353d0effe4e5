use log::{debug, error, info};
use nalgebra::{DMatrix, DVector};
use rand::{SeedableRng, rngs::StdRng};

use crate::prelude::*;
use crate::swarm::finite_mean;

/// Where a run is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Initializing,
    Iterating,
    Converged,
    BudgetExhausted,
    Cancelled,
    Failed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Initializing | RunState::Iterating)
    }
}

/// Why a successful run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// The early-stopping criterion was met.
    Converged,
    /// The iteration budget was used up.
    BudgetExhausted,
    /// A cancellation was requested between iterations.
    Cancelled,
}

impl From<TerminationReason> for RunState {
    fn from(reason: TerminationReason) -> Self {
        match reason {
            TerminationReason::Converged => RunState::Converged,
            TerminationReason::BudgetExhausted => RunState::BudgetExhausted,
            TerminationReason::Cancelled => RunState::Cancelled,
        }
    }
}

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct PsoResult {
    pub best_cost: f64,
    pub best_position: DVector<f64>,
    pub termination: TerminationReason,
    /// Update steps completed, not counting the seeding evaluation.
    pub iterations: usize,
    /// Positions scored, seeding evaluation included.
    pub evaluations: usize,
}

impl PsoResult {
    pub fn into_parts(self) -> (f64, DVector<f64>) {
        (self.best_cost, self.best_position)
    }
}

/// Global-best particle swarm optimizer.
///
/// The swarm and the random generator are created at construction. A run
/// first scores the initial positions to seed the personal and global bests
/// (reported as iteration 0), then repeats for steps `1..=iters`: move every
/// particle, enforce the bounds, score the batch, update the bests.
///
/// Every random draw comes from one `StdRng` in a fixed order (initial
/// positions, initial velocities, then per step the update-rule draws
/// followed by any boundary redraws), so a fixed seed, configuration and
/// deterministic objective reproduce a run bit for bit.
pub struct ParticleSwarm {
    config: PsoConfig,
    rng: StdRng,
    swarm: Swarm,
    update_rule: UpdateRule,
    boundary: BoundaryHandler,
    history: SwarmHistory,
    state: RunState,
    observers: Vec<Box<dyn IterationObserver>>,
    cancellation: Option<CancellationToken>,
}

impl ParticleSwarm {
    pub fn new(config: PsoConfig) -> Self {
        let mut rng = seeded_rng(config.seed());
        let swarm = Swarm::random(&config, &mut rng);
        Self::from_parts(config, rng, swarm)
    }

    /// Like [`ParticleSwarm::new`], with caller-chosen initial positions.
    pub fn with_initial_positions(
        config: PsoConfig,
        positions: DMatrix<f64>,
    ) -> Result<Self, PsoError> {
        let mut rng = seeded_rng(config.seed());
        let swarm = Swarm::with_positions(&config, positions, &mut rng)?;
        Ok(Self::from_parts(config, rng, swarm))
    }

    fn from_parts(config: PsoConfig, rng: StdRng, swarm: Swarm) -> Self {
        Self {
            update_rule: UpdateRule::from_config(&config),
            boundary: BoundaryHandler::from_config(&config),
            config,
            rng,
            swarm,
            history: SwarmHistory::default(),
            state: RunState::Initializing,
            observers: Vec::new(),
            cancellation: None,
        }
    }

    /// Observers are called after every update step, `1..=iters`. The
    /// seeding evaluation (iteration 0) is not reported to them; it is the
    /// first entry of [`history`](Self::history).
    pub fn with_observer(mut self, observer: impl IterationObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn history(&self) -> &SwarmHistory {
        &self.history
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Re-seeds the generator and draws a fresh swarm, as if newly constructed.
    pub fn reset(&mut self) {
        self.rng = seeded_rng(self.config.seed());
        self.swarm = Swarm::random(&self.config, &mut self.rng);
        self.history.clear();
        self.state = RunState::Initializing;
    }

    /// Runs for the configured number of iterations.
    pub fn run<O>(&mut self, objective: &mut O) -> Result<PsoResult, PsoError>
    where
        O: BatchObjective + ?Sized,
    {
        let iters = self.config.iterations();
        self.optimize(objective, iters)
    }

    /// Runs for at most `iters` update steps and returns the global best.
    ///
    /// Calling this again without [`reset`](Self::reset) continues from the
    /// current swarm, keeping its personal and global bests.
    ///
    /// On an objective failure the run ends in [`RunState::Failed`] and the
    /// error names the iteration. The swarm and history still describe the
    /// last successful iteration.
    pub fn optimize<O>(&mut self, objective: &mut O, iters: usize) -> Result<PsoResult, PsoError>
    where
        O: BatchObjective + ?Sized,
    {
        if iters == 0 {
            return Err(PsoError::NonPositiveIterations(iters));
        }

        self.state = RunState::Initializing;
        self.history.clear();
        info!(
            "starting particle swarm: {} particles, {} dimensions, {} iterations",
            self.swarm.n_particles(),
            self.swarm.dimensions(),
            iters
        );

        let mut evaluator = Evaluator::new(objective);

        let seed_batch = match evaluator.evaluate(self.swarm.positions(), 0) {
            Ok(batch) => batch,
            Err(err) => return Err(self.fail(err)),
        };
        self.swarm.report_costs(&seed_batch.costs);
        self.record(&seed_batch);
        debug!("iteration 0: best cost {:.6e}", self.swarm.global_best_cost());

        self.state = RunState::Iterating;
        let mut termination = TerminationReason::BudgetExhausted;
        let mut completed = 0;
        let mut stalled = 0;

        for t in 0..iters {
            if self.cancellation_requested() {
                termination = TerminationReason::Cancelled;
                break;
            }

            let iteration = t + 1;
            let w = self.config.inertia().weight(self.config.options().w, t, iters);
            let previous_best = self.swarm.global_best_cost();

            let mut n_violations = 0;
            if let Some(mut kinematics) = self.swarm.kinematics_mut() {
                self.update_rule.step(&mut kinematics, w, &mut self.rng);
                n_violations = self.boundary.apply(
                    kinematics.positions,
                    kinematics.velocities,
                    &mut self.rng,
                );
            }

            let batch = match evaluator.evaluate(self.swarm.positions(), iteration) {
                Ok(batch) => batch,
                Err(err) => return Err(self.fail(err)),
            };
            let outcome = self.swarm.report_costs(&batch.costs);
            self.record(&batch);
            completed = iteration;

            let info = IterationInfo {
                iteration,
                best_cost: self.swarm.global_best_cost(),
                mean_personal_best_cost: self.swarm.mean_personal_best_cost(),
                inertia: w,
                improved: outcome.global_improved,
            };
            debug!(
                "iteration {}: best cost {:.6e} (w={:.4}, {} out-of-bounds coordinates)",
                iteration, info.best_cost, w, n_violations
            );
            for observer in self.observers.iter_mut() {
                observer.observe_iter(&info);
            }

            if let Some(early_stopping) = self.config.early_stopping() {
                if early_stopping.is_stall(previous_best, info.best_cost) {
                    stalled += 1;
                } else {
                    stalled = 0;
                }
                if stalled >= early_stopping.patience {
                    termination = TerminationReason::Converged;
                    break;
                }
            }
        }

        self.state = termination.into();
        let best = self.swarm.global_best().ok_or(PsoError::NoGlobalBest)?;
        info!(
            "particle swarm stopped ({:?}) after {} iterations: best cost {:.6e}",
            termination, completed, best.cost
        );

        Ok(PsoResult {
            best_cost: best.cost,
            best_position: best.position.clone(),
            termination,
            iterations: completed,
            evaluations: evaluator.evaluations(),
        })
    }

    fn cancellation_requested(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    fn record(&mut self, batch: &BatchCosts) {
        self.history.best_cost.push(self.swarm.global_best_cost());
        self.history
            .mean_personal_best_cost
            .push(self.swarm.mean_personal_best_cost());
        self.history
            .mean_batch_cost
            .push(finite_mean(batch.costs.iter()));
        if self.config.record_positions() {
            self.history.positions.push(self.swarm.positions().clone());
        }
    }

    fn fail(&mut self, err: PsoError) -> PsoError {
        error!("particle swarm failed: {}", err);
        self.state = RunState::Failed;
        err
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
