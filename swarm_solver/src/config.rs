use crate::prelude::*;

/// The recognized swarm options: cognitive weight `c1`, social weight `c2`
/// and inertia weight `w`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwarmOptions {
    pub c1: f64,
    pub c2: f64,
    pub w: f64,
}

impl Default for SwarmOptions {
    fn default() -> Self {
        Self {
            c1: 0.5,
            c2: 0.3,
            w: 0.9,
        }
    }
}

/// How the inertia weight evolves over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Inertia {
    /// Use `SwarmOptions::w` for every step.
    #[default]
    Constant,
    /// Decay linearly from `start` at the first step towards `end` at the last.
    LinearDecay { start: f64, end: f64 },
}

impl Inertia {
    /// Inertia weight for step `t` (counted from 0) of a run of `budget` steps.
    pub fn weight(&self, w: f64, t: usize, budget: usize) -> f64 {
        match *self {
            Inertia::Constant => w,
            Inertia::LinearDecay { start, end } => {
                let budget = budget.max(1) as f64;
                let remaining = budget - (t as f64).min(budget);
                end + (start - end) * remaining / budget
            }
        }
    }
}

/// Stop once the global best has stalled for `patience` consecutive
/// iterations.
///
/// An iteration stalls when the improvement of the global-best cost is at most
/// `tolerance * (1 + |previous best|)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EarlyStopping {
    pub tolerance: f64,
    pub patience: usize,
}

impl EarlyStopping {
    pub fn new(tolerance: f64, patience: usize) -> Self {
        Self {
            tolerance,
            patience,
        }
    }

    /// Never a stall while `previous` is not finite: the first finite best
    /// always counts as progress.
    pub fn is_stall(&self, previous: f64, current: f64) -> bool {
        if !previous.is_finite() {
            return false;
        }
        let improvement = previous - current;
        improvement <= self.tolerance * (1.0 + previous.abs())
    }
}

/// Per-dimension box constraints `[lower[d], upper[d]]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl Bounds {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self { lower, upper }
    }

    /// The same `[lower, upper]` interval in every one of `dimensions`.
    pub fn uniform(dimensions: usize, lower: f64, upper: f64) -> Self {
        Self {
            lower: vec![lower; dimensions],
            upper: vec![upper; dimensions],
        }
    }

    pub fn dimensions(&self) -> usize {
        self.lower.len()
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point
            .iter()
            .zip(self.lower.iter().zip(self.upper.iter()))
            .all(|(x, (lo, hi))| *lo <= *x && *x <= *hi)
    }

    fn validate(&self, dimensions: usize) -> Result<(), PsoError> {
        if self.lower.len() != dimensions || self.upper.len() != dimensions {
            return Err(PsoError::BoundsLengthMismatch {
                n_lower: self.lower.len(),
                n_upper: self.upper.len(),
                dimensions,
            });
        }
        for (dim, (&lower, &upper)) in self.lower.iter().zip(self.upper.iter()).enumerate() {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(PsoError::InvalidBounds { dim, lower, upper });
            }
        }
        Ok(())
    }
}

/// Component-wise velocity limits `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityClamp {
    pub min: f64,
    pub max: f64,
}

impl VelocityClamp {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

/// Validated construction parameters for a [`ParticleSwarm`].
///
/// Only obtainable through [`PsoConfig::builder`], so every field has
/// already been checked.
#[derive(Clone, Debug)]
pub struct PsoConfig {
    pub(crate) n_particles: usize,
    pub(crate) dimensions: usize,
    pub(crate) options: SwarmOptions,
    pub(crate) inertia: Inertia,
    pub(crate) bounds: Option<Bounds>,
    pub(crate) boundary_strategy: BoundaryStrategy,
    pub(crate) velocity_clamp: Option<VelocityClamp>,
    pub(crate) init_range: (f64, f64),
    pub(crate) iterations: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) early_stopping: Option<EarlyStopping>,
    pub(crate) record_positions: bool,
}

impl PsoConfig {
    pub fn builder(n_particles: usize, dimensions: usize) -> PsoConfigBuilder {
        PsoConfigBuilder::new(n_particles, dimensions)
    }

    pub fn n_particles(&self) -> usize {
        self.n_particles
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn options(&self) -> SwarmOptions {
        self.options
    }

    pub fn inertia(&self) -> Inertia {
        self.inertia
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn boundary_strategy(&self) -> BoundaryStrategy {
        self.boundary_strategy
    }

    pub fn velocity_clamp(&self) -> Option<VelocityClamp> {
        self.velocity_clamp
    }

    pub fn init_range(&self) -> (f64, f64) {
        self.init_range
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn early_stopping(&self) -> Option<EarlyStopping> {
        self.early_stopping
    }

    pub fn record_positions(&self) -> bool {
        self.record_positions
    }
}

/// Consuming builder for [`PsoConfig`]. All checks happen in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct PsoConfigBuilder {
    config: PsoConfig,
}

impl PsoConfigBuilder {
    pub fn new(n_particles: usize, dimensions: usize) -> Self {
        Self {
            config: PsoConfig {
                n_particles,
                dimensions,
                options: SwarmOptions::default(),
                inertia: Inertia::Constant,
                bounds: None,
                boundary_strategy: BoundaryStrategy::default(),
                velocity_clamp: None,
                init_range: (0.0, 1.0),
                iterations: 100,
                seed: None,
                early_stopping: None,
                record_positions: false,
            },
        }
    }

    pub fn options(mut self, options: SwarmOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn c1(mut self, c1: f64) -> Self {
        self.config.options.c1 = c1;
        self
    }

    pub fn c2(mut self, c2: f64) -> Self {
        self.config.options.c2 = c2;
        self
    }

    pub fn w(mut self, w: f64) -> Self {
        self.config.options.w = w;
        self
    }

    pub fn inertia(mut self, inertia: Inertia) -> Self {
        self.config.inertia = inertia;
        self
    }

    pub fn bounds(mut self, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        self.config.bounds = Some(Bounds::new(lower, upper));
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.config.bounds = Some(bounds);
        self
    }

    pub fn boundary_strategy(mut self, strategy: BoundaryStrategy) -> Self {
        self.config.boundary_strategy = strategy;
        self
    }

    pub fn velocity_clamp(mut self, min: f64, max: f64) -> Self {
        self.config.velocity_clamp = Some(VelocityClamp::new(min, max));
        self
    }

    /// Range used for initial positions when no bounds are configured.
    pub fn init_range(mut self, lower: f64, upper: f64) -> Self {
        self.config.init_range = (lower, upper);
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn early_stopping(mut self, tolerance: f64, patience: usize) -> Self {
        self.config.early_stopping = Some(EarlyStopping::new(tolerance, patience));
        self
    }

    pub fn record_positions(mut self, record: bool) -> Self {
        self.config.record_positions = record;
        self
    }

    pub fn build(self) -> Result<PsoConfig, PsoError> {
        let config = self.config;

        if config.n_particles == 0 {
            return Err(PsoError::NonPositiveParticles(config.n_particles));
        }
        if config.dimensions == 0 {
            return Err(PsoError::NonPositiveDimensions(config.dimensions));
        }
        if config.iterations == 0 {
            return Err(PsoError::NonPositiveIterations(config.iterations));
        }

        check_weight("c1", config.options.c1)?;
        check_weight("c2", config.options.c2)?;
        check_weight("w", config.options.w)?;
        if let Inertia::LinearDecay { start, end } = config.inertia {
            check_weight("inertia.start", start)?;
            check_weight("inertia.end", end)?;
        }

        if let Some(bounds) = &config.bounds {
            bounds.validate(config.dimensions)?;
        }

        if let Some(VelocityClamp { min, max }) = config.velocity_clamp {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(PsoError::InvalidVelocityClamp { min, max });
            }
        }

        let (lower, upper) = config.init_range;
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(PsoError::InvalidInitRange { lower, upper });
        }

        if let Some(EarlyStopping {
            tolerance,
            patience,
        }) = config.early_stopping
        {
            if !tolerance.is_finite() || tolerance < 0.0 || patience == 0 {
                return Err(PsoError::InvalidEarlyStopping {
                    tolerance,
                    patience,
                });
            }
        }

        Ok(config)
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<(), PsoError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PsoError::InvalidOption { name, value })
    }
}
