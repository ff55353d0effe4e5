use thiserror::Error;

/// Errors raised while configuring or running the swarm.
///
/// Configuration variants are returned by `PsoConfigBuilder::build` and never
/// occur once a run has started. `Evaluation` and `BatchShape` abort a run.

#[derive(Error, Debug)]
pub enum PsoError {
    #[error("Number of particles must be positive, got {0}")]
    NonPositiveParticles(usize),

    #[error("Number of dimensions must be positive, got {0}")]
    NonPositiveDimensions(usize),

    #[error("Iteration budget must be positive, got {0}")]
    NonPositiveIterations(usize),

    #[error("Swarm option `{name}` must be finite and non-negative, got {value}")]
    InvalidOption { name: &'static str, value: f64 },

    #[error("Bounds length mismatch; lower has {n_lower}, upper has {n_upper}, swarm has {dimensions} dimensions")]
    BoundsLengthMismatch {
        n_lower: usize,
        n_upper: usize,
        dimensions: usize,
    },

    #[error("Invalid bounds for dimension {dim}: lower={lower}, upper={upper}")]
    InvalidBounds { dim: usize, lower: f64, upper: f64 },

    #[error("Invalid velocity clamp: min={min}, max={max}")]
    InvalidVelocityClamp { min: f64, max: f64 },

    #[error("Invalid initialization range: lower={lower}, upper={upper}")]
    InvalidInitRange { lower: f64, upper: f64 },

    #[error("Invalid early stopping: tolerance={tolerance}, patience={patience}")]
    InvalidEarlyStopping { tolerance: f64, patience: usize },

    #[error("Initial positions have shape {got:?}, expected {expected:?}")]
    InitialPositionsShape {
        expected: (usize, usize),
        got: (usize, usize),
    },

    #[error("Initial position of particle {particle} lies outside the bounds in dimension {dim}")]
    InitialPositionOutOfBounds { particle: usize, dim: usize },

    #[error("Objective evaluation failed at iteration {iteration}: {source}")]
    Evaluation {
        iteration: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Objective returned {got} costs at iteration {iteration}, expected one per particle ({expected})")]
    BatchShape {
        iteration: usize,
        expected: usize,
        got: usize,
    },

    #[error("No global best found in optimization result")]
    NoGlobalBest,
}

impl PsoError {
    /// True for errors raised while building a configuration, before any run.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            PsoError::Evaluation { .. } | PsoError::BatchShape { .. } | PsoError::NoGlobalBest
        )
    }

    /// True for errors raised by the objective during a run.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, PsoError::Evaluation { .. } | PsoError::BatchShape { .. })
    }

    /// The iteration at which a run failed, if this is a run-time failure.
    pub fn iteration(&self) -> Option<usize> {
        match self {
            PsoError::Evaluation { iteration, .. } | PsoError::BatchShape { iteration, .. } => {
                Some(*iteration)
            }
            _ => None,
        }
    }
}
