//! Global-best particle swarm optimization for black-box objectives.
//!
//! ```
//! use swarm_solver::prelude::*;
//!
//! let config = PsoConfig::builder(30, 3)
//!     .options(SwarmOptions { c1: 0.5, c2: 0.3, w: 0.9 })
//!     .bounds(vec![-10.0; 3], vec![10.0; 3])
//!     .iterations(200)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! let mut pso = ParticleSwarm::new(config);
//! let result = pso.run(&mut RowWise::new(benchmarks::sphere)).unwrap();
//! assert!(result.best_cost < 1e-3);
//! ```

pub mod boundary;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod history;
pub mod objective;
pub mod observer;
pub mod optimizer;
pub mod swarm;
pub mod update_rule;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::{
        boundary::*,
        config::*,
        error::*,
        evaluator::*,
        history::*,
        objective::{self, benchmarks, *},
        observer::*,
        optimizer::*,
        swarm::{GlobalBest, ReportOutcome, Swarm, SwarmKinematics},
        update_rule::*,
    };

    pub use argmin;
    pub use nalgebra;
}

#[macro_export]
macro_rules! assert_approx_eq {
    ($a:expr, $b:expr) => {{
        let eps = 1.0e-6;
        let (a, b) = (&$a, &$b);
        assert!(
            (*a - *b).abs() < eps,
            "assertion failed: `(left !== right)` \
             (left: `{:?}`, right: `{:?}`, expect diff: `{:?}`, real diff: `{:?}`)",
            *a,
            *b,
            eps,
            (*a - *b).abs()
        );
    }};
    ($a:expr, $b:expr, $eps:expr) => {{
        let (a, b) = (&$a, &$b);
        let eps = $eps;
        assert!(
            (*a - *b).abs() < eps,
            "assertion failed: `(left !== right)` \
             (left: `{:?}`, right: `{:?}`, expect diff: `{:?}`, real diff: `{:?}`)",
            *a,
            *b,
            eps,
            (*a - *b).abs()
        );
    }};
}
