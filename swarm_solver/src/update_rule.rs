use rand::Rng;

use crate::prelude::*;

/// Global-best velocity and position update.
///
/// For particle `i`, dimension `d`:
///
/// ```text
/// v[i][d] <- w * v[i][d] + c1 * r1 * (pbest[i][d] - x[i][d]) + c2 * r2 * (gbest[d] - x[i][d])
/// x[i][d] <- x[i][d] + v[i][d]
/// ```
///
/// `r1` and `r2` are fresh uniform draws in `[0, 1)` for every particle,
/// dimension and step, consumed from a single generator in row-major order:
/// particle 0 dimension 0 draws `r1` then `r2`, then particle 0 dimension 1,
/// and so on. The optional velocity clamp is applied to each component before
/// the position moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateRule {
    c1: f64,
    c2: f64,
    velocity_clamp: Option<VelocityClamp>,
}

impl UpdateRule {
    pub fn new(options: SwarmOptions, velocity_clamp: Option<VelocityClamp>) -> Self {
        Self {
            c1: options.c1,
            c2: options.c2,
            velocity_clamp,
        }
    }

    pub fn from_config(config: &PsoConfig) -> Self {
        Self::new(config.options(), config.velocity_clamp())
    }

    /// Advances every particle one step with inertia weight `w`.
    pub fn step<R: Rng>(&self, swarm: &mut SwarmKinematics<'_>, w: f64, rng: &mut R) {
        let (n, d) = swarm.positions.shape();
        for i in 0..n {
            for j in 0..d {
                let r1: f64 = rng.random();
                let r2: f64 = rng.random();

                let x = swarm.positions[(i, j)];
                let mut v = w * swarm.velocities[(i, j)]
                    + self.c1 * r1 * (swarm.personal_best[(i, j)] - x)
                    + self.c2 * r2 * (swarm.global_best[j] - x);
                if let Some(clamp) = &self.velocity_clamp {
                    v = clamp.apply(v);
                }

                swarm.velocities[(i, j)] = v;
                swarm.positions[(i, j)] = x + v;
            }
        }
    }
}
