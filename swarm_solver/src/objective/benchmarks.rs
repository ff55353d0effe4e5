//! Standard test functions, each defined on a single position.

use std::f64::consts::PI;

/// `sum(x_i^2)`, minimum 0 at the origin.
pub fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|xi| xi * xi).sum()
}

/// `sum(100 (x_{i+1} - x_i^2)^2 + (1 - x_i)^2)`, minimum 0 at `(1, .., 1)`.
pub fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2)
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

/// `10 n + sum(x_i^2 - 10 cos(2 pi x_i))`, minimum 0 at the origin.
pub fn rastrigin(x: &[f64]) -> f64 {
    10.0 * x.len() as f64
        + x.iter()
            .map(|xi| xi * xi - 10.0 * (2.0 * PI * xi).cos())
            .sum::<f64>()
}
