use std::f64::consts::TAU;

use anyhow::{Result, bail};
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Normal;

/// Labelled samples: one feature row per sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    pub features: DMatrix<f64>,
    pub labels: Vec<usize>,
}

const BLOB_RADIUS: f64 = 3.0;
const BLOB_SPREAD: f64 = 0.6;

impl Dataset {
    pub fn new(features: DMatrix<f64>, labels: Vec<usize>) -> Result<Self> {
        if features.nrows() != labels.len() {
            bail!(
                "Feature rows ({}) did not match number of labels ({})",
                features.nrows(),
                labels.len()
            );
        }
        Ok(Self { features, labels })
    }

    /// Two-dimensional Gaussian blobs, one per class, centered on a circle.
    /// Samples are ordered class by class.
    pub fn blobs(n_per_class: usize, n_classes: usize, seed: u64) -> Result<Self> {
        if n_per_class == 0 || n_classes == 0 {
            bail!(
                "Need at least one class and one sample per class, got {} x {}",
                n_classes,
                n_per_class
            );
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let noise = Normal::new(0.0, BLOB_SPREAD)?;

        let n = n_per_class * n_classes;
        let mut features = DMatrix::zeros(n, 2);
        let mut labels = Vec::with_capacity(n);
        for class in 0..n_classes {
            let angle = TAU * class as f64 / n_classes as f64;
            let center = [BLOB_RADIUS * angle.cos(), BLOB_RADIUS * angle.sin()];
            for k in 0..n_per_class {
                let i = class * n_per_class + k;
                features[(i, 0)] = center[0] + rng.sample(noise);
                features[(i, 1)] = center[1] + rng.sample(noise);
                labels.push(class);
            }
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}
