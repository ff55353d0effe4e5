use anyhow::{Result, bail};
use nalgebra::{DMatrix, DVector};

use crate::dataset::Dataset;

/// One dense layer: `weights` is `n_out × n_in`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub weights: DMatrix<f64>,
    pub biases: DVector<f64>,
}

/// Fully connected feed-forward classifier with tanh hidden layers and a
/// softmax output, parameterized by one flat vector.
#[derive(Clone, Debug)]
pub struct Network {
    layer_sizes: Vec<usize>,
}

impl Network {
    /// `layer_sizes` runs from the input width to the number of classes.
    pub fn new(layer_sizes: Vec<usize>) -> Result<Self> {
        if layer_sizes.len() < 2 {
            bail!(
                "A network needs at least an input and an output layer, got sizes {:?}",
                layer_sizes
            );
        }
        if layer_sizes.contains(&0) {
            bail!("Layer sizes must be positive, got {:?}", layer_sizes);
        }
        Ok(Self { layer_sizes })
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn n_inputs(&self) -> usize {
        self.layer_sizes[0]
    }

    pub fn n_classes(&self) -> usize {
        self.layer_sizes[self.layer_sizes.len() - 1]
    }

    /// Length of the flat parameter vector.
    pub fn n_params(&self) -> usize {
        self.layer_sizes
            .windows(2)
            .map(|w| w[0] * w[1] + w[1])
            .sum()
    }

    /// Splits a flat parameter vector into layers. Each layer takes its
    /// weights in row-major order, then its biases.
    pub fn unroll(&self, params: &[f64]) -> Result<Vec<Layer>> {
        if params.len() != self.n_params() {
            bail!(
                "Parameter vector length ({}) did not match network parameter count ({})",
                params.len(),
                self.n_params()
            );
        }

        let mut offset = 0;
        let layers = self
            .layer_sizes
            .windows(2)
            .map(|w| {
                let (n_in, n_out) = (w[0], w[1]);
                let weights =
                    DMatrix::from_row_slice(n_out, n_in, &params[offset..offset + n_out * n_in]);
                offset += n_out * n_in;
                let biases = DVector::from_column_slice(&params[offset..offset + n_out]);
                offset += n_out;
                Layer { weights, biases }
            })
            .collect();
        Ok(layers)
    }

    /// Log class probabilities, `n_samples × n_classes`.
    pub fn forward_log_probs(&self, layers: &[Layer], inputs: &DMatrix<f64>) -> DMatrix<f64> {
        let mut activations = inputs.clone();
        for (k, layer) in layers.iter().enumerate() {
            let mut z = &activations * layer.weights.transpose();
            for (j, bias) in layer.biases.iter().enumerate() {
                z.column_mut(j).add_scalar_mut(*bias);
            }
            activations = if k + 1 < layers.len() {
                z.map(f64::tanh)
            } else {
                z
            };
        }
        log_softmax_rows(activations)
    }

    /// Class probabilities, `n_samples × n_classes`; every row sums to one.
    pub fn forward(&self, layers: &[Layer], inputs: &DMatrix<f64>) -> DMatrix<f64> {
        self.forward_log_probs(layers, inputs).map(f64::exp)
    }

    /// Checks that `dataset` can be fed through this network: one input per
    /// feature column and every label a valid class index.
    pub fn check_dataset(&self, dataset: &Dataset) -> Result<()> {
        self.check_inputs(&dataset.features)?;
        if dataset.features.nrows() != dataset.labels.len() {
            bail!(
                "Feature rows ({}) did not match number of labels ({})",
                dataset.features.nrows(),
                dataset.labels.len()
            );
        }
        if let Some((i, label)) = dataset
            .labels
            .iter()
            .enumerate()
            .find(|(_, label)| **label >= self.n_classes())
        {
            bail!(
                "Label {} of sample {} is out of range for {} classes",
                label,
                i,
                self.n_classes()
            );
        }
        Ok(())
    }

    fn check_inputs(&self, inputs: &DMatrix<f64>) -> Result<()> {
        if inputs.ncols() != self.n_inputs() {
            bail!(
                "Input width ({}) did not match network input size ({})",
                inputs.ncols(),
                self.n_inputs()
            );
        }
        Ok(())
    }

    /// Mean negative log-likelihood of the labels.
    pub fn nll_loss(&self, params: &[f64], dataset: &Dataset) -> Result<f64> {
        self.check_dataset(dataset)?;
        let layers = self.unroll(params)?;
        let log_probs = self.forward_log_probs(&layers, &dataset.features);
        let total: f64 = dataset
            .labels
            .iter()
            .enumerate()
            .map(|(i, &label)| -log_probs[(i, label)])
            .sum();
        Ok(total / dataset.len() as f64)
    }

    /// Most probable class per sample.
    pub fn predict(&self, params: &[f64], inputs: &DMatrix<f64>) -> Result<Vec<usize>> {
        self.check_inputs(inputs)?;
        let layers = self.unroll(params)?;
        let log_probs = self.forward_log_probs(&layers, inputs);
        Ok(log_probs.row_iter().map(|row| row.transpose().argmax().0).collect())
    }

    pub fn accuracy(&self, params: &[f64], dataset: &Dataset) -> Result<f64> {
        let predictions = self.predict(params, &dataset.features)?;
        let correct = predictions
            .iter()
            .zip(dataset.labels.iter())
            .filter(|(p, y)| p == y)
            .count();
        Ok(correct as f64 / dataset.len() as f64)
    }
}

fn log_softmax_rows(mut z: DMatrix<f64>) -> DMatrix<f64> {
    for mut row in z.row_iter_mut() {
        let max = row.max();
        let log_sum = row.iter().map(|x| (x - max).exp()).sum::<f64>().ln();
        row.apply(|x| *x = *x - max - log_sum);
    }
    z
}
