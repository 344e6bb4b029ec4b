use serde::Deserialize;

use super::{EstimatorError, check_dims};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Relu,
    Identity,
}

/// Inference-mode layers of a feed-forward network. Dropout is a no-op at
/// inference and is not exported.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Dense {
        /// `weights[out][in]`
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
        activation: Activation,
    },
    BatchNorm {
        gamma: Vec<f64>,
        beta: Vec<f64>,
        moving_mean: Vec<f64>,
        moving_variance: Vec<f64>,
        #[serde(default = "default_epsilon")]
        epsilon: f64,
    },
}

fn default_epsilon() -> f64 {
    1e-3
}

impl Layer {
    fn input_width(&self) -> usize {
        match self {
            Layer::Dense { weights, .. } => weights.first().map(Vec::len).unwrap_or(0),
            Layer::BatchNorm { gamma, .. } => gamma.len(),
        }
    }

    fn output_width(&self) -> usize {
        match self {
            Layer::Dense { weights, .. } => weights.len(),
            Layer::BatchNorm { gamma, .. } => gamma.len(),
        }
    }

    fn forward(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Layer::Dense {
                weights,
                bias,
                activation,
            } => weights
                .iter()
                .zip(bias)
                .map(|(row, b)| {
                    let z = row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b;
                    match activation {
                        Activation::Relu => z.max(0.0),
                        Activation::Identity => z,
                    }
                })
                .collect(),
            Layer::BatchNorm {
                gamma,
                beta,
                moving_mean,
                moving_variance,
                epsilon,
            } => x
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    gamma[i] * (v - moving_mean[i]) / (moving_variance[i] + epsilon).sqrt()
                        + beta[i]
                })
                .collect(),
        }
    }
}

/// Feed-forward regression network with a single output unit.
#[derive(Debug, Clone, Deserialize)]
pub struct Mlp {
    pub layers: Vec<Layer>,
}

impl Mlp {
    pub fn n_features(&self) -> Option<usize> {
        self.layers.first().map(Layer::input_width)
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        let Some(last) = self.layers.last() else {
            return Err(EstimatorError::Malformed("network has no layers".into()));
        };
        if last.output_width() != 1 {
            return Err(EstimatorError::Malformed(format!(
                "last layer has {} outputs, expected 1",
                last.output_width()
            )));
        }
        for (idx, layer) in self.layers.iter().enumerate() {
            match layer {
                Layer::Dense { weights, bias, .. } => {
                    let width = layer.input_width();
                    if weights.is_empty()
                        || width == 0
                        || bias.len() != weights.len()
                        || weights.iter().any(|row| row.len() != width)
                    {
                        return Err(EstimatorError::Malformed(format!(
                            "dense layer {idx} has inconsistent shape"
                        )));
                    }
                }
                Layer::BatchNorm {
                    gamma,
                    beta,
                    moving_mean,
                    moving_variance,
                    ..
                } => {
                    let n = gamma.len();
                    if beta.len() != n || moving_mean.len() != n || moving_variance.len() != n {
                        return Err(EstimatorError::Malformed(format!(
                            "batch norm layer {idx} has inconsistent shape"
                        )));
                    }
                }
            }
            if let Some(next) = self.layers.get(idx + 1) {
                if layer.output_width() != next.input_width() {
                    return Err(EstimatorError::Malformed(format!(
                        "layer {idx} emits {} values but layer {} expects {}",
                        layer.output_width(),
                        idx + 1,
                        next.input_width()
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64, EstimatorError> {
        check_dims(self.n_features().unwrap_or(0), x.len())?;
        let output = self
            .layers
            .iter()
            .fold(x.to_vec(), |acc, layer| layer.forward(&acc));
        output
            .first()
            .copied()
            .ok_or_else(|| EstimatorError::Malformed("network produced no output".into()))
    }
}
