use serde::Deserialize;

use super::{EstimatorError, check_dims};

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NeighborWeights {
    Uniform,
    Distance,
}

/// k-nearest-neighbours classifier over the stored (scaled) training rows.
#[derive(Debug, Clone, Deserialize)]
pub struct KNeighbors {
    pub n_neighbors: usize,
    pub weights: NeighborWeights,
    pub classes: Vec<i64>,
    pub fit_x: Vec<Vec<f64>>,
    /// Index into `classes` for each training row.
    pub fit_y: Vec<usize>,
}

impl KNeighbors {
    pub fn n_features(&self) -> Option<usize> {
        self.fit_x.first().map(Vec::len)
    }

    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.n_neighbors == 0 {
            return Err(EstimatorError::Malformed("n_neighbors must be positive".into()));
        }
        if self.fit_x.len() < self.n_neighbors {
            return Err(EstimatorError::Malformed(format!(
                "{} training rows cannot supply {} neighbours",
                self.fit_x.len(),
                self.n_neighbors
            )));
        }
        if self.fit_x.len() != self.fit_y.len() {
            return Err(EstimatorError::Malformed("fit_x and fit_y differ in length".into()));
        }
        let width = self.n_features().unwrap_or(0);
        if self.fit_x.iter().any(|row| row.len() != width) {
            return Err(EstimatorError::Malformed("ragged training rows".into()));
        }
        if self.fit_y.iter().any(|&y| y >= self.classes.len()) {
            return Err(EstimatorError::Malformed("label index out of range".into()));
        }
        Ok(())
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        check_dims(self.n_features().unwrap_or(0), x.len())?;

        let mut distances: Vec<(f64, usize)> = self
            .fit_x
            .iter()
            .zip(&self.fit_y)
            .map(|(row, &label)| {
                let d2: f64 = row.iter().zip(x).map(|(a, b)| (a - b).powi(2)).sum();
                (d2.sqrt(), label)
            })
            .collect();
        // Stable sort keeps training order among equidistant rows.
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));
        let nearest = &distances[..self.n_neighbors];

        let mut votes = vec![0.0; self.classes.len()];
        match self.weights {
            NeighborWeights::Uniform => {
                for &(_, label) in nearest {
                    votes[label] += 1.0;
                }
            }
            NeighborWeights::Distance => {
                // Exact matches take all of the weight.
                if nearest.iter().any(|(d, _)| *d == 0.0) {
                    for &(d, label) in nearest {
                        if d == 0.0 {
                            votes[label] += 1.0;
                        }
                    }
                } else {
                    for &(d, label) in nearest {
                        votes[label] += 1.0 / d;
                    }
                }
            }
        }

        let total: f64 = votes.iter().sum();
        Ok(votes.into_iter().map(|v| v / total).collect())
    }
}
