use serde::Deserialize;

use super::EstimatorError;

const LEAF: i64 = -1;

/// One fitted tree in scikit-learn's flat array layout.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class counts (or fractions).
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_classes: usize) -> Result<(), EstimatorError> {
        let n = self.children_left.len();
        if n == 0 {
            return Err(EstimatorError::Malformed("empty tree".into()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(EstimatorError::Malformed("tree arrays differ in length".into()));
        }
        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if self.value[node].len() != n_classes {
                    return Err(EstimatorError::Malformed(format!(
                        "leaf {node} has {} class values, expected {n_classes}",
                        self.value[node].len()
                    )));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) || self.feature[node] < 0 {
                return Err(EstimatorError::Malformed(format!("bad split at node {node}")));
            }
        }
        Ok(())
    }

    fn leaf_distribution(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            let value = *x.get(feature).ok_or(EstimatorError::DimensionMismatch {
                expected: feature + 1,
                actual: x.len(),
            })?;
            node = if value <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let counts = &self.value[node];
        let total: f64 = counts.iter().sum();
        if total <= 0.0 {
            return Err(EstimatorError::Malformed(format!("leaf {node} is empty")));
        }
        Ok(counts.iter().map(|c| c / total).collect())
    }
}

/// Random forest (a single decision tree is a forest of one).
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.trees.is_empty() {
            return Err(EstimatorError::Malformed("forest has no trees".into()));
        }
        self.trees
            .iter()
            .try_for_each(|tree| tree.validate(self.classes.len()))
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, EstimatorError> {
        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.leaf_distribution(x)?) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(proba.into_iter().map(|p| p / n).collect())
    }
}
