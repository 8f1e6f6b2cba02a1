use super::{check_len, Regressor};
use crate::error::{PredictError, Result};
use serde::Deserialize;

const LEAF: i64 = -1;

/// One regression tree in flattened array form. Node 0 is the root; a node
/// whose left child is -1 is a leaf and its `value` is the tree output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl Tree {
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("tree arrays differ in length".into());
        }
        for i in 0..n {
            let (l, r) = (self.children_left[i], self.children_right[i]);
            if l == LEAF {
                if r != LEAF {
                    return Err(format!("node {} has only a right child", i));
                }
                if !self.value[i].is_finite() {
                    return Err(format!("leaf {} has a non-finite value", i));
                }
                continue;
            }
            // children always come after their parent, so traversal terminates
            for c in [l, r] {
                if c <= i as i64 || c >= n as i64 {
                    return Err(format!("node {} has out-of-order child {}", i, c));
                }
            }
            let f = self.feature[i];
            if f < 0 || f as usize >= n_features {
                return Err(format!("node {} splits on missing feature {}", i, f));
            }
        }
        Ok(())
    }

    fn eval(&self, x: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left == LEAF {
                return self.value[node];
            }
            let f = self.feature[node] as usize;
            node = if x[f] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Averages the outputs of its trees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".into());
        }
        for (i, t) in self.trees.iter().enumerate() {
            t.validate(self.n_features)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: &[f64]) -> Result<f64> {
        check_len(x, self.n_features)?;
        if self.trees.is_empty() {
            return Err(PredictError::Model("forest has no trees".into()));
        }
        let sum: f64 = self.trees.iter().map(|t| t.eval(x)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
