//! Gradient-boosted regression trees, multi-class softmax inference.
//!
//! Each class owns a chain of regression trees. A class's raw score is its
//! base score plus `learning_rate × Σ tree(x)`; probabilities are the softmax
//! of the raw scores. Training happens elsewhere; this engine only evaluates
//! a fitted ensemble.
//!
//! XGBoost-style dumps already fold the learning rate into leaf values; load
//! those with `learning_rate = 1.0`.

use serde::{Deserialize, Serialize};

use crate::domain::RiskLabel;
use crate::error::ClassifierError;
use crate::record::{FeatureVector, FEATURE_COUNT};

use super::{Classifier, Probabilities};

/// One tree as parallel node arrays. `feature[i] < 0` marks a leaf; for a
/// split node, samples with `x[feature] <= threshold` go to `left[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeArrays {
    pub feature: Vec<i32>,
    pub threshold: Vec<f64>,
    pub left: Vec<i32>,
    pub right: Vec<i32>,
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A validated regression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Validate and convert node arrays.
    ///
    /// Children must point strictly forward, which rules out cycles and
    /// bounds evaluation by the node count.
    pub fn from_arrays(t: &TreeArrays) -> Result<Self, ClassifierError> {
        let n = t.feature.len();
        if n == 0 {
            return Err(ClassifierError::InvalidModel("empty tree".into()));
        }
        if [t.threshold.len(), t.left.len(), t.right.len(), t.value.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(ClassifierError::InvalidModel("inconsistent tree array lengths".into()));
        }

        let child = |i: usize, c: i32| -> Result<usize, ClassifierError> {
            usize::try_from(c)
                .ok()
                .filter(|&c| c > i && c < n)
                .ok_or_else(|| {
                    ClassifierError::InvalidModel(format!("node {i}: child index {c} out of order"))
                })
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let node = match usize::try_from(t.feature[i]) {
                Err(_) => Node::Leaf(t.value[i]),
                Ok(feature) if feature < FEATURE_COUNT => Node::Split {
                    feature,
                    threshold: t.threshold[i],
                    left: child(i, t.left[i])?,
                    right: child(i, t.right[i])?,
                },
                Ok(feature) => {
                    return Err(ClassifierError::InvalidModel(format!(
                        "node {i}: feature index {feature} out of range"
                    )))
                }
            };
            nodes.push(node);
        }
        Ok(Self { nodes })
    }

    /// Leaf value reached by `x`.
    pub fn predict(&self, x: &FeatureVector) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(v) => return v,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }
}

/// Serialised ensemble description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbmSpec {
    pub learning_rate: f64,
    /// Initial raw score per class.
    pub base_scores: Vec<f64>,
    /// `class_trees[k]` is the tree chain of class `k`.
    pub class_trees: Vec<Vec<TreeArrays>>,
}

/// Multi-class gradient-boosted classifier over the five risk labels.
#[derive(Debug, Clone)]
pub struct GbmClassifier {
    class_trees: Vec<Vec<RegressionTree>>,
    learning_rate: f64,
    base_scores: [f64; RiskLabel::COUNT],
}

impl GbmClassifier {
    pub fn from_spec(spec: &GbmSpec) -> Result<Self, ClassifierError> {
        if spec.class_trees.len() != RiskLabel::COUNT {
            return Err(ClassifierError::InvalidModel(format!(
                "expected {} tree chains, found {}",
                RiskLabel::COUNT,
                spec.class_trees.len()
            )));
        }
        let base_scores: [f64; RiskLabel::COUNT] =
            spec.base_scores.as_slice().try_into().map_err(|_| {
                ClassifierError::InvalidModel(format!(
                    "expected {} base scores, found {}",
                    RiskLabel::COUNT,
                    spec.base_scores.len()
                ))
            })?;
        if !spec.learning_rate.is_finite() {
            return Err(ClassifierError::InvalidModel("learning_rate must be finite".into()));
        }

        let class_trees = spec
            .class_trees
            .iter()
            .map(|chain| chain.iter().map(RegressionTree::from_arrays).collect())
            .collect::<Result<Vec<Vec<_>>, _>>()?;

        Ok(Self {
            class_trees,
            learning_rate: spec.learning_rate,
            base_scores,
        })
    }

    /// Boosting rounds per class.
    pub fn n_estimators(&self) -> usize {
        self.class_trees.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Raw (pre-softmax) score per class.
    pub fn raw_scores(&self, x: &FeatureVector) -> [f64; RiskLabel::COUNT] {
        let mut scores = self.base_scores;
        for (k, chain) in self.class_trees.iter().enumerate() {
            scores[k] += self.learning_rate * chain.iter().map(|t| t.predict(x)).sum::<f64>();
        }
        scores
    }
}

fn softmax(scores: [f64; RiskLabel::COUNT]) -> Probabilities {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = scores.map(|s| (s - max).exp());
    let sum: f64 = exp.iter().sum();
    exp.map(|e| e / sum)
}

impl Classifier for GbmClassifier {
    fn predict_probabilities(&self, x: &FeatureVector) -> Result<Probabilities, ClassifierError> {
        Ok(softmax(self.raw_scores(x)))
    }

    fn kind(&self) -> &'static str {
        "gradient_boosted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// x[feature] <= threshold → lo, else hi.
    fn stump(feature: i32, threshold: f64, lo: f64, hi: f64) -> TreeArrays {
        TreeArrays {
            feature: vec![feature, -1, -1],
            threshold: vec![threshold, 0.0, 0.0],
            left: vec![1, -1, -1],
            right: vec![2, -1, -1],
            value: vec![0.0, lo, hi],
        }
    }

    fn leaf(v: f64) -> TreeArrays {
        TreeArrays {
            feature: vec![-1],
            threshold: vec![0.0],
            left: vec![-1],
            right: vec![-1],
            value: vec![v],
        }
    }

    /// Class 0 wins on dry input, class 3 wins on wet input.
    fn rain_model() -> GbmSpec {
        GbmSpec {
            learning_rate: 0.5,
            base_scores: vec![0.0; 5],
            class_trees: vec![
                vec![stump(2, 40.0, 2.0, -2.0)],
                vec![leaf(0.0)],
                vec![leaf(0.0)],
                vec![stump(2, 40.0, -2.0, 2.0), stump(3, 70.0, 0.0, 1.0)],
                vec![],
            ],
        }
    }

    fn x(r7: f64, humidity: f64) -> FeatureVector {
        [r7 * 0.1, r7 * 0.5, r7, humidity, 0.0, 0.0, 0.0, 20.0]
    }

    #[test]
    fn stump_routes_on_threshold() {
        let t = RegressionTree::from_arrays(&stump(2, 40.0, -1.0, 1.0)).unwrap();
        assert_eq!(t.predict(&x(40.0, 50.0)), -1.0);
        assert_eq!(t.predict(&x(40.5, 50.0)), 1.0);
    }

    #[test]
    fn raw_scores_sum_scaled_tree_outputs() {
        let gbm = GbmClassifier::from_spec(&rain_model()).unwrap();
        let s = gbm.raw_scores(&x(80.0, 90.0));
        assert_relative_eq!(s[0], -1.0);
        assert_relative_eq!(s[3], 0.5 * (2.0 + 1.0));
        assert_relative_eq!(s[4], 0.0);
    }

    #[test]
    fn probabilities_are_a_distribution() {
        let gbm = GbmClassifier::from_spec(&rain_model()).unwrap();
        for input in [x(5.0, 45.0), x(80.0, 90.0), x(40.0, 70.0)] {
            let p = gbm.predict_probabilities(&input).unwrap();
            assert_relative_eq!(p.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert!(p.iter().all(|&v| v > 0.0));
        }
    }

    #[test]
    fn argmax_follows_rainfall() {
        let gbm = GbmClassifier::from_spec(&rain_model()).unwrap();
        let argmax = |p: Probabilities| {
            p.iter()
                .enumerate()
                .fold(0, |best, (i, &v)| if v > p[best] { i } else { best })
        };
        assert_eq!(argmax(gbm.predict_probabilities(&x(5.0, 45.0)).unwrap()), 0);
        assert_eq!(argmax(gbm.predict_probabilities(&x(80.0, 90.0)).unwrap()), 3);
    }

    #[test]
    fn rejects_wrong_class_count() {
        let mut spec = rain_model();
        spec.class_trees.pop();
        assert!(matches!(
            GbmClassifier::from_spec(&spec),
            Err(ClassifierError::InvalidModel(_))
        ));
    }

    #[test]
    fn rejects_backward_child_pointer() {
        let mut t = stump(0, 1.0, 0.0, 0.0);
        t.left[0] = 0;
        assert!(RegressionTree::from_arrays(&t).is_err());
    }

    #[test]
    fn rejects_feature_outside_schema() {
        assert!(RegressionTree::from_arrays(&stump(8, 1.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn rejects_ragged_arrays() {
        let mut t = stump(0, 1.0, 0.0, 0.0);
        t.value.pop();
        assert!(RegressionTree::from_arrays(&t).is_err());
    }
}
