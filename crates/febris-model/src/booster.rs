//! Multi-class gradient-boosted tree ensemble.
//!
//! Serialized as JSON with one entry per tree; each tree is tagged with the
//! class whose margin it contributes to and stores its nodes as a flat array
//! indexed by `id`:
//!
//! ```json
//! {
//!   "objective": "multi:softprob",
//!   "num_class": 3,
//!   "base_score": 0.5,
//!   "trees": [
//!     {
//!       "class": 1,
//!       "nodes": [
//!         {"id": 0, "feature": 0, "threshold": 38.5, "left": 1, "right": 2},
//!         {"id": 1, "leaf": -0.8},
//!         {"id": 2, "leaf": 1.2}
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Traversal goes left when `row[feature] < threshold`. Class margins are
//! `base_score` plus the sum of leaf values of that class's trees, and the
//! distribution is the softmax of the margins.

use serde::{Deserialize, Serialize};

use febris_contracts::error::{FebrisError, FebrisResult};

/// The only objective this crate evaluates.
pub const SOFTPROB_OBJECTIVE: &str = "multi:softprob";

/// One tree node. A record with the split fields is a split, one with
/// `leaf` is a leaf; anything else, including a mix of both, fails to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split(SplitNode),
    Leaf(LeafNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitNode {
    pub id: usize,
    pub feature: usize,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeafNode {
    pub id: usize,
    pub leaf: f64,
}

impl Node {
    pub fn id(&self) -> usize {
        match self {
            Node::Split(split) => split.id,
            Node::Leaf(leaf) => leaf.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Class index whose margin this tree adds to.
    pub class: usize,
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Check the structure so that `leaf_value` can never index out of
    /// bounds or loop.
    ///
    /// Nodes must be stored in `id` order, every split must reference two
    /// children with larger ids and a feature below `feature_count`, and
    /// every leaf must carry a finite value.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            if node.id() != idx {
                return Err(format!("node at position {idx} has id {}", node.id()));
            }

            match node {
                Node::Leaf(leaf) => {
                    if !leaf.leaf.is_finite() {
                        return Err(format!("leaf {idx} has a non-finite value"));
                    }
                }
                Node::Split(split) => {
                    if split.feature >= feature_count {
                        return Err(format!(
                            "node {idx} splits on feature {}, only {feature_count} declared",
                            split.feature
                        ));
                    }
                    if !split.threshold.is_finite() {
                        return Err(format!("node {idx} has a non-finite threshold"));
                    }
                    for child in [split.left, split.right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf and return its value.
    ///
    /// Assumes the tree passed `validate` and `row` is at least as long as
    /// the declared feature count.
    pub fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(leaf) => return leaf.leaf,
                Node::Split(split) => {
                    idx = if row[split.feature] < split.threshold {
                        split.left
                    } else {
                        split.right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booster {
    pub objective: String,
    pub num_class: usize,
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

fn default_base_score() -> f64 {
    0.5
}

impl Booster {
    /// Check the ensemble against the declared feature count.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.objective != SOFTPROB_OBJECTIVE {
            return Err(format!(
                "unsupported objective '{}', expected '{SOFTPROB_OBJECTIVE}'",
                self.objective
            ));
        }
        if self.num_class == 0 {
            return Err("num_class must be positive".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("base_score must be finite".to_string());
        }

        let mut per_class = vec![0usize; self.num_class];
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.class >= self.num_class {
                return Err(format!(
                    "tree {t} targets class {} but num_class is {}",
                    tree.class, self.num_class
                ));
            }
            tree.validate(feature_count)
                .map_err(|e| format!("tree {t}: {e}"))?;
            per_class[tree.class] += 1;
        }

        if let Some(class) = per_class.iter().position(|n| *n == 0) {
            return Err(format!("no trees for class {class}"));
        }
        Ok(())
    }

    /// Raw (pre-softmax) score per class.
    pub fn margins(&self, row: &[f64]) -> Vec<f64> {
        let mut margins = vec![self.base_score; self.num_class];
        for tree in &self.trees {
            margins[tree.class] += tree.leaf_value(row);
        }
        margins
    }

    /// Class probabilities for one row.
    pub fn predict_proba(&self, row: &[f64], feature_count: usize) -> FebrisResult<Vec<f64>> {
        if row.len() != feature_count {
            return Err(FebrisError::InferenceFailure {
                reason: format!("expected {feature_count} features, got {}", row.len()),
            });
        }
        if row.iter().any(|x| !x.is_finite()) {
            return Err(FebrisError::InferenceFailure {
                reason: "feature row contains a non-finite value".to_string(),
            });
        }
        Ok(softmax(&self.margins(row)))
    }
}

/// Numerically stable softmax.
pub fn softmax(x: &[f64]) -> Vec<f64> {
    let max_val = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp_sum: f64 = x.iter().map(|v| (v - max_val).exp()).sum();
    x.iter().map(|v| (v - max_val).exp() / exp_sum).collect()
}
