//! Random-forest scorer loaded from a JSON export.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "categories": ["work", "study", "health", ...],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 0, "threshold": 5.5, "left": 1, "right": 2 },
//!         { "value": [0.0, 1.0, 9.0] },
//!         { "value": [7.0, 2.0, 1.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Node 0 is the root of each tree. Inner nodes go left when
//! `x[feature] <= threshold`. Leaves hold per-class weights for
//! low, medium and high.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use kairos_core::TaskCategory;

use crate::features::ScoreFeatures;
use crate::score::{PriorityScore, ScorerFault};
use crate::scorer::Scorer;

/// Number of entries in the feature vector.
pub const FEATURE_COUNT: usize = 4;
/// Number of priority classes a leaf distributes over.
pub const CLASS_COUNT: usize = 3;
/// Days-until-due encoded for a task with no due date.
pub const NO_DUE_DATE_DAYS: f64 = 365.0;

// ── Artifact ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ModelArtifact {
    pub categories: Vec<String>,
    pub trees: Vec<TreeDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeDef {
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NodeDef {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

// ── Validated model ───────────────────────────────────────────

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution.
    Leaf([f64; CLASS_COUNT]),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_def(index: usize, def: TreeDef) -> Result<Self, ScorerFault> {
        let corrupt = |msg: String| ScorerFault::CorruptModel(format!("tree {}: {}", index, msg));
        let len = def.nodes.len();
        if len == 0 {
            return Err(corrupt("no nodes".into()));
        }

        let mut nodes = Vec::with_capacity(len);
        for (i, node) in def.nodes.into_iter().enumerate() {
            nodes.push(match node {
                NodeDef::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= FEATURE_COUNT {
                        return Err(corrupt(format!("node {} uses feature {}", i, feature)));
                    }
                    if !threshold.is_finite() {
                        return Err(corrupt(format!("node {} has a non-finite threshold", i)));
                    }
                    if left >= len || right >= len {
                        return Err(corrupt(format!("node {} points past the last node", i)));
                    }
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    }
                }
                NodeDef::Leaf { value } => Node::Leaf(normalize_leaf(&value).ok_or_else(|| {
                    corrupt(format!(
                        "leaf {} needs {} non-negative weights with a positive sum",
                        i, CLASS_COUNT
                    ))
                })?),
            });
        }

        let tree = Self { nodes };
        tree.check_acyclic().map_err(corrupt)?;
        Ok(tree)
    }

    /// Every node reachable from the root must be reached exactly once.
    fn check_acyclic(&self) -> Result<(), String> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            if std::mem::replace(&mut seen[i], true) {
                return Err(format!("node {} is reached twice", i));
            }
            if let Node::Split { left, right, .. } = self.nodes[i] {
                stack.push(left);
                stack.push(right);
            }
        }
        Ok(())
    }

    fn predict(&self, x: &[f64; FEATURE_COUNT]) -> &[f64; CLASS_COUNT] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if x[*feature] <= *threshold { *left } else { *right },
                Node::Leaf(dist) => return dist,
            }
        }
    }
}

fn normalize_leaf(weights: &[f64]) -> Option<[f64; CLASS_COUNT]> {
    if weights.len() != CLASS_COUNT || weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return None;
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return None;
    }
    Some([weights[0] / sum, weights[1] / sum, weights[2] / sum])
}

/// Scorer backed by a validated random forest.
#[derive(Debug, Clone)]
pub struct TrainedScorer {
    categories: Vec<String>,
    trees: Vec<Tree>,
}

impl TrainedScorer {
    pub fn load(path: &Path) -> Result<Self, ScorerFault> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ScorerFault::ModelMissing(format!("{}: {}", path.display(), e)))?;
        let scorer = Self::from_json(&raw)?;
        info!(
            "Loaded model from {} ({} trees, {} categories)",
            path.display(),
            scorer.tree_count(),
            scorer.categories.len()
        );
        Ok(scorer)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScorerFault> {
        let artifact: ModelArtifact =
            serde_json::from_str(raw).map_err(|e| ScorerFault::CorruptModel(e.to_string()))?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ScorerFault> {
        if artifact.trees.is_empty() {
            return Err(ScorerFault::CorruptModel("forest has no trees".into()));
        }
        if artifact.categories.is_empty() {
            return Err(ScorerFault::CorruptModel("category encoder is empty".into()));
        }
        let categories = artifact
            .categories
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, def)| Tree::from_def(i, def))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { categories, trees })
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    fn category_index(&self, category: TaskCategory) -> Result<usize, ScorerFault> {
        self.categories
            .iter()
            .position(|c| c == category.as_str())
            .ok_or_else(|| ScorerFault::UnknownCategory(category.as_str().to_string()))
    }

    /// Feature vector in training order: days until due, minutes, difficulty, category index.
    pub fn encode(&self, features: &ScoreFeatures) -> Result<[f64; FEATURE_COUNT], ScorerFault> {
        let days = match features.days_until_due {
            Some(d) => d.max(0) as f64,
            None => NO_DUE_DATE_DAYS,
        };
        Ok([
            days,
            features.estimated_minutes as f64,
            features.difficulty as f64,
            self.category_index(features.category)? as f64,
        ])
    }

    /// Mean class distribution across all trees.
    pub fn predict_proba(&self, x: &[f64; FEATURE_COUNT]) -> [f64; CLASS_COUNT] {
        let mut acc = [0.0; CLASS_COUNT];
        for tree in &self.trees {
            for (a, p) in acc.iter_mut().zip(tree.predict(x)) {
                *a += p;
            }
        }
        let n = self.trees.len() as f64;
        acc.map(|a| a / n)
    }

    /// Arg-max class. The lowest class wins ties.
    pub fn predict_class(&self, x: &[f64; FEATURE_COUNT]) -> usize {
        let proba = self.predict_proba(x);
        let mut best = 0;
        for class in 1..CLASS_COUNT {
            if proba[class] > proba[best] {
                best = class;
            }
        }
        best
    }
}

#[async_trait]
impl Scorer for TrainedScorer {
    fn name(&self) -> &str {
        "model"
    }

    async fn score(&self, features: &ScoreFeatures) -> Result<PriorityScore, ScorerFault> {
        let x = self.encode(features)?;
        let class = self.predict_class(&x);
        debug!("Model input {:?} -> class {}", x, class);
        PriorityScore::from_class(class as i64)
    }
}
