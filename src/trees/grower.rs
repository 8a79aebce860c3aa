//! The shared tree-growth engine.
//!
//! Classifier and regressor both delegate here; the only thing they decide
//! is the [`GrowStrategy`] the engine is driven by.

use nalgebra::DVector;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::data::dataset::{Dataset, Number, TargetValue};
use crate::trees::node::TreeNode;
use crate::trees::params::TreeParams;

/// The two task-specific decisions of tree growth: how impure a label subset
/// is, and what value a leaf over that subset predicts.
pub(crate) trait GrowStrategy<XT: Number, YT: TargetValue>: Sync {
    /// Non-negative, 0 for a homogeneous subset, lower is better.
    fn impurity(&self, y: &DVector<YT>) -> f64;

    fn leaf_value(&self, y: &DVector<YT>) -> YT;

    fn is_homogeneous(&self, y: &DVector<YT>) -> bool {
        match y.iter().next() {
            Some(first) => y.iter().all(|value| value == first),
            None => true,
        }
    }
}

pub(crate) struct SplitData<XT: Number, YT: TargetValue> {
    pub feature_index: usize,
    pub threshold: XT,
    pub left: Dataset<XT, YT>,
    pub right: Dataset<XT, YT>,
    score: f64,
}

/// Grows a tree by recursive greedy split search.
///
/// At every node a fresh subset of `ceil(sqrt(n_features))` candidate
/// features is drawn without replacement, each distinct value of a candidate
/// feature is tried as a threshold, and the partition with the lowest
/// size-weighted child impurity wins. Ties keep the first candidate found,
/// with features in sampled order and thresholds ascending.
pub(crate) struct TreeGrower<'a, S> {
    strategy: &'a S,
    min_samples_split: u16,
    max_depth: Option<u16>,
}

impl<'a, S> TreeGrower<'a, S> {
    pub fn new(strategy: &'a S, params: &TreeParams) -> Self {
        Self {
            strategy,
            min_samples_split: params.min_samples_split(),
            max_depth: params.max_depth(),
        }
    }

    /// Builds the subtree for `dataset`. The root is grown at `level` 1; a
    /// node at `level` may only split while `level + 1` stays within
    /// `max_depth`.
    pub fn grow<XT, YT>(
        &self,
        dataset: &Dataset<XT, YT>,
        rng: &mut StdRng,
        level: u16,
    ) -> TreeNode<XT, YT>
    where
        XT: Number,
        YT: TargetValue,
        S: GrowStrategy<XT, YT>,
    {
        let within_depth = self.max_depth.map_or(true, |depth| level + 1 <= depth);
        if within_depth
            && dataset.n_samples() >= usize::from(self.min_samples_split)
            && !self.strategy.is_homogeneous(&dataset.y)
        {
            if let Some(split) = self.best_split(dataset, rng) {
                let left = self.grow(&split.left, rng, level + 1);
                let right = self.grow(&split.right, rng, level + 1);
                return TreeNode::Internal {
                    feature_index: split.feature_index,
                    threshold: split.threshold,
                    left: Box::new(left),
                    right: Box::new(right),
                };
            }
        }

        TreeNode::leaf(self.strategy.leaf_value(&dataset.y))
    }

    fn best_split<XT, YT>(
        &self,
        dataset: &Dataset<XT, YT>,
        rng: &mut StdRng,
    ) -> Option<SplitData<XT, YT>>
    where
        XT: Number,
        YT: TargetValue,
        S: GrowStrategy<XT, YT>,
    {
        let n_features = dataset.n_features();
        if n_features == 0 {
            return None;
        }
        let subset_size = ((n_features as f64).sqrt().ceil() as usize).min(n_features);
        let candidates = rand::seq::index::sample(rng, n_features, subset_size).into_vec();

        let scanned: Vec<_> = candidates
            .into_par_iter()
            .map(|feature_index| self.scan_feature(dataset, feature_index))
            .collect();

        // Sequential fold in sampled-feature order with a strict `<`, so a
        // tied score never displaces an earlier candidate regardless of how
        // the parallel scan interleaved.
        let mut best: Option<SplitData<XT, YT>> = None;
        for candidate in scanned.into_iter().flatten() {
            match &best {
                Some(current) if candidate.score >= current.score => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// The best split on one feature, trying every distinct value of the
    /// column as a threshold in ascending order. Candidates leaving either
    /// side empty are rejected; `None` means no candidate survived.
    fn scan_feature<XT, YT>(
        &self,
        dataset: &Dataset<XT, YT>,
        feature_index: usize,
    ) -> Option<SplitData<XT, YT>>
    where
        XT: Number,
        YT: TargetValue,
        S: GrowStrategy<XT, YT>,
    {
        let n_samples = dataset.n_samples() as f64;
        let mut best: Option<SplitData<XT, YT>> = None;

        for threshold in dataset.feature_values(feature_index) {
            let (left, right) = dataset.split_on_threshold(feature_index, threshold);
            if !left.is_not_empty() || !right.is_not_empty() {
                continue;
            }
            let score = (left.n_samples() as f64 / n_samples) * self.strategy.impurity(&left.y)
                + (right.n_samples() as f64 / n_samples) * self.strategy.impurity(&right.y);
            if best.as_ref().map_or(true, |current| score < current.score) {
                best = Some(SplitData {
                    feature_index,
                    threshold,
                    left,
                    right,
                    score,
                });
            }
        }
        best
    }
}
