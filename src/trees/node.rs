use nalgebra::DVector;

use crate::data::dataset::{Number, TargetValue};

/// A node of a fitted decision tree.
///
/// A node is either a leaf carrying the prediction for every row routed to
/// it, or an internal decision node owning its two children. The two states
/// are exclusive by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum TreeNode<XT: Number, YT: TargetValue> {
    Leaf {
        value: YT,
    },
    Internal {
        feature_index: usize,
        threshold: XT,
        left: Box<TreeNode<XT, YT>>,
        right: Box<TreeNode<XT, YT>>,
    },
}

impl<XT: Number, YT: TargetValue> TreeNode<XT, YT> {
    pub fn leaf(value: YT) -> Self {
        Self::Leaf { value }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }

    /// The number of node levels below and including this node.
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Routes one feature row down the tree and returns the leaf value it
    /// reaches. Rows go left iff `features[feature_index] <= threshold`.
    pub fn traverse(&self, features: &DVector<XT>) -> YT {
        match self {
            Self::Leaf { value } => *value,
            Self::Internal {
                feature_index,
                threshold,
                left,
                right,
            } => {
                if features[*feature_index] <= *threshold {
                    left.traverse(features)
                } else {
                    right.traverse(features)
                }
            }
        }
    }
}
