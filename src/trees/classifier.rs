//! Decision Tree Classifier

use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::data::dataset::{Dataset, Number, WholeNumber};
use crate::error::{Result, TreeError};
use crate::trees::grower::{GrowStrategy, TreeGrower};
use crate::trees::node::TreeNode;
use crate::trees::params::{ClassificationCriterion, TreeClassifierParams};

/// Gini / entropy impurity with class weights looked up by class value, plus
/// majority-vote leaf values.
pub(crate) struct ClassificationStrategy<YT: WholeNumber> {
    criterion: ClassificationCriterion,
    class_weights: HashMap<YT, f64>,
}

impl<YT: WholeNumber> ClassificationStrategy<YT> {
    pub fn new(criterion: ClassificationCriterion, class_weights: HashMap<YT, f64>) -> Self {
        Self {
            criterion,
            class_weights,
        }
    }

    /// Weight of one class; classes the weights were never computed for
    /// count as unweighted.
    fn weight(&self, class: &YT) -> f64 {
        self.class_weights.get(class).copied().unwrap_or(1.0)
    }

    fn class_counts(y: &DVector<YT>) -> HashMap<YT, usize> {
        let mut counts = HashMap::new();
        for label in y.iter() {
            *counts.entry(*label).or_insert(0) += 1;
        }
        counts
    }
}

impl<XT: Number, YT: WholeNumber> GrowStrategy<XT, YT> for ClassificationStrategy<YT> {
    /// Sums over the classes present in `y` only, so the entropy branch
    /// never takes `log2` of a zero probability.
    fn impurity(&self, y: &DVector<YT>) -> f64 {
        let n = y.len() as f64;
        Self::class_counts(y)
            .iter()
            .map(|(class, &count)| {
                let weight = self.weight(class);
                let p = count as f64 / n;
                match self.criterion {
                    ClassificationCriterion::Gini => weight * p * (1.0 - p),
                    ClassificationCriterion::Entropy => -(weight * p * p.log2()),
                }
            })
            .sum()
    }

    /// The most frequent class, ties broken towards the lowest class value.
    fn leaf_value(&self, y: &DVector<YT>) -> YT {
        let mut winner: Option<(YT, usize)> = None;
        for (class, count) in Self::class_counts(y) {
            winner = match winner {
                Some((best_class, best_count))
                    if count < best_count
                        || (count == best_count
                            && class.partial_cmp(&best_class) != Some(Ordering::Less)) =>
                {
                    Some((best_class, best_count))
                }
                _ => Some((class, count)),
            };
        }
        winner.map(|(class, _)| class).unwrap_or_else(YT::zero)
    }
}

/// Decision Tree Classifier
#[derive(Clone, Debug)]
pub struct DecisionTreeClassifier<XT: Number, YT: WholeNumber> {
    root: Option<TreeNode<XT, YT>>,
    params: TreeClassifierParams,
    class_weights: Vec<(YT, f64)>,
    n_features: Option<usize>,
}

impl<XT: Number, YT: WholeNumber> Default for DecisionTreeClassifier<XT, YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: Number, YT: WholeNumber> DecisionTreeClassifier<XT, YT> {
    /// Creates a classifier with default parameters (gini, unbounded depth,
    /// `min_samples_split` of 2, unweighted classes).
    pub fn new() -> Self {
        Self {
            root: None,
            params: TreeClassifierParams::new(),
            class_weights: Vec::new(),
            n_features: None,
        }
    }

    /// Creates a classifier with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the criterion is not one of `"gini"` /
    /// `"entropy"`, if `min_samples_split` is less than 2, or if `max_depth`
    /// is less than 1.
    pub fn with_params(
        criterion: Option<&str>,
        min_samples_split: Option<u16>,
        max_depth: Option<u16>,
    ) -> Result<Self> {
        let mut tree = Self::new();
        if let Some(criterion) = criterion {
            tree.set_criterion(criterion)?;
        }
        tree.set_min_samples_split(min_samples_split.unwrap_or(2))?;
        tree.set_max_depth(max_depth)?;
        Ok(tree)
    }

    pub fn set_criterion(&mut self, criterion: &str) -> Result<()> {
        self.params.set_criterion(criterion)
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        self.params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<()> {
        self.params.set_max_depth(max_depth)
    }

    pub fn set_balance_class_weights(&mut self, balance_class_weights: bool) {
        self.params.set_balance_class_weights(balance_class_weights);
    }

    pub fn set_rng_seed(&mut self, rng_seed: Option<u64>) {
        self.params.set_rng_seed(rng_seed);
    }

    /// The configured hyperparameters. Learned state (the tree, the class
    /// weights) is not part of this.
    pub fn get_params(&self) -> &TreeClassifierParams {
        &self.params
    }

    /// The per-class weights of the last `fit`, ascending by class value.
    pub fn class_weights(&self) -> &[(YT, f64)] {
        &self.class_weights
    }

    pub fn root(&self) -> Option<&TreeNode<XT, YT>> {
        self.root.as_ref()
    }

    /// Fits the tree, replacing any previously trained one.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset has no rows or if the feature matrix
    /// and the target vector disagree on the sample count.
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<()> {
        let (x, y) = dataset.into_parts();
        if x.nrows() == 0 {
            return Err(TreeError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(TreeError::SampleCountMismatch {
                x_rows: x.nrows(),
                y_rows: y.len(),
            });
        }

        self.class_weights = self.compute_class_weights(y);
        let strategy = ClassificationStrategy::new(
            self.params.criterion(),
            self.class_weights.iter().copied().collect(),
        );
        let grower = TreeGrower::new(&strategy, &self.params.base_params);
        let mut rng = match self.params.rng_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.n_features = Some(x.ncols());
        self.root = Some(grower.grow(dataset, &mut rng, 1));
        Ok(())
    }

    /// Predicts one class per row of `features`, preserving row order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree wasn't fitted yet or if the column count
    /// differs from the training data.
    pub fn predict(&self, features: &DMatrix<XT>) -> Result<DVector<YT>> {
        let root = self.root.as_ref().ok_or(TreeError::NotFitted)?;
        let expected = self.n_features.ok_or(TreeError::NotFitted)?;
        if features.ncols() != expected {
            return Err(TreeError::FeatureCountMismatch {
                expected,
                got: features.ncols(),
            });
        }

        let predictions: Vec<YT> = features
            .row_iter()
            .map(|row| root.traverse(&row.transpose()))
            .collect();
        Ok(DVector::from_vec(predictions))
    }

    /// One weight per class seen in `y`, ascending by class value. With
    /// balancing enabled a class's weight is `n / (n_classes * count)`, so
    /// rarer classes weigh more; otherwise every weight is 1.0.
    fn compute_class_weights(&self, y: &DVector<YT>) -> Vec<(YT, f64)> {
        let mut counts: HashMap<YT, usize> = HashMap::new();
        for label in y.iter() {
            *counts.entry(*label).or_insert(0) += 1;
        }
        let mut classes: Vec<(YT, usize)> = counts.into_iter().collect();
        classes.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let n = y.len() as f64;
        let n_classes = classes.len() as f64;
        classes
            .into_iter()
            .map(|(class, count)| {
                let weight = if self.params.balance_class_weights() {
                    n / (n_classes * count as f64)
                } else {
                    1.0
                };
                (class, weight)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_dataset() -> Dataset<f64, u8> {
        let x = DMatrix::from_row_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![0, 0, 1, 1]);
        Dataset::new(x, y)
    }

    #[test]
    fn test_fit_and_predict_pure_split() {
        let mut classifier = DecisionTreeClassifier::with_params(Some("gini"), None, Some(2)).unwrap();
        classifier.fit(&step_dataset()).unwrap();

        match classifier.root().unwrap() {
            TreeNode::Internal {
                feature_index,
                threshold,
                left,
                right,
            } => {
                assert_eq!(*feature_index, 0);
                assert_relative_eq!(*threshold, 1.0);
                assert!(left.is_leaf());
                assert!(right.is_leaf());
            }
            TreeNode::Leaf { .. } => panic!("separable classes should split"),
        }

        let predictions = classifier
            .predict(&DMatrix::from_row_slice(2, 1, &[0.0, 3.0]))
            .unwrap();
        assert_eq!(predictions, DVector::from_vec(vec![0, 1]));
    }

    #[test]
    fn test_entropy_criterion_reaches_the_same_split() {
        let mut classifier =
            DecisionTreeClassifier::with_params(Some("entropy"), None, Some(2)).unwrap();
        classifier.fit(&step_dataset()).unwrap();
        let predictions = classifier
            .predict(&DMatrix::from_row_slice(2, 1, &[0.0, 3.0]))
            .unwrap();
        assert_eq!(predictions, DVector::from_vec(vec![0, 1]));
    }

    #[test]
    fn test_homogeneous_labels_make_the_root_a_leaf() {
        let x = DMatrix::from_row_slice(3, 1, &[1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![1u8, 1, 1]);
        let mut classifier = DecisionTreeClassifier::new();
        classifier.fit(&Dataset::new(x, y)).unwrap();
        assert_eq!(classifier.root(), Some(&TreeNode::leaf(1)));
    }

    #[test]
    fn test_min_samples_split_and_mode_tie_break() {
        // Four rows below the split threshold of five, so the root stays a
        // leaf; four single-count classes tie, won by the lowest value.
        let x = DMatrix::from_row_slice(4, 1, &[0.0, 1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![3u8, 1, 2, 0]);
        let mut classifier = DecisionTreeClassifier::with_params(None, Some(5), None).unwrap();
        classifier.fit(&Dataset::new(x, y)).unwrap();
        assert_eq!(classifier.root(), Some(&TreeNode::leaf(0)));
    }

    #[test]
    fn test_balanced_class_weights() {
        let x = DMatrix::from_row_slice(5, 1, &[0.0, 1.0, 2.0, 3.0, 4.0]);
        let y = DVector::from_vec(vec![0u8, 0, 0, 0, 1]);
        let dataset = Dataset::new(x, y);

        let mut classifier = DecisionTreeClassifier::new();
        classifier.set_balance_class_weights(true);
        classifier.fit(&dataset).unwrap();
        assert_eq!(classifier.class_weights(), &[(0, 0.625), (1, 2.5)]);

        let mut unweighted = DecisionTreeClassifier::new();
        unweighted.fit(&dataset).unwrap();
        assert_eq!(unweighted.class_weights(), &[(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn test_class_weights_recomputed_each_fit() {
        let mut classifier = DecisionTreeClassifier::new();
        classifier.set_balance_class_weights(true);

        let x = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        classifier
            .fit(&Dataset::new(x.clone(), DVector::from_vec(vec![0u8, 1])))
            .unwrap();
        assert_eq!(classifier.class_weights(), &[(0, 1.0), (1, 1.0)]);

        classifier
            .fit(&Dataset::new(x, DVector::from_vec(vec![2u8, 2])))
            .unwrap();
        assert_eq!(classifier.class_weights(), &[(2, 1.0)]);
    }

    #[test]
    fn test_impurity_weights_align_by_class_value() {
        // A subset missing the globally lowest class must still pair each
        // class with its own weight, not with the weights in positional
        // order.
        let weights: HashMap<u8, f64> = [(0, 0.5), (1, 2.0), (2, 10.0)].into_iter().collect();
        let strategy = ClassificationStrategy::new(ClassificationCriterion::Gini, weights);

        let subset = DVector::from_vec(vec![1u8, 1, 2]);
        let expected = 2.0 * (2.0 / 3.0) * (1.0 / 3.0) + 10.0 * (1.0 / 3.0) * (2.0 / 3.0);
        let got = GrowStrategy::<f64, u8>::impurity(&strategy, &subset);
        assert_relative_eq!(got, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_gini_of_pure_subset_is_zero() {
        let strategy =
            ClassificationStrategy::new(ClassificationCriterion::Gini, HashMap::new());
        let y = DVector::from_vec(vec![4u8, 4, 4]);
        assert_relative_eq!(GrowStrategy::<f64, u8>::impurity(&strategy, &y), 0.0);
    }

    #[test]
    fn test_entropy_of_even_split_is_one_bit() {
        let strategy =
            ClassificationStrategy::new(ClassificationCriterion::Entropy, HashMap::new());
        let y = DVector::from_vec(vec![0u8, 0, 1, 1]);
        assert_relative_eq!(GrowStrategy::<f64, u8>::impurity(&strategy, &y), 1.0);
    }

    #[test]
    fn test_deterministic_with_fixed_seed() {
        let x = DMatrix::from_row_slice(
            8,
            3,
            &[
                0.1, 5.0, 2.0, 0.4, 4.0, 1.0, 0.6, 3.5, 7.0, 0.9, 2.0, 4.0, 1.3, 1.0, 3.0, 1.7,
                0.5, 9.0, 2.2, 0.3, 5.0, 2.9, 0.1, 6.0,
            ],
        );
        let y = DVector::from_vec(vec![0u8, 0, 0, 1, 1, 1, 2, 2]);
        let dataset = Dataset::new(x.clone(), y);

        let mut first = DecisionTreeClassifier::new();
        first.set_rng_seed(Some(7));
        first.fit(&dataset).unwrap();

        let mut second = DecisionTreeClassifier::new();
        second.set_rng_seed(Some(7));
        second.fit(&dataset).unwrap();

        assert_eq!(first.root(), second.root());
        assert_eq!(first.predict(&x).unwrap(), second.predict(&x).unwrap());
    }

    #[test]
    fn test_max_depth_one_never_splits() {
        let mut classifier = DecisionTreeClassifier::with_params(None, None, Some(1)).unwrap();
        classifier.fit(&step_dataset()).unwrap();
        assert!(classifier.root().unwrap().depth() <= 2);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let classifier: DecisionTreeClassifier<f64, u8> = DecisionTreeClassifier::new();
        let err = classifier
            .predict(&DMatrix::from_row_slice(1, 1, &[0.0]))
            .unwrap_err();
        assert_eq!(err, TreeError::NotFitted);
    }

    #[test]
    fn test_predict_feature_count_mismatch_fails() {
        let mut classifier = DecisionTreeClassifier::new();
        classifier.fit(&step_dataset()).unwrap();
        let err = classifier
            .predict(&DMatrix::from_row_slice(1, 2, &[0.0, 1.0]))
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::FeatureCountMismatch {
                expected: 1,
                got: 2
            }
        );
    }

    #[test]
    fn test_fit_on_empty_dataset_fails() {
        let mut classifier: DecisionTreeClassifier<f64, u8> = DecisionTreeClassifier::new();
        let empty = Dataset::new(DMatrix::zeros(0, 2), DVector::zeros(0));
        assert_eq!(classifier.fit(&empty).unwrap_err(), TreeError::EmptyTrainingSet);
    }

    #[test]
    fn test_fit_on_mismatched_rows_fails() {
        let mut classifier: DecisionTreeClassifier<f64, u8> = DecisionTreeClassifier::new();
        let dataset = Dataset::new(
            DMatrix::from_row_slice(3, 1, &[0.0, 1.0, 2.0]),
            DVector::from_vec(vec![0, 1]),
        );
        assert_eq!(
            classifier.fit(&dataset).unwrap_err(),
            TreeError::SampleCountMismatch {
                x_rows: 3,
                y_rows: 2
            }
        );
    }

    #[test]
    fn test_unknown_loss_is_rejected_at_configuration() {
        let result = DecisionTreeClassifier::<f64, u8>::with_params(Some("logloss"), None, None);
        assert!(matches!(result, Err(TreeError::UnknownLoss { .. })));
    }

    #[test]
    fn test_get_params_reports_configuration() {
        let classifier =
            DecisionTreeClassifier::<f64, u8>::with_params(Some("entropy"), Some(4), Some(3))
                .unwrap();
        let params = classifier.get_params();
        assert_eq!(params.criterion(), ClassificationCriterion::Entropy);
        assert_eq!(params.min_samples_split(), 4);
        assert_eq!(params.max_depth(), Some(3));
        assert!(!params.balance_class_weights());
    }
}
