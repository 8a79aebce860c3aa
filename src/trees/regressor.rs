//! Decision Tree Regressor

use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, SeedableRng};

use crate::data::dataset::{Dataset, RealNumber};
use crate::error::{Result, TreeError};
use crate::metrics::RegressionMetrics;
use crate::trees::grower::{GrowStrategy, TreeGrower};
use crate::trees::node::TreeNode;
use crate::trees::params::{RegressionCriterion, TreeRegressorParams};

/// MSE / MAE impurity about the subset mean, with mean leaf values.
pub(crate) struct RegressionStrategy {
    criterion: RegressionCriterion,
}

impl RegressionStrategy {
    pub fn new(criterion: RegressionCriterion) -> Self {
        Self { criterion }
    }

    fn mean<T: RealNumber>(y: &DVector<T>) -> T {
        let sum = y.iter().fold(T::zero(), |acc, &value| acc + value);
        sum / T::from_usize(y.len()).unwrap_or_else(T::one)
    }
}

impl<T: RealNumber> GrowStrategy<T, T> for RegressionStrategy {
    fn impurity(&self, y: &DVector<T>) -> f64 {
        let mean = Self::mean(y);
        let total = y
            .iter()
            .map(|&value| match self.criterion {
                RegressionCriterion::Mse => (value - mean) * (value - mean),
                RegressionCriterion::Mae => (value - mean).abs(),
            })
            .fold(T::zero(), |acc, term| acc + term);
        (total / T::from_usize(y.len()).unwrap_or_else(T::one))
            .to_f64()
            .unwrap_or(f64::INFINITY)
    }

    fn leaf_value(&self, y: &DVector<T>) -> T {
        Self::mean(y)
    }
}

/// Decision Tree Regressor
#[derive(Clone, Debug)]
pub struct DecisionTreeRegressor<T: RealNumber> {
    root: Option<TreeNode<T, T>>,
    params: TreeRegressorParams,
    n_features: Option<usize>,
}

impl<T: RealNumber> Default for DecisionTreeRegressor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: RealNumber> RegressionMetrics<T> for DecisionTreeRegressor<T> {}

impl<T: RealNumber> DecisionTreeRegressor<T> {
    /// Creates a regressor with default parameters (mse, unbounded depth,
    /// `min_samples_split` of 2).
    pub fn new() -> Self {
        Self {
            root: None,
            params: TreeRegressorParams::new(),
            n_features: None,
        }
    }

    /// Creates a regressor with custom parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the criterion is not one of `"mse"` / `"mae"`, if
    /// `min_samples_split` is less than 2, or if `max_depth` is less than 1.
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

    pub fn set_rng_seed(&mut self, rng_seed: Option<u64>) {
        self.params.set_rng_seed(rng_seed);
    }

    /// The configured hyperparameters. Learned state is not part of this.
    pub fn get_params(&self) -> &TreeRegressorParams {
        &self.params
    }

    pub fn root(&self) -> Option<&TreeNode<T, T>> {
        self.root.as_ref()
    }

    /// Fits the tree, replacing any previously trained one.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset has no rows or if the feature matrix
    /// and the target vector disagree on the sample count.
    pub fn fit(&mut self, dataset: &Dataset<T, T>) -> Result<()> {
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

        let strategy = RegressionStrategy::new(self.params.criterion());
        let grower = TreeGrower::new(&strategy, &self.params.base_params);
        let mut rng = match self.params.rng_seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.n_features = Some(x.ncols());
        self.root = Some(grower.grow(dataset, &mut rng, 1));
        Ok(())
    }

    /// Predicts one value per row of `features`, preserving row order.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree wasn't fitted yet or if the column count
    /// differs from the training data.
    pub fn predict(&self, features: &DMatrix<T>) -> Result<DVector<T>> {
        let root = self.root.as_ref().ok_or(TreeError::NotFitted)?;
        let expected = self.n_features.ok_or(TreeError::NotFitted)?;
        if features.ncols() != expected {
            return Err(TreeError::FeatureCountMismatch {
                expected,
                got: features.ncols(),
            });
        }

        let predictions: Vec<T> = features
            .row_iter()
            .map(|row| root.traverse(&row.transpose()))
            .collect();
        Ok(DVector::from_vec(predictions))
    }
}
