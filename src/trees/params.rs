use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TreeError};

/// Impurity criterion for classification trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassificationCriterion {
    Gini,
    Entropy,
}

impl FromStr for ClassificationCriterion {
    type Err = TreeError;

    fn from_str(loss: &str) -> Result<Self> {
        match loss {
            "gini" => Ok(Self::Gini),
            "entropy" => Ok(Self::Entropy),
            other => Err(TreeError::UnknownLoss {
                got: other.to_string(),
                expected: "'gini', 'entropy'",
            }),
        }
    }
}

impl fmt::Display for ClassificationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gini => write!(f, "gini"),
            Self::Entropy => write!(f, "entropy"),
        }
    }
}

/// Impurity criterion for regression trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegressionCriterion {
    Mse,
    Mae,
}

impl FromStr for RegressionCriterion {
    type Err = TreeError;

    fn from_str(loss: &str) -> Result<Self> {
        match loss {
            "mse" => Ok(Self::Mse),
            "mae" => Ok(Self::Mae),
            other => Err(TreeError::UnknownLoss {
                got: other.to_string(),
                expected: "'mse', 'mae'",
            }),
        }
    }
}

impl fmt::Display for RegressionCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mse => write!(f, "mse"),
            Self::Mae => write!(f, "mae"),
        }
    }
}

/// Hyperparameters shared by every decision tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeParams {
    pub min_samples_split: u16,
    pub max_depth: Option<u16>,
    pub rng_seed: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            min_samples_split: 2,
            max_depth: None,
            rng_seed: None,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        if min_samples_split < 2 {
            return Err(TreeError::InvalidParameter(
                "the minimum number of samples to split must be greater than 1".to_string(),
            ));
        }
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<()> {
        if max_depth.is_some_and(|depth| depth < 1) {
            return Err(TreeError::InvalidParameter(
                "the maximum depth must be greater than 0".to_string(),
            ));
        }
        self.max_depth = max_depth;
        Ok(())
    }

    pub fn set_rng_seed(&mut self, rng_seed: Option<u64>) {
        self.rng_seed = rng_seed;
    }

    pub fn min_samples_split(&self) -> u16 {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.max_depth
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.rng_seed
    }
}

/// Hyperparameters of the classification tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeClassifierParams {
    pub base_params: TreeParams,
    pub criterion: ClassificationCriterion,
    pub balance_class_weights: bool,
}

impl Default for TreeClassifierParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeClassifierParams {
    pub fn new() -> Self {
        Self {
            base_params: TreeParams::new(),
            criterion: ClassificationCriterion::Gini,
            balance_class_weights: false,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        self.base_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<()> {
        self.base_params.set_max_depth(max_depth)
    }

    pub fn set_rng_seed(&mut self, rng_seed: Option<u64>) {
        self.base_params.set_rng_seed(rng_seed);
    }

    pub fn set_criterion(&mut self, criterion: &str) -> Result<()> {
        self.criterion = criterion.parse()?;
        Ok(())
    }

    pub fn set_balance_class_weights(&mut self, balance_class_weights: bool) {
        self.balance_class_weights = balance_class_weights;
    }

    pub fn min_samples_split(&self) -> u16 {
        self.base_params.min_samples_split
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.base_params.max_depth
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.base_params.rng_seed
    }

    pub fn criterion(&self) -> ClassificationCriterion {
        self.criterion
    }

    pub fn balance_class_weights(&self) -> bool {
        self.balance_class_weights
    }
}

/// Hyperparameters of the regression tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeRegressorParams {
    pub base_params: TreeParams,
    pub criterion: RegressionCriterion,
}

impl Default for TreeRegressorParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeRegressorParams {
    pub fn new() -> Self {
        Self {
            base_params: TreeParams::new(),
            criterion: RegressionCriterion::Mse,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        self.base_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: Option<u16>) -> Result<()> {
        self.base_params.set_max_depth(max_depth)
    }

    pub fn set_rng_seed(&mut self, rng_seed: Option<u64>) {
        self.base_params.set_rng_seed(rng_seed);
    }

    pub fn set_criterion(&mut self, criterion: &str) -> Result<()> {
        self.criterion = criterion.parse()?;
        Ok(())
    }

    pub fn min_samples_split(&self) -> u16 {
        self.base_params.min_samples_split
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.base_params.max_depth
    }

    pub fn rng_seed(&self) -> Option<u64> {
        self.base_params.rng_seed
    }

    pub fn criterion(&self) -> RegressionCriterion {
        self.criterion
    }
}
