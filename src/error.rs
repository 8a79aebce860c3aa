//! Error types shared across the crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A hyperparameter was set to a value outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The loss selector did not match any known criterion.
    #[error("unknown loss {got:?}, expected one of {expected}")]
    UnknownLoss { got: String, expected: &'static str },

    /// `predict` was called before any successful `fit`.
    #[error("the model has not been fitted yet")]
    NotFitted,

    /// The prediction matrix's column count differs from the training one.
    #[error("expected {expected} features, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    /// `fit` was called with no rows.
    #[error("the training set is empty")]
    EmptyTrainingSet,

    /// The feature matrix and the target vector disagree on the sample count.
    #[error("feature matrix has {x_rows} rows but target vector has {y_rows}")]
    SampleCountMismatch { x_rows: usize, y_rows: usize },
}
