use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::error::{Result, TreeError};

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

/// Discrete values usable as class labels (hashable, equality-comparable).
pub trait WholeNumber: Number + Eq + Hash {}
impl<T> WholeNumber for T where T: Number + Eq + Hash {}

/// Continuous values usable as regression targets.
pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

pub trait TargetValue: DataValue {}
impl<T> TargetValue for T where T: DataValue {}

/// A labeled dataset: one feature row in `x` per target entry in `y`.
#[derive(Clone, Debug)]
pub struct Dataset<XT: Number, YT: TargetValue> {
    pub x: DMatrix<XT>,
    pub y: DVector<YT>,
}

impl<XT: Number, YT: TargetValue> Dataset<XT, YT> {
    pub fn new(x: DMatrix<XT>, y: DVector<YT>) -> Self {
        Self { x, y }
    }

    pub fn into_parts(&self) -> (&DMatrix<XT>, &DVector<YT>) {
        (&self.x, &self.y)
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_not_empty(&self) -> bool {
        !(self.x.is_empty() || self.y.is_empty())
    }

    /// The distinct values of one feature column, in ascending order.
    /// These are the candidate thresholds the split search enumerates.
    pub fn feature_values(&self, feature_index: usize) -> Vec<XT> {
        let mut values: Vec<XT> = self.x.column(feature_index).iter().copied().collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        values.dedup();
        values
    }

    /// Partitions the rows into `(left, right)` where a row goes left iff
    /// `row[feature_index] <= threshold`. The two sides are disjoint and
    /// together cover every row of `self`.
    pub fn split_on_threshold(&self, feature_index: usize, threshold: XT) -> (Self, Self) {
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
            (0..self.x.nrows()).partition(|&row| self.x[(row, feature_index)] <= threshold);

        (self.select_rows(&left_rows), self.select_rows(&right_rows))
    }

    fn select_rows(&self, indices: &[usize]) -> Self {
        if indices.is_empty() {
            return Self::new(DMatrix::zeros(0, self.x.ncols()), DVector::zeros(0));
        }
        let rows: Vec<_> = indices.iter().map(|&row| self.x.row(row)).collect();
        let y = DVector::from_iterator(indices.len(), indices.iter().map(|&row| self.y[row]));
        Self::new(DMatrix::from_rows(&rows), y)
    }

    /// Randomly splits the rows into a training and a test dataset.
    pub fn train_test_split(&self, train_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(TreeError::InvalidParameter(
                "train size should be between 0.0 and 1.0".to_string(),
            ));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices: Vec<usize> = (0..self.x.nrows()).collect();
        indices.shuffle(&mut rng);
        let n_train = (self.x.nrows() as f64 * train_size).floor() as usize;

        Ok((
            self.select_rows(&indices[..n_train]),
            self.select_rows(&indices[n_train..]),
        ))
    }
}
