//! Model evaluation metrics.

use nalgebra::DVector;

use crate::data::dataset::RealNumber;
use crate::error::{Result, TreeError};

fn check_lengths<T: RealNumber>(y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
    if y_true.len() != y_pred.len() {
        return Err(TreeError::SampleCountMismatch {
            x_rows: y_true.len(),
            y_rows: y_pred.len(),
        });
    }
    T::from_usize(y_true.len()).ok_or_else(|| {
        TreeError::InvalidParameter("sample count not representable in the target type".to_string())
    })
}

/// Regression quality metrics over paired label/prediction vectors.
pub trait RegressionMetrics<T: RealNumber> {
    fn mse(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        let n = check_lengths(y_true, y_pred)?;
        let errors = y_pred - y_true;
        Ok(errors.component_mul(&errors).sum() / n)
    }

    fn mae(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        let n = check_lengths(y_true, y_pred)?;
        let total = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&truth, &prediction)| (prediction - truth).abs())
            .fold(T::zero(), |acc, term| acc + term);
        Ok(total / n)
    }

    /// Coefficient of determination: 1 minus the model's squared error over
    /// the variance of the labels.
    fn r2(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        let n = check_lengths(y_true, y_pred)?;
        let mean = y_true.iter().fold(T::zero(), |acc, &value| acc + value) / n;
        let variance = y_true
            .iter()
            .map(|&value| (value - mean) * (value - mean))
            .fold(T::zero(), |acc, term| acc + term)
            / n;
        if variance == T::zero() {
            return Err(TreeError::InvalidParameter(
                "r2 is undefined for constant labels".to_string(),
            ));
        }
        let mse = self.mse(y_true, y_pred)?;
        Ok(T::one() - mse / variance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Model;
    impl RegressionMetrics<f64> for Model {}

    #[test]
    fn test_mse() {
        let y_true = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y_pred = DVector::from_vec(vec![1.0, 3.0, 5.0]);
        assert_relative_eq!(Model.mse(&y_true, &y_pred).unwrap(), 5.0 / 3.0);
    }

    #[test]
    fn test_mae() {
        let y_true = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y_pred = DVector::from_vec(vec![1.0, 3.0, 5.0]);
        assert_relative_eq!(Model.mae(&y_true, &y_pred).unwrap(), 1.0);
    }

    #[test]
    fn test_r2_of_exact_predictions_is_one() {
        let y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_relative_eq!(Model.r2(&y, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_r2_of_constant_labels_fails() {
        let y_true = DVector::from_vec(vec![3.0, 3.0, 3.0]);
        let y_pred = DVector::from_vec(vec![2.0, 3.0, 4.0]);
        assert!(Model.r2(&y_true, &y_pred).is_err());
    }

    #[test]
    fn test_length_mismatch_fails() {
        let y_true = DVector::from_vec(vec![1.0, 2.0]);
        let y_pred = DVector::from_vec(vec![1.0]);
        assert!(Model.mse(&y_true, &y_pred).is_err());
    }
}
