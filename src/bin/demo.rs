use csv::ReaderBuilder;
use nalgebra::{DMatrix, DVector};
use rusty_trees::data::dataset::Dataset;
use rusty_trees::metrics::RegressionMetrics;
use rusty_trees::trees::classifier::DecisionTreeClassifier;
use rusty_trees::trees::regressor::DecisionTreeRegressor;
use std::collections::HashMap;
use std::env;
use std::error::Error;

/// Reads a CSV whose last column is a categorical label, encoding each
/// distinct label string as a consecutive integer.
fn read_file_classification(
    file_path: &str,
    header: bool,
) -> Result<Dataset<f64, u16>, Box<dyn Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(header)
        .from_path(file_path)?;
    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut label_map: HashMap<String, u16> = HashMap::new();
    let mut dimension = 0;

    for result in reader.records() {
        let record = result?;
        dimension = record.len() - 1;
        let mut feature_row = Vec::new();

        for feature in record.iter().take(dimension) {
            feature_row.push(feature.parse::<f64>()?);
        }

        let label = record.get(dimension).ok_or("Missing label")?;
        let next_id = label_map.len() as u16;
        let label_id = *label_map.entry(label.to_string()).or_insert(next_id);

        features.push(feature_row);
        labels.push(label_id);
    }
    let feature_matrix = DMatrix::from_row_slice(features.len(), dimension, &features.concat());
    let label_vector = DVector::from_vec(labels);

    Ok(Dataset::new(feature_matrix, label_vector))
}

/// Reads a CSV whose last column is a real-valued target.
fn read_file_regression(file_path: &str, header: bool) -> Result<Dataset<f64, f64>, Box<dyn Error>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(header)
        .from_path(file_path)?;
    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut dimension = 0;

    for result in reader.records() {
        let record = result?;
        dimension = record.len() - 1;
        let mut feature_row = Vec::new();

        for feature in record.iter().take(dimension) {
            feature_row.push(feature.parse::<f64>()?);
        }

        let label = record.get(dimension).ok_or("Missing label")?;

        features.push(feature_row);
        labels.push(label.parse::<f64>()?);
    }
    let feature_matrix = DMatrix::from_row_slice(features.len(), dimension, &features.concat());
    let label_vector = DVector::from_vec(labels);

    Ok(Dataset::new(feature_matrix, label_vector))
}

fn run_classification(path: &str) -> Result<String, Box<dyn Error>> {
    let dataset = read_file_classification(path, true)?;
    let (train_dataset, test_dataset) = dataset.train_test_split(0.75, Some(42))?;

    let mut classifier = DecisionTreeClassifier::with_params(Some("gini"), None, Some(10))?;
    classifier.set_rng_seed(Some(42));
    classifier.fit(&train_dataset)?;

    let predictions = classifier.predict(&test_dataset.x)?;
    let correct = predictions
        .iter()
        .zip(test_dataset.y.iter())
        .filter(|(prediction, actual)| prediction == actual)
        .count();
    Ok(format!(
        "Accuracy: {}%",
        (correct as f64 / test_dataset.y.len() as f64) * 100.0
    ))
}

fn run_regression(path: &str) -> Result<String, Box<dyn Error>> {
    let dataset = read_file_regression(path, true)?;
    let (train_dataset, test_dataset) = dataset.train_test_split(0.75, Some(42))?;

    let mut regressor = DecisionTreeRegressor::with_params(Some("mse"), None, Some(10))?;
    regressor.set_rng_seed(Some(42));
    regressor.fit(&train_dataset)?;

    let predictions = regressor.predict(&test_dataset.x)?;
    let mse = regressor.mse(&test_dataset.y, &predictions)?;
    Ok(format!("Predictions MSE: {}", mse))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: demo-trees <classify|regress> <path-to-csv>");
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "classify" => run_classification(&args[2]),
        "regress" => run_regression(&args[2]),
        other => Err(format!("Unknown task: {}", other).into()),
    };

    match result {
        Ok(report) => println!("{}", report),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}
