pub mod classifier;
pub(crate) mod grower;
pub mod node;
pub mod params;
pub mod regressor;
