//! # Wagecast Trainer
//!
//! Offline pipeline that turns a labeled census-style CSV into the two
//! artifacts the predictor loads: the selected model (`best_model.json`) and
//! the feature schema it was fitted on (`model_columns.json`).
//!
//! Five classifier families are fitted on the same seeded 80/20 split and
//! the one with the highest held-out accuracy is kept.

pub mod classifiers;
pub mod config;
pub mod data;
pub mod split;
pub mod trainer;

pub use config::{CategoricalEncoding, Hyperparameters, TrainingConfig};
pub use data::{EncodedDataset, prepare};
pub use trainer::{ModelScore, Trainer, TrainingReport, accuracy, run_training};
