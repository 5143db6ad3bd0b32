//! # Wagecast Core
//!
//! Feature alignment and income-bracket inference. Raw, human-entered
//! attributes are expanded into indicator columns, projected onto the column
//! schema a model was trained on, and scored by the trained classifier.
//!
//! ## Quick Start
//!
//! ```rust
//! use wagecast_core::{FeatureAligner, FeatureSchema, RawRecord, UnknownCategoryPolicy};
//!
//! let schema = FeatureSchema::new(["age", "gender_Male", "gender_Female", "workclass_Private"]).unwrap();
//! let aligner = FeatureAligner::new(schema, UnknownCategoryPolicy::ZeroFill);
//!
//! let record = RawRecord::new().with("age", 30).with("gender", "Male").with("workclass", "Private");
//! let aligned = aligner.align(&record).unwrap();
//!
//! assert_eq!(aligned.row(0).to_vec(), vec![30.0, 1.0, 0.0, 1.0]);
//! ```
pub mod align;
pub mod error;
pub mod labels;
pub mod model;
pub mod predictor;
pub mod table;
pub mod types;

// Re-export primary API
pub use align::{Alignment, AlignmentReport, FeatureAligner, UnknownCategoryPolicy};
pub use error::{Result, WagecastError};
pub use labels::{Language, UiStrings};
pub use model::{Classifier, ModelKind, ModelParams, TrainedModel};
pub use predictor::{BatchPrediction, Prediction, Predictor, PredictorConfig};
pub use table::RawTable;
pub use types::{FeatureSchema, RawRecord, RawValue};
