use thiserror::Error;

/// Errors that can occur during Wagecast core operations.
#[derive(Debug, Error)]
pub enum WagecastError {
    /// A batch or table contained no rows where at least one was required.
    #[error("input contains no rows")]
    EmptyInput,

    /// A feature schema could not be constructed.
    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    /// A categorical value has no column in the feature schema and the
    /// alignment policy rejects unknown categories.
    #[error("unknown category {value:?} for field {field:?}")]
    UnknownCategory {
        /// The field the value was supplied for.
        field: String,
        /// The value that was not seen at training time.
        value: String,
    },

    /// The encoded input does not have the width the model was trained on.
    #[error("feature count mismatch: model expects {expected} columns, got {found}")]
    FeatureMismatch {
        /// Number of columns the model was fitted on.
        expected: usize,
        /// Number of columns supplied.
        found: usize,
    },

    /// The encoded input contains values the model cannot score.
    #[error("invalid model input: {0}")]
    InvalidInput(String),

    /// A table operation referenced a column that does not exist, or was
    /// given data of the wrong shape.
    #[error("invalid table: {0}")]
    InvalidTable(String),

    /// The model or schema artifact could not be loaded.
    #[error("failed to load model: {0}")]
    ModelLoadError(String),

    /// The model inference failed.
    #[error("inference error: {0}")]
    InferenceError(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact (de)serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Delimited-file parsing or writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Candle ML framework error.
    #[error("ML inference error: {0}")]
    Candle(#[from] candle_core::Error),
}

/// Result type alias for Wagecast operations.
pub type Result<T> = std::result::Result<T, WagecastError>;
