use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WagecastError};

/// The ordered column list a trained model expects as input.
///
/// Persisted next to the model as a plain JSON array of column names.
/// Column names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    columns: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Builds a schema from an ordered list of column names.
    ///
    /// # Errors
    ///
    /// Returns `WagecastError::InvalidSchema` if a column name repeats.
    pub fn new<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(WagecastError::InvalidSchema(format!(
                    "duplicate column {name:?}"
                )));
            }
        }
        Ok(Self { columns, index })
    }

    /// Loads a schema from a JSON array file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WagecastError::ModelLoadError(format!("{}: {e}", path.display()))
        })?;
        let schema: Self = serde_json::from_str(&content).map_err(|e| {
            WagecastError::ModelLoadError(format!("{}: {e}", path.display()))
        })?;
        tracing::debug!(columns = schema.len(), path = %path.display(), "loaded feature schema");
        Ok(schema)
    }

    /// Writes the schema as a JSON array file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(&self.columns)?)?;
        Ok(())
    }

    /// Column names in model order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Returns `true` if any column was derived from `field`, either as the
    /// field itself or as one of its `<field>_<value>` indicators.
    ///
    /// The schema file is a bare list of names, so an indicator cannot be told
    /// apart from a column whose own name contains an underscore: `hours`
    /// is covered by `hours_per_week`. A text value for such a field is
    /// treated as an unknown level rather than an inert field.
    #[must_use]
    pub fn covers_field(&self, field: &str) -> bool {
        self.contains(field)
            || self.columns.iter().any(|c| {
                c.strip_prefix(field)
                    .is_some_and(|rest| rest.starts_with('_'))
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = WagecastError;

    fn try_from(columns: Vec<String>) -> Result<Self> {
        Self::new(columns)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.columns
    }
}
