use std::fmt;

use serde::{Deserialize, Serialize};

/// A single raw attribute value, as typed into a form or read from a table cell.
///
/// Numeric values keep their own column after expansion; text values are
/// categorical and expand into one indicator column per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Numeric attribute. A missing cell in a numeric table column is `NaN`.
    Number(f64),
    /// Categorical attribute.
    Text(String),
    /// No value supplied.
    Missing,
}

impl RawValue {
    /// Interprets a free-form input string: empty is missing, anything that
    /// parses as a number is numeric, everything else is categorical.
    /// Surrounding whitespace is dropped.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Self::Number(n),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Returns `true` for categorical values.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns `true` if no value was supplied.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Numeric view of the value, if it is numeric.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the value, if it is categorical.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Cells render the way they are written back to delimited files:
/// missing values and `NaN` become empty cells.
impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.is_nan() => Ok(()),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => Ok(()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_input() {
        assert_eq!(RawValue::parse("30"), RawValue::Number(30.0));
        assert_eq!(RawValue::parse(" 40.5 "), RawValue::Number(40.5));
        assert_eq!(RawValue::parse("Private"), RawValue::Text("Private".into()));
        assert_eq!(RawValue::parse("   "), RawValue::Missing);
        assert_eq!(RawValue::parse("NaN"), RawValue::Text("NaN".into()));
    }

    #[test]
    fn parse_trims_categorical_text() {
        assert_eq!(RawValue::parse(" Male "), RawValue::Text("Male".into()));
        assert_eq!(RawValue::parse("\tSelf-emp"), RawValue::Text("Self-emp".into()));
    }

    #[test]
    fn display_matches_csv_cells() {
        assert_eq!(RawValue::Number(30.0).to_string(), "30");
        assert_eq!(RawValue::Number(2.5).to_string(), "2.5");
        assert_eq!(RawValue::Number(f64::NAN).to_string(), "");
        assert_eq!(RawValue::Missing.to_string(), "");
        assert_eq!(RawValue::from("Sales").to_string(), "Sales");
    }

    #[test]
    fn conversions() {
        assert_eq!(RawValue::from(45), RawValue::Number(45.0));
        assert_eq!(RawValue::from(None::<&str>), RawValue::Missing);
        assert!(RawValue::from("Male").is_categorical());
        assert_eq!(RawValue::from(1.5).as_number(), Some(1.5));
        assert_eq!(RawValue::from("x").as_text(), Some("x"));
    }

    #[test]
    fn serde_untagged() {
        let json = serde_json::to_string(&vec![
            RawValue::Number(1.0),
            RawValue::from("a"),
            RawValue::Missing,
        ])
        .unwrap();
        assert_eq!(json, r#"[1.0,"a",null]"#);
    }
}
