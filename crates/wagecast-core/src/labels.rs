//! Static UI strings for the supported display languages.

use std::fmt;
use std::str::FromStr;

/// Display language for user-facing strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Telugu,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::English, Self::Hindi, Self::Telugu];

    /// Resolves a language code, falling back to English for anything unknown.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Telugu => "te",
        }
    }

    /// The translated string table.
    #[must_use]
    pub fn strings(self) -> &'static UiStrings {
        match self {
            Self::English => &ENGLISH,
            Self::Hindi => &HINDI,
            Self::Telugu => &TELUGU,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::English),
            "hi" => Ok(Self::Hindi),
            "te" => Ok(Self::Telugu),
            other => Err(format!("unsupported language code {other:?}")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "English"),
            Self::Hindi => write!(f, "Hindi"),
            Self::Telugu => write!(f, "Telugu"),
        }
    }
}

/// One language's worth of UI strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiStrings {
    pub title: &'static str,
    pub age: &'static str,
    pub gender: &'static str,
    pub workclass: &'static str,
    pub education: &'static str,
    pub occupation: &'static str,
    pub hours: &'static str,
    pub predict: &'static str,
    pub predicted_income: &'static str,
    pub upload_csv: &'static str,
    pub download: &'static str,
}

impl UiStrings {
    /// Label for a form field name, if it has one.
    #[must_use]
    pub fn field_label(&self, field: &str) -> Option<&'static str> {
        match field {
            "age" => Some(self.age),
            "gender" => Some(self.gender),
            "workclass" => Some(self.workclass),
            "education" => Some(self.education),
            "occupation" => Some(self.occupation),
            "hours_per_week" | "hours-per-week" => Some(self.hours),
            _ => None,
        }
    }
}

static ENGLISH: UiStrings = UiStrings {
    title: "Employee Salary Classification",
    age: "Age",
    gender: "Gender",
    workclass: "Workclass",
    education: "Education",
    occupation: "Occupation",
    hours: "Hours per Week",
    predict: "🎯 Predict Salary",
    predicted_income: "Predicted Income",
    upload_csv: "Upload CSV for Bulk Predictions",
    download: "⬇️ Download Results",
};

static HINDI: UiStrings = UiStrings {
    title: "कर्मचारी वेतन वर्गीकरण",
    age: "आयु",
    gender: "लिंग",
    workclass: "कार्य वर्ग",
    education: "शिक्षा",
    occupation: "पेशा",
    hours: "प्रति सप्ताह घंटे",
    predict: "🎯 वेतन का पूर्वानुमान करें",
    predicted_income: "अनुमानित आय",
    upload_csv: "CSV अपलोड करें (थोक भविष्यानुमान)",
    download: "⬇️ परिणाम डाउनलोड करें",
};

static TELUGU: UiStrings = UiStrings {
    title: "ఉద్యోగి జీతం వర్గీకరణ",
    age: "వయస్సు",
    gender: "లింగం",
    workclass: "పని తరగతి",
    education: "విద్య",
    occupation: "ఉద్యోగం",
    hours: "వారం గంటలు",
    predict: "🎯 జీతంని ఊహించండి",
    predicted_income: "అంచనా జీతం",
    upload_csv: "CSV అప్లోడ్ (బల్క్ ప్రిడిక్షన్)",
    download: "⬇️ ఫలితాలన్ని డాఉన్లోడ్ చెయండి",
};
