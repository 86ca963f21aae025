//! Single-user records: profile, income sources and additional info.

use super::Patch;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The applicant's profile. At most one exists per store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub fullname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub monthly_income: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Every profile field, used for a full save (upsert).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub fullname: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub monthly_income: Option<f64>,
}

/// Partial update of the profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub fullname: Option<String>,
    pub date_of_birth: Patch<NaiveDate>,
    pub gender: Patch<String>,
    pub phone: Patch<String>,
    pub email: Patch<String>,
    pub address: Patch<String>,
    pub monthly_income: Patch<f64>,
}

/// Where an income comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeKind {
    Employment,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
    Other,
}

impl IncomeKind {
    pub const ALL: [Self; 3] = [Self::Employment, Self::SelfEmployed, Self::Other];

    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employment => "employment",
            Self::SelfEmployed => "self-employed",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Employment => "Employment",
            Self::SelfEmployed => "Self-Employed",
            Self::Other => "Other",
        }
    }

    /// Parse the stored spelling.
    #[must_use]
    pub fn from_stored(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for IncomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored income source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: i64,
    pub source: IncomeKind,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub employment_length: Option<String>,
    pub employer_contact: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when adding an income source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncomeSource {
    pub source: IncomeKind,
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub employment_length: Option<String>,
    pub employer_contact: Option<String>,
}

impl NewIncomeSource {
    #[must_use]
    pub const fn new(source: IncomeKind) -> Self {
        Self {
            source,
            employer_name: None,
            job_title: None,
            employment_length: None,
            employer_contact: None,
        }
    }
}

/// Partial update of an income source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomeSourcePatch {
    pub source: Option<IncomeKind>,
    pub employer_name: Patch<String>,
    pub job_title: Patch<String>,
    pub employment_length: Patch<String>,
    pub employer_contact: Patch<String>,
}

/// An arbitrary label/value pair shown on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    pub id: i64,
    pub label: String,
    pub value: String,
    pub icon: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied when adding (or upserting) additional info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAdditionalInfo {
    pub label: String,
    pub value: String,
    pub icon: Option<String>,
}

impl NewAdditionalInfo {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            icon: None,
        }
    }
}

/// Partial update of additional info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalInfoPatch {
    pub label: Option<String>,
    pub value: Option<String>,
    pub icon: Patch<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_kind_spellings() {
        assert_eq!(
            serde_json::to_string(&IncomeKind::SelfEmployed).unwrap(),
            "\"Self-Employed\""
        );
        assert_eq!(IncomeKind::from_stored("self-employed"), Some(IncomeKind::SelfEmployed));
        assert_eq!(IncomeKind::from_stored("Employment"), None);
        assert_eq!(IncomeKind::Other.to_string(), "Other");
    }
}
