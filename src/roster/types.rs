use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The fixed set of class labels the roster endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeLevel {
    #[serde(rename = "4th std")]
    Std4,
    #[serde(rename = "5th std")]
    Std5,
    #[serde(rename = "6th std")]
    Std6,
    #[serde(rename = "7th std")]
    Std7,
    #[serde(rename = "8th std")]
    Std8,
    #[serde(rename = "9th std")]
    Std9,
    #[serde(rename = "10th std")]
    Std10,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 7] = [
        GradeLevel::Std4,
        GradeLevel::Std5,
        GradeLevel::Std6,
        GradeLevel::Std7,
        GradeLevel::Std8,
        GradeLevel::Std9,
        GradeLevel::Std10,
    ];

    /// Wire label used as the `class` query parameter.
    pub fn label(self) -> &'static str {
        match self {
            GradeLevel::Std4 => "4th std",
            GradeLevel::Std5 => "5th std",
            GradeLevel::Std6 => "6th std",
            GradeLevel::Std7 => "7th std",
            GradeLevel::Std8 => "8th std",
            GradeLevel::Std9 => "9th std",
            GradeLevel::Std10 => "10th std",
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown class label '{0}' (expected one of \"4th std\" through \"10th std\")")]
pub struct ParseGradeError(pub String);

impl FromStr for GradeLevel {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        GradeLevel::ALL
            .iter()
            .copied()
            .find(|grade| grade.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseGradeError(s.to_string()))
    }
}

/// A student eligible to receive an uploaded material.
///
/// Field names match the roster endpoint's JSON body exactly; records are
/// validated at the client boundary rather than trusted blindly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRecord {
    pub id: String,
    pub name: String,
    pub class: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_labels_round_trip() {
        for grade in GradeLevel::ALL {
            assert_eq!(grade.label().parse::<GradeLevel>(), Ok(grade));
        }
    }

    #[test]
    fn grade_parse_is_case_insensitive() {
        assert_eq!("6TH STD".parse::<GradeLevel>(), Ok(GradeLevel::Std6));
        assert_eq!(" 10th std ".parse::<GradeLevel>(), Ok(GradeLevel::Std10));
    }

    #[test]
    fn grade_parse_rejects_unknown_labels() {
        assert!("11th std".parse::<GradeLevel>().is_err());
        assert!("sixth".parse::<GradeLevel>().is_err());
    }

    #[test]
    fn grade_serializes_as_wire_label() {
        let json = serde_json::to_string(&GradeLevel::Std4).unwrap();
        assert_eq!(json, "\"4th std\"");
    }
}
