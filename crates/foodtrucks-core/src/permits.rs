//! Mobile food facility permit records and their status values.

use serde::{Deserialize, Serialize};

use crate::search::Coordinates;

/// Permit status as it appears in the source data.
///
/// The three canonical values are matched case-sensitively; anything else is
/// kept verbatim in [`PermitStatus::Other`] so records with unexpected
/// statuses still load and remain searchable when no filter is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PermitStatus {
    Approved,
    Requested,
    Expired,
    Other(String),
}

impl PermitStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            PermitStatus::Approved => "APPROVED",
            PermitStatus::Requested => "REQUESTED",
            PermitStatus::Expired => "EXPIRED",
            PermitStatus::Other(raw) => raw,
        }
    }
}

impl From<&str> for PermitStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "APPROVED" => PermitStatus::Approved,
            "REQUESTED" => PermitStatus::Requested,
            "EXPIRED" => PermitStatus::Expired,
            other => PermitStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for PermitStatus {
    fn from(raw: String) -> Self {
        PermitStatus::from(raw.as_str())
    }
}

impl From<PermitStatus> for String {
    fn from(status: PermitStatus) -> Self {
        match status {
            PermitStatus::Other(raw) => raw,
            canonical => canonical.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PermitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status values a caller may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusFilter {
    Approved,
    Requested,
    Expired,
}

impl StatusFilter {
    /// Exact match against the canonical status. Unrecognized statuses never match.
    #[must_use]
    pub fn matches(self, status: &PermitStatus) -> bool {
        matches!(
            (self, status),
            (StatusFilter::Approved, PermitStatus::Approved)
                | (StatusFilter::Requested, PermitStatus::Requested)
                | (StatusFilter::Expired, PermitStatus::Expired)
        )
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::Approved => write!(f, "APPROVED"),
            StatusFilter::Requested => write!(f, "REQUESTED"),
            StatusFilter::Expired => write!(f, "EXPIRED"),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPROVED" => Ok(StatusFilter::Approved),
            "REQUESTED" => Ok(StatusFilter::Requested),
            "EXPIRED" => Ok(StatusFilter::Expired),
            other => Err(format!(
                "unknown status \"{other}\" (expected APPROVED, REQUESTED or EXPIRED)"
            )),
        }
    }
}

/// One permit entry in canonical shape.
///
/// `latitude` and `longitude` are either both present and in range, or both
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "locationid")]
    pub location_id: String,
    pub applicant: String,
    pub facility_type: Option<String>,
    pub address: String,
    pub status: PermitStatus,
    pub food_items: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_description: Option<String>,
}

impl Record {
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}
