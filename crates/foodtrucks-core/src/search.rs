//! Query and result shapes shared by the engine, the HTTP layer and the CLI.

use serde::{Deserialize, Serialize};

use crate::permits::{Record, StatusFilter};

/// Result limit for name and street searches when the caller gives none.
pub const DEFAULT_LIMIT: usize = 10;
/// Result limit for proximity searches when the caller gives none.
pub const DEFAULT_PROXIMITY_LIMIT: usize = 5;
/// Largest limit a caller may request.
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Name,
    Street,
    Proximity,
}

impl SearchType {
    #[must_use]
    pub fn default_limit(self) -> usize {
        match self {
            SearchType::Name | SearchType::Street => DEFAULT_LIMIT,
            SearchType::Proximity => DEFAULT_PROXIMITY_LIMIT,
        }
    }
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchType::Name => write!(f, "name"),
            SearchType::Street => write!(f, "street"),
            SearchType::Proximity => write!(f, "proximity"),
        }
    }
}

/// Flat request shape as received over the wire.
///
/// Only the fields for `query_type` are meaningful; the engine turns this
/// into a [`SearchQuery`] and rejects requests missing their mode's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query_type: SearchType,
    #[serde(default)]
    pub applicant: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchCriteria {
    Name { applicant: String },
    Street { street: String },
    Proximity { origin: Coordinates },
}

impl SearchCriteria {
    #[must_use]
    pub fn search_type(&self) -> SearchType {
        match self {
            SearchCriteria::Name { .. } => SearchType::Name,
            SearchCriteria::Street { .. } => SearchType::Street,
            SearchCriteria::Proximity { .. } => SearchType::Proximity,
        }
    }
}

/// Typed query: one search mode plus the optional status filter and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub criteria: SearchCriteria,
    pub status: Option<StatusFilter>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(criteria: SearchCriteria) -> Self {
        Self {
            criteria,
            status: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn search_type(&self) -> SearchType {
        self.criteria.search_type()
    }

    /// Limit actually applied: the caller's value or the per-mode default.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or_else(|| self.search_type().default_limit())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub query_type: SearchType,
    pub status_filter: Option<StatusFilter>,
    pub limit: usize,
    pub total_results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_coordinates: Option<Coordinates>,
}

/// Ordered matches plus metadata. Owns its records outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub data: Vec<Record>,
    pub metadata: SearchMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proximity_defaults_to_smaller_limit() {
        let near = SearchQuery::new(SearchCriteria::Proximity {
            origin: Coordinates {
                latitude: 37.77,
                longitude: -122.42,
            },
        });
        assert_eq!(near.effective_limit(), DEFAULT_PROXIMITY_LIMIT);

        let by_name = SearchQuery::new(SearchCriteria::Name {
            applicant: "taco".to_string(),
        });
        assert_eq!(by_name.effective_limit(), DEFAULT_LIMIT);
        assert_eq!(by_name.with_limit(42).effective_limit(), 42);
    }

    #[test]
    fn search_request_deserializes_with_missing_optional_fields() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query_type":"street","street":"MISSION","status":"APPROVED"}"#)
                .expect("deserialize");
        assert_eq!(request.query_type, SearchType::Street);
        assert_eq!(request.street.as_deref(), Some("MISSION"));
        assert_eq!(request.status, Some(StatusFilter::Approved));
        assert!(request.limit.is_none());
        assert!(request.latitude.is_none());
    }

    #[test]
    fn metadata_omits_coordinates_outside_proximity_mode() {
        let metadata = SearchMetadata {
            query_type: SearchType::Name,
            status_filter: None,
            limit: 10,
            total_results: 0,
            search_coordinates: None,
        };
        let json = serde_json::to_value(&metadata).expect("serialize");
        assert!(json.get("search_coordinates").is_none());
        assert!(json["status_filter"].is_null());
        assert_eq!(json["query_type"], "name");
    }
}
