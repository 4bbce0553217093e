//! Name, street and proximity search over a dataset snapshot.
//!
//! Every function here is pure over its inputs: no I/O, no locks, no state
//! carried between calls.

use foodtrucks_core::{
    Coordinates, Record, SearchCriteria, SearchMetadata, SearchQuery, SearchRequest, SearchResult,
    SearchType, StatusFilter, MAX_LIMIT,
};

use crate::error::EngineError;
use crate::geo::distance_km;
use crate::store::Dataset;

/// Turns the flat wire request into a typed query.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when a field required by the request's
/// mode is absent or blank.
pub fn build_query(request: &SearchRequest) -> Result<SearchQuery, EngineError> {
    let criteria = match request.query_type {
        SearchType::Name => SearchCriteria::Name {
            applicant: required_text(request.applicant.as_deref(), "applicant", "name")?,
        },
        SearchType::Street => SearchCriteria::Street {
            street: required_text(request.street.as_deref(), "street", "street")?,
        },
        SearchType::Proximity => match (request.latitude, request.longitude) {
            (Some(latitude), Some(longitude)) => SearchCriteria::Proximity {
                origin: Coordinates {
                    latitude,
                    longitude,
                },
            },
            _ => {
                return Err(EngineError::Validation(
                    "latitude and longitude are required for proximity search".to_string(),
                ))
            }
        },
    };

    Ok(SearchQuery {
        criteria,
        status: request.status,
        limit: request.limit,
    })
}

fn required_text(value: Option<&str>, field: &str, mode: &str) -> Result<String, EngineError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| EngineError::Validation(format!("{field} is required for {mode} search")))
}

/// Runs `query` against `dataset` and returns an owned, ordered result.
///
/// Status filtering happens before matching. Proximity searches with no
/// status default to `APPROVED`, skip records without coordinates and sort
/// nearest first, keeping source order on ties. Results are cut to the
/// query's effective limit.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] for blank search text, out-of-range
/// coordinates or a limit outside `1..=100`.
pub fn execute(dataset: &Dataset, query: &SearchQuery) -> Result<SearchResult, EngineError> {
    validate(query)?;

    let limit = query.effective_limit();
    let status = match query.criteria {
        SearchCriteria::Proximity { .. } => Some(query.status.unwrap_or(StatusFilter::Approved)),
        _ => query.status,
    };

    let candidates = dataset
        .records()
        .iter()
        .filter(|record| status.is_none_or(|s| s.matches(&record.status)));

    let data: Vec<Record> = match &query.criteria {
        SearchCriteria::Name { applicant } => {
            let needle = applicant.trim().to_lowercase();
            candidates
                .filter(|record| contains_ignore_case(&record.applicant, &needle))
                .take(limit)
                .cloned()
                .collect()
        }
        SearchCriteria::Street { street } => {
            let needle = street.trim().to_lowercase();
            candidates
                .filter(|record| contains_ignore_case(&record.address, &needle))
                .take(limit)
                .cloned()
                .collect()
        }
        SearchCriteria::Proximity { origin } => nearest(candidates, *origin, limit)?,
    };

    let search_coordinates = match query.criteria {
        SearchCriteria::Proximity { origin } => Some(origin),
        _ => None,
    };

    Ok(SearchResult {
        metadata: SearchMetadata {
            query_type: query.search_type(),
            status_filter: query.status,
            limit,
            total_results: data.len(),
            search_coordinates,
        },
        data,
    })
}

fn validate(query: &SearchQuery) -> Result<(), EngineError> {
    match &query.criteria {
        SearchCriteria::Name { applicant } if applicant.trim().is_empty() => {
            return Err(EngineError::Validation(
                "applicant is required for name search".to_string(),
            ));
        }
        SearchCriteria::Street { street } if street.trim().is_empty() => {
            return Err(EngineError::Validation(
                "street is required for street search".to_string(),
            ));
        }
        SearchCriteria::Proximity { origin } => {
            if !(-90.0..=90.0).contains(&origin.latitude) {
                return Err(EngineError::Validation(format!(
                    "latitude must be between -90 and 90, got {}",
                    origin.latitude
                )));
            }
            if !(-180.0..=180.0).contains(&origin.longitude) {
                return Err(EngineError::Validation(format!(
                    "longitude must be between -180 and 180, got {}",
                    origin.longitude
                )));
            }
        }
        _ => {}
    }

    if let Some(limit) = query.limit {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(EngineError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }
    }

    Ok(())
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

fn nearest<'a>(
    candidates: impl Iterator<Item = &'a Record>,
    origin: Coordinates,
    limit: usize,
) -> Result<Vec<Record>, EngineError> {
    let mut ranked = candidates
        .filter_map(|record| record.coordinates().map(|at| (record, at)))
        .map(|(record, at)| {
            distance_km(origin.latitude, origin.longitude, at.latitude, at.longitude)
                .map(|km| (km, record))
        })
        .collect::<Result<Vec<_>, _>>()?;

    // `sort_by` is stable, so equal distances keep dataset order.
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(_, record)| record.clone())
        .collect())
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
