//! Conversion from raw source rows into canonical [`Record`]s.
//!
//! Field names are matched through a fixed table after folding case and
//! dropping separators, so `FoodItems`, `food_items` and `Food Items` all
//! land on the same field. Unknown columns are ignored.

use std::collections::HashMap;

use foodtrucks_core::{PermitStatus, Record};

use crate::error::EngineError;

/// One source row: field name to raw text.
pub type RawRow = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    LocationId,
    Applicant,
    FacilityType,
    Address,
    Status,
    FoodItems,
    Latitude,
    Longitude,
    LocationDescription,
}

const FIELD_NAMES: &[(&str, Field)] = &[
    ("locationid", Field::LocationId),
    ("applicant", Field::Applicant),
    ("facilitytype", Field::FacilityType),
    ("address", Field::Address),
    ("status", Field::Status),
    ("fooditems", Field::FoodItems),
    ("latitude", Field::Latitude),
    ("longitude", Field::Longitude),
    ("locationdescription", Field::LocationDescription),
];

fn field_for(name: &str) -> Option<Field> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect();
    FIELD_NAMES
        .iter()
        .find_map(|(known, field)| (*known == key).then_some(*field))
}

#[derive(Debug, Default)]
struct RowFields<'a> {
    location_id: Option<&'a str>,
    applicant: Option<&'a str>,
    facility_type: Option<&'a str>,
    address: Option<&'a str>,
    status: Option<&'a str>,
    food_items: Option<&'a str>,
    latitude: Option<&'a str>,
    longitude: Option<&'a str>,
    location_description: Option<&'a str>,
}

impl<'a> RowFields<'a> {
    /// When several columns fold to the same field, the first non-blank one in
    /// header-name order wins.
    fn collect(raw: &'a RawRow) -> Self {
        let mut columns: Vec<(&'a String, &'a String)> = raw.iter().collect();
        columns.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut fields = Self::default();
        for (name, value) in columns {
            let Some(field) = field_for(name) else {
                continue;
            };
            let value = Some(value.trim()).filter(|v| !v.is_empty());
            let slot = match field {
                Field::LocationId => &mut fields.location_id,
                Field::Applicant => &mut fields.applicant,
                Field::FacilityType => &mut fields.facility_type,
                Field::Address => &mut fields.address,
                Field::Status => &mut fields.status,
                Field::FoodItems => &mut fields.food_items,
                Field::Latitude => &mut fields.latitude,
                Field::Longitude => &mut fields.longitude,
                Field::LocationDescription => &mut fields.location_description,
            };
            if slot.is_none() {
                *slot = value;
            }
        }
        fields
    }
}

/// Maps one raw row into a [`Record`].
///
/// Coordinates that are non-numeric, non-finite, out of range or the `(0, 0)`
/// placeholder are recorded as absent; the row itself is kept.
///
/// # Errors
///
/// Returns [`EngineError::RowMapping`] when `locationid`, `applicant` or
/// `status` is missing or blank.
pub fn map_row(raw: &RawRow) -> Result<Record, EngineError> {
    let fields = RowFields::collect(raw);

    let location_id = fields
        .location_id
        .ok_or(EngineError::RowMapping { field: "locationid" })?;
    let applicant = fields
        .applicant
        .ok_or(EngineError::RowMapping { field: "applicant" })?;
    let status = fields
        .status
        .ok_or(EngineError::RowMapping { field: "status" })?;

    let (latitude, longitude) = match (
        parse_coordinate(fields.latitude, 90.0),
        parse_coordinate(fields.longitude, 180.0),
    ) {
        (Some(lat), Some(lon)) if lat != 0.0 || lon != 0.0 => (Some(lat), Some(lon)),
        _ => (None, None),
    };

    Ok(Record {
        location_id: location_id.to_string(),
        applicant: applicant.to_string(),
        facility_type: fields.facility_type.map(str::to_string),
        address: fields.address.unwrap_or_default().to_string(),
        status: PermitStatus::from(status),
        food_items: fields.food_items.map(str::to_string),
        latitude,
        longitude,
        location_description: fields.location_description.map(str::to_string),
    })
}

fn parse_coordinate(raw: Option<&str>, bound: f64) -> Option<f64> {
    let value = raw?.parse::<f64>().ok()?;
    (value.is_finite() && value.abs() <= bound).then_some(value)
}

/// Records that mapped cleanly plus the number of rows that were dropped.
#[derive(Debug, Default)]
pub struct MappedRows {
    pub records: Vec<Record>,
    pub dropped: usize,
}

/// Maps every row, skipping the ones that fail. Never aborts on a bad row.
#[must_use]
pub fn map_rows(rows: &[RawRow]) -> MappedRows {
    let mut mapped = MappedRows {
        records: Vec::with_capacity(rows.len()),
        dropped: 0,
    };
    for (index, raw) in rows.iter().enumerate() {
        match map_row(raw) {
            Ok(record) => mapped.records.push(record),
            Err(e) => {
                tracing::debug!(row = index + 1, error = %e, "mapper: skipping row");
                mapped.dropped += 1;
            }
        }
    }
    mapped
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
