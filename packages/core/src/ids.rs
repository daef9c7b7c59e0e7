//! # Identifier & coordinate codec
//!
//! Every addressable thing in the grid is keyed by an opaque string id of
//! the form `type:payload`:
//!
//! | kind   | format                         |
//! |--------|--------------------------------|
//! | cell   | `cell:{rowIndex}-{columnIndex}` |
//! | header | `header:{columnKey}`           |
//! | row    | `row:{rowKey}`                 |
//! | footer | `footer:{columnKey}`           |
//!
//! Ids are the only map keys used by the engine, so equality is a plain
//! string comparison. The cell codec is total and reversible:
//! `extract_cell_id(&create_cell_id(c)) == Ok(c)`.

use crate::errors::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Zero-based (row, column) position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellCoordinates {
    pub row_index: usize,
    pub column_index: usize,
}

impl CellCoordinates {
    pub fn new(row_index: usize, column_index: usize) -> Self {
        Self {
            row_index,
            column_index,
        }
    }

    pub fn id(&self) -> CellId {
        create_cell_id(*self)
    }
}

/// Row-major ordering
impl Ord for CellCoordinates {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row_index
            .cmp(&other.row_index)
            .then_with(|| self.column_index.cmp(&other.column_index))
    }
}

impl PartialOrd for CellCoordinates {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CellCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row_index, self.column_index)
    }
}

/// Opaque `type:payload` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

/// Ids produced by [`create_cell_id`]
pub type CellId = Id;

impl Id {
    /// Wrap a raw id string, e.g. one read back from a rendered element.
    /// Validation happens when the id is decoded.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Id(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the first `:`
    pub fn payload(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, payload)| payload)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind encoded in an id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    Cell,
    Header,
    Row,
    Footer,
}

impl IdType {
    pub fn prefix(&self) -> &'static str {
        match self {
            IdType::Cell => "cell",
            IdType::Header => "header",
            IdType::Row => "row",
            IdType::Footer => "footer",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "cell" => Some(IdType::Cell),
            "header" => Some(IdType::Header),
            "row" => Some(IdType::Row),
            "footer" => Some(IdType::Footer),
            _ => None,
        }
    }
}

/// Input for [`create_id`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSpec<'a> {
    Cell(CellCoordinates),
    Header(&'a str),
    Row(&'a str),
    Footer(&'a str),
}

pub fn create_cell_id(coordinates: CellCoordinates) -> CellId {
    Id(format!(
        "cell:{}-{}",
        coordinates.row_index, coordinates.column_index
    ))
}

pub fn create_id(kind: IdSpec<'_>) -> Id {
    match kind {
        IdSpec::Cell(coordinates) => create_cell_id(coordinates),
        IdSpec::Header(key) => Id(format!("header:{}", key)),
        IdSpec::Row(key) => Id(format!("row:{}", key)),
        IdSpec::Footer(key) => Id(format!("footer:{}", key)),
    }
}

/// Decode a cell id back into coordinates
pub fn extract_cell_id(id: &Id) -> GridResult<CellCoordinates> {
    let (prefix, payload) = id
        .0
        .split_once(':')
        .ok_or_else(|| GridError::MalformedId(id.0.clone()))?;

    if prefix != IdType::Cell.prefix() {
        return Err(GridError::NotACellId(id.0.clone()));
    }

    let (row, column) = payload
        .split_once('-')
        .ok_or_else(|| GridError::MalformedId(id.0.clone()))?;

    let row_index = row
        .parse::<usize>()
        .map_err(|_| GridError::MalformedId(id.0.clone()))?;
    let column_index = column
        .parse::<usize>()
        .map_err(|_| GridError::MalformedId(id.0.clone()))?;

    Ok(CellCoordinates::new(row_index, column_index))
}

/// Kind of an id, read from the prefix before the first `:`
pub fn get_id_type(id: &Id) -> GridResult<IdType> {
    id.0.split_once(':')
        .and_then(|(prefix, _)| IdType::from_prefix(prefix))
        .ok_or_else(|| GridError::MalformedId(id.0.clone()))
}

/// Smaller of two cell ids in row-major numeric order.
///
/// Compares decoded coordinates rather than the raw strings, so
/// `cell:2-0` sorts before `cell:10-0`.
pub fn get_min_cell_id(a: &CellId, b: &CellId) -> GridResult<CellId> {
    let (ca, cb) = (extract_cell_id(a)?, extract_cell_id(b)?);
    Ok(if cb < ca { b.clone() } else { a.clone() })
}

/// Larger of two cell ids in row-major numeric order
pub fn get_max_cell_id(a: &CellId, b: &CellId) -> GridResult<CellId> {
    let (ca, cb) = (extract_cell_id(a)?, extract_cell_id(b)?);
    Ok(if cb > ca { b.clone() } else { a.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_create_ids() {
        assert_eq!(create_cell_id(CellCoordinates::new(3, 7)).as_str(), "cell:3-7");
        assert_eq!(create_id(IdSpec::Header("name")).as_str(), "header:name");
        assert_eq!(create_id(IdSpec::Row("42")).as_str(), "row:42");
        assert_eq!(create_id(IdSpec::Footer("total")).as_str(), "footer:total");
    }

    #[test]
    fn test_id_type_uses_first_colon() {
        let id = create_id(IdSpec::Header("a:b"));
        assert_eq!(get_id_type(&id), Ok(IdType::Header));
        assert_eq!(id.payload(), Some("a:b"));
    }

    #[test]
    fn test_extract_rejects_non_cell_ids() {
        let header = create_id(IdSpec::Header("name"));
        assert_eq!(
            extract_cell_id(&header),
            Err(GridError::NotACellId("header:name".into()))
        );
        assert!(matches!(
            extract_cell_id(&Id::from_raw("cell:x-1")),
            Err(GridError::MalformedId(_))
        ));
        assert!(matches!(
            extract_cell_id(&Id::from_raw("nonsense")),
            Err(GridError::MalformedId(_))
        ));
        assert!(get_id_type(&Id::from_raw("widget:1")).is_err());
    }

    #[test]
    fn test_min_max_are_numeric() {
        let two = create_cell_id(CellCoordinates::new(2, 0));
        let ten = create_cell_id(CellCoordinates::new(10, 0));

        // Raw strings sort the other way round
        assert!(ten < two);
        assert_eq!(get_min_cell_id(&ten, &two).unwrap(), two);
        assert_eq!(get_max_cell_id(&two, &ten).unwrap(), ten);
    }

    proptest! {
        #[test]
        fn prop_cell_id_round_trips(row in 0usize..100_000, column in 0usize..10_000) {
            let coordinates = CellCoordinates::new(row, column);
            prop_assert_eq!(extract_cell_id(&create_cell_id(coordinates)), Ok(coordinates));
        }
    }
}
