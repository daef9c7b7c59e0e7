//! Row operations emitted alongside every data change

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Update,
    Delete,
    Create,
    /// Deleted rows put back by undo
    Restore,
    /// Updated rows rolled back by undo
    Revert,
}

/// Which rows of the new array changed, as the half-open span
/// `[from_row_index, to_row_index)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOperation {
    #[serde(rename = "type")]
    pub kind: OperationType,
    pub from_row_index: usize,
    pub to_row_index: usize,
}

impl RowOperation {
    pub fn new(kind: OperationType, from_row_index: usize, to_row_index: usize) -> Self {
        Self {
            kind,
            from_row_index,
            to_row_index,
        }
    }

    pub fn update(from: usize, to: usize) -> Self {
        Self::new(OperationType::Update, from, to)
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self::new(OperationType::Delete, from, to)
    }

    pub fn create(from: usize, to: usize) -> Self {
        Self::new(OperationType::Create, from, to)
    }

    pub fn restore(from: usize, to: usize) -> Self {
        Self::new(OperationType::Restore, from, to)
    }

    pub fn revert(from: usize, to: usize) -> Self {
        Self::new(OperationType::Revert, from, to)
    }

    pub fn len(&self) -> usize {
        self.to_row_index.saturating_sub(self.from_row_index)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(RowOperation::create(3, 6)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "CREATE", "fromRowIndex": 3, "toRowIndex": 6})
        );
    }
}
