use super::ViewportError;

/// What a display position shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// Display position 0
    Header,
    /// Display position `logical_row + 1`
    Data { logical_row: usize },
}

impl SlotKind {
    pub fn is_header(&self) -> bool {
        matches!(self, SlotKind::Header)
    }

    pub fn logical_row(&self) -> Option<usize> {
        match self {
            SlotKind::Header => None,
            SlotKind::Data { logical_row } => Some(*logical_row),
        }
    }

    /// Inverse of [`RowRegistry::resolve`]
    pub fn display_position(&self) -> usize {
        match self {
            SlotKind::Header => 0,
            SlotKind::Data { logical_row } => logical_row + 1,
        }
    }
}

/// Maps display positions to header/data rows
///
/// Position 0 is reserved for the header, so the host sees one more item
/// than the dataset has rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowRegistry {
    row_count: usize,
}

impl RowRegistry {
    pub fn new(row_count: usize) -> Self {
        Self { row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn item_count(&self) -> usize {
        self.row_count + 1
    }

    pub fn resolve(&self, position: usize) -> Result<SlotKind, ViewportError> {
        match position {
            0 => Ok(SlotKind::Header),
            p if p <= self.row_count => Ok(SlotKind::Data { logical_row: p - 1 }),
            p => Err(ViewportError::PositionOutOfRange {
                position: p,
                item_count: self.item_count(),
            }),
        }
    }
}
