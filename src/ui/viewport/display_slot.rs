use super::row_registry::SlotKind;
use super::scroll_sync::RowScroll;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

/// What a slot is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBinding {
    pub position: usize,
    pub kind: SlotKind,
    /// Generation of the dataset handle the cells came from
    pub generation: u64,
}

/// A reusable display row
///
/// The host owns slots and moves them between display positions; every move
/// goes through `TableController::bind`, which replaces the cells wholesale.
#[derive(Debug)]
pub struct DisplaySlot {
    id: u64,
    binding: Option<SlotBinding>,
    scroll: RowScroll,
    cells: Vec<String>,
}

impl DisplaySlot {
    pub fn new() -> Self {
        Self {
            id: NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed),
            binding: None,
            scroll: RowScroll::new(),
            cells: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn binding(&self) -> Option<&SlotBinding> {
        self.binding.as_ref()
    }

    pub fn kind(&self) -> Option<SlotKind> {
        self.binding.map(|b| b.kind)
    }

    pub fn position(&self) -> Option<usize> {
        self.binding.map(|b| b.position)
    }

    pub fn is_bound_to(&self, position: usize, generation: u64) -> bool {
        self.binding
            .is_some_and(|b| b.position == position && b.generation == generation)
    }

    pub fn scroll(&self) -> &RowScroll {
        &self.scroll
    }

    pub fn offset(&self) -> usize {
        self.scroll.offset()
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Replace the cell container and the binding in one step
    pub(crate) fn rebuild(&mut self, binding: SlotBinding, cells: Vec<String>) {
        self.cells.clear();
        self.cells.extend(cells);
        self.binding = Some(binding);
    }
}

impl Default for DisplaySlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_is_unbound() {
        let slot = DisplaySlot::new();
        assert!(slot.binding().is_none());
        assert!(slot.cells().is_empty());
        assert_eq!(slot.offset(), 0);
        assert_ne!(slot.id(), DisplaySlot::new().id());
    }

    #[test]
    fn test_rebuild_replaces_cells_and_binding() {
        let mut slot = DisplaySlot::new();
        slot.rebuild(
            SlotBinding {
                position: 0,
                kind: SlotKind::Header,
                generation: 4,
            },
            vec!["a".into(), "b".into(), "c".into()],
        );
        slot.rebuild(
            SlotBinding {
                position: 2,
                kind: SlotKind::Data { logical_row: 1 },
                generation: 4,
            },
            vec!["x".into()],
        );

        assert_eq!(slot.cells(), &["x"]);
        assert_eq!(slot.position(), Some(2));
        assert!(slot.is_bound_to(2, 4));
        assert!(!slot.is_bound_to(2, 5));
        assert_eq!(slot.kind(), Some(SlotKind::Data { logical_row: 1 }));
    }
}
