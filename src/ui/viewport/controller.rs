use super::cell_label::CellLabeler;
use super::display_slot::{DisplaySlot, SlotBinding};
use super::row_registry::{RowRegistry, SlotKind};
use super::scroll_sync::ScrollCoordinator;
use super::ViewportError;
use crate::data::dataset::DatasetHandle;
use tracing::{debug, info, trace};

/// Cells fetched for one display position, not yet applied to a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContent {
    pub position: usize,
    pub kind: SlotKind,
    pub generation: u64,
    pub cells: Vec<String>,
}

/// Result of applying fetched content to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound(SlotKind),
    /// The content was fetched from a dataset that has since been replaced
    Stale,
}

/// Counters for what the controller has bound so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindStats {
    pub header_binds: u64,
    pub data_binds: u64,
    pub stale_discards: u64,
}

/// Binds logical rows to recycled display slots
///
/// The host asks for [`TableController::item_count`] before layout and calls
/// [`TableController::bind`] whenever a slot scrolls into view or is moved
/// to a new position. Every bind rebuilds the slot's cells from scratch and
/// makes sure the slot follows the shared horizontal offset.
#[derive(Debug)]
pub struct TableController {
    dataset: Option<DatasetHandle>,
    registry: RowRegistry,
    labeler: CellLabeler,
    coordinator: ScrollCoordinator,
    stats: BindStats,
}

impl TableController {
    pub fn new(
        dataset: DatasetHandle,
        coordinator: ScrollCoordinator,
        labeler: CellLabeler,
    ) -> Self {
        info!(
            target: "viewport",
            "Attached dataset {} ({} rows, {} columns)",
            dataset.name().unwrap_or("<unnamed>"),
            dataset.row_count(),
            dataset.column_count()
        );
        Self {
            registry: RowRegistry::new(dataset.row_count()),
            dataset: Some(dataset),
            labeler,
            coordinator,
            stats: BindStats::default(),
        }
    }

    pub fn dataset(&self) -> Option<&DatasetHandle> {
        self.dataset.as_ref()
    }

    pub fn generation(&self) -> Option<u64> {
        self.dataset.as_ref().map(DatasetHandle::generation)
    }

    pub fn is_attached(&self) -> bool {
        self.dataset.is_some()
    }

    /// Number of display positions, header included; 0 once torn down
    pub fn item_count(&self) -> usize {
        if self.dataset.is_some() {
            self.registry.item_count()
        } else {
            0
        }
    }

    pub fn resolve(&self, position: usize) -> Result<SlotKind, ViewportError> {
        if self.dataset.is_none() {
            return Err(ViewportError::Detached);
        }
        self.registry.resolve(position)
    }

    /// Read and format the cells for `position` from the current dataset
    pub fn fetch(&self, position: usize) -> Result<RowContent, ViewportError> {
        let dataset = self.dataset.as_ref().ok_or(ViewportError::Detached)?;
        let kind = self.registry.resolve(position)?;

        let cells = match kind {
            SlotKind::Header => dataset
                .headers()
                .iter()
                .map(|header| self.labeler.header_label(header))
                .collect(),
            SlotKind::Data { logical_row } => self.data_cells(dataset, logical_row),
        };

        Ok(RowContent {
            position,
            kind,
            generation: dataset.generation(),
            cells,
        })
    }

    /// Put fetched content into `slot` unless the dataset changed meanwhile
    pub fn apply(&mut self, slot: &mut DisplaySlot, content: RowContent) -> BindOutcome {
        if self.generation() != Some(content.generation) {
            debug!(
                target: "viewport",
                "Discarding stale content for position {} (generation {}, active {:?})",
                content.position,
                content.generation,
                self.generation()
            );
            self.stats.stale_discards += 1;
            return BindOutcome::Stale;
        }

        let kind = content.kind;
        slot.rebuild(
            SlotBinding {
                position: content.position,
                kind,
                generation: content.generation,
            },
            content.cells,
        );

        self.coordinator.register(slot.scroll());
        self.coordinator.adopt(slot.scroll());

        match kind {
            SlotKind::Header => self.stats.header_binds += 1,
            SlotKind::Data { .. } => self.stats.data_binds += 1,
        }
        trace!(
            target: "viewport",
            "Slot {} bound to position {} at offset {}",
            slot.id(),
            content.position,
            slot.offset()
        );
        BindOutcome::Bound(kind)
    }

    pub fn bind(
        &mut self,
        slot: &mut DisplaySlot,
        position: usize,
    ) -> Result<BindOutcome, ViewportError> {
        let content = self.fetch(position)?;
        Ok(self.apply(slot, content))
    }

    /// Stop tracking a slot the host is destroying
    pub fn release(&mut self, slot: &DisplaySlot) -> bool {
        self.coordinator.unregister(slot.scroll())
    }

    /// Switch to a freshly loaded dataset
    ///
    /// Content fetched from the previous handle is discarded by
    /// [`TableController::apply`]. Every slot is unregistered and rejoins the
    /// group at offset 0 on its next bind.
    pub fn replace_dataset(&mut self, dataset: DatasetHandle) {
        info!(
            target: "viewport",
            "Replacing dataset with {} ({} rows, {} columns)",
            dataset.name().unwrap_or("<unnamed>"),
            dataset.row_count(),
            dataset.column_count()
        );
        self.registry = RowRegistry::new(dataset.row_count());
        self.dataset = Some(dataset);
        self.coordinator.clear();
        self.coordinator.reset();
    }

    /// Release every slot registration and the dataset; safe to call twice
    pub fn teardown(&mut self) {
        if self.dataset.is_none() && self.coordinator.is_empty() {
            return;
        }
        let slots = self.coordinator.len();
        self.coordinator.clear();
        self.coordinator.reset();
        self.dataset = None;
        self.registry = RowRegistry::default();
        info!(target: "viewport", "Viewport torn down, released {} slots", slots);
    }

    /// Untruncated header text for column `col`
    pub fn full_header(&self, col: usize) -> Option<&str> {
        self.dataset
            .as_ref()
            .and_then(|dataset| dataset.headers().get(col))
            .map(String::as_str)
    }

    pub fn coordinator(&self) -> &ScrollCoordinator {
        &self.coordinator
    }

    pub fn labeler(&self) -> &CellLabeler {
        &self.labeler
    }

    pub fn stats(&self) -> BindStats {
        self.stats
    }

    fn data_cells(&self, dataset: &DatasetHandle, logical_row: usize) -> Vec<String> {
        let column_count = dataset.column_count();
        match dataset.store().get_row(logical_row) {
            Some(values) => (0..column_count.max(values.len()))
                .map(|col| self.labeler.data_label(values.get(col).map(String::as_str)))
                .collect(),
            None => {
                debug!(
                    target: "viewport",
                    "Row {} not available, rendering empty row",
                    logical_row
                );
                vec![String::new(); column_count]
            }
        }
    }
}
