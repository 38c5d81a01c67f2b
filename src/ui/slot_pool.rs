/// SlotPool - the recycling host around `TableController`
///
/// Owns the display slots that are currently on screen and decides which
/// display position each of them shows. Scrolling vertically rotates the pool
/// so that slots still on screen keep their binding, and only the slots that
/// wrapped around to the other edge are rebound.
///
/// Screen layout:
/// - pinned header (optional) at screen row 0, always display position 0
/// - data slots below it, showing positions `top..top + slots.len()`
use crate::ui::viewport::{BindOutcome, DisplaySlot, TableController, ViewportError};
use tracing::{debug, trace, warn};

/// Result of a vertical navigation request
#[derive(Debug, Clone)]
pub struct RowNavigationResult {
    /// Display position now shown in the first data slot
    pub top: usize,
    /// Human-readable description of the operation
    pub description: String,
    /// Whether the operation changed the visible window
    pub viewport_changed: bool,
}

#[derive(Debug)]
pub struct SlotPool {
    pin_header: bool,
    header: Option<DisplaySlot>,
    slots: Vec<DisplaySlot>,
    /// Display position of `slots[0]`
    top: usize,
    /// Largest valid `top` as of the last sync
    max_top: usize,
    bind_count: u64,
}

impl SlotPool {
    pub fn new(pin_header: bool) -> Self {
        let first = Self::first_scrolling_position(pin_header);
        Self {
            pin_header,
            header: None,
            slots: Vec::new(),
            top: first,
            max_top: first,
            bind_count: 0,
        }
    }

    fn first_scrolling_position(pin_header: bool) -> usize {
        usize::from(pin_header)
    }

    pub fn pin_header(&self) -> bool {
        self.pin_header
    }

    pub fn top(&self) -> usize {
        self.top
    }

    /// Number of data slots on screen
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Total binds issued by this pool
    pub fn bind_count(&self) -> u64 {
        self.bind_count
    }

    /// Bring the pool in line with the controller and a screen `height`
    ///
    /// Creates or destroys slots to fill the height, clamps the window to the
    /// item count and rebinds every slot whose binding is missing, points at
    /// another position, or came from an older dataset.
    pub fn sync(
        &mut self,
        controller: &mut TableController,
        height: usize,
    ) -> Result<(), ViewportError> {
        let item_count = controller.item_count();
        let Some(generation) = controller.generation().filter(|_| item_count > 0) else {
            self.discard_slots(controller);
            return Ok(());
        };

        let first = Self::first_scrolling_position(self.pin_header);
        let data_height = if self.pin_header {
            if height > 0 {
                let header = self.header.get_or_insert_with(DisplaySlot::new);
                if !header.is_bound_to(0, generation) {
                    bind_slot(controller, header, 0, &mut self.bind_count)?;
                }
            }
            height.saturating_sub(1)
        } else {
            if let Some(header) = self.header.take() {
                controller.release(&header);
            }
            height
        };

        let available = item_count.saturating_sub(first);
        let wanted = data_height.min(available);
        self.resize(controller, wanted);

        self.max_top = first + available - wanted;
        self.top = self.top.clamp(first, self.max_top);

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let position = self.top + index;
            if !slot.is_bound_to(position, generation) {
                bind_slot(controller, slot, position, &mut self.bind_count)?;
            }
        }
        Ok(())
    }

    fn resize(&mut self, controller: &mut TableController, wanted: usize) {
        if self.slots.len() == wanted {
            return;
        }
        debug!(
            target: "viewport",
            "Resizing slot pool from {} to {} slots",
            self.slots.len(),
            wanted
        );
        while self.slots.len() > wanted {
            if let Some(slot) = self.slots.pop() {
                controller.release(&slot);
            }
        }
        self.slots.resize_with(wanted, DisplaySlot::new);
    }

    /// Move the window so that `top` is the first data position
    ///
    /// Slots whose position is still on screen are rotated into place; the
    /// rest are rebound on the next [`SlotPool::sync`].
    pub fn scroll_to(&mut self, top: usize) -> RowNavigationResult {
        let first = Self::first_scrolling_position(self.pin_header);
        let target = top.clamp(first, self.max_top.max(first));
        let old_top = self.top;
        let len = self.slots.len();

        if target > old_top && target - old_top < len {
            self.slots.rotate_left(target - old_top);
        } else if target < old_top && old_top - target < len {
            self.slots.rotate_right(old_top - target);
        }
        self.top = target;

        trace!(target: "viewport", "Window moved from {} to {}", old_top, target);
        RowNavigationResult {
            top: target,
            description: format!("Showing from position {}", target),
            viewport_changed: target != old_top,
        }
    }

    pub fn scroll_by(&mut self, delta: isize) -> RowNavigationResult {
        self.scroll_to(self.top.saturating_add_signed(delta))
    }

    pub fn page_down(&mut self) -> RowNavigationResult {
        let page = self.slots.len().max(1);
        let mut result = self.scroll_to(self.top.saturating_add(page));
        result.description = format!("Page down to position {}", result.top);
        result
    }

    pub fn page_up(&mut self) -> RowNavigationResult {
        let page = self.slots.len().max(1);
        let mut result = self.scroll_to(self.top.saturating_sub(page));
        result.description = format!("Page up to position {}", result.top);
        result
    }

    pub fn to_first(&mut self) -> RowNavigationResult {
        let mut result = self.scroll_to(0);
        result.description = "Jumped to first row".to_string();
        result
    }

    pub fn to_last(&mut self) -> RowNavigationResult {
        let mut result = self.scroll_to(usize::MAX);
        result.description = "Jumped to last row".to_string();
        result
    }

    /// Slots in screen order, pinned header first
    pub fn visible(&self) -> impl Iterator<Item = &DisplaySlot> {
        self.header.iter().chain(self.slots.iter())
    }

    pub fn slot_at(&self, screen_row: usize) -> Option<&DisplaySlot> {
        self.visible().nth(screen_row)
    }

    /// Horizontal offset shared by the visible slots
    pub fn offset(&self) -> usize {
        self.visible().next().map_or(0, DisplaySlot::offset)
    }

    /// Scroll one slot horizontally; the coordinator moves the rest
    pub fn scroll_row_to(&self, screen_row: usize, offset: usize) -> bool {
        match self.slot_at(screen_row) {
            Some(slot) => {
                slot.scroll().scroll_to(offset);
                true
            }
            None => false,
        }
    }

    /// Drop every slot and tear the controller down
    pub fn teardown(&mut self, controller: &mut TableController) {
        self.header = None;
        self.slots.clear();
        self.top = Self::first_scrolling_position(self.pin_header);
        self.max_top = self.top;
        controller.teardown();
    }

    fn discard_slots(&mut self, controller: &mut TableController) {
        for slot in self.header.take().iter().chain(self.slots.iter()) {
            controller.release(slot);
        }
        self.slots.clear();
    }
}

fn bind_slot(
    controller: &mut TableController,
    slot: &mut DisplaySlot,
    position: usize,
    bind_count: &mut u64,
) -> Result<(), ViewportError> {
    *bind_count += 1;
    if controller.bind(slot, position)? == BindOutcome::Stale {
        warn!(target: "viewport", "Bind for position {} came back stale", position);
    }
    Ok(())
}
