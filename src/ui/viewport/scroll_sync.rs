//! Horizontal scroll synchronization between display rows
//!
//! Each display row scrolls horizontally on its own so rows can be recycled
//! independently. The coordinator listens to every registered row and copies
//! an offset change from one row onto all the others, making the grid look
//! like a single wide surface.
//!
//! Everything here runs on the UI thread; the types are `Rc` based and
//! deliberately `!Send`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_ROW_SCROLL_ID: AtomicU64 = AtomicU64::new(1);

type OffsetListener = Rc<dyn Fn(&RowScroll, usize)>;

/// Horizontal scroll state of one display row
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct RowScroll {
    inner: Rc<RowScrollInner>,
}

struct RowScrollInner {
    id: u64,
    offset: Cell<usize>,
    listener: RefCell<Option<OffsetListener>>,
}

impl RowScroll {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RowScrollInner {
                id: NEXT_ROW_SCROLL_ID.fetch_add(1, Ordering::Relaxed),
                offset: Cell::new(0),
                listener: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn offset(&self) -> usize {
        self.inner.offset.get()
    }

    /// Move to `offset` and notify the listener if the offset changed
    pub fn scroll_to(&self, offset: usize) {
        if self.inner.offset.get() == offset {
            return;
        }
        self.inner.offset.set(offset);

        // Clone out of the RefCell so the listener may replace itself.
        let listener = self.inner.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(self, offset);
        }
    }

    pub fn scroll_by(&self, delta: isize) {
        self.scroll_to(self.offset().saturating_add_signed(delta));
    }

    pub fn has_listener(&self) -> bool {
        self.inner.listener.borrow().is_some()
    }

    fn set_listener(&self, listener: OffsetListener) {
        *self.inner.listener.borrow_mut() = Some(listener);
    }

    fn clear_listener(&self) {
        self.inner.listener.borrow_mut().take();
    }
}

impl Default for RowScroll {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for RowScroll {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for RowScroll {}

impl fmt::Debug for RowScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowScroll")
            .field("id", &self.id())
            .field("offset", &self.offset())
            .finish()
    }
}

/// Keeps every registered row at the same horizontal offset
#[derive(Clone, Default)]
pub struct ScrollCoordinator {
    inner: Rc<CoordinatorInner>,
}

#[derive(Default)]
struct CoordinatorInner {
    rows: RefCell<Vec<RowScroll>>,
    propagating: Cell<bool>,
    offset: Cell<usize>,
    propagations: Cell<u64>,
}

/// Restores the propagation flag even if a listener unwinds
struct PropagationGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> PropagationGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for PropagationGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `row` to the live set and start listening to it
    ///
    /// Returns false if the row was already registered. Registration does not
    /// move the row; use [`ScrollCoordinator::adopt`] for that.
    pub fn register(&self, row: &RowScroll) -> bool {
        if self.contains(row) {
            return false;
        }
        self.inner.rows.borrow_mut().push(row.clone());

        let coordinator = Rc::downgrade(&self.inner);
        row.set_listener(Rc::new(move |source: &RowScroll, offset: usize| {
            if let Some(inner) = Weak::upgrade(&coordinator) {
                ScrollCoordinator { inner }.propagate(source, offset);
            }
        }));
        trace!(target: "scroll", "Registered row {} ({} live)", row.id(), self.len());
        true
    }

    /// Copy `offset` onto every registered row other than `source`
    ///
    /// Offsets set here fire the target rows' listeners, which call back into
    /// this method; those nested calls are dropped while the guard is set.
    pub fn propagate(&self, source: &RowScroll, offset: usize) {
        if self.inner.propagating.get() {
            trace!(target: "scroll", "Ignored echo from row {} at {}", source.id(), offset);
            return;
        }
        let _guard = PropagationGuard::engage(&self.inner.propagating);

        self.inner.offset.set(offset);
        self.inner.propagations.set(self.inner.propagations.get() + 1);

        let targets: Vec<RowScroll> = self
            .inner
            .rows
            .borrow()
            .iter()
            .filter(|row| row.id() != source.id())
            .cloned()
            .collect();
        for row in &targets {
            row.scroll_to(offset);
        }
        trace!(
            target: "scroll",
            "Row {} moved {} other rows to {}",
            source.id(),
            targets.len(),
            offset
        );
    }

    /// Move `row` to the group's offset without echoing it to the others
    pub fn adopt(&self, row: &RowScroll) {
        let _guard = PropagationGuard::engage(&self.inner.propagating);
        row.scroll_to(self.inner.offset.get());
    }

    pub fn unregister(&self, row: &RowScroll) -> bool {
        let mut rows = self.inner.rows.borrow_mut();
        let Some(index) = rows.iter().position(|r| r.id() == row.id()) else {
            return false;
        };
        rows.remove(index).clear_listener();
        trace!(target: "scroll", "Unregistered row {} ({} live)", row.id(), rows.len());
        true
    }

    /// Drop every registration
    pub fn clear(&self) {
        let rows = std::mem::take(&mut *self.inner.rows.borrow_mut());
        for row in &rows {
            row.clear_listener();
        }
        if !rows.is_empty() {
            trace!(target: "scroll", "Cleared {} rows", rows.len());
        }
    }

    /// Forget the group offset, e.g. when a new dataset replaces the old one
    pub fn reset(&self) {
        self.inner.offset.set(0);
    }

    /// Last offset propagated through the group
    pub fn offset(&self) -> usize {
        self.inner.offset.get()
    }

    pub fn contains(&self, row: &RowScroll) -> bool {
        self.inner.rows.borrow().iter().any(|r| r.id() == row.id())
    }

    pub fn len(&self) -> usize {
        self.inner.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_propagating(&self) -> bool {
        self.inner.propagating.get()
    }

    /// Number of fan-outs performed so far
    pub fn propagation_count(&self) -> u64 {
        self.inner.propagations.get()
    }
}

impl fmt::Debug for ScrollCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollCoordinator")
            .field("rows", &self.len())
            .field("offset", &self.offset())
            .field("propagating", &self.is_propagating())
            .finish()
    }
}
