// Grid rendering for the slot pool
// Each slot is drawn as one line, clipped by its own horizontal offset

use crate::ui::slot_pool::SlotPool;
use crate::ui::viewport::column_layout::COLUMN_GAP;
use crate::ui::viewport::{ColumnLayout, DisplaySlot, SlotKind};
use crate::utils::text_width::{clip_cells, display_width, single_line, take_width};
use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Everything the grid needs to draw one frame
pub struct TableViewContext<'a> {
    pub pool: &'a SlotPool,
    pub layout: &'a ColumnLayout,
    pub title: String,
    pub row_count: usize,
    pub show_row_numbers: bool,
}

impl TableViewContext<'_> {
    /// Columns taken by the row-number gutter, separator included
    pub fn gutter_width(&self) -> u16 {
        gutter_width(self.row_count, self.show_row_numbers)
    }
}

pub fn gutter_width(row_count: usize, show_row_numbers: bool) -> u16 {
    if !show_row_numbers {
        return 0;
    }
    let digits = row_count.max(1).ilog10() as u16 + 1;
    digits + 1
}

/// Area inside the border that holds the grid lines
pub fn grid_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

pub fn render_table(f: &mut Frame, area: Rect, ctx: &TableViewContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(ctx.title.clone());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let gutter = ctx.gutter_width();
    let content_width = inner.width.saturating_sub(gutter) as usize;

    let lines: Vec<Line> = ctx
        .pool
        .visible()
        .take(inner.height as usize)
        .map(|slot| build_line(slot, ctx, gutter, content_width))
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn build_line(
    slot: &DisplaySlot,
    ctx: &TableViewContext,
    gutter: u16,
    content_width: usize,
) -> Line<'static> {
    let is_header = slot.kind().is_some_and(|kind| kind.is_header());
    let mut spans = Vec::with_capacity(2);

    if gutter > 0 {
        let label = match slot.kind() {
            Some(SlotKind::Data { logical_row }) => (logical_row + 1).to_string(),
            Some(SlotKind::Header) => "#".to_string(),
            None => String::new(),
        };
        spans.push(Span::styled(
            format!("{:>width$} ", label, width = gutter as usize - 1),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let row = compose_row(slot.cells(), ctx.layout, is_header);
    let text = clip_cells(&row, slot.offset(), content_width);

    let style = if is_header {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    spans.push(Span::styled(text, style));
    Line::from(spans)
}

/// Lay the cells out at their column widths, before clipping
pub fn compose_row(cells: &[String], layout: &ColumnLayout, is_header: bool) -> String {
    let gap = " ".repeat(COLUMN_GAP as usize);
    let mut row = String::new();
    for col in 0..layout.column_count() {
        if col > 0 {
            row.push_str(&gap);
        }
        let width = layout.width(col).unwrap_or(0) as usize;
        let value = cells.get(col).map(String::as_str).unwrap_or_default();
        let right_align = !is_header && layout.is_numeric(col);
        row.push_str(&fit_cell(&single_line(value), width, right_align));
    }
    row
}

/// Pad or truncate `value` to exactly `width` cells
pub fn fit_cell(value: &str, width: usize, right_align: bool) -> String {
    let text = truncate_text(value, width);
    let padding = " ".repeat(width.saturating_sub(display_width(&text)));
    if right_align {
        padding + &text
    } else {
        text + &padding
    }
}

/// Cut `s` to at most `max_width` cells, marking the cut with `…`
pub fn truncate_text(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        s.to_string()
    } else if max_width <= 1 {
        take_width(s, max_width).0.to_string()
    } else {
        let mut result = take_width(s, max_width - 1).0.to_string();
        result.push('…');
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("exactly", 7), "exactly");
        assert_eq!(truncate_text("truncated", 5), "trun…");
        assert_eq!(truncate_text("ab", 1), "a");
        assert_eq!(truncate_text("ab", 0), "");
    }

    #[test]
    fn test_fit_cell_alignment() {
        assert_eq!(fit_cell("42", 5, true), "   42");
        assert_eq!(fit_cell("ok", 5, false), "ok   ");
        assert_eq!(fit_cell("overflowing", 5, false), "over…");
    }

    #[test]
    fn test_wide_glyphs_are_padded_by_cells() {
        assert_eq!(fit_cell("東京", 6, false), "東京  ");
        assert_eq!(fit_cell("東京", 6, true), "  東京");
        assert_eq!(truncate_text("東京都庁", 6), "東京…");
        assert_eq!(display_width(&truncate_text("東京都庁", 6)), 5);
        assert_eq!(fit_cell("東京都庁", 6, false), "東京… ");
    }

    #[test]
    fn test_compose_row_keeps_later_columns_aligned() {
        use crate::data::dataset::DatasetHandle;
        use crate::data::memory_store::MemoryStore;
        use crate::ui::viewport::{CellLabeler, LayoutSettings};
        use std::sync::Arc;

        let store = MemoryStore::new(["place", "city"]).with_rows([
            ["東京都庁", "Oslo"],
            ["ab\ncd", "Bergen"],
            ["plain", "Tromsø"],
        ]);
        let dataset = DatasetHandle::new(Arc::new(store));
        let layout =
            ColumnLayout::measure(&dataset, &CellLabeler::default(), &LayoutSettings::default());
        let city_start = layout.start(1).unwrap();

        for (cells, city) in [
            (["東京都庁", "Oslo"], "Oslo"),
            (["ab\ncd", "Bergen"], "Bergen"),
            (["plain", "Tromsø"], "Tromsø"),
        ] {
            let cells: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
            let row = compose_row(&cells, &layout, false);
            let (before, _) = row.split_at(row.find(city).unwrap());
            assert_eq!(display_width(before), city_start, "row {:?}", row);
            assert!(!row.contains('\n'));
        }
    }

    #[test]
    fn test_gutter_width() {
        assert_eq!(gutter_width(0, true), 2);
        assert_eq!(gutter_width(9, true), 2);
        assert_eq!(gutter_width(10, true), 3);
        assert_eq!(gutter_width(12_345, true), 6);
        assert_eq!(gutter_width(12_345, false), 0);
    }
}
