use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::layout::BookLayout;
use crate::viewport::ViewportSize;

pub const NAV_BUTTON_WIDTH: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub prev_button: Option<Rect>,
    pub book_area: Rect,
    pub next_button: Option<Rect>,
    /// Fitted page footprint inside `book_area`.
    pub page: Rect,
    pub status: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    PrevButton,
    NextButton,
    Page,
    Outside,
}

/// Splits the screen into book, optional side buttons and a status row, then
/// places the fitted page in the middle of the book area.
pub fn split_layout(
    area: Rect,
    show_nav_buttons: bool,
    book: BookLayout,
    cell_px: (u16, u16),
) -> UiLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let main = rows[0];

    let (prev_button, book_area, next_button) =
        if show_nav_buttons && main.width > NAV_BUTTON_WIDTH * 2 {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(NAV_BUTTON_WIDTH),
                    Constraint::Min(1),
                    Constraint::Length(NAV_BUTTON_WIDTH),
                ])
                .split(main);
            (Some(columns[0]), columns[1], Some(columns[2]))
        } else {
            (None, main, None)
        };

    let page = centered_rect(
        book_area,
        px_to_cells(book.width, cell_px.0),
        px_to_cells(book.height, cell_px.1),
    );

    UiLayout {
        prev_button,
        book_area,
        next_button,
        page,
        status: rows[1],
    }
}

pub fn hit_test(layout: &UiLayout, column: u16, row: u16) -> HitTarget {
    let contains = |rect: Rect| {
        column >= rect.x
            && column < rect.x.saturating_add(rect.width)
            && row >= rect.y
            && row < rect.y.saturating_add(rect.height)
    };

    if layout.prev_button.is_some_and(contains) {
        HitTarget::PrevButton
    } else if layout.next_button.is_some_and(contains) {
        HitTarget::NextButton
    } else if contains(layout.page) {
        HitTarget::Page
    } else {
        HitTarget::Outside
    }
}

/// Terminal area expressed in pixels for the viewport tracker.
pub fn viewport_px(columns: u16, rows: u16, cell_px: (u16, u16)) -> ViewportSize {
    ViewportSize::new(
        f32::from(columns) * f32::from(cell_px.0.max(1)),
        f32::from(rows) * f32::from(cell_px.1.max(1)),
    )
}

fn px_to_cells(px: f32, cell_px: u16) -> u16 {
    if !px.is_finite() || px <= 0.0 {
        return 1;
    }
    (px / f32::from(cell_px.max(1))).round().clamp(1.0, f32::from(u16::MAX)) as u16
}

pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.max(1).min(area.width);
    let height = height.max(1).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
