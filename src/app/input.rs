use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::EngineConfig;
use crate::ui::{HitTarget, UiLayout, hit_test};
use crate::viewer::{NavDirection, ViewerInput};

const WHEEL_LINES: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InputAction {
    Viewer(ViewerInput),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PointerDown {
    column: u16,
    row: u16,
    at: Instant,
}

/// Turns terminal key and mouse events into viewer inputs. Tracks just enough
/// pointer history for double-clicks, drags and swipes.
pub(crate) struct InputMapper {
    double_click: Duration,
    swipe_distance_px: u16,
    cell_px: (u16, u16),
    last_click: Option<PointerDown>,
    drag_origin: Option<PointerDown>,
    drag_last: Option<(u16, u16)>,
}

impl InputMapper {
    pub(crate) fn new(config: &EngineConfig, cell_px: (u16, u16)) -> Self {
        Self {
            double_click: Duration::from_millis(config.double_click_ms),
            swipe_distance_px: config.swipe_distance_px,
            cell_px: (cell_px.0.max(1), cell_px.1.max(1)),
            last_click: None,
            drag_origin: None,
            drag_last: None,
        }
    }

    pub(crate) fn map(&mut self, event: &Event, layout: &UiLayout, now: Instant) -> Vec<InputAction> {
        match event {
            Event::Key(key) => map_key(*key).into_iter().collect(),
            Event::Mouse(mouse) => self.map_mouse(*mouse, layout, now),
            Event::Resize(columns, rows) => vec![InputAction::Viewer(ViewerInput::Resize {
                width: f32::from(*columns) * f32::from(self.cell_px.0),
                height: f32::from(*rows) * f32::from(self.cell_px.1),
            })],
            _ => Vec::new(),
        }
    }

    fn map_mouse(&mut self, mouse: MouseEvent, layout: &UiLayout, now: Instant) -> Vec<InputAction> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer_down(mouse.column, mouse.row, layout, now)
            }
            MouseEventKind::Drag(MouseButton::Left) => self.pointer_drag(mouse.column, mouse.row),
            MouseEventKind::Up(MouseButton::Left) => self.pointer_up(mouse.column),
            MouseEventKind::ScrollUp => vec![self.wheel(-1.0, mouse.modifiers)],
            MouseEventKind::ScrollDown => vec![self.wheel(1.0, mouse.modifiers)],
            _ => Vec::new(),
        }
    }

    fn pointer_down(
        &mut self,
        column: u16,
        row: u16,
        layout: &UiLayout,
        now: Instant,
    ) -> Vec<InputAction> {
        self.drag_origin = None;
        self.drag_last = None;

        match hit_test(layout, column, row) {
            HitTarget::PrevButton => vec![InputAction::Viewer(ViewerInput::Prev)],
            HitTarget::NextButton => vec![InputAction::Viewer(ViewerInput::Next)],
            HitTarget::Outside => Vec::new(),
            HitTarget::Page => {
                let down = PointerDown { column, row, at: now };
                let is_double = self.last_click.is_some_and(|last| {
                    last.column == column
                        && last.row == row
                        && now.saturating_duration_since(last.at) <= self.double_click
                });
                if is_double {
                    self.last_click = None;
                    return vec![InputAction::Viewer(ViewerInput::DoubleClick)];
                }
                self.last_click = Some(down);
                self.drag_origin = Some(down);
                self.drag_last = Some((column, row));
                Vec::new()
            }
        }
    }

    /// Dragging scrolls the zoomed page opposite to the pointer.
    fn pointer_drag(&mut self, column: u16, row: u16) -> Vec<InputAction> {
        let Some((last_column, last_row)) = self.drag_last else {
            return Vec::new();
        };
        self.drag_last = Some((column, row));
        let dx = (f32::from(last_column) - f32::from(column)) * f32::from(self.cell_px.0);
        let dy = (f32::from(last_row) - f32::from(row)) * f32::from(self.cell_px.1);
        if dx == 0.0 && dy == 0.0 {
            return Vec::new();
        }
        vec![InputAction::Viewer(ViewerInput::Pan { dx, dy })]
    }

    fn pointer_up(&mut self, column: u16) -> Vec<InputAction> {
        self.drag_last = None;
        let Some(origin) = self.drag_origin.take() else {
            return Vec::new();
        };
        let dx_px = (i32::from(column) - i32::from(origin.column)) * i32::from(self.cell_px.0);
        if dx_px.unsigned_abs() < u32::from(self.swipe_distance_px) {
            return Vec::new();
        }
        self.last_click = None;
        let direction = if dx_px < 0 {
            NavDirection::Forward
        } else {
            NavDirection::Backward
        };
        vec![InputAction::Viewer(ViewerInput::Swipe(direction))]
    }

    fn wheel(&self, notch: f32, modifiers: KeyModifiers) -> InputAction {
        let modifier = modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);
        let delta_y = if modifier {
            notch
        } else {
            notch * WHEEL_LINES * f32::from(self.cell_px.1)
        };
        InputAction::Viewer(ViewerInput::Wheel { delta_y, modifier })
    }
}

pub(crate) fn map_key(key: KeyEvent) -> Option<InputAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(InputAction::Quit),
            _ => None,
        };
    }

    let input = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(InputAction::Quit),
        KeyCode::Right
        | KeyCode::PageDown
        | KeyCode::Char(' ')
        | KeyCode::Char('j')
        | KeyCode::Char('l') => ViewerInput::Next,
        KeyCode::Left | KeyCode::PageUp | KeyCode::Char('k') | KeyCode::Char('h') => {
            ViewerInput::Prev
        }
        KeyCode::Char('+') | KeyCode::Char('=') => ViewerInput::ZoomIn,
        KeyCode::Char('-') => ViewerInput::ZoomOut,
        KeyCode::Char('0') => ViewerInput::ZoomReset,
        _ => return None,
    };
    Some(InputAction::Viewer(input))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use ratatui::layout::Rect;

    use super::{InputAction, InputMapper, map_key};
    use crate::config::EngineConfig;
    use crate::layout::BookLayout;
    use crate::ui::{UiLayout, split_layout};
    use crate::viewer::{NavDirection, ViewerInput};

    const CELL: (u16, u16) = (10, 20);

    fn layout() -> UiLayout {
        split_layout(
            Rect::new(0, 0, 192, 54),
            true,
            BookLayout {
                width: 620.0,
                height: 879.0,
                fit_scale: 1.0,
            },
            CELL,
        )
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn viewer(input: ViewerInput) -> Vec<InputAction> {
        vec![InputAction::Viewer(input)]
    }

    #[test]
    fn keys_map_to_navigation_zoom_and_quit() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(key(KeyCode::Right)), Some(InputAction::Viewer(ViewerInput::Next)));
        assert_eq!(map_key(key(KeyCode::Char('k'))), Some(InputAction::Viewer(ViewerInput::Prev)));
        assert_eq!(map_key(key(KeyCode::Char('+'))), Some(InputAction::Viewer(ViewerInput::ZoomIn)));
        assert_eq!(map_key(key(KeyCode::Char('0'))), Some(InputAction::Viewer(ViewerInput::ZoomReset)));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(InputAction::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputAction::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn clicks_on_side_buttons_navigate() {
        let mut mapper = InputMapper::new(&EngineConfig::default(), CELL);
        let now = Instant::now();
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Down(MouseButton::Left), 1, 20), &layout(), now),
            viewer(ViewerInput::Prev)
        );
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Down(MouseButton::Left), 190, 20), &layout(), now),
            viewer(ViewerInput::Next)
        );
    }

    #[test]
    fn double_click_within_window_resets_zoom() {
        let mut mapper = InputMapper::new(&EngineConfig::default(), CELL);
        let now = Instant::now();
        let down = mouse(MouseEventKind::Down(MouseButton::Left), 96, 20);
        assert!(mapper.map(&down, &layout(), now).is_empty());
        assert_eq!(
            mapper.map(&down, &layout(), now + Duration::from_millis(200)),
            viewer(ViewerInput::DoubleClick)
        );

        assert!(mapper.map(&down, &layout(), now + Duration::from_secs(2)).is_empty());
        assert!(mapper.map(&down, &layout(), now + Duration::from_secs(4)).is_empty());
    }

    #[test]
    fn horizontal_drag_past_swipe_distance_flips() {
        let mut mapper = InputMapper::new(&EngineConfig::default(), CELL);
        let now = Instant::now();
        mapper.map(&mouse(MouseEventKind::Down(MouseButton::Left), 100, 20), &layout(), now);
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Drag(MouseButton::Left), 96, 20), &layout(), now),
            viewer(ViewerInput::Pan { dx: 40.0, dy: 0.0 })
        );
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Up(MouseButton::Left), 96, 20), &layout(), now),
            viewer(ViewerInput::Swipe(NavDirection::Forward))
        );

        mapper.map(&mouse(MouseEventKind::Down(MouseButton::Left), 80, 30), &layout(), now);
        assert!(
            mapper
                .map(&mouse(MouseEventKind::Up(MouseButton::Left), 82, 30), &layout(), now)
                .is_empty()
        );
    }

    #[test]
    fn wheel_zooms_only_with_control() {
        let mut mapper = InputMapper::new(&EngineConfig::default(), CELL);
        let now = Instant::now();
        let zoom = Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 96,
            row: 20,
            modifiers: KeyModifiers::CONTROL,
        });
        assert_eq!(
            mapper.map(&zoom, &layout(), now),
            viewer(ViewerInput::Wheel {
                delta_y: -1.0,
                modifier: true
            })
        );
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::ScrollDown, 96, 20), &layout(), now),
            viewer(ViewerInput::Wheel {
                delta_y: 60.0,
                modifier: false
            })
        );
    }

    #[test]
    fn resize_is_reported_in_pixels() {
        let mut mapper = InputMapper::new(&EngineConfig::default(), CELL);
        assert_eq!(
            mapper.map(&Event::Resize(50, 40), &layout(), Instant::now()),
            viewer(ViewerInput::Resize {
                width: 500.0,
                height: 800.0
            })
        );
    }
}
