use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::layout::centered_rect;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
pub const SWIPE_HINT_TEXT: &str = "<  swipe to turn the page  >";

pub fn spinner_frame(elapsed_ms: u128) -> &'static str {
    SPINNER_FRAMES[(elapsed_ms / 120) as usize % SPINNER_FRAMES.len()]
}

pub fn draw_loading_overlay(frame: &mut Frame<'_>, area: Rect, elapsed_ms: u128) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let popup = centered_rect(area, area.width.min(30), area.height.min(3));
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let message = Paragraph::new(format!("{} Loading album", spinner_frame(elapsed_ms)))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White));
    frame.render_widget(message, inner);
}

pub fn draw_swipe_hint(frame: &mut Frame<'_>, page: Rect) {
    if page.width == 0 || page.height == 0 {
        return;
    }

    let width = (SWIPE_HINT_TEXT.len() as u16).min(page.width);
    let hint = Rect::new(
        page.x + page.width.saturating_sub(width) / 2,
        page.y + page.height.saturating_sub(1),
        width,
        1,
    );
    frame.render_widget(Clear, hint);
    frame.render_widget(
        Paragraph::new(SWIPE_HINT_TEXT)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(Color::White)),
        hint,
    );
}

pub fn draw_failure_overlay(frame: &mut Frame<'_>, area: Rect, message: &str) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let popup = centered_rect(area, area.width.min(48), area.height.min(6));
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title("Album unavailable")
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Red));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    frame.render_widget(
        Paragraph::new(message.to_string())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::White)),
        inner,
    );
}

pub fn draw_nav_button(frame: &mut Frame<'_>, area: Rect, label: &str, enabled: bool) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let row = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(
        Paragraph::new(label.to_string())
            .alignment(Alignment::Center)
            .style(style),
        row,
    );
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Rect;

    use super::{SWIPE_HINT_TEXT, draw_failure_overlay, draw_swipe_hint, spinner_frame};

    #[test]
    fn spinner_cycles_through_frames() {
        assert_eq!(spinner_frame(0), "|");
        assert_eq!(spinner_frame(130), "/");
        assert_eq!(spinner_frame(480), "|");
    }

    #[test]
    fn swipe_hint_is_drawn_on_last_page_row() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).expect("test terminal");
        terminal
            .draw(|frame| draw_swipe_hint(frame, Rect::new(0, 0, 40, 10)))
            .expect("draw should pass");

        let buffer = terminal.backend().buffer();
        let row: String = (0..40_u16)
            .map(|x| buffer[(x, 9)].symbol().to_string())
            .collect();
        assert!(row.contains(SWIPE_HINT_TEXT.trim()));
    }

    #[test]
    fn failure_overlay_survives_tiny_areas() {
        let mut terminal = Terminal::new(TestBackend::new(4, 2)).expect("test terminal");
        terminal
            .draw(|frame| draw_failure_overlay(frame, Rect::new(0, 0, 4, 2), "broken"))
            .expect("draw should pass");
    }
}
