use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use crate::viewer::{LoadPhase, ViewerSnapshot};

pub fn status_text(snapshot: &ViewerSnapshot, source_label: &str) -> String {
    let state = match &snapshot.phase {
        LoadPhase::Idle => "empty",
        LoadPhase::Loading { .. } => "loading",
        LoadPhase::Failed { .. } => "failed",
        LoadPhase::Loaded if snapshot.is_flipping => "turning",
        LoadPhase::Loaded => "ready",
    };
    let page = if snapshot.page_count == 0 {
        "-/-".to_string()
    } else {
        format!(
            "{}/{}",
            snapshot.current_page.saturating_add(1).min(snapshot.page_count),
            snapshot.page_count
        )
    };

    format!(
        "{source_label} | page {page} | zoom {:.2}x | {state}",
        snapshot.render.zoom
    )
}

pub fn draw_chrome(frame: &mut Frame<'_>, area: Rect, snapshot: &ViewerSnapshot, source_label: &str) {
    let style = match snapshot.phase {
        LoadPhase::Failed { .. } => Style::default().fg(Color::Red),
        _ => Style::default(),
    };
    frame.render_widget(
        Paragraph::new(status_text(snapshot, source_label)).style(style),
        area,
    );
}
