use listsync::state::ListState;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, state: &ListState, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }
    let text = status_text(state);
    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn status_text(state: &ListState) -> Cow<'static, str> {
    if let Some(item) = state.active_drag_item() {
        Cow::Owned(format!(
            "Moving #{}: move cursor, Ctrl+G drop, Esc cancel",
            item.id
        ))
    } else if state.loading_more() {
        Cow::Borrowed("Loading more…")
    } else if state.loading_initial() && !state.items().is_empty() {
        Cow::Borrowed("Loading…")
    } else {
        Cow::Borrowed("[Tab]select [Ctrl+G]move [Ctrl+R]eload [Esc]clear [Ctrl+Q]uit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_shows_key_hints() {
        let state = ListState::new();
        assert!(status_text(&state).contains("[Tab]select"));
    }
}
