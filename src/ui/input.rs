//! Keyboard input handling for the TUI.
//!
//! Keys are first classified into a [`Command`] (pure, testable), then the
//! command is applied to the controller. The table doubles as the drag
//! gesture source: `Ctrl+G` picks up the row under the cursor and drops it
//! onto whichever row the cursor is on at the second press.

use crossterm::event::{KeyCode, KeyModifiers};
use listsync::api::FetchGateway;
use listsync::controller::ListController;
use listsync::util::MAX_SEARCH_QUERY_LENGTH;

use super::loop_runner::Action;
use super::view::{CursorMove, ListView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    Reload,
    ClearSearch,
    Type(char),
    Backspace,
    Move(CursorMove),
    ToggleSelection,
    PickUpOrDrop,
    CancelDrag,
    DismissNotice,
    Ignore,
}

fn command_for_key(code: KeyCode, modifiers: KeyModifiers, dragging: bool) -> Command {
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('q') => Command::Quit,
            KeyCode::Char('r') => Command::Reload,
            KeyCode::Char('u') => Command::ClearSearch,
            KeyCode::Char('g') => Command::PickUpOrDrop,
            KeyCode::Char('n') => Command::DismissNotice,
            _ => Command::Ignore,
        };
    }

    match code {
        KeyCode::Esc if dragging => Command::CancelDrag,
        KeyCode::Esc => Command::ClearSearch,
        KeyCode::Up => Command::Move(CursorMove::Up),
        KeyCode::Down => Command::Move(CursorMove::Down),
        KeyCode::PageUp => Command::Move(CursorMove::PageUp),
        KeyCode::PageDown => Command::Move(CursorMove::PageDown),
        KeyCode::Home => Command::Move(CursorMove::Top),
        KeyCode::End => Command::Move(CursorMove::Bottom),
        KeyCode::Tab => Command::ToggleSelection,
        KeyCode::Backspace => Command::Backspace,
        KeyCode::Char(c) if !modifiers.contains(KeyModifiers::ALT) => Command::Type(c),
        _ => Command::Ignore,
    }
}

/// Apply one key press to the controller and view.
pub(super) fn handle_input<G: FetchGateway>(
    controller: &mut ListController<G>,
    view: &mut ListView,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Action {
    let dragging = controller.state().active_drag_item().is_some();
    let command = command_for_key(code, modifiers, dragging);
    let cursor_id = controller.state().items().get(view.cursor).map(|item| item.id);

    match command {
        Command::Quit => return Action::Quit,
        Command::Reload => {
            view.reset();
            controller.reload();
        }
        Command::ClearSearch => {
            if !controller.state().query().is_empty() || controller.search_pending() {
                view.reset();
                controller.clear_search();
            }
        }
        Command::Type(c) => {
            let mut query = controller.state().query().to_string();
            if query.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                tracing::debug!("Search query at maximum length, ignoring input");
                return Action::Continue;
            }
            query.push(c);
            view.reset();
            controller.on_search_input(query);
        }
        Command::Backspace => {
            let mut query = controller.state().query().to_string();
            if query.pop().is_none() {
                return Action::Continue;
            }
            view.reset();
            if query.is_empty() {
                controller.clear_search();
            } else {
                controller.on_search_input(query);
            }
        }
        Command::Move(movement) => {
            let len = controller.state().items().len();
            view.move_cursor(movement, len);
            controller.on_scroll(view.metrics(len));
        }
        Command::ToggleSelection => {
            if let Some(id) = cursor_id {
                controller.toggle_selection(id);
            }
        }
        Command::PickUpOrDrop => {
            let held = controller.state().active_drag_item().map(|item| item.id);
            match (held, cursor_id) {
                (Some(source), target) => {
                    controller.drag_end(Some(source), target);
                }
                (None, Some(id)) => controller.drag_start(id),
                (None, None) => {}
            }
        }
        Command::CancelDrag => controller.drag_cancel(),
        Command::DismissNotice => controller.dismiss_notice(),
        Command::Ignore => return Action::Continue,
    }
    view.needs_redraw = true;
    Action::Continue
}
