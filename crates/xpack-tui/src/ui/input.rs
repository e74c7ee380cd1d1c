//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes and wizard interactions.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if app.wizard.is_open() {
        if matches!(app.state, AppState::Searching) {
            handle_search_input(app, key);
        } else {
            handle_wizard_input(app, key);
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('n') | KeyCode::Char('o') | KeyCode::Enter => app.open_wizard(),
        _ => {}
    }
    Ok(false)
}

/// Keys while the wizard overlay is open
fn handle_wizard_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.submit(),
            KeyCode::Char('f') => app.start_search(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.close_wizard(),
        KeyCode::Enter => app.enter(),
        KeyCode::Tab => app.cycle_focus(true),
        KeyCode::BackTab => app.cycle_focus(false),
        KeyCode::PageUp => app.back(),
        KeyCode::PageDown => app.forward(),
        KeyCode::Up => app.move_tile_cursor(false),
        KeyCode::Down => app.move_tile_cursor(true),
        KeyCode::Left => app.cycle_choice(false),
        KeyCode::Right => app.cycle_choice(true),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Char(' ') => app.toggle(),
        KeyCode::Char('/') if app.focused_field().is_none() => app.start_search(),
        KeyCode::Char(c) => app.type_char(c),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Down | KeyCode::Tab => app.end_search(),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use xpack_core::wizard::FOCUS_DELAY;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE)).expect("input handled")
    }

    fn settle(app: &mut App) {
        app.tick(Instant::now() + FOCUS_DELAY + Duration::from_millis(10));
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = App::new();
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')));
        assert_eq!(app.state, AppState::Normal);

        press(&mut app, KeyCode::Char('q'));
        assert!(press(&mut app, KeyCode::Char('y')));
    }

    #[test]
    fn test_q_is_typed_inside_the_wizard() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('n'));
        settle(&mut app);
        assert!(app.wizard.is_open());

        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.state, AppState::Normal);
        let name = app.focused_field().and_then(|f| app.wizard.field(f)).map(|f| f.value.clone());
        assert_eq!(name.as_deref(), Some("q"));
    }

    #[test]
    fn test_slash_searches_apartments() {
        let mut app = App::new();
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        for c in "Ana".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        settle(&mut app);
        assert_eq!(app.wizard.current_step(), 1);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.state, AppState::Searching);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.search_query, "c-");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.wizard.current_step(), 1);
    }

    #[test]
    fn test_escape_closes_overlay() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.wizard.is_open());
    }
}
