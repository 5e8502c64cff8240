use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.input_mode == InputMode::Editing {
                app.insert_str(&text);
            }
        }
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C quits from any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if app.is_generating() {
                app.cancel_generation();
            } else {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Result;
        }
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Delete => app.delete_char_forward(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Esc => {
            if app.is_generating() {
                app.cancel_generation();
            }
        }

        // Focus the prompt and start editing
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
            app.move_cursor_end();
        }

        KeyCode::Tab => match app.focus {
            FocusPane::Input => app.focus = FocusPane::Result,
            FocusPane::Result => {
                // Auto-enter editing mode when focusing input
                app.focus = FocusPane::Input;
                app.input_mode = InputMode::Editing;
                app.move_cursor_end();
            }
        },

        KeyCode::Enter => app.submit(),

        KeyCode::Char('c') => app.copy_result(),
        KeyCode::Char('s') => app.save_result(),

        // Result scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_result_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_result_up(1),
        KeyCode::PageDown => app.scroll_result_down(10),
        KeyCode::PageUp => app.scroll_result_up(10),
        KeyCode::Char('g') => app.scroll_result_top(),
        KeyCode::Char('G') => app.scroll_result_bottom(),

        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_result_up(3),
        MouseEventKind::ScrollDown => app.scroll_result_down(3),
        _ => {}
    }
}
