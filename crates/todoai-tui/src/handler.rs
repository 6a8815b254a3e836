use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::input::TextInput;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_generation().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Adding => handle_add_input(app, key),
        InputMode::Prompting => handle_prompt_input(app, key),
        InputMode::Editing => handle_edit_popup(app, key),
        InputMode::Settings => handle_settings_popup(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),

        // Reorder
        KeyCode::Char('J') => app.move_selected_down(),
        KeyCode::Char('K') => app.move_selected_up(),

        // Task actions
        KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => app.toggle_selected(),
        KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),

        // Inputs
        KeyCode::Char('a') | KeyCode::Char('i') => app.input_mode = InputMode::Adding,
        KeyCode::Char('p') | KeyCode::Char('/') => app.input_mode = InputMode::Prompting,
        KeyCode::Char('s') => app.open_settings(),

        KeyCode::Esc => app.status = None,

        _ => {}
    }
}

/// Cursor editing keys shared by every text input
fn edit_text(input: &mut TextInput, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Char(c) => input.insert(c),
        _ => {}
    }
}

fn handle_add_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_add(),
        KeyCode::Tab => app.input_mode = InputMode::Prompting,
        _ => edit_text(&mut app.add_input, key),
    }
}

fn handle_prompt_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            app.submit_prompt();
        }
        KeyCode::Tab => app.input_mode = InputMode::Adding,
        _ => edit_text(&mut app.prompt_input, key),
    }
}

fn handle_edit_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.commit_edit(),
        _ => edit_text(&mut app.edit_input, key),
    }
}

fn handle_settings_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.key_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.save_key(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_key(),
        _ => edit_text(&mut app.key_input, key),
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.input_mode != InputMode::Normal {
        return;
    }

    let in_list = app
        .list_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_list {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_prev(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoai_core::{CredentialStore, Credentials, MemoryStore};

    fn test_app() -> App {
        let store: Box<dyn CredentialStore + Send> = Box::new(MemoryStore::new());
        App::with_credentials(Credentials::with_default(store, None))
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_add_then_toggle_via_keys() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Walk dog");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Char(' '));

        let task = app.tasks.at(0).unwrap();
        assert_eq!(task.text, "Walk dog");
        assert!(task.completed);
    }

    #[test]
    fn test_typed_q_in_input_does_not_quit() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('p'));
        type_text(&mut app, "quiz");
        assert!(!app.should_quit);
        assert_eq!(app.prompt_input.value(), "quiz");
    }

    #[test]
    fn test_generate_input_keys() {
        for code in [KeyCode::Char('p'), KeyCode::Char('/')] {
            let mut app = test_app();
            press(&mut app, code);
            assert_eq!(app.input_mode, InputMode::Prompting);
        }

        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.input_mode, InputMode::Prompting);
    }

    #[test]
    fn test_g_and_shift_g_jump_to_ends() {
        let mut app = test_app();
        app.tasks.extend(["a", "b", "c"]);
        app.list_state.select(Some(1));

        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.list_state.selected(), Some(2));
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = test_app();
        app.input_mode = InputMode::Settings;
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_escape_cancels_edit() {
        let mut app = test_app();
        app.tasks.add("keep me");
        app.list_state.select(Some(0));

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.tasks.at(0).unwrap().text, "keep me");
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
