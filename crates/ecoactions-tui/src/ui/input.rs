//! Keyboard and mouse input handling for the TUI.
//!
//! Modal dialogs capture all keys while open. Esc and clicks outside a
//! dialog are delivered as backdrop clicks, so dismissal goes through the
//! same listener a pointer click would.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use ecoactions_core::view::ClickTarget;
use ecoactions_core::{ModalId, Section};

use crate::app::{App, AppState, LoginFocus, RegisterFocus};

use super::render;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.active_modal() {
        Some(ModalId::LOGIN) => return handle_login_input(app, key).await,
        Some(ModalId::REGISTER) => return handle_register_input(app, key).await,
        _ => {}
    }

    // Keys pressed between two dialogs belong to neither screen
    if app.is_switching_modal() {
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.navigate(Section::ALL[index]);
        }
        KeyCode::Right | KeyCode::Tab => app.next_section(),
        KeyCode::Left | KeyCode::BackTab => app.prev_section(),
        KeyCode::Char('l') if !app.is_logged_in() => app.open_login(),
        KeyCode::Char('r') if !app.is_logged_in() => app.open_register(),
        KeyCode::Char('o') if app.is_logged_in() => app.logout().await,
        KeyCode::Esc => app.controller.notifier().dismiss(),
        _ => {}
    }

    Ok(false)
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.dismiss_modal(ModalId::LOGIN),
        KeyCode::Char('r') if ctrl => app.switch_to_register(),
        KeyCode::Down | KeyCode::Tab => {
            app.login_form.focus = app.login_form.focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_form.focus = app.login_form.focus.prev();
        }
        KeyCode::Enter => match app.login_form.focus {
            LoginFocus::Email => app.login_form.focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                app.submit_login().await;
            }
        },
        KeyCode::Backspace => app.login_form.pop(),
        KeyCode::Char(c) if !ctrl => app.login_form.push(c),
        _ => {}
    }
    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.dismiss_modal(ModalId::REGISTER),
        KeyCode::Char('l') if ctrl => app.switch_to_login(),
        KeyCode::Down | KeyCode::Tab => {
            app.register_form.focus = app.register_form.focus.next();
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.register_form.focus = app.register_form.focus.prev();
        }
        KeyCode::Enter => match app.register_form.focus {
            RegisterFocus::Confirm | RegisterFocus::Button => {
                app.submit_register().await;
            }
            other => app.register_form.focus = other.next(),
        },
        KeyCode::Backspace => app.register_form.pop(),
        KeyCode::Char(c) if !ctrl => app.register_form.push(c),
        _ => {}
    }
    Ok(false)
}

/// Route a left click to the open dialog: inside hits the dialog content,
/// anywhere else hits its backdrop.
pub fn handle_mouse(app: &App, mouse: MouseEvent, screen: Rect) {
    if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
        return;
    }
    let Some(modal) = app.active_modal() else {
        return;
    };

    let dialog = render::modal_area(modal, screen);
    let target = if dialog.contains(Position::new(mouse.column, mouse.row)) {
        ClickTarget::Content
    } else {
        ClickTarget::Backdrop
    };
    app.click_modal(modal, target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoactions_core::{ApiClient, Config, MemoryStore};
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let backend = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
        App::from_parts(Config::default(), Arc::new(backend), Arc::new(MemoryStore::new()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test]
    async fn test_number_keys_switch_sections() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.snapshot().section, Section::Feed);
        handle_input(&mut app, key(KeyCode::Left)).await.unwrap();
        assert_eq!(app.snapshot().section, Section::Map);
    }

    #[tokio::test]
    async fn test_login_modal_captures_typing() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('l'))).await.unwrap();
        assert_eq!(app.active_modal(), Some(ModalId::LOGIN));

        for c in "q1".chars() {
            let quit = handle_input(&mut app, key(KeyCode::Char(c))).await.unwrap();
            assert!(!quit);
        }
        assert_eq!(app.login_form.email, "q1");
        assert_eq!(app.snapshot().section, Section::Home);

        handle_input(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.active_modal(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_r_switches_to_register() {
        let mut app = app();
        app.open_login();
        handle_input(&mut app, ctrl('r')).await.unwrap();
        assert_eq!(app.active_modal(), None);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(app.active_modal(), Some(ModalId::REGISTER));
        assert!(app.login_form.email.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_during_modal_switch_are_ignored() {
        let mut app = app();
        app.open_login();
        handle_input(&mut app, ctrl('r')).await.unwrap();

        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_ne!(app.state, AppState::Quitting);
        handle_input(&mut app, key(KeyCode::Char('l'))).await.unwrap();
        assert_eq!(app.active_modal(), None);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(app.controller.modals().open_modals(), vec![ModalId::REGISTER]);
    }

    #[tokio::test]
    async fn test_mouse_inside_dialog_keeps_it_open() {
        let mut app = app();
        app.open_login();
        let screen = Rect::new(0, 0, 100, 30);
        let dialog = render::modal_area(ModalId::LOGIN, screen);

        handle_mouse(&app, click(dialog.x + 1, dialog.y + 1), screen);
        assert_eq!(app.active_modal(), Some(ModalId::LOGIN));

        handle_mouse(&app, click(0, 0), screen);
        assert_eq!(app.active_modal(), None);
    }

    #[tokio::test]
    async fn test_quit_and_help() {
        let mut app = app();
        handle_input(&mut app, key(KeyCode::Char('?'))).await.unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);
        assert!(!handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
        assert_eq!(app.state, AppState::Normal);
        assert!(handle_input(&mut app, key(KeyCode::Char('q'))).await.unwrap());
    }
}
