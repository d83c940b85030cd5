use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::App;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(width, height) => app.on_resize(width, height),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Started(outcome) => app.on_started(outcome),
        AppEvent::Replied(result) => app.on_replied(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => app.submit(),

        // Chat scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),

        // Input editing
        KeyCode::Backspace => {
            if app.cursor > 0 {
                app.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.cursor = (app.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.cursor = 0;
        }
        KeyCode::End => {
            app.cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.cursor);
            app.input.insert(byte_pos, c);
            app.cursor += 1;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use checkin_core::testing::{FakeTransport, RecordingDelay};
    use checkin_core::{
        ChatRole, ConnectionStatus, ConversationClient, RawResponse, RetryPolicy, APOLOGY,
        GREETING,
    };
    use serde_json::json;
    use tokio::sync::mpsc;

    fn setup() -> (App, Arc<FakeTransport>, mpsc::UnboundedReceiver<AppEvent>) {
        let transport = Arc::new(FakeTransport::new());
        let client = ConversationClient::new(
            transport.clone(),
            Arc::new(RecordingDelay::new()),
            RetryPolicy::default(),
        );
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(client, "http://test".to_string(), tx);
        (app, transport, rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    fn reply(text: &str, state: serde_json::Value) -> RawResponse {
        RawResponse::json(200, json!({"reply": text, "newState": state}).to_string())
    }

    #[tokio::test]
    async fn test_start_shows_greeting_then_server_reply() {
        let (mut app, transport, mut rx) = setup();
        transport.queue_response(reply("Hi from the server", json!({"turn_count": 0})));

        app.start();
        assert_eq!(app.log.len(), 1);
        assert_eq!(app.log.messages()[0].content, GREETING);

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event).unwrap();

        assert_eq!(app.log.last().unwrap().content, "Hi from the server");
        assert_eq!(app.client.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_enter_sends_and_clears_input() {
        let (mut app, transport, mut rx) = setup();
        transport.queue_response(reply(
            "Tell me more",
            json!({"turn_count": 1, "scores": {"anxiety": 1, "depression": 0, "stress": 0}}),
        ));

        type_text(&mut app, "I feel anxious");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
        assert!(app.is_waiting());
        assert_eq!(app.log.messages()[0].content, "I feel anxious");
        assert_eq!(app.log.messages()[0].role, ChatRole::User);

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event).unwrap();

        assert!(!app.is_waiting());
        assert_eq!(app.log.len(), 2);
        assert_eq!(app.log.messages()[1].content, "Tell me more");
        assert_eq!(app.client.current_state().turn_count(), Some(1));
    }

    #[tokio::test]
    async fn test_failed_send_shows_apology() {
        let (mut app, transport, mut rx) = setup();
        transport.queue_response(RawResponse::json(500, ""));

        type_text(&mut app, "hello");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event).unwrap();

        assert_eq!(app.log.last().unwrap().content, APOLOGY);
        assert_eq!(app.client.current_state().turn_count(), Some(0));
    }

    #[tokio::test]
    async fn test_blank_enter_does_nothing() {
        let (mut app, transport, _rx) = setup();

        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        assert!(app.log.is_empty());
        assert!(!app.is_waiting());
        assert_eq!(app.input, "   ");
        assert!(transport.recorded_requests().is_empty());
    }

    #[test]
    fn test_cursor_editing() {
        let (mut app, _transport, _rx) = setup();

        type_text(&mut app, "ac");
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        type_text(&mut app, "b");
        assert_eq!(app.input, "abc");

        handle_event(&mut app, key(KeyCode::Home)).unwrap();
        handle_event(&mut app, key(KeyCode::Delete)).unwrap();
        assert_eq!(app.input, "bc");

        handle_event(&mut app, key(KeyCode::End)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "b");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_editing_multibyte_input() {
        let (mut app, _transport, _rx) = setup();

        type_text(&mut app, "héllo");
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Left)).unwrap();
        handle_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.input, "hllo");
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _transport, _rx) = setup();
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(app.should_quit);

        let (mut app, _transport, _rx) = setup();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(ctrl_c)).unwrap();
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }
}
