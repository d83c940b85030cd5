use checkin_core::{ChatRole, ConnectionStatus};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let [header_area, chat_area, input_area, footer_area] = main_layout(frame.area());

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(frame, footer_area);
}

/// Header, chat, input, footer
fn main_layout(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area)
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = app.client.status();
    let status_color = match status {
        ConnectionStatus::Connecting => Color::Yellow,
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Offline => Color::Red,
    };

    let mut spans = vec![
        Span::styled(" Check-in ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(format!("{} ", app.base_url), Style::default().fg(Color::White)),
        Span::styled(format!("[{}]", status.label()), Style::default().fg(status_color)),
    ];
    if let Some(turn) = app.client.current_state().turn_count() {
        spans.push(Span::styled(format!(" turn {}", turn), Style::default().fg(Color::Gray)));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Size of the chat pane's inner area for a terminal of the given size.
pub fn chat_inner_size(width: u16, height: u16) -> (u16, u16) {
    let [_, chat_area, _, _] = main_layout(Rect::new(0, 0, width, height));
    (chat_area.width.saturating_sub(2), chat_area.height.saturating_sub(2))
}

/// Wrap text to fit within a given width, breaking words that are longer
/// than the width on their own.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        // Split an overlong word into full-width pieces
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word_len = word.len();
        let word: String = word.into_iter().collect();

        if current_len == 0 {
            // First word on line
            current_line = word;
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            // Word fits on current line
            current_line.push(' ');
            current_line.push_str(&word);
            current_len += 1 + word_len;
        } else {
            // Word doesn't fit, start new line
            lines.push(std::mem::replace(&mut current_line, word));
            current_len = word_len;
        }
    }

    // Don't forget the last line
    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// The chat pane content, already wrapped to `width`. One entry per screen row,
/// so the scroll range is exactly `len() - height`.
pub fn chat_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.log.messages() {
        let (label, color) = match msg.role {
            ChatRole::User => ("You:", Color::Cyan),
            ChatRole::Bot => ("Bot:", Color::Yellow),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text_line in msg.content.lines() {
            lines.extend(wrap_text_to_width(text_line, width).into_iter().map(Line::from));
        }
        lines.push(Line::default());
    }

    if app.is_waiting() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Typing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);
    app.settle_scroll();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let lines = chat_lines(app, app.wrap_width());
    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message (Enter to send) ");

    // Keep the cursor visible by scrolling the input horizontally
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    let cursor_x = (app.cursor - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = Line::from(vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(hints).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handle_event;
    use crate::tui::AppEvent;
    use checkin_core::testing::{FakeTransport, RecordingDelay};
    use checkin_core::{ChatResponse, ConversationClient, ConversationState, RetryPolicy};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    const LONG_REPLY: &str = "aaaaaa bbbbbb cccccc dddddd eeeeee ffffff LASTWD";

    fn app() -> App {
        let client = ConversationClient::new(
            Arc::new(FakeTransport::new()),
            Arc::new(RecordingDelay::new()),
            RetryPolicy::default(),
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(client, "http://test".to_string(), tx)
    }

    fn bot_reply(app: &mut App, text: &str) {
        app.on_replied(Ok(ChatResponse {
            reply: text.to_string(),
            new_state: ConversationState::bootstrap(),
        }));
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrap_exact_width_is_one_line() {
        assert_eq!(wrap_text_to_width("abcde fghij", 11), vec!["abcde fghij"]);
        assert_eq!(wrap_text_to_width("abcde fghij", 10), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_wrap_splits_overlong_words() {
        assert_eq!(
            wrap_text_to_width("hi abcdefghijkl xy", 5),
            vec!["hi", "abcde", "fghij", "kl xy"]
        );
        assert_eq!(wrap_text_to_width("", 5), vec![""]);
    }

    #[test]
    fn test_newest_entry_visible_after_wrapping() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(12, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        bot_reply(&mut app, LONG_REPLY);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(screen_text(&terminal).contains("LASTWD"));
    }

    #[test]
    fn test_display_before_first_render_still_follows() {
        let mut app = app();
        bot_reply(&mut app, LONG_REPLY);

        let mut terminal = Terminal::new(TestBackend::new(12, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(screen_text(&terminal).contains("LASTWD"));
    }

    #[test]
    fn test_resize_reanchors_scroll() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        bot_reply(&mut app, LONG_REPLY);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert_eq!(app.scroll, 0);

        terminal.backend_mut().resize(12, 12);
        handle_event(&mut app, AppEvent::Resize(12, 12)).unwrap();
        assert_eq!(app.chat_width, 10);
        assert_eq!(app.chat_height, 5);
        assert_eq!(app.scroll, 4);

        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("LASTWD"));
    }

    #[test]
    fn test_scrolled_up_view_is_kept_until_new_entry() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(12, 12)).unwrap();
        bot_reply(&mut app, LONG_REPLY);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        app.scroll_up(4);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert_eq!(app.scroll, 0);
        assert!(!screen_text(&terminal).contains("LASTWD"));

        bot_reply(&mut app, "fresh");
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("fresh"));
    }
}
