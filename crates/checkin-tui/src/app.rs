use checkin_core::{
    ChatResponse, ConversationClient, ExchangeError, MessageLog, StartOutcome,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::tui::AppEvent;
use crate::ui;

pub struct App {
    pub should_quit: bool,

    // Conversation
    pub client: ConversationClient,
    pub log: MessageLog,
    pub base_url: String,
    pub pending_replies: usize,

    // Input box
    pub input: String,
    pub cursor: usize, // cursor position in input, in chars

    // Chat pane
    pub scroll: u16,
    pub follow: bool, // Keep the newest entry in view
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    events: mpsc::UnboundedSender<AppEvent>,
    tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(
        client: ConversationClient,
        base_url: String,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            client,
            log: MessageLog::new(),
            base_url,
            pending_replies: 0,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            follow: true,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            events,
            tasks: Vec::new(),
        }
    }

    /// Show the greeting right away and fetch `/start` in the background.
    pub fn start(&mut self) {
        self.client.begin(&mut self.log);
        self.follow_tail();

        let fetcher = self.client.start_fetcher();
        let events = self.events.clone();
        self.spawn(async move {
            let outcome = fetcher.fetch().await;
            let _ = events.send(AppEvent::Started(outcome));
        });
    }

    /// Send whatever is in the input box. Blank input is left alone.
    pub fn submit(&mut self) {
        let Some(request) = self.client.prepare_send(&self.input, &mut self.log) else {
            return;
        };
        self.input.clear();
        self.cursor = 0;
        self.pending_replies += 1;
        self.follow_tail();

        let exchanger = self.client.exchanger();
        let events = self.events.clone();
        self.spawn(async move {
            let result = exchanger.exchange(&request).await;
            let _ = events.send(AppEvent::Replied(result));
        });
    }

    pub fn on_started(&mut self, outcome: StartOutcome) {
        self.client.apply_start(outcome, &mut self.log);
        self.follow_tail();
    }

    pub fn on_replied(&mut self, result: Result<ChatResponse, ExchangeError>) {
        self.pending_replies = self.pending_replies.saturating_sub(1);
        self.client.apply_reply(result, &mut self.log);
        self.follow_tail();
    }

    pub fn is_waiting(&self) -> bool {
        self.pending_replies > 0
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.scroll = self.scroll.saturating_add(lines).min(max);
        self.follow = self.scroll == max;
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }

    /// Terminal was resized: take the new chat pane size and re-anchor the scroll.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        let (chat_width, chat_height) = ui::chat_inner_size(width, height);
        self.chat_width = chat_width;
        self.chat_height = chat_height;
        self.settle_scroll();
    }

    /// Pin to the newest entry while following, otherwise keep the offset in range.
    pub fn settle_scroll(&mut self) {
        let max = self.max_scroll();
        self.scroll = if self.follow { max } else { self.scroll.min(max) };
    }

    /// Abort any request still in flight.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn wrap_width(&self) -> usize {
        // Default to 50 until the first render reports the real width
        if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        }
    }

    fn follow_tail(&mut self) {
        if self.log.take_follow_request() {
            self.follow = true;
            self.settle_scroll();
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    fn max_scroll(&self) -> u16 {
        let total = ui::chat_lines(self, self.wrap_width()).len();
        let hidden = total.saturating_sub(self.visible_height() as usize);
        u16::try_from(hidden).unwrap_or(u16::MAX)
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.tasks.retain(|t| !t.is_finished());
        debug!(in_flight = self.tasks.len(), "spawning request task");
        self.tasks.push(tokio::spawn(task));
    }
}
