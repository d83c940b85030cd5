use std::sync::Arc;

use anyhow::Result;
use checkin_core::{Config, ConversationClient, HttpTransport, TokioDelay};
use tracing::info;

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = logging::init() {
        eprintln!("warning: file logging disabled: {err}");
    }

    let config = Config::load().unwrap_or_else(|_| Config::new());
    let base_url = config.resolve_base_url();
    info!(%base_url, "starting check-in client");

    let transport = HttpTransport::new(
        &base_url,
        config.request_timeout(),
        config.skip_tunnel_warning(),
    )?;
    let client = ConversationClient::new(
        Arc::new(transport),
        Arc::new(TokioDelay),
        config.retry_policy(),
    );

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let mut app = App::new(client, base_url, events.sender());
    app.start();

    let result = run(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}
