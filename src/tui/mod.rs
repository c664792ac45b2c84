pub mod render;

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::{Paragraph, Wrap};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

use crate::app::App;
use crate::aws::ConnectOptions;
use crate::protocol::{Dispatcher, Msg};

pub async fn run(app: &mut App, options: ConnectOptions) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = event_loop(&mut terminal, app, options).await;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    options: ConnectOptions,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(tx.clone(), options);
    let input = tokio::spawn(pump_input(tx));

    let size = terminal.size()?;
    app.update(Msg::Resize(size.height));
    dispatcher.dispatch(app.start(), app.client());

    loop {
        terminal.draw(|frame| draw(frame, app))?;

        let Some(msg) = rx.recv().await else {
            debug!("message channel closed");
            break;
        };
        if let Some(command) = app.update(msg) {
            dispatcher.dispatch(command, app.client());
        }
        if app.quit {
            break;
        }
    }

    input.abort();
    Ok(())
}

/// Forwards terminal events into the message channel until it closes.
async fn pump_input(tx: UnboundedSender<Msg>) {
    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        let msg = match event {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => Msg::Key(key),
            Ok(Event::Resize(_, height)) => Msg::Resize(height),
            Ok(_) => continue,
            Err(err) => {
                warn!(%err, "terminal input failed");
                break;
            }
        };
        if tx.send(msg).is_err() {
            break;
        }
    }
}

fn draw(frame: &mut ratatui::Frame, app: &App) {
    let lines = render::render(app);
    let mut para = Paragraph::new(lines);
    if app.status.is_some() {
        para = para.wrap(Wrap { trim: true });
    }
    frame.render_widget(para, frame.size());
}
