use super::App;

use crossterm::event::{Event, EventStream};
use futures::{FutureExt, Stream, StreamExt};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::panic;

pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    terminal.clear()?;

    let mut events = EventStream::new();
    let outcome = drive(app, &mut events, |app| terminal.draw(|frame| app.render(frame)).map(|_| ())).await;

    app.vm.transport_turn(|transport| transport.cancel());

    terminal.show_cursor()?;
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;

    outcome
}

/// Wait on terminal events and transport updates until the app exits
///
/// Each wake-up handles everything already queued on the woken source before
/// redrawing once, so a burst of keys or tokens costs a single frame.
pub(super) async fn drive<S, F>(app: &mut App, events: &mut S, mut redraw: F) -> Result<()>
where
    S: Stream<Item = Result<Event>> + Unpin,
    F: FnMut(&App) -> Result<()>,
{
    redraw(app)?;

    while !app.should_exit {
        tokio::select! {
            maybe_event = events.next() => {
                let mut next = maybe_event;
                loop {
                    match next {
                        Some(Ok(event)) => app.handle_event(&event),
                        Some(Err(e)) => tracing::warn!(error = %e, "terminal read error"),
                        None => {
                            tracing::debug!("terminal event stream ended");
                            app.should_exit = true;
                            break;
                        }
                    }
                    if app.should_exit {
                        break;
                    }
                    match events.next().now_or_never() {
                        Some(pending) => next = pending,
                        None => break,
                    }
                }
            }
            maybe_update = app.updates.recv() => {
                match maybe_update {
                    Some(update) => {
                        app.handle_update(update);
                        while let Ok(update) = app.updates.try_recv() {
                            app.handle_update(update);
                        }
                    }
                    None => {
                        tracing::warn!("transport update channel closed");
                        app.should_exit = true;
                    }
                }
            }
        }

        redraw(app)?;
    }

    Ok(())
}
