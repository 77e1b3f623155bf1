//! Interactive terminal viewer for one category's deck.
//!
//! Multiplexes key input with the local store's change notifications via
//! `tokio::select!`, so a card appended from another view (or another
//! process sharing the store through a remote read) shows up without
//! restarting the viewer.

use std::io::{self, Write};

use anyhow::{bail, Result};
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;

use crate::speech::Speech;
use crate::storage::Category;
use crate::sync::Catalog;
use crate::viewer::{self, ViewerState};

/// Run the viewer over one category until the user quits.
pub async fn run(
    catalog: &Catalog,
    category_id: &str,
    start_index: usize,
    speech: Box<dyn Speech>,
) -> Result<()> {
    let Some(category) = catalog.category(category_id).await else {
        bail!("Category '{}' not found", category_id);
    };

    enable_raw_mode()?;
    let result = view_loop(catalog, category, start_index, speech.as_ref()).await;
    disable_raw_mode()?;
    result
}

async fn view_loop(
    catalog: &Catalog,
    mut category: Category,
    start_index: usize,
    speech: &dyn Speech,
) -> Result<()> {
    let mut state = ViewerState::with_index(category.cards.len(), start_index);
    let mut changes = catalog.subscribe();
    let mut events = EventStream::new();

    draw(&category, &state);

    loop {
        tokio::select! {
            maybe_event = events.next() => {
                let Some(event) = maybe_event else { break };
                let Event::Key(key) = event? else { continue };
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Right | KeyCode::Char('n') => state.next(),
                    KeyCode::Left | KeyCode::Char('b') => state.previous(),
                    KeyCode::Char('r') => state.random(),
                    KeyCode::Char('p') => {
                        pronounce_current(&category, &state, speech);
                        continue;
                    }
                    KeyCode::Char('o') => {
                        open_current_image(&category, &state);
                        continue;
                    }
                    _ => continue,
                }
                draw(&category, &state);
            }

            change = changes.recv() => {
                match change {
                    // Lagged only means intermediate revisions were missed;
                    // the refresh below reads the latest state anyway.
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if let Some(updated) = catalog.category(&category.id).await {
                            category = updated;
                            state.set_total(category.cards.len());
                            draw(&category, &state);
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}

fn draw(category: &Category, state: &ViewerState) {
    if state.is_empty() {
        print!("{}: no cards yet   [q quit]\r\n", category.title);
    } else {
        let (pos, total) = state.counter();
        let card = &category.cards[state.index()];
        print!(
            "{} {}/{}: {}   [←/→ navigate · r random · p play · o image · q quit]\r\n",
            category.title, pos, total, card.label
        );
    }
    let _ = io::stdout().flush();
}

/// Speak the visible card. Unavailable speech is a message, not a crash.
fn pronounce_current(category: &Category, state: &ViewerState, speech: &dyn Speech) {
    if state.is_empty() {
        return;
    }
    let card = &category.cards[state.index()];
    if let Err(e) = viewer::pronounce(speech, card) {
        print!("Cannot play audio: {e}\r\n");
        let _ = io::stdout().flush();
    }
}

/// Hand the visible card's image to the platform opener.
fn open_current_image(category: &Category, state: &ViewerState) {
    if state.is_empty() {
        return;
    }
    let card = &category.cards[state.index()];
    if card.image_url.starts_with("data:") {
        print!("Inline image data cannot be opened externally\r\n");
    } else if let Err(e) = open::that(&card.image_url) {
        print!("Failed to open image: {e}\r\n");
    }
    let _ = io::stdout().flush();
}
