use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};
use crate::state::ViewEvent;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    match key.code {
      KeyCode::Char('c') => {
        app.should_quit = true;
        return Ok(());
      }
      KeyCode::Char('t') => {
        app.next_theme();
        return Ok(());
      }
      KeyCode::Char('r') => {
        app.dispatch(ViewEvent::Reset);
        app.cursor_position = 0;
        app.input_scroll = 0;
        app.tag_cursor = 0;
        return Ok(());
      }
      KeyCode::Char('s') => {
        if app.player.is_playing() {
          app.player.stop().await.context("Failed to stop playback")?;
        }
        return Ok(());
      }
      // Unbound chords never reach the query or list.
      _ => return Ok(()),
    }
  }

  if app.view.selected.is_some() {
    return handle_preview_key(app, key).await.context("Failed to handle preview key event");
  }

  if key.code == KeyCode::Tab {
    app.mode = app.mode.next();
    return Ok(());
  }

  match app.mode {
    AppMode::Search => handle_search_key(app, key),
    AppMode::Tags => handle_tags_key(app, key),
    AppMode::Browse => handle_browse_key(app, key).await.context("Failed to handle browse key event")?,
  }
  Ok(())
}

/// Edit the query as a copy and feed the result back through the reducer.
fn edit_query(app: &mut App, edit: impl FnOnce(&mut String, &mut usize)) {
  let mut query = app.view.query.clone();
  edit(&mut query, &mut app.cursor_position);
  if query != app.view.query {
    app.dispatch(ViewEvent::QueryChanged(query));
  }
}

pub(crate) fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Char(c) => edit_query(app, |q, cursor| {
      q.insert(char_to_byte_index(q, *cursor), c);
      *cursor += 1;
    }),
    KeyCode::Backspace => edit_query(app, |q, cursor| {
      if *cursor > 0 {
        *cursor -= 1;
        q.remove(char_to_byte_index(q, *cursor));
      }
    }),
    KeyCode::Delete => edit_query(app, |q, cursor| {
      if *cursor < q.chars().count() {
        q.remove(char_to_byte_index(q, *cursor));
      }
    }),
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.view.query.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.view.query.chars().count();
    }
    KeyCode::Enter | KeyCode::Down => {
      if !app.visible.is_empty() {
        app.mode = AppMode::Browse;
      }
    }
    KeyCode::Esc => {
      if !app.view.query.is_empty() {
        app.dispatch(ViewEvent::QueryChanged(String::new()));
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
}

pub(crate) fn handle_tags_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Left | KeyCode::Char('h') => app.move_tag_cursor(false),
    KeyCode::Right | KeyCode::Char('l') => app.move_tag_cursor(true),
    KeyCode::Enter | KeyCode::Char(' ') => app.press_tag(),
    KeyCode::Down | KeyCode::Char('j') => app.mode = AppMode::Browse,
    KeyCode::Esc => app.mode = AppMode::Search,
    _ => {}
  }
}

async fn handle_browse_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Enter => app.open_preview(),
    KeyCode::Char('p') => app.play().await?,
    KeyCode::Char('o') => app.open_source(),
    KeyCode::Char(' ') => toggle_pause(app).await,
    KeyCode::Char('/') => app.mode = AppMode::Search,
    KeyCode::Char('t') => app.mode = AppMode::Tags,
    KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
    KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
    KeyCode::Esc => app.mode = AppMode::Search,
    _ => {}
  }
  Ok(())
}

async fn handle_preview_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Enter | KeyCode::Char('p') => app.play().await?,
    KeyCode::Char('o') => app.open_source(),
    KeyCode::Char(' ') => toggle_pause(app).await,
    KeyCode::Esc | KeyCode::Char('q') => app.close_preview(),
    _ => {}
  }
  Ok(())
}

async fn toggle_pause(app: &mut App) {
  if app.player.is_playing()
    && let Err(e) = app.player.toggle_pause().await
  {
    app.set_error(format!("Pause error: {}", e));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::config::Config;
  use crate::state::ViewState;
  use ratatui::crossterm::event::KeyEvent;

  fn make_app() -> App {
    App::new(Catalog::embedded().unwrap(), Config::default(), ViewState::default())
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
      handle_search_key(app, key(KeyCode::Char(c)));
    }
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("promo", 0), 0);
    assert_eq!(char_to_byte_index("promo", 3), 3);
    assert_eq!(char_to_byte_index("promo", 5), 5);
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "a—é"; // a=1 byte, —=3 bytes, é=2 bytes
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 4);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- search ---

  #[test]
  fn typing_filters_live() {
    let mut app = make_app();
    type_str(&mut app, "bott");
    assert_eq!(app.view.query, "bott");
    assert_eq!(app.cursor_position, 4);
    assert_eq!(app.visible, vec![2]);
  }

  #[test]
  fn backspace_widens_again() {
    let mut app = make_app();
    type_str(&mut app, "zzz");
    assert!(app.visible.is_empty());
    for _ in 0..3 {
      handle_search_key(&mut app, key(KeyCode::Backspace));
    }
    assert!(app.view.query.is_empty());
    assert_eq!(app.visible.len(), 3);
  }

  #[test]
  fn insert_in_middle() {
    let mut app = make_app();
    type_str(&mut app, "wdding");
    app.cursor_position = 1;
    handle_search_key(&mut app, key(KeyCode::Char('e')));
    assert_eq!(app.view.query, "wedding");
    assert_eq!(app.visible, vec![3]);
  }

  #[test]
  fn esc_clears_then_quits() {
    let mut app = make_app();
    type_str(&mut app, "promo");
    handle_search_key(&mut app, key(KeyCode::Esc));
    assert!(app.view.query.is_empty());
    assert!(!app.should_quit);
    handle_search_key(&mut app, key(KeyCode::Esc));
    assert!(app.should_quit);
  }

  #[test]
  fn enter_moves_to_browse_only_with_results() {
    let mut app = make_app();
    type_str(&mut app, "zzz");
    handle_search_key(&mut app, key(KeyCode::Enter));
    assert_eq!(app.mode, AppMode::Search);
    app.dispatch(ViewEvent::QueryChanged(String::new()));
    handle_search_key(&mut app, key(KeyCode::Enter));
    assert_eq!(app.mode, AppMode::Browse);
  }

  // --- tags ---

  #[test]
  fn tag_bar_press() {
    let mut app = make_app();
    app.mode = AppMode::Tags;
    handle_tags_key(&mut app, key(KeyCode::Right));
    handle_tags_key(&mut app, key(KeyCode::Enter));
    assert_eq!(app.view.active_tag, "Cinematic");
    assert_eq!(app.visible, vec![1]);
  }

  // --- preview ---

  #[tokio::test]
  async fn browse_enter_opens_preview_and_esc_closes() {
    let mut app = make_app();
    app.mode = AppMode::Browse;
    handle_key_event(&mut app, key(KeyCode::Down)).await.unwrap();
    handle_key_event(&mut app, key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.view.selected, Some(2));
    handle_key_event(&mut app, key(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.mode, AppMode::Browse);
    handle_key_event(&mut app, key(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.view.selected, None);
  }

  #[tokio::test]
  async fn ctrl_r_resets_filters() {
    let mut app = make_app();
    type_str(&mut app, "promo");
    app.dispatch(ViewEvent::TagPressed("Promo".to_string()));
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL)).await.unwrap();
    assert_eq!(app.view, ViewState::default());
    assert_eq!(app.cursor_position, 0);
    assert_eq!(app.visible.len(), 3);
  }

  #[tokio::test]
  async fn unbound_ctrl_chord_is_ignored() {
    let mut app = make_app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL)).await.unwrap();
    assert!(app.view.query.is_empty());
    assert_eq!(app.cursor_position, 0);
    app.mode = AppMode::Browse;
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL)).await.unwrap();
    assert_eq!(app.list_state.selected(), Some(0));
  }

  #[tokio::test]
  async fn ctrl_c_quits() {
    let mut app = make_app();
    handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).await.unwrap();
    assert!(app.should_quit);
  }
}
