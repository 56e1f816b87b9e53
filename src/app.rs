use anyhow::Result;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::catalog::{Catalog, Project};
use crate::config::Config;
use crate::constants::constants;
use crate::player::{self, NowPlaying, Player};
use crate::query::{self, Playback};
use crate::state::{ViewEvent, ViewState, reduce};
use crate::theme::{self, THEMES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Typing into the search box.
  Search,
  /// Moving through the project list.
  Browse,
  /// Moving across the tag bar.
  Tags,
}

impl AppMode {
  /// Tab order.
  pub fn next(self) -> Self {
    match self {
      AppMode::Search => AppMode::Tags,
      AppMode::Tags => AppMode::Browse,
      AppMode::Browse => AppMode::Search,
    }
  }
}

pub struct App {
  pub catalog: Catalog,
  pub view: ViewState,
  /// Tag vocabulary, `All` first.
  pub tags: Vec<String>,
  /// Ids of the projects currently passing the filter, in catalog order.
  pub visible: Vec<u32>,
  pub list_state: ListState,
  /// Highlighted entry in the tag bar.
  pub tag_cursor: usize,
  /// Cursor position within the search query (char index).
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  pub theme_index: usize,
  pub player: Player,
  pub last_error: Option<String>,
  /// Informational message, lower priority than errors.
  pub info_message: Option<String>,
  pub should_quit: bool,
  config: Config,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(catalog: Catalog, config: Config, view: ViewState) -> Self {
    let tags = catalog.tag_vocabulary();
    let tag_cursor = tags.iter().position(|t| view.is_tag_active(t)).unwrap_or(0);
    let cursor_position = view.query.chars().count();
    let player = Player::new(config.player_command());
    let theme_index = theme::index_of(config.theme_name.as_deref());

    let mut app = Self {
      catalog,
      view,
      tags,
      visible: Vec::new(),
      list_state: ListState::default(),
      tag_cursor,
      cursor_position,
      input_scroll: 0,
      mode: AppMode::Search,
      theme_index,
      player,
      last_error: None,
      info_message: None,
      should_quit: false,
      config,
      error_time: None,
    };
    app.recompute_visible();
    app
  }

  pub fn theme(&self) -> &'static theme::Theme {
    // Safety: theme_index comes from theme::index_of or modular arithmetic in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  /// Apply a view event and refresh whatever derives from it.
  pub fn dispatch(&mut self, event: ViewEvent) {
    debug!(?event, "view event");
    let refilter = matches!(event, ViewEvent::QueryChanged(_) | ViewEvent::TagPressed(_) | ViewEvent::Reset);
    self.view = reduce(&self.view, event);
    if refilter {
      self.recompute_visible();
    }
  }

  /// Rebuild `visible` from the view state and clamp the list selection to it.
  pub fn recompute_visible(&mut self) {
    self.visible = self.view.visible(&self.catalog).iter().map(|p| p.id).collect();
    if self.visible.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(self.visible.len() - 1)));
    }
  }

  pub fn visible_projects(&self) -> Vec<&Project> {
    self.visible.iter().filter_map(|id| self.catalog.get(*id)).collect()
  }

  /// Project under the list cursor.
  pub fn highlighted(&self) -> Option<&Project> {
    let idx = self.list_state.selected()?;
    self.visible.get(idx).and_then(|id| self.catalog.get(*id))
  }

  /// Project open in the preview modal.
  pub fn preview(&self) -> Option<&Project> {
    self.view.selected_project(&self.catalog)
  }

  pub fn move_selection(&mut self, forward: bool) {
    let count = self.visible.len();
    if count == 0 {
      return;
    }
    let i = match (self.list_state.selected(), forward) {
      (None, _) => 0,
      (Some(i), true) => (i + 1) % count,
      (Some(0), false) => count - 1,
      (Some(i), false) => i - 1,
    };
    self.list_state.select(Some(i));
  }

  pub fn move_tag_cursor(&mut self, forward: bool) {
    let count = self.tags.len();
    self.tag_cursor = if forward {
      (self.tag_cursor + 1) % count
    } else if self.tag_cursor == 0 {
      count - 1
    } else {
      self.tag_cursor - 1
    };
  }

  pub fn press_tag(&mut self) {
    if let Some(tag) = self.tags.get(self.tag_cursor).cloned() {
      self.dispatch(ViewEvent::TagPressed(tag));
    }
  }

  pub fn open_preview(&mut self) {
    if let Some(id) = self.highlighted().map(|p| p.id) {
      self.dispatch(ViewEvent::ProjectSelected(id));
    }
  }

  pub fn close_preview(&mut self) {
    self.dispatch(ViewEvent::SelectionCleared);
  }

  /// Project the open/play actions apply to: the preview if open, else the list cursor.
  fn target(&self) -> Option<&Project> {
    self.preview().or_else(|| self.highlighted())
  }

  /// Open the raw video link in a new browser context.
  pub fn open_source(&mut self) {
    let Some(url) = self.target().map(|p| p.video_url.clone()) else { return };
    if let Err(e) = player::open_external(&url) {
      self.set_error(format!("{:#}", e));
    }
  }

  /// Hand the target project to its playback surface.
  pub async fn play(&mut self) -> Result<()> {
    let Some(project) = self.target() else { return Ok(()) };
    let (id, title) = (project.id, project.title.clone());
    let playback = query::resolve(&project.video_url);
    self.clear_error();
    self.info_message = None;

    match playback {
      Playback::Native { address, mime } => {
        let now = NowPlaying { project_id: id, title, address, mime };
        if let Err(e) = self.player.play(now).await {
          self.set_error(format!("Playback error: {:#}", e));
          self.player.stop().await?;
        }
      }
      Playback::Embed { address } => match player::open_external(&address) {
        Ok(()) => {
          info!(project = id, %address, "opened embed player");
          self.info_message = Some(format!("Opened embed player for '{}'", title));
        }
        Err(e) => self.set_error(format!("{:#}", e)),
      },
      Playback::External { .. } => {
        debug!(project = id, url = playback.address(), "no inline playback");
        self.info_message = Some(constants().preview_unavailable.clone());
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::ALL_TAG;

  fn make_app() -> App {
    App::new(Catalog::embedded().unwrap(), Config::default(), ViewState::default())
  }

  // --- construction ---

  #[test]
  fn new_shows_whole_catalog() {
    let app = make_app();
    assert_eq!(app.visible, vec![1, 2, 3]);
    assert_eq!(app.list_state.selected(), Some(0));
    assert_eq!(app.tags[0], ALL_TAG);
    assert_eq!(app.tag_cursor, 0);
  }

  #[test]
  fn new_with_seeded_view() {
    let view = ViewState { query: "bottle".to_string(), active_tag: "Promo".to_string(), selected: None };
    let app = App::new(Catalog::embedded().unwrap(), Config::default(), view);
    assert_eq!(app.visible, vec![2]);
    assert_eq!(app.cursor_position, 6);
    assert_eq!(app.tags[app.tag_cursor], "Promo");
  }

  // --- filtering ---

  #[test]
  fn query_change_refilters_and_clamps_selection() {
    let mut app = make_app();
    app.list_state.select(Some(2));
    app.dispatch(ViewEvent::QueryChanged("promo".to_string()));
    assert_eq!(app.visible, vec![2]);
    assert_eq!(app.list_state.selected(), Some(0));
    assert_eq!(app.highlighted().map(|p| p.id), Some(2));
  }

  #[test]
  fn no_match_clears_selection() {
    let mut app = make_app();
    app.dispatch(ViewEvent::QueryChanged("zzz-no-match".to_string()));
    assert!(app.visible.is_empty());
    assert_eq!(app.list_state.selected(), None);
    assert!(app.highlighted().is_none());
  }

  #[test]
  fn press_tag_under_cursor() {
    let mut app = make_app();
    let wedding = app.tags.iter().position(|t| t == "Wedding").unwrap();
    app.tag_cursor = wedding;
    app.press_tag();
    assert_eq!(app.view.active_tag, "Wedding");
    assert_eq!(app.visible, vec![3]);
    app.tag_cursor = 0;
    app.press_tag();
    assert!(app.view.active_tag.is_empty());
    assert_eq!(app.visible.len(), 3);
  }

  // --- navigation ---

  #[test]
  fn move_selection_wraps() {
    let mut app = make_app();
    app.move_selection(false);
    assert_eq!(app.list_state.selected(), Some(2));
    app.move_selection(true);
    assert_eq!(app.list_state.selected(), Some(0));
  }

  #[test]
  fn move_tag_cursor_wraps() {
    let mut app = make_app();
    app.move_tag_cursor(false);
    assert_eq!(app.tag_cursor, app.tags.len() - 1);
    app.move_tag_cursor(true);
    assert_eq!(app.tag_cursor, 0);
  }

  #[test]
  fn mode_tab_order() {
    assert_eq!(AppMode::Search.next(), AppMode::Tags);
    assert_eq!(AppMode::Tags.next(), AppMode::Browse);
    assert_eq!(AppMode::Browse.next(), AppMode::Search);
  }

  // --- preview ---

  #[test]
  fn open_preview_maps_through_filter() {
    let mut app = make_app();
    app.dispatch(ViewEvent::TagPressed("Wedding".to_string()));
    app.open_preview();
    assert_eq!(app.preview().map(|p| p.id), Some(3));
    app.close_preview();
    assert!(app.preview().is_none());
  }

  #[test]
  fn refilter_keeps_open_preview() {
    let mut app = make_app();
    app.open_preview();
    app.dispatch(ViewEvent::QueryChanged("wedding".to_string()));
    assert_eq!(app.preview().map(|p| p.id), Some(1));
  }

  #[tokio::test]
  async fn play_unrecognized_link_explains_instead_of_playing() {
    let catalog = Catalog::from_ron("(projects: [(id: 5, title: \"Page\", video_url: \"https://host/page\")])").unwrap();
    let mut app = App::new(catalog, Config::default(), ViewState::default());
    app.open_preview();
    app.play().await.unwrap();
    assert!(!app.player.is_playing());
    assert_eq!(app.info_message.as_deref(), Some(constants().preview_unavailable.as_str()));
  }

  #[tokio::test]
  async fn play_with_missing_player_sets_error() {
    let catalog = Catalog::from_ron("(projects: [(id: 1, video_url: \"https://host/a.mp4\")])").unwrap();
    let config = Config { player_command: Some("reel-no-such-player".to_string()), ..Config::default() };
    let mut app = App::new(catalog, config, ViewState::default());
    app.play().await.unwrap();
    assert!(app.last_error.as_deref().is_some_and(|e| e.starts_with("Playback error")));
    assert!(!app.player.is_playing());
  }
}
