//! Browse criteria and selection as an immutable value.
//!
//! The UI never mutates these fields directly; it feeds a [`ViewEvent`] to [`reduce`]
//! and swaps in the returned state.

use crate::catalog::{ALL_TAG, Catalog, Project};
use crate::query;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
  /// Free-text search.
  pub query: String,
  /// Active tag; empty means `All`.
  pub active_tag: String,
  /// Id of the project open in the preview.
  pub selected: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
  QueryChanged(String),
  /// A tag button was pressed. Pressing `All` clears the tag.
  TagPressed(String),
  ProjectSelected(u32),
  SelectionCleared,
  Reset,
}

pub fn reduce(state: &ViewState, event: ViewEvent) -> ViewState {
  match event {
    ViewEvent::QueryChanged(query) => ViewState { query, ..state.clone() },
    ViewEvent::TagPressed(tag) => {
      let active_tag = if tag == ALL_TAG { String::new() } else { tag };
      ViewState { active_tag, ..state.clone() }
    }
    ViewEvent::ProjectSelected(id) => ViewState { selected: Some(id), ..state.clone() },
    ViewEvent::SelectionCleared => ViewState { selected: None, ..state.clone() },
    ViewEvent::Reset => ViewState::default(),
  }
}

impl ViewState {
  /// Whether `tag`'s button should render as pressed.
  pub fn is_tag_active(&self, tag: &str) -> bool {
    self.active_tag == tag || (tag == ALL_TAG && self.active_tag.is_empty())
  }

  /// The catalog narrowed by the current query and tag.
  pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Project> {
    query::filter(catalog.all_projects(), &self.query, &self.active_tag)
  }

  pub fn selected_project<'a>(&self, catalog: &'a Catalog) -> Option<&'a Project> {
    self.selected.and_then(|id| catalog.get(id))
  }
}
