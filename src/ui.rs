use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode};
use crate::catalog::{Profile, Project};
use crate::constants::constants;
use crate::query::{self, Playback};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// `2024 • 2:34 • Cinematic · Short`, skipping empty parts.
fn meta_line(project: &Project, tag_sep: &str) -> String {
  let mut parts = vec![project.year.to_string()];
  if !project.duration.is_empty() {
    parts.push(project.duration.clone());
  }
  if !project.tags.is_empty() {
    parts.push(project.tags.join(tag_sep));
  }
  parts.join(" • ")
}

/// ` · Contact … · CV … · Instagram YouTube`, from whatever the profile provides.
fn contact_line(profile: &Profile) -> String {
  let mut out = String::new();
  if !profile.email.is_empty() {
    out.push_str(&format!(" · Contact {}", profile.email));
  }
  if let Some(resume) = &profile.resume {
    out.push_str(&format!(" · CV {}", resume));
  }
  if !profile.links.is_empty() {
    let labels: Vec<&str> = profile.links.iter().map(|l| l.label.as_str()).collect();
    out.push_str(&format!(" · {}", labels.join(" ")));
  }
  out
}

fn rounded_block<'a>(border: Color) -> Block<'a> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, tags_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_tags(frame, app, tags_area);
  render_projects(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);

  if app.preview().is_some() {
    render_preview(frame, app);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let profile = app.catalog.profile();
  let mut spans = vec![Span::styled(" ▶ reel ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))];
  if !profile.owner.is_empty() {
    let who = if profile.headline.is_empty() {
      profile.owner.clone()
    } else {
      format!("{} — {}", profile.owner, profile.headline)
    };
    spans.push(Span::styled(who, Style::default().fg(theme.fg)));
  }
  if !profile.tagline.is_empty() {
    spans.push(Span::styled(format!("  {}", profile.tagline), Style::default().fg(theme.muted)));
  }
  frame.render_widget(Line::from(spans), area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let width = (version.len() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width - width, width, ..area };
  frame.render_widget(right, right_area);
}

fn render_tags(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let focused = app.mode == AppMode::Tags;
  let mut spans = vec![Span::raw(" ")];
  for (i, tag) in app.tags.iter().enumerate() {
    let mut style = if app.view.is_tag_active(tag) {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    if focused && i == app.tag_cursor {
      style = style.add_modifier(Modifier::UNDERLINED);
    }
    spans.push(Span::styled(format!(" {} ", tag), style));
    spans.push(Span::raw(" "));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_projects(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Browse { theme.accent } else { theme.border };
  let count = app.visible.len();
  let title = format!(" Projects — {} of {} ", count, app.catalog.len());
  let mut block = rounded_block(border_color)
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD));
  if let Some(featured) = app.catalog.featured() {
    block = block.title_bottom(Line::from(Span::styled(
      format!(" ★ Featured: {} ", featured.title),
      Style::default().fg(theme.muted),
    )));
  }

  if count == 0 {
    let message = if app.catalog.is_empty() { "The catalog is empty." } else { "No projects found." };
    let text = vec![Line::from(""), Line::from(Span::styled(message, Style::default().fg(theme.muted)))];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
    return;
  }

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;
  let selected = app.list_state.selected();

  let items: Vec<ListItem> = app
    .visible_projects()
    .into_iter()
    .enumerate()
    .map(|(i, project)| {
      let is_selected = Some(i) == selected;
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let right = meta_line(project, " · ");
      let right_w = right.chars().count();
      let title = truncate_str(&project.title, inner_w.saturating_sub(right_w + 2));
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);
      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(truncate_str(&right, inner_w), Style::default().fg(theme.muted)),
      ]);
      let description = Line::from(Span::styled(
        format!("  {}", truncate_str(&project.description, inner_w.saturating_sub(2))),
        Style::default().fg(theme.muted),
      ));
      ListItem::new(vec![line, description]).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(status) = app.player.last_status() {
    (format!(" ♪ {}", status), Style::default().fg(theme.status))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ {}", info), Style::default().fg(theme.status))
  } else {
    (format!(" Ready{}", contact_line(app.catalog.profile())), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Search { theme.accent } else { theme.border };
  let input_block = rounded_block(border_color)
    .title(" Search projects, e.g. 'wedding' or 'promo' ")
    .title_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.view.query, app.cursor_position);

  if inner_w == 0 {
    app.input_scroll = 0;
  } else if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .view
    .query
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  // No room to show a cursor inside the borders.
  if inner_w > 0 && app.mode == AppMode::Search && app.preview().is_none() {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = if let Some(project) = app.preview() {
    let mut k = if query::resolve(&project.video_url).is_inline() {
      vec![("Enter", "Play"), ("o", "Open source")]
    } else {
      vec![("o", "Open in browser")]
    };
    if is_playing {
      k.push(("Space", if app.player.paused { "Resume" } else { "Pause" }));
      k.push(("^s", "Stop"));
    }
    k.push(("Esc", "Close"));
    k
  } else {
    let mut k = match app.mode {
      AppMode::Search => vec![("Enter", "Browse"), ("Tab", "Tags"), ("Esc", "Clear/Quit")],
      AppMode::Tags => vec![("h/l", "Move"), ("Enter", "Filter"), ("Tab", "Projects")],
      AppMode::Browse => vec![("Enter", "Preview"), ("p", "Play"), ("o", "Open source"), ("j/k", "Navigate")],
    };
    if is_playing {
      k.push(("^s", "Stop"));
    }
    k.push(("^t", "Theme"));
    k
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let width = (theme_label.len() as u16).min(area.width);
  let right_area = Rect { x: area.x + area.width - width, width, ..area };
  frame.render_widget(right, right_area);
}

/// Lines describing how the project will be played.
fn playback_lines<'a>(project: &Project, theme: &Theme) -> Vec<Line<'a>> {
  let source = query::classify(&project.video_url);
  let playback = query::resolve(&project.video_url);
  let label = Style::default().fg(theme.muted);
  let value = Style::default().fg(theme.fg);
  match playback {
    Playback::Embed { address } => vec![
      Line::from(vec![Span::styled("Player    ", label), Span::styled(format!("{} embed", source.label()), value)]),
      Line::from(vec![
        Span::styled("Address   ", label),
        Span::styled(address, Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED)),
      ]),
    ],
    Playback::Native { address, mime } => vec![
      Line::from(vec![Span::styled("Player    ", label), Span::styled(format!("native ({})", mime), value)]),
      Line::from(vec![
        Span::styled("Address   ", label),
        Span::styled(address, Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED)),
      ]),
    ],
    Playback::External { url } => vec![
      Line::from(Span::styled(constants().preview_unavailable.clone(), Style::default().fg(theme.error))),
      Line::from(vec![
        Span::styled("Link      ", label),
        Span::styled(url, Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED)),
      ]),
    ],
  }
}

fn render_preview(frame: &mut Frame, app: &App) {
  let theme = app.theme();
  let Some(project) = app.preview() else { return };

  let [area] = Layout::horizontal([Constraint::Percentage(80)]).flex(Flex::Center).areas(frame.area());
  let [area] = Layout::vertical([Constraint::Percentage(70)]).flex(Flex::Center).areas(area);
  frame.render_widget(Clear, area);

  let block = rounded_block(theme.accent)
    .title(Line::from(Span::styled(
      format!(" {} ", project.title),
      Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
    )))
    .padding(Padding::horizontal(1))
    .style(Style::default().bg(theme.bg));

  let mut lines =
    vec![Line::from(Span::styled(meta_line(project, ", "), Style::default().fg(theme.muted))), Line::from("")];
  lines.extend(playback_lines(project, theme));
  if let Some(now) = &app.player.current
    && now.project_id == project.id
  {
    let state = if app.player.paused { "paused" } else { "playing" };
    lines.push(Line::from(Span::styled(format!("Now {}", state), Style::default().fg(theme.status))));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(project.description.clone(), Style::default().fg(theme.fg))));
  if !project.thumbnail.is_empty() {
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
      Span::styled("Thumbnail ", Style::default().fg(theme.muted)),
      Span::styled(project.thumbnail.clone(), Style::default().fg(theme.muted)),
    ]));
  }

  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
  frame.render_widget(paragraph, area);
}
