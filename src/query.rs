//! Catalog filtering and video-link classification.
//!
//! Everything here is a pure function over borrowed data. Classification works on the
//! raw URL text (no parsing or normalization) and is total: any string maps to some
//! [`VideoSource`], falling back to [`VideoSource::Unrecognized`].

use tracing::debug;

use crate::catalog::{ALL_TAG, Project};
use crate::constants::constants;

// --- Filtering ---

/// Case-insensitive substring match against title or description.
/// Blank (empty or whitespace-only) text matches everything.
pub fn matches_text(project: &Project, text: &str) -> bool {
  if text.trim().is_empty() {
    return true;
  }
  let needle = text.to_lowercase();
  project.title.to_lowercase().contains(&needle) || project.description.to_lowercase().contains(&needle)
}

/// Exact, case-sensitive tag membership. An empty tag (or the `All` label) matches everything.
pub fn matches_tag(project: &Project, tag: &str) -> bool {
  tag.is_empty() || tag == ALL_TAG || project.tags.iter().any(|t| t == tag)
}

/// Projects matching both `text` and `tag`, in catalog order.
pub fn filter<'a>(projects: &'a [Project], text: &str, tag: &str) -> Vec<&'a Project> {
  let result: Vec<&Project> =
    projects.iter().filter(|p| matches_text(p, text) && matches_tag(p, tag)).collect();
  debug!(text, tag, matched = result.len(), total = projects.len(), "filtered catalog");
  result
}

// --- Classification ---

/// How a video link can be played back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSource {
  YouTube,
  Vimeo,
  /// A plain `.mp4` file.
  DirectFile,
  Unrecognized,
}

impl VideoSource {
  pub fn label(self) -> &'static str {
    match self {
      VideoSource::YouTube => "YouTube",
      VideoSource::Vimeo => "Vimeo",
      VideoSource::DirectFile => "MP4",
      VideoSource::Unrecognized => "External link",
    }
  }
}

/// `.mp4` (any case) followed by end of text or a `?` query string.
fn is_mp4(url: &str) -> bool {
  let lower = url.to_ascii_lowercase();
  lower.match_indices(".mp4").any(|(i, m)| matches!(lower[i + m.len()..].chars().next(), None | Some('?')))
}

/// Classify a video link. The checks run in a fixed order and the first hit wins,
/// so `https://youtube.com/x.mp4` is YouTube, not a direct file.
pub fn classify(url: &str) -> VideoSource {
  if url.contains("youtube") || url.contains("youtu.be") {
    VideoSource::YouTube
  } else if url.contains("vimeo") {
    VideoSource::Vimeo
  } else if is_mp4(url) {
    VideoSource::DirectFile
  } else {
    VideoSource::Unrecognized
  }
}

// --- Playback addresses ---

/// Where and how a selected project should be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playback {
  /// Embeddable player page (YouTube / Vimeo).
  Embed { address: String },
  /// Native media playback of a file with a known MIME type.
  Native { address: String, mime: String },
  /// No inline playback; the raw link can only be opened elsewhere.
  External { url: String },
}

impl Playback {
  /// The address handed to a playback surface or opener.
  pub fn address(&self) -> &str {
    match self {
      Playback::Embed { address } | Playback::Native { address, .. } => address,
      Playback::External { url } => url,
    }
  }

  pub fn is_inline(&self) -> bool {
    !matches!(self, Playback::External { .. })
  }
}

/// Rewrite the first `watch?v=` to `embed/`. Links without it pass through unchanged.
pub fn youtube_embed_url(url: &str) -> String {
  url.replacen("watch?v=", "embed/", 1)
}

/// Rewrite the first `vimeo.com/<digits>` to `player.vimeo.com/video/<digits>`.
/// Only the digit run directly after `vimeo.com/` is captured; anything else passes through.
pub fn vimeo_player_url(url: &str) -> String {
  const HOST: &str = "vimeo.com/";
  for (start, _) in url.match_indices(HOST) {
    let rest = &url[start + HOST.len()..];
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
      let id = &rest[..digits];
      return format!("{}player.vimeo.com/video/{}{}", &url[..start], id, &rest[digits..]);
    }
  }
  url.to_string()
}

/// Classify `url` and derive the address for its playback surface.
pub fn resolve(url: &str) -> Playback {
  let source = classify(url);
  let playback = match source {
    VideoSource::YouTube => Playback::Embed { address: youtube_embed_url(url) },
    VideoSource::Vimeo => Playback::Embed { address: vimeo_player_url(url) },
    VideoSource::DirectFile => {
      Playback::Native { address: url.to_string(), mime: constants().native_mime.clone() }
    }
    VideoSource::Unrecognized => Playback::External { url: url.to_string() },
  };
  if matches!(playback, Playback::Embed { ref address } if address == url) {
    debug!(url, "embed address left unchanged");
  }
  debug!(url, source = source.label(), "resolved playback");
  playback
}

#[cfg(test)]
mod tests {
  use super::*;

  fn make_project(id: u32, title: &str, description: &str, tags: &[&str]) -> Project {
    Project {
      id,
      title: title.to_string(),
      year: 2024,
      tags: tags.iter().map(|t| t.to_string()).collect(),
      thumbnail: String::new(),
      video_url: String::new(),
      duration: "0:30".to_string(),
      description: description.to_string(),
    }
  }

  fn sample() -> Vec<Project> {
    vec![
      make_project(1, "Cinematic Short — City Lights", "Night-time cityscapes", &["Cinematic"]),
      make_project(2, "Product Promo — Smart Bottle", "Fast cuts and kinetic typography", &["Promo"]),
      make_project(3, "Wedding Highlight", "Emotional pacing", &["Wedding"]),
    ]
  }

  fn ids(projects: &[&Project]) -> Vec<u32> {
    projects.iter().map(|p| p.id).collect()
  }

  // --- filter ---

  #[test]
  fn filter_blank_returns_everything_in_order() {
    let catalog = sample();
    assert_eq!(ids(&filter(&catalog, "", "")), vec![1, 2, 3]);
    assert_eq!(ids(&filter(&catalog, "   ", "")), vec![1, 2, 3]);
  }

  #[test]
  fn filter_own_title_is_included() {
    for project in sample() {
      let single = vec![project.clone()];
      assert_eq!(ids(&filter(&single, &project.title, "")), vec![project.id]);
      assert_eq!(ids(&filter(&single, &project.title.to_uppercase(), "")), vec![project.id]);
    }
  }

  #[test]
  fn filter_matches_description_case_insensitively() {
    let catalog = sample();
    assert_eq!(ids(&filter(&catalog, "KINETIC", "")), vec![2]);
    assert_eq!(ids(&filter(&catalog, "city", "")), vec![1]);
  }

  #[test]
  fn filter_by_tag_scenario() {
    let catalog = sample();
    assert_eq!(ids(&filter(&catalog, "", "Promo")), vec![2]);
  }

  #[test]
  fn filter_tag_is_case_sensitive() {
    let catalog = sample();
    assert!(filter(&catalog, "", "promo").is_empty());
  }

  #[test]
  fn filter_all_label_means_no_tag() {
    let catalog = sample();
    assert_eq!(ids(&filter(&catalog, "", ALL_TAG)), vec![1, 2, 3]);
  }

  #[test]
  fn filter_text_and_tag_combine() {
    let catalog = sample();
    assert_eq!(ids(&filter(&catalog, "wedding", "Wedding")), vec![3]);
    assert!(filter(&catalog, "wedding", "Promo").is_empty());
  }

  #[test]
  fn filter_no_match_is_empty() {
    let catalog = sample();
    assert!(filter(&catalog, "zzz-no-match", "").is_empty());
  }

  #[test]
  fn filter_is_idempotent() {
    let catalog = sample();
    for (text, tag) in [("", ""), ("o", ""), ("", "Promo"), ("e", "Wedding"), ("zzz", "")] {
      let once: Vec<Project> = filter(&catalog, text, tag).into_iter().cloned().collect();
      let twice = filter(&once, text, tag);
      assert_eq!(ids(&twice), once.iter().map(|p| p.id).collect::<Vec<_>>());
    }
  }

  #[test]
  fn filter_project_without_tags() {
    let catalog = vec![make_project(9, "Untagged", "", &[])];
    assert_eq!(ids(&filter(&catalog, "", "")), vec![9]);
    assert!(filter(&catalog, "", "Promo").is_empty());
  }

  // --- classify ---

  #[test]
  fn classify_youtube() {
    assert_eq!(classify("https://www.youtube.com/watch?v=abc123"), VideoSource::YouTube);
    assert_eq!(classify("https://youtu.be/abc123"), VideoSource::YouTube);
  }

  #[test]
  fn classify_vimeo() {
    assert_eq!(classify("https://vimeo.com/76979871"), VideoSource::Vimeo);
  }

  #[test]
  fn classify_direct_file() {
    assert_eq!(classify("https://host/video.mp4?token=xyz"), VideoSource::DirectFile);
    assert_eq!(classify("https://host/video.mp4"), VideoSource::DirectFile);
    assert_eq!(classify("https://host/VIDEO.MP4"), VideoSource::DirectFile);
  }

  #[test]
  fn classify_unrecognized() {
    assert_eq!(classify("https://host/page"), VideoSource::Unrecognized);
    assert_eq!(classify("https://host/video.mp4v"), VideoSource::Unrecognized);
    assert_eq!(classify(""), VideoSource::Unrecognized);
  }

  #[test]
  fn classify_is_case_sensitive_for_hosts() {
    assert_eq!(classify("https://www.YOUTUBE.com/watch?v=abc"), VideoSource::Unrecognized);
  }

  #[test]
  fn classify_priority_order() {
    assert_eq!(classify("https://youtube.com/vimeo/clip.mp4"), VideoSource::YouTube);
    assert_eq!(classify("https://vimeo.com/files/clip.mp4"), VideoSource::Vimeo);
  }

  // --- addresses ---

  #[test]
  fn youtube_watch_url_becomes_embed() {
    assert_eq!(
      resolve("https://www.youtube.com/watch?v=abc123"),
      Playback::Embed { address: "https://www.youtube.com/embed/abc123".to_string() }
    );
  }

  #[test]
  fn youtube_short_link_passes_through() {
    assert_eq!(youtube_embed_url("https://youtu.be/abc123"), "https://youtu.be/abc123");
  }

  #[test]
  fn vimeo_url_becomes_player_url() {
    assert_eq!(
      resolve("https://vimeo.com/76979871"),
      Playback::Embed { address: "https://player.vimeo.com/video/76979871".to_string() }
    );
  }

  #[test]
  fn vimeo_captures_first_digit_run_only() {
    assert_eq!(vimeo_player_url("https://vimeo.com/123/456"), "https://player.vimeo.com/video/123/456");
    assert_eq!(vimeo_player_url("https://vimeo.com/channels/staff"), "https://vimeo.com/channels/staff");
  }

  #[test]
  fn direct_file_keeps_address_with_mime() {
    let url = "https://host/video.mp4?token=xyz";
    assert_eq!(resolve(url), Playback::Native { address: url.to_string(), mime: "video/mp4".to_string() });
  }

  #[test]
  fn unrecognized_is_external() {
    let playback = resolve("https://host/page");
    assert_eq!(playback, Playback::External { url: "https://host/page".to_string() });
    assert!(!playback.is_inline());
    assert_eq!(playback.address(), "https://host/page");
  }
}
