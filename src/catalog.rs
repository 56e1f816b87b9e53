//! The portfolio catalog: owner profile plus the ordered, immutable list of projects.
//!
//! A default portfolio is embedded from `portfolio.ron`. A user file (RON or JSON,
//! chosen by extension) replaces it wholesale; nothing is ever added or removed
//! after load.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Label of the synthetic tag that means "no tag narrowing".
pub const ALL_TAG: &str = "All";

/// A single video project in the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id: u32,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub year: i32,
  /// Missing tags are treated as an empty list.
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub thumbnail: String,
  #[serde(default, alias = "videoUrl")]
  pub video_url: String,
  /// Free-form display string such as `2:34`.
  #[serde(default)]
  pub duration: String,
  #[serde(default)]
  pub description: String,
}

/// An outbound link shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  pub label: String,
  pub url: String,
}

/// Who the portfolio belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
  pub owner: String,
  pub headline: String,
  pub tagline: String,
  pub email: String,
  pub resume: Option<String>,
  pub links: Vec<Link>,
}

/// On-disk shape of a portfolio file.
#[derive(Debug, Deserialize)]
struct Portfolio {
  #[serde(default)]
  profile: Profile,
  #[serde(default)]
  projects: Vec<Project>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
  profile: Profile,
  projects: Vec<Project>,
}

impl Catalog {
  /// Build a catalog, rejecting duplicate project ids.
  pub fn new(profile: Profile, projects: Vec<Project>) -> Result<Self> {
    let mut seen = HashSet::new();
    for project in &projects {
      if !seen.insert(project.id) {
        return Err(anyhow!("Duplicate project id {} ('{}')", project.id, project.title));
      }
    }
    Ok(Self { profile, projects })
  }

  /// The portfolio compiled into the binary.
  pub fn embedded() -> Result<Self> {
    Self::from_ron(include_str!("../portfolio.ron")).context("Embedded portfolio.ron is invalid")
  }

  pub fn from_ron(source: &str) -> Result<Self> {
    let portfolio: Portfolio = ron::from_str(source).context("Failed to parse portfolio RON")?;
    Self::new(portfolio.profile, portfolio.projects)
  }

  pub fn from_json(source: &str) -> Result<Self> {
    let portfolio: Portfolio = serde_json::from_str(source).context("Failed to parse portfolio JSON")?;
    Self::new(portfolio.profile, portfolio.projects)
  }

  /// Load a portfolio file. `.json` files are read as JSON, anything else as RON.
  pub fn load(path: &Path) -> Result<Self> {
    let content =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let parsed = if is_json { Self::from_json(&content) } else { Self::from_ron(&content) };
    let catalog = parsed.with_context(|| format!("Invalid catalog {}", path.display()))?;
    info!(path = %path.display(), projects = catalog.len(), "loaded catalog");
    Ok(catalog)
  }

  /// Load `path` if given, otherwise the embedded portfolio.
  pub fn load_or_embedded(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(p) => Self::load(p),
      None => {
        debug!("using embedded portfolio");
        Self::embedded()
      }
    }
  }

  pub fn profile(&self) -> &Profile {
    &self.profile
  }

  /// Every project, in catalog order.
  pub fn all_projects(&self) -> &[Project] {
    &self.projects
  }

  pub fn get(&self, id: u32) -> Option<&Project> {
    self.projects.iter().find(|p| p.id == id)
  }

  /// The lead project of the reel.
  pub fn featured(&self) -> Option<&Project> {
    self.projects.first()
  }

  pub fn len(&self) -> usize {
    self.projects.len()
  }

  pub fn is_empty(&self) -> bool {
    self.projects.is_empty()
  }

  /// `"All"` followed by every distinct tag in first-seen order.
  pub fn tag_vocabulary(&self) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = vec![ALL_TAG.to_string()];
    for tag in self.projects.iter().flat_map(|p| p.tags.iter()) {
      if seen.insert(tag.as_str()) {
        tags.push(tag.clone());
      }
    }
    tags
  }
}
