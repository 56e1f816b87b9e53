use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  /// Alternate row background.
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Studio",
    bg: Color::Rgb(24, 24, 27),
    fg: Color::Rgb(228, 228, 231),
    accent: Color::Rgb(250, 204, 21),
    muted: Color::Rgb(113, 113, 122),
    border: Color::Rgb(63, 63, 70),
    highlight_fg: Color::Rgb(24, 24, 27),
    highlight_bg: Color::Rgb(250, 204, 21),
    stripe_bg: Color::Rgb(32, 32, 36),
    status: Color::Rgb(134, 239, 172),
    error: Color::Rgb(248, 113, 113),
    key_fg: Color::Rgb(24, 24, 27),
    key_bg: Color::Rgb(161, 161, 170),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(249, 250, 251),
    fg: Color::Rgb(17, 24, 39),
    accent: Color::Rgb(0, 0, 0),
    muted: Color::Rgb(107, 114, 128),
    border: Color::Rgb(209, 213, 219),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(0, 0, 0),
    stripe_bg: Color::Rgb(243, 244, 246),
    status: Color::Rgb(21, 128, 61),
    error: Color::Rgb(185, 28, 28),
    key_fg: Color::Rgb(255, 255, 255),
    key_bg: Color::Rgb(75, 85, 99),
  },
  Theme {
    name: "Grade",
    bg: Color::Rgb(15, 23, 42),
    fg: Color::Rgb(226, 232, 240),
    accent: Color::Rgb(45, 212, 191),
    muted: Color::Rgb(100, 116, 139),
    border: Color::Rgb(51, 65, 85),
    highlight_fg: Color::Rgb(15, 23, 42),
    highlight_bg: Color::Rgb(251, 146, 60),
    stripe_bg: Color::Rgb(22, 32, 54),
    status: Color::Rgb(45, 212, 191),
    error: Color::Rgb(251, 113, 133),
    key_fg: Color::Rgb(15, 23, 42),
    key_bg: Color::Rgb(148, 163, 184),
  },
];

/// Index of the theme called `name`, or the first theme.
pub fn index_of(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}
