mod app;
mod catalog;
mod config;
mod constants;
mod input;
mod logging;
mod player;
mod query;
mod state;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use app::App;
use catalog::Catalog;
use config::Config;
use constants::constants;
use state::{ViewEvent, ViewState, reduce};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Portfolio file (.ron or .json). Defaults to `catalog_path` in prefs.toml, then the built-in reel.
  #[arg(short, long, global = true)]
  catalog: Option<PathBuf>,

  /// Initial search text (matches titles and descriptions, case-insensitive)
  #[arg(short, long, global = true, default_value = "")]
  query: String,

  /// Initial tag filter (exact, case-sensitive; "All" for none)
  #[arg(short, long, global = true, default_value = "")]
  tag: String,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the projects matching --query and --tag
  List {
    /// Emit JSON instead of tab-separated rows
    #[arg(long)]
    json: bool,
  },
  /// Print the tag vocabulary, "All" first
  Tags,
  /// Show how a video link would be played
  Classify { url: String },
  /// Generate shell completions
  Completions { shell: Shell },
}

// --- Main ---

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  let args = Args::parse();
  // Pure stdout commands run without touching the data dir.
  let _log_guard = if writes_log(args.command.as_ref()) {
    logging::init().inspect_err(|e| eprintln!("warning: file logging disabled: {:#}", e)).ok()
  } else {
    None
  };

  let config = Config::load();
  let catalog_path = args.catalog.clone().or_else(|| config.catalog_path.clone());
  let view = [ViewEvent::QueryChanged(args.query.clone()), ViewEvent::TagPressed(args.tag.clone())]
    .into_iter()
    .fold(ViewState::default(), |state, event| reduce(&state, event));

  match args.command {
    Some(Command::Completions { shell }) => {
      clap_complete::generate(shell, &mut Args::command(), "reel", &mut std::io::stdout());
      Ok(())
    }
    Some(Command::Classify { url }) => print_classification(&url),
    Some(Command::List { json }) => {
      let catalog = Catalog::load_or_embedded(catalog_path.as_deref())?;
      print_list(&catalog, &view, json)
    }
    Some(Command::Tags) => {
      let catalog = Catalog::load_or_embedded(catalog_path.as_deref())?;
      let mut out = std::io::stdout().lock();
      for tag in catalog.tag_vocabulary() {
        writeln!(out, "{}", tag)?;
      }
      Ok(())
    }
    None => {
      let catalog = Catalog::load_or_embedded(catalog_path.as_deref())?;
      run_tui(App::new(catalog, config, view)).await
    }
  }
}

fn writes_log(command: Option<&Command>) -> bool {
  !matches!(command, Some(Command::Completions { .. } | Command::Classify { .. }))
}

fn print_classification(url: &str) -> Result<()> {
  let source = query::classify(url);
  let playback = query::resolve(url);
  let mut out = std::io::stdout().lock();
  writeln!(out, "source:  {}", source.label())?;
  match &playback {
    query::Playback::Embed { address } => writeln!(out, "embed:   {}", address)?,
    query::Playback::Native { address, mime } => writeln!(out, "native:  {} ({})", address, mime)?,
    query::Playback::External { url } => {
      writeln!(out, "{}", constants().preview_unavailable)?;
      writeln!(out, "open:    {}", url)?;
    }
  }
  Ok(())
}

fn print_list(catalog: &Catalog, view: &ViewState, json: bool) -> Result<()> {
  let projects = view.visible(catalog);
  let mut out = std::io::stdout().lock();
  if json {
    serde_json::to_writer_pretty(&mut out, &projects).context("Failed to serialize projects")?;
    writeln!(out)?;
  } else {
    for p in projects {
      writeln!(out, "{}\t{}\t{}\t{}\t{}", p.id, p.year, p.title, p.tags.join(", "), p.video_url)?;
    }
  }
  Ok(())
}

async fn run_tui(mut app: App) -> Result<()> {
  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  info!(projects = app.catalog.len(), "starting browser");
  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app).await;
  ratatui::restore();
  app.player.stop().await?;
  result
}

async fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  let poll_interval = Duration::from_millis(constants().poll_interval_ms);
  loop {
    app.player.check_status();
    app.expire_error();

    terminal.draw(|frame| ui::ui(frame, app)).context("Failed to draw frame")?;

    if event::poll(poll_interval)? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}
