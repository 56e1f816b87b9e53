//! Playback surfaces.
//!
//! Native files are handed to an external media player (mpv by default) whose status
//! line is streamed back for the status bar. Embed pages and raw links are opened with
//! the platform opener.

use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::{
  io::{AsyncBufReadExt, AsyncWriteExt, BufReader as TokioBufReader},
  net::UnixStream,
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::{debug, info, warn};

/// What the native player is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
  pub project_id: u32,
  pub title: String,
  pub address: String,
  pub mime: String,
}

pub struct Player {
  command: String,
  pub(crate) current_process: Option<TokioChild>,
  pub current: Option<NowPlaying>,
  monitor_handle: Option<JoinHandle<()>>,
  status_rx: Option<mpsc::Receiver<String>>,
  last_status: Option<String>,
  ipc_socket_path: Option<String>,
  pub paused: bool,
}

impl Player {
  pub fn new(command: impl Into<String>) -> Self {
    Self {
      command: command.into(),
      current_process: None,
      current: None,
      monitor_handle: None,
      status_rx: None,
      last_status: None,
      ipc_socket_path: None,
      paused: false,
    }
  }

  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  /// Drain pending status lines and notice when the player exited on its own.
  pub fn check_status(&mut self) {
    if let Some(rx) = &mut self.status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_status = Some(status);
      }
    }
    if let Some(child) = &mut self.current_process
      && let Ok(Some(exit)) = child.try_wait()
    {
      info!(%exit, "player exited");
      self.current_process = None;
      self.reset();
    }
  }

  /// Forget the finished project, its status feed and its IPC socket.
  fn reset(&mut self) {
    self.status_rx = None;
    self.last_status = None;
    self.paused = false;
    if let Some(now) = self.current.take() {
      debug!(project = now.project_id, "playback ended");
    }
    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
  }

  fn current_title(&self) -> &str {
    self.current.as_ref().map_or("player", |now| now.title.as_str())
  }

  pub fn last_status(&self) -> Option<&str> {
    self.last_status.as_deref()
  }

  pub async fn play(&mut self, now: NowPlaying) -> Result<()> {
    self.stop().await.context("Failed to stop previous playback")?;
    self.paused = false;

    let socket_path = std::env::temp_dir().join(format!("reel-player-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new(&self.command);
    cmd.args([
      "--term-status-msg=Time: ${time-pos/full} / ${duration/full} | ${pause} ${percent-pos}%",
      &format!("--input-ipc-server={}", socket_path_str),
      &format!("--force-media-title={}", now.title),
      "--",
      &now.address,
    ]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Undrained stderr would eventually block the player.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("{} not found. Install mpv or set player_command in prefs.toml", self.command)
      } else {
        anyhow!(e).context("Failed to spawn player process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get player stdout")?;
    let (tx, rx) = mpsc::channel::<String>(10);
    self.status_rx = Some(rx);

    let monitor_handle = tokio::spawn(async move {
      let reader = TokioBufReader::new(stdout);
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    });

    info!(project = now.project_id, address = %now.address, mime = %now.mime, "native playback started");
    self.current_process = Some(child);
    self.current = Some(now);
    self.monitor_handle = Some(monitor_handle);
    self.ipc_socket_path = Some(socket_path_str);
    Ok(())
  }

  /// Flip pause on the running player. Without one this does nothing.
  pub async fn toggle_pause(&mut self) -> Result<()> {
    let Some(socket_path) = self.ipc_socket_path.as_deref() else {
      return Ok(());
    };
    send_ipc(socket_path, &["cycle", "pause"])
      .await
      .with_context(|| format!("Failed to pause '{}'", self.current_title()))?;
    self.paused = !self.paused;
    debug!(paused = self.paused, "toggled pause");
    Ok(())
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(handle) = self.monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }

    if let Some(mut child) = self.current_process.take() {
      if let Err(e) = child.kill().await {
        warn!(title = self.current_title(), "failed to kill player: {}", e);
      }
      let _ = child.wait().await;
      info!(title = self.current_title(), "playback stopped");
    }

    self.reset();
    Ok(())
  }
}

/// Write one JSON IPC command line (`{"command":[...]}`) to the player socket.
async fn send_ipc(socket_path: &str, command: &[&str]) -> Result<()> {
  let mut line =
    serde_json::to_vec(&serde_json::json!({ "command": command })).context("Failed to encode player command")?;
  line.push(b'\n');
  let mut stream = UnixStream::connect(socket_path).await.context("Failed to connect to player IPC socket")?;
  stream.write_all(&line).await.context("Failed to send player command")?;
  Ok(())
}

/// The platform command that opens a URL in the default browser.
pub fn opener_command() -> &'static str {
  if cfg!(target_os = "macos") { "open" } else { "xdg-open" }
}

/// Open `url` in a new browser context without blocking the UI.
pub fn open_external(url: &str) -> Result<()> {
  let mut child = std::process::Command::new(opener_command())
    .arg(url)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to open {}", url))?;
  info!(url, "opened externally");
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}
