//! TUI application state and event loop.
//!
//! The terminal is the viewport: the swarm scheduler and the playback engine
//! both run against it, driven by one monotonic clock (duration since the
//! app mounted). The event loop polls input at 50ms and advances both
//! engines with the current clock on every pass — all scheduling stays
//! inside the engines.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::prelude::*;

use driftwall_core::{
    ClockSource, FrameSet, Message, PlaybackEngine, PlaybackState, SwarmConfig, SwarmScheduler,
    Viewport,
};

// Capacity and font policies are specified in logical pixels; map terminal
// cells so a 120-column terminal behaves like a 1200px viewport.
const CELL_PX_W: u32 = 10;
const CELL_PX_H: u32 = 20;

fn viewport_from_cells(cols: u16, rows: u16) -> Viewport {
    Viewport::new(cols as u32 * CELL_PX_W, rows as u32 * CELL_PX_H)
}

pub struct App {
    feed_path: PathBuf,
    feed: Vec<Message>,
    asset: Option<FrameSet>,
    swarm: SwarmScheduler,
    playback: PlaybackEngine,
    viewport: Viewport,
    mounted: Instant,
    running: bool,
    overlay_on: bool,
    require_gesture: bool,
    status: Option<String>,
}

impl App {
    pub fn new(
        feed_path: PathBuf,
        feed: Vec<Message>,
        asset: Option<FrameSet>,
        capacity: Option<usize>,
        seed: Option<u64>,
        require_gesture: bool,
    ) -> Self {
        // Until the terminal is measured, assume a typical 80x24 window.
        let viewport = viewport_from_cells(80, 24);

        let config = SwarmConfig {
            capacity_override: capacity,
            ..Default::default()
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            feed_path,
            feed,
            asset,
            swarm: SwarmScheduler::with_config(viewport, config, rng),
            playback: PlaybackEngine::new(),
            viewport,
            mounted: Instant::now(),
            running: true,
            overlay_on: false,
            require_gesture,
            status: None,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Install panic hook that restores terminal before printing the panic.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error.
        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;

        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        let size = terminal.size()?;
        self.resize(size.width, size.height);
        let now = self.now();
        self.swarm.set_feed(&self.feed, now);

        while self.running {
            let now = self.now();
            self.swarm.advance(now);
            self.playback.tick(now, None);

            terminal.draw(|f| super::ui::draw(f, self))?;

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(key.code)
                    }
                    Event::Resize(cols, rows) => self.resize(cols, rows),
                    _ => {}
                }
            }
        }

        self.swarm.teardown();
        self.playback.deactivate();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('r') => self.reload_feed(),
            KeyCode::Char('b') => self.toggle_overlay(),
            KeyCode::Char(' ') => {
                if self.playback.state() == PlaybackState::PendingGesture {
                    let now = self.now();
                    self.playback.on_user_gesture(ClockSource::Wall, now);
                }
            }
            _ => {}
        }
    }

    fn reload_feed(&mut self) {
        match crate::commands::load_feed(&self.feed_path) {
            Ok(feed) => {
                self.status = Some(format!("reloaded {} records", feed.len()));
                self.feed = feed;
                let now = self.now();
                self.swarm.set_feed(&self.feed, now);
            }
            Err(e) => {
                log::warn!("feed reload failed: {e}");
                self.status = Some(format!("reload failed: {e}"));
            }
        }
    }

    fn toggle_overlay(&mut self) {
        if self.overlay_on {
            self.playback.deactivate();
            self.overlay_on = false;
            return;
        }

        let Some(asset) = self.asset.clone() else {
            self.status = Some("no asset loaded (pass --asset)".to_string());
            return;
        };

        // The asset was decoded before the terminal was taken over, so the
        // one-shot load completes immediately with the current token.
        let token = self.playback.activate(self.viewport);
        self.playback.on_asset_loaded(token, Ok(asset));
        if self.require_gesture {
            self.playback.on_autoplay_rejected();
        } else {
            let now = self.now();
            self.playback.begin(ClockSource::Wall, now);
        }
        self.overlay_on = true;
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport = viewport_from_cells(cols, rows);
        self.swarm.on_resize(self.viewport);
        self.playback.on_resize(self.viewport);
    }

    /// Monotonic engine clock: duration since the app mounted.
    pub fn now(&self) -> Duration {
        self.mounted.elapsed()
    }

    // --- Accessors for rendering ---

    pub fn swarm(&self) -> &SwarmScheduler {
        &self.swarm
    }

    pub fn playback(&self) -> &PlaybackEngine {
        &self.playback
    }

    pub fn feed_name(&self) -> String {
        self.feed_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.feed_path.display().to_string())
    }

    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_cell_mapping() {
        let vp = viewport_from_cells(120, 40);
        assert_eq!(vp.width, 1200);
        assert_eq!(vp.height, 800);
    }

    #[test]
    fn test_narrow_terminal_maps_to_narrow_policy() {
        // A 40-column terminal lands in the narrow capacity bucket.
        let vp = viewport_from_cells(40, 24);
        assert_eq!(driftwall_core::swarm_capacity(vp.width), 15);
    }
}
