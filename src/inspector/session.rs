//! The poll-render loop driving one inspection session.
//!
//! Single logical thread of control: once per tick the loop samples the
//! keyboard, dispatches at most one command, re-reads the probe's selection
//! slot, feeds the cache, and redraws. Communication with the page is
//! strictly pull-based, so click-to-display latency is bounded by the tick
//! period.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use crate::browser::probe::DomProbe;
use crate::core::config::{InspectorConfig, SAVE_COOLDOWN_MS};
use crate::inspector::cache::{HistoryEntry, SelectionCache};
use crate::inspector::display::{self, Notice};
use crate::sinks;

/// The four single-key commands, in dispatch-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Clear,
    Save,
    GenerateScraper,
}

/// Map the keys pressed during one tick to at most one command.
///
/// Precedence is quit > clear > save > generate: a quitting user is never
/// delayed by a queued save, and clear beats the writers because it
/// invalidates the selection they would persist.
fn resolve_command(pressed: &[KeyCode]) -> Option<Command> {
    let has = |c: char| pressed.contains(&KeyCode::Char(c));
    if has('q') {
        Some(Command::Quit)
    } else if has('c') {
        Some(Command::Clear)
    } else if has('s') {
        Some(Command::Save)
    } else if has('g') {
        Some(Command::GenerateScraper)
    } else {
        None
    }
}

/// Debounce guard for commands whose keys are sampled, not queued: a key
/// held across several ticks fires at most once per window.
#[derive(Debug)]
pub struct Cooldown {
    window: Duration,
    last_fired: Option<Instant>,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fired: None,
        }
    }

    /// `true` when the action may run now; arms the window when it does.
    pub fn try_fire(&mut self) -> bool {
        let now = Instant::now();
        match self.last_fired {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Running,
    Stopped,
}

/// RAII wrapper for the live terminal view: raw mode + alternate screen on
/// enter, restored on drop so an error exit never leaves the shell broken.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = std::io::stdout();
        crossterm::execute!(stdout, EnterAlternateScreen)
            .context("failed to enter alternate screen")?;
        let terminal =
            Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")?;
        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(std::io::stdout(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// One inspection session: probe + cache + notice line + command cooldowns.
pub struct InspectSession {
    probe: DomProbe,
    cache: SelectionCache,
    notice: Option<Notice>,
    save_cooldown: Cooldown,
    scraper_cooldown: Cooldown,
    tick: Duration,
    elements_dir: std::path::PathBuf,
    scrapers_dir: std::path::PathBuf,
    state: SessionState,
}

impl InspectSession {
    pub fn new(probe: DomProbe, cfg: &InspectorConfig) -> Self {
        let cooldown = Duration::from_millis(SAVE_COOLDOWN_MS);
        Self {
            probe,
            cache: SelectionCache::new(cfg.max_history),
            notice: None,
            save_cooldown: Cooldown::new(cooldown),
            scraper_cooldown: Cooldown::new(cooldown),
            tick: cfg.tick,
            elements_dir: cfg.elements_dir.clone(),
            scrapers_dir: cfg.scrapers_dir.clone(),
            state: SessionState::Running,
        }
    }

    /// Run the poll-render loop until the quit key or a fatal browser error.
    ///
    /// Sink failures surface on the notice line and the loop continues; any
    /// probe failure propagates and ends the session.
    pub async fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        info!("inspection session started");
        while self.state == SessionState::Running {
            let pressed = sample_pressed_keys()?;
            match resolve_command(&pressed) {
                Some(Command::Quit) => {
                    self.state = SessionState::Stopped;
                    break;
                }
                Some(Command::Clear) => self.probe.clear().await?,
                Some(Command::Save) => self.save_current().await?,
                Some(Command::GenerateScraper) => self.generate_scraper().await?,
                None => {}
            }

            // Always re-read, even right after a command: the user may have
            // clicked between samples.
            let current = self.probe.query().await?;
            self.cache.touch(current.as_ref());

            let history: Vec<HistoryEntry> = self.cache.entries().cloned().collect();
            let snap = display::snapshot(current.as_ref(), &history, self.notice.as_ref());
            terminal
                .draw(|frame| display::render(frame, &snap))
                .context("failed to draw display")?;

            tokio::time::sleep(self.tick).await;
        }
        info!("inspection session stopped");
        Ok(())
    }

    /// Save the current selection as a JSON snapshot. No selection → silent
    /// no-op; sink failure → red notice, loop continues.
    async fn save_current(&mut self) -> Result<()> {
        if !self.save_cooldown.try_fire() {
            return Ok(());
        }
        let Some(descriptor) = self.probe.query().await? else {
            return Ok(());
        };
        self.notice = Some(match sinks::save_element(&descriptor, &self.elements_dir) {
            Ok(path) => Notice::success(format!("Element saved to {}", path.display())),
            Err(e) => {
                warn!("save_element failed: {}", e);
                Notice::error(format!("Error saving element: {}", e))
            }
        });
        Ok(())
    }

    /// Emit a scraper stub for the current selection's preferred selector.
    async fn generate_scraper(&mut self) -> Result<()> {
        if !self.scraper_cooldown.try_fire() {
            return Ok(());
        }
        let Some(descriptor) = self.probe.query().await? else {
            return Ok(());
        };
        let selector = descriptor.preferred_selector();
        self.notice = Some(
            match sinks::save_scraper_stub(&selector, &self.scrapers_dir) {
                Ok(path) => Notice::success(format!("Scraper saved to {}", path.display())),
                Err(e) => {
                    warn!("save_scraper_stub failed: {}", e);
                    Notice::error(format!("Error saving scraper: {}", e))
                }
            },
        );
        Ok(())
    }
}

/// Drain every terminal event queued since the last tick and collect the key
/// presses. Non-key events (resize, mouse) are discarded; key repeats and
/// releases don't count as presses.
fn sample_pressed_keys() -> Result<Vec<KeyCode>> {
    let mut pressed = Vec::new();
    while event::poll(Duration::from_millis(0)).context("failed to poll terminal input")? {
        if let Event::Key(key) = event::read().context("failed to read terminal input")? {
            if key.kind == KeyEventKind::Press {
                pressed.push(key.code);
            }
        }
    }
    Ok(pressed)
}
