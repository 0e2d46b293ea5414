//! src/main.rs
//! Three-pane file manager TUI: terminal lifecycle, key mapping, event loop

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    path::PathBuf,
};

use anyhow::{Context, Result};
use crossterm::{
    event::{Event as TerminalEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::{process::Command, sync::mpsc};
use tracing::{debug, error, info, warn};

use triptych_core::{
    Logger,
    config::Config,
    controller::{
        intents::{Intent, OperationKind, OperationOutcome},
        navigator::{HandleResult, NavigationController},
    },
    error::AppError,
    fs::gateway::FileSystemGateway,
    ops::engine::FileOperationEngine,
    view::{
        overlay::{ConfirmKind, Overlay, PromptKind},
        ui::UIRenderer,
    },
};
use yankr::YankMode;

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();
    let _log_guard = Logger::init_tracing();

    let app = App::new()
        .await
        .context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    controller: NavigationController,
    renderer: UIRenderer,
    overlay: Overlay,
    outcome_rx: mpsc::UnboundedReceiver<OperationOutcome>,
    editor_cmd: String,
}

impl App {
    async fn new() -> Result<Self> {
        let config = Config::load().await.unwrap_or_else(|e| {
            info!("Failed to load config, using defaults: {}", e);
            Config::default()
        });

        let start_dir: PathBuf = match std::env::args_os().nth(1) {
            Some(arg) => PathBuf::from(arg),
            None => PathBuf::from("."),
        };
        let start_dir = tokio::fs::canonicalize(&start_dir)
            .await
            .with_context(|| format!("Cannot open start directory {}", start_dir.display()))?;

        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel::<OperationOutcome>();
        let engine = FileOperationEngine::new(FileSystemGateway::new(), outcome_tx);

        let editor_cmd = config.editor_cmd.clone();
        let controller = NavigationController::new(start_dir.clone(), config, engine)
            .await
            .with_context(|| format!("Cannot list start directory {}", start_dir.display()))?;

        let terminal = setup_terminal().context("Failed to initialize terminal")?;
        info!("Application initialized in {}", start_dir.display());

        Ok(Self {
            terminal,
            controller,
            renderer: UIRenderer::new(),
            overlay: Overlay::None,
            outcome_rx,
            editor_cmd,
        })
    }

    async fn run(mut self) -> Result<()> {
        let mut events = EventStream::new();

        loop {
            self.draw().await?;

            tokio::select! {
                maybe_event = events.next() => {
                    let Some(event) = maybe_event.transpose().context("Terminal event stream failed")? else {
                        break;
                    };

                    if !self.on_terminal_event(event).await? {
                        break;
                    }
                }

                Some(outcome) = self.outcome_rx.recv() => {
                    self.on_outcome(outcome).await?;
                }
            }
        }

        info!("Event loop terminated cleanly");
        Ok(())
    }

    async fn draw(&mut self) -> Result<()> {
        let snap = self
            .controller
            .render_snapshot()
            .await
            .context("Failed to derive panes")?;

        self.terminal
            .draw(|frame| self.renderer.render(frame, &snap, &self.overlay))
            .context("Failed to draw terminal")?;

        Ok(())
    }

    /// Returns `false` when the application should exit.
    async fn on_terminal_event(&mut self, event: TerminalEvent) -> Result<bool> {
        let TerminalEvent::Key(key) = event else {
            // Resizes redraw on the next loop turn anyway.
            return Ok(true);
        };

        if key.kind == KeyEventKind::Release {
            return Ok(true);
        }

        let intent = if self.overlay.is_none() {
            self.map_browse_key(key)
        } else {
            self.on_overlay_key(key)
        };

        let Some(intent) = intent else {
            return Ok(true);
        };

        self.apply(intent).await
    }

    /// Browse-mode key bindings, vi-flavored.
    fn map_browse_key(&mut self, key: KeyEvent) -> Option<Intent> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Intent::Quit),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') => Some(Intent::Quit),

            KeyCode::Char('j') | KeyCode::Down => Some(Intent::MoveCursor(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Intent::MoveCursor(-1)),
            KeyCode::Char('l') | KeyCode::Enter | KeyCode::Right => Some(Intent::Descend),
            KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Left => Some(Intent::Ascend),
            KeyCode::Char('g') => Some(Intent::JumpTop),
            KeyCode::Char('G') => Some(Intent::JumpBottom),
            KeyCode::Char('~') => Some(Intent::GoHome),
            KeyCode::Char('.') => Some(Intent::ToggleHidden),
            KeyCode::Char('R') | KeyCode::F(5) => Some(Intent::Reload),

            KeyCode::Char('y') => Some(Intent::Yank(YankMode::Copy)),
            KeyCode::Char('x') => Some(Intent::Yank(YankMode::Cut)),
            KeyCode::Char('p') => Some(Intent::Paste { overwrite: false }),

            // Esc interrupts a running operation first; with nothing in
            // flight it clears the pending yank.
            KeyCode::Esc => {
                if self.controller.is_busy() {
                    Some(Intent::CancelOperation)
                } else {
                    Some(Intent::CancelYank)
                }
            }

            KeyCode::Char('e') => Some(Intent::OpenInEditor),

            KeyCode::Char('a') => {
                self.overlay = Overlay::input(PromptKind::CreateEntry, "");
                None
            }

            KeyCode::Char('r') => {
                let current = self.controller.selected_entry()?.name.to_string();
                self.overlay = Overlay::input(PromptKind::RenameEntry, &current);
                None
            }

            KeyCode::Char('D') => {
                let name = self.controller.selected_entry()?.name.to_string();
                self.overlay = Overlay::Confirm(ConfirmKind::Delete { name });
                None
            }

            _ => None,
        }
    }

    /// Key handling while a modal overlay is up.
    fn on_overlay_key(&mut self, key: KeyEvent) -> Option<Intent> {
        match &mut self.overlay {
            Overlay::None => None,

            Overlay::Input { kind, buffer } => match key.code {
                KeyCode::Esc => {
                    self.overlay = Overlay::None;
                    None
                }

                KeyCode::Enter => {
                    let text = std::mem::take(buffer);
                    let intent = match kind {
                        PromptKind::CreateEntry => Intent::Create(text),
                        PromptKind::RenameEntry => Intent::Rename(text),
                    };
                    self.overlay = Overlay::None;
                    Some(intent)
                }

                KeyCode::Backspace => {
                    buffer.pop();
                    None
                }

                KeyCode::Char(c) => {
                    buffer.push(c);
                    None
                }

                _ => None,
            },

            Overlay::Confirm(kind) => match key.code {
                KeyCode::Char('y' | 'Y') => {
                    let intent = kind.confirmed_intent();
                    self.overlay = Overlay::None;
                    Some(intent)
                }

                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.overlay = Overlay::None;
                    None
                }

                _ => None,
            },

            Overlay::Message { .. } => {
                self.overlay = Overlay::None;
                None
            }
        }
    }

    async fn apply(&mut self, intent: Intent) -> Result<bool> {
        debug!("Applying intent: {:?}", intent);

        match self.controller.handle(intent).await {
            Ok(HandleResult::Quit) => return Ok(false),

            Ok(HandleResult::Editor(path)) => {
                self.run_editor(&path).await?;
            }

            Ok(HandleResult::Busy) => {
                self.overlay = Overlay::notice("An operation is already running".to_string());
            }

            Ok(HandleResult::Redraw | HandleResult::Noop) => {}

            Err(e) => {
                warn!("Intent failed: {}", e);
                self.overlay = Overlay::error(e.to_string());
            }
        }

        Ok(true)
    }

    /// Fold a finished background operation into the state, surfacing
    /// collisions as an overwrite confirmation.
    async fn on_outcome(&mut self, outcome: OperationOutcome) -> Result<()> {
        let is_paste = matches!(
            outcome.kind,
            OperationKind::PasteCopy | OperationKind::PasteCut
        );

        match &outcome.result {
            Err(AppError::AlreadyExists(dest)) if is_paste => {
                self.overlay = Overlay::paste_collision(dest, self.controller.yank_slot());
            }

            Err(e) => {
                self.overlay = Overlay::error(e.to_string());
            }

            Ok(()) => {
                info!("{} finished: {}", outcome.kind, outcome.path.display());
            }
        }

        self.controller
            .absorb_outcome(&outcome)
            .await
            .context("Failed to refresh after operation")?;

        Ok(())
    }

    /// Suspend the TUI, run the configured editor on `path`, resume.
    async fn run_editor(&mut self, path: &std::path::Path) -> Result<()> {
        let mut parts = self.editor_cmd.split_whitespace();
        let Some(program) = parts.next() else {
            self.overlay = Overlay::error("No editor configured".to_string());
            return Ok(());
        };
        let args: Vec<&str> = parts.collect();

        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;

        info!("Running editor: {} {}", program, path.display());
        let status = Command::new(program).args(&args).arg(path).status().await;

        enable_raw_mode().context("Failed to re-enable raw mode")?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)
            .context("Failed to re-enter alternate screen")?;
        self.terminal.clear().context("Failed to clear terminal")?;

        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                self.overlay = Overlay::error(format!("Editor exited with {status}"));
            }
            Err(e) => {
                self.overlay = Overlay::error(format!("Failed to run {program}: {e}"));
            }
        }

        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
