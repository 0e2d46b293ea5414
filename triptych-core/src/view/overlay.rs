//! `src/view/overlay.rs`
//! ============================================================================
//! # Modal overlay state and rendering
//!
//! Prompts, confirmations, and message boxes. The event loop owns one
//! `Overlay` value; while it is anything but `None`, key input edits the
//! overlay instead of driving navigation. The overlay itself never touches
//! the filesystem: confirming only produces an `Intent`.

use std::path::{Path, PathBuf};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use yankr::{YankMode, YankSlot};

use crate::controller::intents::Intent;
use crate::view::theme;

/// What a text prompt is collecting input for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// New entry name; a trailing separator requests a directory.
    CreateEntry,

    /// Replacement name for the selected entry.
    RenameEntry,
}

impl PromptKind {
    const fn title(self) -> &'static str {
        match self {
            Self::CreateEntry => " Create (append / for a directory) ",
            Self::RenameEntry => " Rename ",
        }
    }
}

/// What a yes/no confirmation will trigger on `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmKind {
    /// Delete the named entry.
    Delete { name: String },

    /// Re-issue a paste with overwrite after an `AlreadyExists` collision.
    Overwrite { dest: PathBuf, mode: YankMode },
}

impl ConfirmKind {
    /// The intent a confirmed dialog resolves to.
    #[must_use]
    pub fn confirmed_intent(&self) -> Intent {
        match self {
            Self::Delete { .. } => Intent::Delete,
            Self::Overwrite { .. } => Intent::Paste { overwrite: true },
        }
    }

    fn question(&self) -> String {
        match self {
            Self::Delete { name } => format!("Delete {name}? (y/n)"),
            Self::Overwrite { dest, .. } => {
                format!("{} exists. Overwrite? (y/n)", dest.display())
            }
        }
    }
}

/// The single modal layer above the panes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,

    Input {
        kind: PromptKind,
        buffer: String,
    },

    Confirm(ConfirmKind),

    /// Error or notice box, dismissed by any key.
    Message {
        title: String,
        text: String,
        is_error: bool,
    },
}

impl Overlay {
    #[must_use]
    pub fn input(kind: PromptKind, initial: &str) -> Self {
        Self::Input {
            kind,
            buffer: initial.to_string(),
        }
    }

    #[must_use]
    pub fn error(text: String) -> Self {
        Self::Message {
            title: " Error ".to_string(),
            text,
            is_error: true,
        }
    }

    #[must_use]
    pub fn notice(text: String) -> Self {
        Self::Message {
            title: " Notice ".to_string(),
            text,
            is_error: false,
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Overlay for a paste that failed with a name collision: an overwrite
    /// confirmation, except when the destination is the yanked source
    /// itself, which overwriting can never resolve.
    #[must_use]
    pub fn paste_collision(dest: &Path, slot: &YankSlot) -> Self {
        match slot.peek() {
            Some(entry) if entry.source == dest => Self::error(format!(
                "{} is the yanked source; paste it somewhere else",
                dest.display()
            )),

            Some(entry) => Self::Confirm(ConfirmKind::Overwrite {
                dest: dest.to_path_buf(),
                mode: entry.mode,
            }),

            None => Self::error(format!("{} already exists", dest.display())),
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>) {
        let screen = frame.area();

        match self {
            Self::None => {}

            Self::Input { kind, buffer } => {
                let area = centered_rect(50, 3, screen);
                frame.render_widget(Clear, area);

                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(kind.title())
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(theme::PURPLE));

                let input = Paragraph::new(buffer.as_str())
                    .block(block)
                    .style(Style::default().fg(theme::FOREGROUND));
                frame.render_widget(input, area);

                let visible = buffer
                    .chars()
                    .count()
                    .min(usize::from(area.width).saturating_sub(2));
                let cursor_x = area.x + 1 + visible as u16;
                frame.set_cursor_position((cursor_x, area.y + 1));

                render_help_line(frame, area, screen, "Enter to confirm • Esc to cancel");
            }

            Self::Confirm(kind) => {
                let area = centered_rect(60, 3, screen);
                frame.render_widget(Clear, area);

                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(" Confirm ")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(theme::YELLOW));

                let question = Paragraph::new(kind.question())
                    .block(block)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(theme::FOREGROUND));
                frame.render_widget(question, area);
            }

            Self::Message {
                title,
                text,
                is_error,
            } => {
                let area = centered_rect(60, 5, screen);
                frame.render_widget(Clear, area);

                let border = if *is_error { theme::RED } else { theme::GREEN };
                let block = Block::default()
                    .borders(Borders::ALL)
                    .title(title.as_str())
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(border));

                let body = Paragraph::new(text.as_str())
                    .block(block)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(body, area);

                render_help_line(frame, area, screen, "Press any key to dismiss");
            }
        }
    }
}

fn render_help_line(frame: &mut Frame<'_>, above: Rect, screen: Rect, text: &str) {
    let help_area = Rect {
        x: above.x,
        y: above.y + above.height,
        width: above.width,
        height: 1,
    };

    if help_area.y < screen.height {
        let help = Paragraph::new(text)
            .style(Style::default().fg(theme::COMMENT))
            .alignment(Alignment::Center);
        frame.render_widget(help, help_area);
    }
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
