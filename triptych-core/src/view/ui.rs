//! `src/view/ui.rs`
//! ============================================================================
//! # Frame renderer: three panes plus a status line
//!
//! Paints the whole TUI from an immutable `RenderSnapshot`; no filesystem
//! access and no locks while drawing. Left pane is the parent listing,
//! middle the current directory, right the preview of the selection.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
};

use crate::controller::navigator::RenderSnapshot;
use crate::fs::entry::{DirectorySnapshot, EntryInfo};
use crate::model::pane::PreviewTarget;
use crate::view::overlay::Overlay;
use crate::view::theme;

pub struct UIRenderer;

impl UIRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, snap: &RenderSnapshot, overlay: &Overlay) {
        let [content, status] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        let [left, middle, right] = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(40),
            Constraint::Percentage(35),
        ])
        .areas(content);

        self.draw_parent_pane(frame, snap, left);
        self.draw_current_pane(frame, snap, middle);
        self.draw_preview_pane(frame, snap, right);
        self.draw_status_bar(frame, snap, status);

        overlay.render(frame);
    }

    fn draw_parent_pane(&self, frame: &mut Frame<'_>, snap: &RenderSnapshot, area: Rect) {
        let block = pane_block(" parent ");

        let Some(parent) = &snap.panes.parent else {
            frame.render_widget(Paragraph::new("").block(block), area);
            return;
        };

        let list = entry_list(parent).block(block);
        let mut state = ListState::default().with_selected(snap.panes.parent_highlight);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_current_pane(&self, frame: &mut Frame<'_>, snap: &RenderSnapshot, area: Rect) {
        let title = format!(" {} ", snap.panes.cwd.display());
        let block = pane_block(&title).border_style(Style::default().fg(theme::PURPLE));

        if snap.panes.current.is_empty() {
            let empty = Paragraph::new("(empty)")
                .style(Style::default().fg(theme::COMMENT))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let dim = Style::default().fg(theme::COMMENT);
        let rows: Vec<Row<'_>> = snap
            .panes
            .current
            .entries
            .iter()
            .map(|e| {
                let size = if e.is_dir { String::new() } else { e.size_human() };
                Row::new(vec![
                    Cell::from(entry_line(e)),
                    Cell::from(size).style(dim),
                    Cell::from(e.format_date("%Y-%m-%d %H:%M")).style(dim),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(1),
                Constraint::Length(9),
                Constraint::Length(16),
            ],
        )
        .block(block)
        .row_highlight_style(theme::selection_style())
        .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(snap.panes.selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_preview_pane(&self, frame: &mut Frame<'_>, snap: &RenderSnapshot, area: Rect) {
        let block = pane_block(" preview ");

        match &snap.panes.preview {
            PreviewTarget::NoSelection => {
                frame.render_widget(Paragraph::new("").block(block), area);
            }

            PreviewTarget::Directory { listing, more } => {
                let mut items: Vec<ListItem<'_>> = listing
                    .entries
                    .iter()
                    .map(|e| ListItem::new(entry_line(e)))
                    .collect();

                if *more > 0 {
                    items.push(ListItem::new(Line::styled(
                        format!("... and {more} more"),
                        Style::default().fg(theme::COMMENT),
                    )));
                }

                frame.render_widget(List::new(items).block(block), area);
            }

            PreviewTarget::Text { lines, truncated } => {
                let mut text: Vec<Line<'_>> = lines.iter().map(|l| Line::raw(l.as_str())).collect();

                if *truncated {
                    text.push(Line::styled(
                        "...",
                        Style::default().fg(theme::COMMENT),
                    ));
                }

                frame.render_widget(Paragraph::new(text).block(block), area);
            }

            PreviewTarget::Binary { extension } => {
                let label = match extension {
                    Some(ext) => format!("binary file ({ext})"),
                    None => "binary file".to_string(),
                };
                frame.render_widget(centered_note(label).block(block), area);
            }

            PreviewTarget::TooLarge { size } => {
                let label = format!("file too large to preview ({})", bytesize::ByteSize::b(*size));
                frame.render_widget(centered_note(label).block(block), area);
            }

            PreviewTarget::Unreadable => {
                let note = Paragraph::new("unreadable")
                    .style(Style::default().fg(theme::RED))
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(note, area);
            }
        }
    }

    fn draw_status_bar(&self, frame: &mut Frame<'_>, snap: &RenderSnapshot, area: Rect) {
        let (dirs, files) = snap.panes.current.counts();

        let mut left = format!(" {dirs} dirs, {files} files");
        if snap.show_hidden {
            left.push_str("  [hidden]");
        }
        if let Some(clip) = &snap.clipboard {
            left.push_str(&format!("  [{}: {}]", clip.mode.indicator(), clip.name));
        }
        if let Some(kind) = snap.busy {
            left.push_str(&format!("  [{kind}...]"));
        }

        let right = match snap.panes.selected {
            Some(i) => format!("{}/{} ", i + 1, snap.panes.current.len()),
            None => String::new(),
        };

        let [l_area, r_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(right.len() as u16)])
                .areas(area);

        frame.render_widget(
            Paragraph::new(left).style(Style::default().fg(theme::FOREGROUND)),
            l_area,
        );
        frame.render_widget(
            Paragraph::new(right).style(Style::default().fg(theme::COMMENT)),
            r_area,
        );
    }
}

impl Default for UIRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn centered_note(text: String) -> Paragraph<'static> {
    Paragraph::new(text)
        .style(Style::default().fg(theme::COMMENT))
        .alignment(Alignment::Center)
}

fn pane_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(theme::pane_border_style())
}

fn entry_list(snapshot: &DirectorySnapshot) -> List<'_> {
    let items: Vec<ListItem<'_>> = snapshot
        .entries
        .iter()
        .map(|e| ListItem::new(entry_line(e)))
        .collect();

    List::new(items)
        .highlight_style(theme::selection_style())
        .highlight_symbol("> ")
}

fn entry_line(entry: &EntryInfo) -> Line<'_> {
    let style = if entry.is_dir {
        theme::directory_style()
    } else if entry.is_symlink {
        theme::symlink_style()
    } else {
        theme::file_style()
    };

    let suffix = if entry.is_dir { "/" } else { "" };
    Line::styled(format!("{}{suffix}", entry.name), style)
}
