#![allow(
    // Allow truncation when casting from usize/i32 to u16 since board coordinates are checked against the area first
    clippy::cast_possible_truncation,
    // Allow sign loss when going from signed to unsigned types since negative coordinates are filtered out
    clippy::cast_sign_loss
)]

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{App, Renderer};
use crate::components::{Board, Piece, Shape, TetrominoType};
use crate::layout::{BoardLayout, COLUMNS_PER_UNIT};
use crate::leaderboard::{Entry, LeaderboardStore};
use crate::name_entry::NameEntry;
use crate::sound::AudioCues;

const BLOCK_SYMBOL: &str = "█";
const PREVIEW_BOX_HEIGHT: u16 = 6;

/// Where each part of the scene goes for the current terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub layout: BoardLayout,
    /// Board interior, one block per `layout.block_size` rows.
    pub board: Rect,
    /// Stats, next preview and controls, right of the board.
    pub panel: Rect,
    /// Leaderboard, left of the board.
    pub leaderboard: Rect,
}

impl ScreenAreas {
    /// `None` when the terminal cannot fit the bordered board.
    #[must_use]
    pub fn compute(area: Rect, grid: (usize, usize)) -> Option<Self> {
        let layout = BoardLayout::compute((area.width, area.height), grid)?;
        let (board_w, board_h) = layout.board_size(grid);
        if layout.offset_x == 0 {
            return None;
        }

        let board = Rect::new(
            area.x + layout.offset_x,
            area.y + layout.offset_y,
            board_w,
            board_h,
        );
        // The border needs one extra cell on every side
        if board.right() >= area.right() || board.bottom() >= area.bottom() {
            return None;
        }

        let panel_x = board.right() + 2;
        let panel = Rect::new(
            panel_x,
            board.y,
            area.right().saturating_sub(panel_x),
            board.height,
        );
        let leaderboard = Rect::new(
            area.x,
            area.y,
            (board.x - 1).saturating_sub(area.x + 1),
            area.height,
        );

        Some(Self {
            layout,
            board,
            panel,
            leaderboard,
        })
    }
}

/// Draws the scene into a ratatui frame.
pub struct TerminalRenderer<'a, 'b> {
    frame: &'a mut Frame<'b>,
    areas: ScreenAreas,
}

impl<'a, 'b> TerminalRenderer<'a, 'b> {
    pub fn new(frame: &'a mut Frame<'b>, areas: ScreenAreas) -> Self {
        Self { frame, areas }
    }

    fn paint_block(&mut self, x: u16, y: u16, width: u16, height: u16, color: Color) {
        let area = self.frame.area();
        let buffer = self.frame.buffer_mut();
        for row in y..y.saturating_add(height) {
            for column in x..x.saturating_add(width) {
                if column >= area.right() || row >= area.bottom() {
                    continue;
                }
                if let Some(cell) = buffer.cell_mut((column, row)) {
                    cell.set_symbol(BLOCK_SYMBOL);
                    cell.set_fg(color);
                    cell.set_bg(Color::Black);
                }
            }
        }
    }

    fn paint_grid_cell(&mut self, x: i32, y: i32, kind: TetrominoType) {
        let board = self.areas.board;
        let block_rows = self.areas.layout.block_size;
        let block_columns = self.areas.layout.block_columns();
        let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        let left = board.x + x * block_columns;
        let top = board.y + y * block_rows;
        if left >= board.right() || top >= board.bottom() {
            return;
        }
        self.paint_block(left, top, block_columns, block_rows, kind.get_color());
    }

    fn panel_line(&mut self, row: u16, text: String, style: Style) {
        let panel = self.areas.panel;
        if row >= panel.height || panel.width == 0 {
            return;
        }
        let area = Rect::new(panel.x, panel.y + row, panel.width, 1);
        self.frame
            .render_widget(Paragraph::new(text).style(style), area);
    }
}

impl Renderer for TerminalRenderer<'_, '_> {
    fn render_grid(&mut self, board: &Board) {
        let interior = self.areas.board;
        let border = Rect::new(
            interior.x - 1,
            interior.y - 1,
            interior.width + 2,
            interior.height + 2,
        );
        self.frame
            .render_widget(Block::default().borders(Borders::ALL), border);

        for (y, row) in board.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(kind) = cell {
                    self.paint_grid_cell(x as i32, y as i32, *kind);
                }
            }
        }
    }

    fn render_piece(&mut self, piece: &Piece) {
        let kind = piece.shape.kind;
        let cells: Vec<_> = piece.get_blocks().collect();
        for (x, y) in cells {
            self.paint_grid_cell(x, y, kind);
        }
    }

    fn render_score(&mut self, score: u32) {
        self.panel_line(0, format!("Score: {score}"), Style::default().fg(Color::White));
    }

    fn render_level(&mut self, level: u32) {
        self.panel_line(1, format!("Level: {level}"), Style::default().fg(Color::White));
    }

    fn render_next_preview(&mut self, shape: &Shape) {
        let panel = self.areas.panel;
        let box_width = 4 * COLUMNS_PER_UNIT + 4;
        if panel.height < 4 + PREVIEW_BOX_HEIGHT || panel.width < box_width {
            return;
        }
        let preview = Rect::new(panel.x, panel.y + 4, box_width, PREVIEW_BOX_HEIGHT);
        self.frame.render_widget(
            Block::default().borders(Borders::ALL).title("Next"),
            preview,
        );

        let inner = Block::default().borders(Borders::ALL).inner(preview);
        let left = inner.x + 1;
        let top = inner.y;
        for (dx, dy) in shape.blocks() {
            self.paint_block(
                left + dx as u16 * COLUMNS_PER_UNIT,
                top + dy as u16,
                COLUMNS_PER_UNIT,
                1,
                shape.kind.get_color(),
            );
        }
    }
}

pub fn render<A: AudioCues, S: LeaderboardStore>(
    f: &mut Frame,
    app: &App<A, S>,
    name_entry: &NameEntry,
) {
    let grid = (app.board().width, app.board().height);
    let Some(areas) = ScreenAreas::compute(f.area(), grid) else {
        let warning_text = Paragraph::new(
            "Terminal too small!\nPlease resize your terminal\nto continue playing.",
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Stackfall"));
        f.render_widget(warning_text, centered_rect(60, 40, f.area()));
        return;
    };

    {
        let mut renderer = TerminalRenderer::new(f, areas);
        app.render(&mut renderer);
        renderer.panel_line(
            2,
            format!("Lines: {}", app.state().lines_cleared),
            Style::default().fg(Color::Gray),
        );
    }

    render_controls(f, areas.panel);
    render_leaderboard(f, areas.leaderboard, app.leaderboard());

    if app.is_suspended() {
        render_name_prompt(f, name_entry);
    }
}

fn render_controls(f: &mut Frame, panel: Rect) {
    let top = 4 + PREVIEW_BOX_HEIGHT + 1;
    if panel.height <= top || panel.width == 0 {
        return;
    }
    let area = Rect::new(panel.x, panel.y + top, panel.width, panel.height - top);
    let controls = Paragraph::new(
        "←/→: Move\n\
        ↓: Soft drop\n\
        ↑/Space: Rotate\n\
        Q/Esc: Quit",
    )
    .style(Style::default().fg(Color::DarkGray))
    .wrap(Wrap { trim: true });
    f.render_widget(controls, area);
}

fn render_leaderboard(f: &mut Frame, area: Rect, entries: &[Entry]) {
    if area.width < 12 || area.height < 3 {
        return;
    }

    let mut lines = Vec::with_capacity(entries.len() * 2);
    for (rank, entry) in entries.iter().enumerate() {
        lines.push(Line::from(format!(
            "{}. {} - {}",
            rank + 1,
            entry.name,
            entry.score
        )));
        lines.push(Line::styled(
            format!("   {}", entry.timestamp),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "No scores yet",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let leaderboard = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Leaderboard"),
    );
    f.render_widget(leaderboard, area);
}

fn render_name_prompt(f: &mut Frame, name_entry: &NameEntry) {
    let area = centered_rect(50, 30, f.area());
    let prompt = Paragraph::new(vec![
        Line::from("Game Over! Enter your name:"),
        Line::from(""),
        Line::styled(
            format!("> {}_", name_entry.text()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::styled("Enter: Submit", Style::default().fg(Color::DarkGray)),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Game Over")
            .style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(prompt, area);
}

/// Helper function to create a centered rect using up certain percentage of the available rect
#[must_use]
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
