//! Layout and drawing: playfield, next preview, score, pause and game-over overlays.

use crate::app::Screen;
use crate::board::Cell;
use crate::game::{CellSink, GameState};
use crate::shapes::Rotation;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each board cell is two terminal columns wide so blocks look square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 20;
/// Next preview (7) + gap (1) + stats (5).
const SIDEBAR_HEIGHT: u16 = 13;
/// Duration of the game-over fade (TachyonFX).
const GAME_OVER_FADE_MS: u32 = 600;

/// Playfield size in terminal cells including the border.
fn playfield_outer_size(state: &GameState) -> (u16, u16) {
    let board = state.board();
    (
        board.width() as u16 * CELL_WIDTH + 2,
        board.height() as u16 + 2,
    )
}

/// Smallest terminal area that shows the playfield and sidebar unclipped.
fn required_size(state: &GameState) -> (u16, u16) {
    let (pw, ph) = playfield_outer_size(state);
    (pw + SIDEBAR_WIDTH, ph.max(SIDEBAR_HEIGHT))
}

/// Writes board cells straight into the frame buffer.
struct BufferSink<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    theme: &'a Theme,
}

impl CellSink for BufferSink<'_> {
    fn draw_cell(&mut self, x: usize, y: usize, cell: Cell) {
        let rx = self.area.x + x as u16 * CELL_WIDTH;
        let ry = self.area.y + y as u16;
        if rx + CELL_WIDTH > self.area.right() || ry >= self.area.bottom() {
            return;
        }
        let (symbol, style) = match cell {
            Cell::Occupied(id) => {
                let c = self.theme.piece_color(id);
                ("██", Style::default().fg(c).bg(self.theme.bg))
            }
            Cell::Empty => (" ·", Style::default().fg(self.theme.div_line).bg(self.theme.bg)),
        };
        self.buf.set_string(rx, ry, symbol, style);
    }
}

/// Draw the whole screen: board, sidebar and any overlay.
/// `game_over_effect` is None when animations are disabled.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    screen: Screen,
    paused: bool,
    game_over_effect: Option<&mut Option<Effect>>,
    effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let (need_w, need_h) = required_size(state);
    if area.width < need_w || area.height < need_h {
        draw_too_small(frame.buffer_mut(), theme, area, (need_w, need_h));
        return;
    }
    let board_rect = draw_game(frame, state, theme, area);
    match screen {
        Screen::Playing => {
            if paused {
                draw_pause_overlay(frame, theme, area);
            }
        }
        Screen::GameOver => {
            if let Some(effect) = game_over_effect {
                apply_game_over_effect(frame, theme, board_rect, effect, effect_process_time, now);
            }
            draw_game_over(frame, state, theme, area);
        }
    }
}

/// Shown instead of the game while the terminal can't hold the board.
fn draw_too_small(buf: &mut Buffer, theme: &Theme, area: Rect, (need_w, need_h): (u16, u16)) {
    let style = Style::default().fg(theme.main_fg).bg(theme.bg);
    let lines = vec![
        Line::from(Span::styled("Terminal too small", Style::default().fg(theme.title))),
        Line::from(Span::styled(
            format!("need {}x{}, have {}x{}", need_w, need_h, area.width, area.height),
            style,
        )),
    ];
    let top = area.height.saturating_sub(2) / 2;
    let text_area = Rect::new(area.x, area.y + top, area.width, area.height - top);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(style)
        .render(text_area, buf);
}

/// Draw game: playfield + sidebar, centred. Returns the inner board rect.
fn draw_game(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) -> Rect {
    let (pw, ph) = playfield_outer_size(state);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    let board_rect = draw_playfield(frame, state, theme, inner[0]);
    draw_sidebar(frame, state, theme, inner[1]);
    board_rect
}

fn draw_playfield(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Tetrotui ", theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let mut sink = BufferSink {
        buf: frame.buffer_mut(),
        area: inner,
        theme,
    };
    state.render(&mut sink);
    inner
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Next (border + title + 4-row preview)
            Constraint::Length(1), // gap
            Constraint::Length(5), // Stats (border + score, lines, speed)
        ])
        .split(area);

    // --- Next ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(next_inner);
    Paragraph::new(Line::from(Span::styled("Next", title_style)))
        .render(next_layout[0], frame.buffer_mut());
    let (shape, color) = state.next_preview();
    draw_preview(frame.buffer_mut(), shape, theme.piece_color(color), next_layout[1]);

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[2]);
    stats_block.render(chunks[2], frame.buffer_mut());
    let stats_lines = vec![
        Line::from(vec![
            Span::styled("Score: ", title_style),
            Span::styled(state.score().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Lines: ", title_style),
            Span::styled(state.lines_cleared().to_string(), fg_style),
        ]),
        Line::from(vec![
            Span::styled("Drop:  ", title_style),
            Span::styled(format!("{:.2} ms", state.drop_interval_ms()), fg_style),
        ]),
    ];
    Paragraph::new(ratatui::text::Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());
}

/// Next piece preview: the rotation-0 bitmap, centred.
fn draw_preview(buf: &mut Buffer, shape: &Rotation, color: Color, area: Rect) {
    let n = shape.size() as u16;
    let off_x = area.width.saturating_sub(n * CELL_WIDTH) / 2;
    let off_y = area.height.saturating_sub(n) / 2;
    for (c, r) in shape.occupied() {
        let rx = area.x + off_x + c as u16 * CELL_WIDTH;
        let ry = area.y + off_y + r as u16;
        if rx + CELL_WIDTH <= area.right() && ry < area.bottom() {
            buf.set_string(rx, ry, "██", Style::default().fg(color));
        }
    }
}

/// Create the fade on first use, then advance it by the time since the last frame.
fn apply_game_over_effect(
    frame: &mut Frame,
    theme: &Theme,
    board_rect: Rect,
    effect: &mut Option<Effect>,
    process_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *process_time = Some(now);

    let effect = effect.get_or_insert_with(|| {
        fx::fade_to(
            theme.inactive_fg,
            theme.bg,
            (GAME_OVER_FADE_MS, Interpolation::Linear),
        )
        .with_area(board_rect)
    });
    frame.render_effect(effect, board_rect, TfxDuration::from_millis(delta_ms));
}

fn popup_rect(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P: Resume    Q: Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let popup = popup_rect(area, 30, 9);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Score: {} ", state.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(Span::styled(
            format!(" Lines: {} ", state.lines_cleared()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " R: Restart    Q: Quit ",
            Style::default().fg(theme.main_fg).bold(),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}
