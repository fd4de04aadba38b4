//! Game state: board, active and next piece, score, gravity clock, command dispatch.

use crate::GameConfig;
use crate::board::{Board, Cell};
use crate::piece::Piece;
use crate::shapes::{Rotation, ShapeKind};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::time::{Duration, Instant};

/// Points per cleared row.
pub const SCORE_PER_ROW: u32 = 10;
/// Gravity interval at the start of a session.
pub const DEFAULT_DROP_INTERVAL_MS: f64 = 1000.0;
/// Gravity speed-up per cleared row.
pub const DROP_INTERVAL_STEP_MS: f64 = 0.03;
/// Gravity never gets faster than this.
pub const MIN_DROP_INTERVAL_MS: f64 = 50.0;

/// Player commands accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
}

/// Notifications for the presentation layer; drained with [`GameState::drain_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// The preview piece changed (on start and after every lock).
    NextPieceChanged(ShapeKind),
    /// A lock removed rows.
    RowsCleared(u32),
    ScoreChanged(u32),
    /// The session is over; no further ticks or commands have any effect.
    SessionEnded { score: u32 },
}

/// Receives one call per board cell on a full redraw.
pub trait CellSink {
    fn draw_cell(&mut self, x: usize, y: usize, cell: Cell);
}

#[derive(Debug)]
pub struct GameState {
    board: Board,
    piece: Piece,
    next: Piece,
    score: u32,
    lines_cleared: u32,
    initial_drop_interval_ms: f64,
    drop_interval_ms: f64,
    game_over: bool,
    /// Reference point of the gravity clock.
    drop_start: Instant,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(config: &GameConfig, now: Instant) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let board = Board::new(config.width, config.height);
        let piece = random_piece(&mut rng, board.width());
        let next = random_piece(&mut rng, board.width());
        log::info!(
            "new session: {}x{} board, seed {}, drop interval {} ms",
            config.width,
            config.height,
            config.seed,
            config.drop_interval_ms
        );
        Self {
            board,
            events: vec![GameEvent::NextPieceChanged(next.kind)],
            piece,
            next,
            score: 0,
            lines_cleared: 0,
            initial_drop_interval_ms: config.drop_interval_ms,
            drop_interval_ms: config.drop_interval_ms,
            game_over: false,
            drop_start: now,
            rng,
        }
    }

    /// Start a fresh session on the same board size; the RNG keeps its stream.
    pub fn restart(&mut self, now: Instant) {
        self.board.reset();
        self.piece = random_piece(&mut self.rng, self.board.width());
        self.next = random_piece(&mut self.rng, self.board.width());
        self.score = 0;
        self.lines_cleared = 0;
        self.drop_interval_ms = self.initial_drop_interval_ms;
        self.game_over = false;
        self.drop_start = now;
        self.events.clear();
        self.events.push(GameEvent::NextPieceChanged(self.next.kind));
        self.events.push(GameEvent::ScoreChanged(0));
        log::info!("session restarted");
    }

    /// Gravity. Drops the piece once the interval has strictly elapsed since the last
    /// drop (or lateral input); late by up to one frame, never early.
    pub fn tick(&mut self, now: Instant) {
        if self.game_over {
            return;
        }
        if now.saturating_duration_since(self.drop_start) > self.drop_interval() {
            self.step_down();
            self.drop_start = now;
        }
    }

    /// Applies a player command. Lateral moves and rotation restart the gravity clock so
    /// they are not followed by an immediate automatic drop; soft drop does not.
    pub fn apply(&mut self, command: Command, now: Instant) {
        if self.game_over {
            return;
        }
        match command {
            Command::MoveLeft => {
                self.piece.move_left(&self.board);
                self.drop_start = now;
            }
            Command::MoveRight => {
                self.piece.move_right(&self.board);
                self.drop_start = now;
            }
            Command::RotateCw => {
                self.piece.rotate(&self.board);
                self.drop_start = now;
            }
            Command::SoftDrop => self.step_down(),
        }
    }

    /// Restarts the gravity clock, e.g. when the host resumes from a pause.
    pub fn reset_gravity_clock(&mut self, now: Instant) {
        self.drop_start = now;
    }

    fn step_down(&mut self) {
        if !self.piece.move_down(&self.board) {
            self.lock_piece();
        }
    }

    fn lock_piece(&mut self) {
        let outcome = self.piece.lock(&mut self.board);
        log::debug!(
            "locked {:?} at ({}, {}) rotation {}",
            self.piece.kind,
            self.piece.x,
            self.piece.y,
            self.piece.rotation
        );

        if outcome.cleared_rows > 0 {
            for _ in 0..outcome.cleared_rows {
                self.score += SCORE_PER_ROW;
                // an interval already under the floor stays put rather than rising to it
                let floor = MIN_DROP_INTERVAL_MS.min(self.drop_interval_ms);
                self.drop_interval_ms = (self.drop_interval_ms - DROP_INTERVAL_STEP_MS).max(floor);
            }
            self.lines_cleared += outcome.cleared_rows;
            self.events.push(GameEvent::RowsCleared(outcome.cleared_rows));
            self.events.push(GameEvent::ScoreChanged(self.score));
            log::info!(
                "cleared {} row(s): score {}, drop interval {:.2} ms",
                outcome.cleared_rows,
                self.score,
                self.drop_interval_ms
            );
        }

        if outcome.topped_out {
            self.game_over = true;
            self.events.push(GameEvent::SessionEnded { score: self.score });
            log::info!("game over with score {}", self.score);
            return;
        }

        let fresh = random_piece(&mut self.rng, self.board.width());
        self.piece = std::mem::replace(&mut self.next, fresh);
        self.events.push(GameEvent::NextPieceChanged(self.next.kind));
    }

    /// Full redraw: every board cell once, with the active piece's visible blocks
    /// drawn over it.
    pub fn render(&self, sink: &mut impl CellSink) {
        let piece_cells: Vec<(i32, i32)> = self.piece.cells().collect();
        for (y, row) in self.board.rows().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                let covered = piece_cells.contains(&(x as i32, y as i32));
                let cell = if covered {
                    Cell::Occupied(self.piece.color)
                } else {
                    cell
                };
                sink.draw_cell(x, y, cell);
            }
        }
    }

    /// Next piece as shown in the preview: rotation 0 and its colour.
    pub fn next_preview(&self) -> (&'static Rotation, u8) {
        (self.next.kind.rotation(0), self.next.color)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drop_interval(&self) -> Duration {
        Duration::from_secs_f64(self.drop_interval_ms / 1000.0)
    }

    pub fn drop_interval_ms(&self) -> f64 {
        self.drop_interval_ms
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> &Piece {
        &self.piece
    }
}

/// Uniform, independent draw over the seven shapes.
fn random_piece(rng: &mut Pcg32, board_width: usize) -> Piece {
    let kind = ShapeKind::from_index(rng.random_range(0..ShapeKind::ALL.len()));
    Piece::spawn(kind, board_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::fill_row_except;

    fn config() -> GameConfig {
        GameConfig {
            seed: 7,
            ..GameConfig::default()
        }
    }

    fn game_with(kind: ShapeKind, now: Instant) -> GameState {
        let mut game = GameState::new(&config(), now);
        game.piece = Piece::spawn(kind, game.board.width());
        game.drain_events();
        game
    }

    fn place(game: &mut GameState, kind: ShapeKind, rotation: usize, x: i32, y: i32) {
        game.piece = Piece {
            kind,
            color: kind.color_id(),
            rotation,
            x,
            y,
        };
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    struct Recorder(Vec<(usize, usize, Cell)>);

    impl CellSink for Recorder {
        fn draw_cell(&mut self, x: usize, y: usize, cell: Cell) {
            self.0.push((x, y, cell));
        }
    }

    #[test]
    fn new_session_defaults() {
        let game = GameState::new(&config(), Instant::now());
        assert_eq!(game.score(), 0);
        assert!(!game.is_game_over());
        assert!(approx(game.drop_interval_ms(), DEFAULT_DROP_INTERVAL_MS));
        assert_eq!((game.board().width(), game.board().height()), (10, 20));
        assert_eq!((game.piece().x, game.piece().y), (3, -2));
    }

    #[test]
    fn same_seed_same_sequence() {
        let now = Instant::now();
        let a = GameState::new(&config(), now);
        let b = GameState::new(&config(), now);
        assert_eq!(a.piece().kind, b.piece().kind);
        assert_eq!(a.next.kind, b.next.kind);
    }

    #[test]
    fn o_piece_drops_to_floor_and_locks() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::O, t0);
        let next_kind = game.next.kind;
        let step = Duration::from_millis(1001);
        // 20 moves from y=-2 to y=18, the 21st tick locks
        for i in 1..=21 {
            game.tick(t0 + step * i);
        }
        for (x, y) in [(3, 18), (4, 18), (3, 19), (4, 19)] {
            assert_eq!(game.board().get(x, y), Some(Cell::Occupied(ShapeKind::O.color_id())));
        }
        let occupied = game.board().rows().flatten().filter(|c| c.is_occupied()).count();
        assert_eq!(occupied, 4);
        assert_eq!(game.score(), 0);
        assert_eq!(game.lines_cleared(), 0);
        assert_eq!(game.piece().kind, next_kind);
        assert_eq!(game.piece().y, -2);
        assert!(matches!(game.drain_events().as_slice(), [GameEvent::NextPieceChanged(_)]));
    }

    #[test]
    fn gravity_never_fires_early() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::T, t0);
        game.tick(t0 + Duration::from_millis(1000));
        assert_eq!(game.piece().y, -2);
        game.tick(t0 + Duration::from_millis(1001));
        assert_eq!(game.piece().y, -1);
        // reference point moved to the drop
        game.tick(t0 + Duration::from_millis(1500));
        assert_eq!(game.piece().y, -1);
    }

    #[test]
    fn lateral_input_resets_gravity_clock() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::T, t0);
        game.apply(Command::MoveLeft, t0 + Duration::from_millis(900));
        game.tick(t0 + Duration::from_millis(1200));
        assert_eq!(game.piece().y, -2);
        game.apply(Command::RotateCw, t0 + Duration::from_millis(1800));
        game.tick(t0 + Duration::from_millis(2700));
        assert_eq!(game.piece().y, -2);
        game.tick(t0 + Duration::from_millis(2801));
        assert_eq!(game.piece().y, -1);
    }

    #[test]
    fn soft_drop_keeps_gravity_clock() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::T, t0);
        game.apply(Command::SoftDrop, t0 + Duration::from_millis(900));
        assert_eq!(game.piece().y, -1);
        game.tick(t0 + Duration::from_millis(1001));
        assert_eq!(game.piece().y, 0);
    }

    #[test]
    fn single_row_clear_scores_and_speeds_up() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::I, t0);
        fill_row_except(&mut game.board, 19, &[9]);
        // vertical I in column 9, bottom block fills (9, 19)
        place(&mut game, ShapeKind::I, 1, 7, 16);
        game.apply(Command::SoftDrop, t0);
        assert_eq!(game.score(), 10);
        assert!(approx(game.drop_interval_ms(), DEFAULT_DROP_INTERVAL_MS - 0.03));
        // the I's three upper blocks shifted down one row
        let i_color = Cell::Occupied(ShapeKind::I.color_id());
        for y in 17..20 {
            assert_eq!(game.board().get(9, y), Some(i_color));
        }
        assert_eq!(game.board().get(9, 16), Some(Cell::Empty));
        assert_eq!(game.board().get(0, 19), Some(Cell::Empty));
        assert!(game.board().rows().next().is_some_and(|r| r.iter().all(|c| !c.is_occupied())));
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::RowsCleared(1)));
        assert!(events.contains(&GameEvent::ScoreChanged(10)));
    }

    #[test]
    fn double_row_clear_compounds_per_row() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::O, t0);
        fill_row_except(&mut game.board, 18, &[0, 1]);
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, ShapeKind::O, 0, 0, 17);
        game.apply(Command::SoftDrop, t0);
        game.apply(Command::SoftDrop, t0);
        assert_eq!(game.score(), 20);
        assert_eq!(game.lines_cleared(), 2);
        assert!(approx(game.drop_interval_ms(), DEFAULT_DROP_INTERVAL_MS - 0.06));
        assert_eq!(game.board().rows().flatten().filter(|c| c.is_occupied()).count(), 0);
    }

    #[test]
    fn drop_interval_has_a_floor() {
        let t0 = Instant::now();
        let mut game = GameState::new(
            &GameConfig {
                drop_interval_ms: MIN_DROP_INTERVAL_MS + 0.01,
                ..config()
            },
            t0,
        );
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, ShapeKind::O, 0, 0, 18);
        game.apply(Command::SoftDrop, t0);
        assert!(approx(game.drop_interval_ms(), MIN_DROP_INTERVAL_MS));
    }

    #[test]
    fn drop_interval_below_floor_never_rises() {
        let t0 = Instant::now();
        let mut game = GameState::new(
            &GameConfig {
                drop_interval_ms: 10.0,
                ..config()
            },
            t0,
        );
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, ShapeKind::O, 0, 0, 18);
        game.apply(Command::SoftDrop, t0);
        assert_eq!(game.lines_cleared(), 1);
        assert!(approx(game.drop_interval_ms(), 10.0));
    }

    #[test]
    fn drop_interval_at_floor_stays_at_floor() {
        let t0 = Instant::now();
        let mut game = GameState::new(
            &GameConfig {
                drop_interval_ms: MIN_DROP_INTERVAL_MS,
                ..config()
            },
            t0,
        );
        fill_row_except(&mut game.board, 18, &[0, 1]);
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, ShapeKind::O, 0, 0, 18);
        game.apply(Command::SoftDrop, t0);
        assert_eq!(game.lines_cleared(), 2);
        assert!(approx(game.drop_interval_ms(), MIN_DROP_INTERVAL_MS));
    }

    #[test]
    fn lock_above_board_ends_session() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::O, t0);
        for y in 0..20 {
            game.board.set_cell(3, y, 1);
            game.board.set_cell(4, y, 1);
        }
        game.apply(Command::SoftDrop, t0);
        assert!(game.is_game_over());
        let events = game.drain_events();
        assert_eq!(events, vec![GameEvent::SessionEnded { score: 0 }]);

        let piece = game.piece().clone();
        let board = game.board().clone();
        game.apply(Command::MoveLeft, t0);
        game.apply(Command::SoftDrop, t0);
        game.tick(t0 + Duration::from_secs(60));
        assert_eq!(game.piece(), &piece);
        assert_eq!(game.board(), &board);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn restart_resets_session() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::O, t0);
        fill_row_except(&mut game.board, 19, &[0, 1]);
        place(&mut game, ShapeKind::O, 0, 0, 18);
        game.apply(Command::SoftDrop, t0);
        game.restart(t0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.lines_cleared(), 0);
        assert!(!game.is_game_over());
        assert!(approx(game.drop_interval_ms(), DEFAULT_DROP_INTERVAL_MS));
        assert_eq!(game.board(), &Board::new(10, 20));
    }

    #[test]
    fn render_covers_every_cell_with_piece_overlay() {
        let t0 = Instant::now();
        let mut game = game_with(ShapeKind::O, t0);
        place(&mut game, ShapeKind::O, 0, 3, -1);
        game.board.set_cell(0, 19, 2);
        let mut rec = Recorder(Vec::new());
        game.render(&mut rec);
        assert_eq!(rec.0.len(), 200);
        let color = ShapeKind::O.color_id();
        assert!(rec.0.contains(&(3, 0, Cell::Occupied(color))));
        assert!(rec.0.contains(&(4, 0, Cell::Occupied(color))));
        assert!(rec.0.contains(&(0, 19, Cell::Occupied(2))));
        assert!(rec.0.contains(&(5, 0, Cell::Empty)));
    }

    #[test]
    fn preview_is_rotation_zero_of_next() {
        let game = GameState::new(&config(), Instant::now());
        let (shape, color) = game.next_preview();
        assert_eq!(shape, game.next.kind.rotation(0));
        assert_eq!(color, game.next.kind.color_id());
    }
}
