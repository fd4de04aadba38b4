//! App: terminal init, main loop, tick and key handling.

use crate::game::{GameEvent, GameState};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// Frame budget for the render/poll loop (~60 FPS). Gravity is checked once per frame.
const FRAME_DURATION: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    theme: Theme,
    state: GameState,
    screen: Screen,
    paused: bool,
    no_animation: bool,
    /// TachyonFX fade over the board once the session has ended.
    game_over_effect: Option<Effect>,
    /// Last time the effect was processed (for delta).
    effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(args: &Args, config: &GameConfig, theme: Theme) -> Self {
        Self {
            theme,
            state: GameState::new(config, Instant::now()),
            screen: Screen::Playing,
            paused: false,
            no_animation: args.no_animation,
            game_over_effect: None,
            effect_process_time: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        // Restore
        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    &self.state,
                    &self.theme,
                    self.screen,
                    self.paused,
                    (!self.no_animation).then_some(&mut self.game_over_effect),
                    &mut self.effect_process_time,
                    now,
                );
            })?;

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Only presses; repeats arrive as further presses from the terminal.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.apply_action(key_to_action(key), Instant::now()) == Flow::Quit {
                            return Ok(());
                        }
                    }
                }
            }

            if self.screen == Screen::Playing && !self.paused && !self.state.is_game_over() {
                self.state.tick(Instant::now());
            }
            self.process_events();
        }
    }

    fn apply_action(&mut self, action: Action, now: Instant) -> Flow {
        match (self.screen, action) {
            (_, Action::Quit) => return Flow::Quit,
            (Screen::Playing, Action::Pause) => {
                self.paused = !self.paused;
                if !self.paused {
                    self.state.reset_gravity_clock(now);
                }
            }
            (Screen::Playing, Action::Game(command)) if !self.paused => {
                self.state.apply(command, now);
            }
            (Screen::GameOver, Action::Restart) => self.reset_game(now),
            _ => {}
        }
        Flow::Continue
    }

    fn reset_game(&mut self, now: Instant) {
        self.state.restart(now);
        self.screen = Screen::Playing;
        self.paused = false;
        self.game_over_effect = None;
        self.effect_process_time = None;
    }

    fn process_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::SessionEnded { score } => {
                    log::info!("session ended, final score {}", score);
                    self.screen = Screen::GameOver;
                    self.paused = false;
                }
                GameEvent::NextPieceChanged(kind) => {
                    log::debug!("active {:?}, next {:?}", self.state.piece().kind, kind);
                }
                GameEvent::RowsCleared(rows) => log::debug!("{} row(s) cleared", rows),
                GameEvent::ScoreChanged(score) => log::debug!("score {}", score),
            }
        }
    }
}
