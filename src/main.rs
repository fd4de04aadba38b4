//! Tetrotui: classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod game;
mod input;
mod piece;
mod shapes;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use thiserror::Error;

const MIN_WIDTH: u16 = 4;
const MAX_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 4;
const MAX_HEIGHT: u16 = 60;

/// Options derived from CLI that affect the simulation (board size, gravity, piece sequence).
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub width: u16,
    pub height: u16,
    pub drop_interval_ms: f64,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: board::DEFAULT_COLS,
            height: board::DEFAULT_ROWS,
            drop_interval_ms: game::DEFAULT_DROP_INTERVAL_MS,
            seed: 0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("board width {0} out of range ({min}..={max})", min = MIN_WIDTH, max = MAX_WIDTH)]
    Width(u16),
    #[error("board height {0} out of range ({min}..={max})", min = MIN_HEIGHT, max = MAX_HEIGHT)]
    Height(u16),
    #[error("drop interval must be a positive number of milliseconds, got {0}")]
    DropInterval(f64),
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let config = Self {
            width: args.width,
            height: args.height,
            drop_interval_ms: args.drop_ms,
            seed: args.seed.unwrap_or_else(rand::random),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&self.width) {
            return Err(ConfigError::Width(self.width));
        }
        if !(MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height) {
            return Err(ConfigError::Height(self.height));
        }
        if !self.drop_interval_ms.is_finite() || self.drop_interval_ms <= 0.0 {
            return Err(ConfigError::DropInterval(self.drop_interval_ms));
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(err) => {
            log::warn!("theme not loaded, using defaults: {}", err);
            theme::Theme::default()
        }
    };
    let config = GameConfig::from_args(&args).context("invalid game options")?;
    let mut app = App::new(&args, &config, theme);
    app.run()?;
    Ok(())
}

/// Route `log` output to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("couldn't create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("couldn't initialise logger")?;
    Ok(())
}

/// Classic falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "tetrotui",
    version,
    about = "Classic falling-block puzzle in the terminal. Complete horizontal rows to clear them and score.",
    long_about = "Tetrotui is a terminal take on the classic falling-block puzzle.\n\n\
        Pieces fall under gravity; steer and rotate them so they lock into complete rows. \
        Every cleared row scores 10 points and makes gravity slightly faster. The game ends \
        when a piece locks above the top of the board.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move    Up or k  Rotate    Down or j  Soft drop\n  \
        P  Pause    R  Restart (after game over)    Q / Esc  Quit"
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value_t = board::DEFAULT_COLS, value_name = "COLS")]
    pub width: u16,

    /// Playfield height in rows.
    #[arg(long, default_value_t = board::DEFAULT_ROWS, value_name = "ROWS")]
    pub height: u16,

    /// Initial gravity interval in milliseconds.
    #[arg(long, default_value_t = game::DEFAULT_DROP_INTERVAL_MS, value_name = "MS")]
    pub drop_ms: f64,

    /// Seed for the piece sequence (random if not set).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write logs to this file (level from RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable the game-over fade.
    #[arg(long)]
    pub no_animation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
