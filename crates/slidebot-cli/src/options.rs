use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use slidebot_core::{Preset, RunConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Auto-play a sliding-tile web game in headless Chrome
#[derive(Debug, Parser)]
#[command(name = "slidebot", version, about)]
pub struct Cli {
    /// Game URL (defaults to play2048.co)
    pub url: Option<String>,

    /// Maximum number of moves
    #[arg(long, value_parser = clap::value_parser!(u32).range(50..=1200))]
    pub moves: Option<u32>,

    /// Display refresh rate
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub fps: Option<u32>,

    /// Initial move order
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Do not probe other directions when a move has no effect
    #[arg(long)]
    pub no_escape: bool,

    /// JSON file with run options; flags take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where captured frames are written
    #[arg(long, value_name = "DIR")]
    pub frames_dir: Option<PathBuf>,

    /// Do not write frames to disk
    #[arg(long, conflicts_with = "frames_dir")]
    pub no_frames: bool,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Chrome or Chromium executable
    #[arg(long, value_name = "PATH")]
    pub chrome: Option<PathBuf>,

    /// Play an in-process board instead of a web page
    #[arg(long)]
    pub simulate: bool,

    /// Tile spawn seed for --simulate
    #[arg(long, default_value_t = 2048)]
    pub seed: u64,

    /// Skip the live terminal panel
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    UpLeft,
    LeftDown,
    Clockwise,
}

impl From<StrategyArg> for Preset {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::UpLeft => Preset::UpLeft,
            StrategyArg::LeftDown => Preset::LeftDown,
            StrategyArg::Clockwise => Preset::Clockwise,
        }
    }
}

impl Cli {
    /// Defaults, then the config file, then command-line flags
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RunConfig::default(),
        };

        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(moves) = self.moves {
            config.max_moves = moves as usize;
        }
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if let Some(strategy) = self.strategy {
            config.preset = strategy.into();
        }
        if self.no_escape {
            config.escape = false;
        }
        Ok(config)
    }

    /// Frame directory, unless frames are disabled
    pub fn frames_dir(&self) -> Option<PathBuf> {
        if self.no_frames {
            return None;
        }
        self.frames_dir.clone().or_else(|| {
            Some(
                dirs::data_local_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("slidebot")
                    .join("frames"),
            )
        })
    }
}

fn load_config(path: &Path) -> Result<RunConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["slidebot"]);
        let config = cli.run_config().unwrap();
        assert_eq!(config, RunConfig::default());
        assert!(cli.frames_dir().unwrap().ends_with("slidebot/frames"));
    }

    #[test]
    fn test_flags_override() {
        let cli = Cli::parse_from([
            "slidebot",
            "https://example.com/2048",
            "--moves",
            "300",
            "--fps",
            "6",
            "--strategy",
            "left-down",
            "--no-escape",
            "--no-frames",
        ]);
        let config = cli.run_config().unwrap();
        assert_eq!(config.url, "https://example.com/2048");
        assert_eq!(config.max_moves, 300);
        assert_eq!(config.fps, 6);
        assert_eq!(config.preset, Preset::LeftDown);
        assert!(!config.escape);
        assert!(cli.frames_dir().is_none());
    }

    #[test]
    fn test_out_of_range_moves_rejected() {
        assert!(Cli::try_parse_from(["slidebot", "--moves", "10"]).is_err());
        assert!(Cli::try_parse_from(["slidebot", "--moves", "5000"]).is_err());
        assert!(Cli::try_parse_from(["slidebot", "--fps", "0"]).is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_moves": 900, "fps": 2, "preset": "clockwise" }}"#).unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["slidebot", "--config", &path, "--fps", "5"]);
        let config = cli.run_config().unwrap();
        assert_eq!(config.max_moves, 900);
        assert_eq!(config.fps, 5);
        assert_eq!(config.preset, Preset::Clockwise);
    }

    #[test]
    fn test_bad_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = Cli::parse_from(["slidebot", "--config", &path]);
        let err = cli.run_config().unwrap_err();
        assert!(err.to_string().starts_with("invalid config"));
    }
}
