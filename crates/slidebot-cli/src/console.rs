//! Terminal panel and frame directory output.

use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use serde::{Deserialize, Serialize};
use slidebot_core::{ErrorCategory, FrameSink};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::warn;

/// Name of the per-run frame index inside the frame directory
pub const INDEX_FILE: &str = "frames.jsonl";

/// One line of the frame index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub index: usize,
    pub caption: String,
    pub file: String,
    pub elapsed_ms: u64,
}

struct FrameDir {
    path: PathBuf,
    index: BufWriter<File>,
}

/// Redraws the run log on the terminal and saves frames to disk
pub struct ConsoleSink {
    frames: Option<FrameDir>,
    panel: bool,
    started: Instant,
    frame_count: usize,
    caption: String,
}

impl ConsoleSink {
    /// `frames_dir` is created if needed; `panel` enables terminal redraws
    pub fn create(frames_dir: Option<&Path>, panel: bool) -> Result<Self> {
        let frames = match frames_dir {
            Some(path) => {
                fs::create_dir_all(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                let index_path = path.join(INDEX_FILE);
                let index = File::create(&index_path)
                    .with_context(|| format!("failed to create {}", index_path.display()))?;
                Some(FrameDir {
                    path: path.to_path_buf(),
                    index: BufWriter::new(index),
                })
            }
            None => None,
        };

        Ok(Self {
            frames,
            panel,
            started: Instant::now(),
            frame_count: 0,
            caption: String::new(),
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn save_frame(&mut self, image: &[u8], caption: &str) -> io::Result<()> {
        let Some(dir) = self.frames.as_mut() else {
            return Ok(());
        };
        let file = format!("frame-{:04}.{}", self.frame_count, extension(image));
        fs::write(dir.path.join(&file), image)?;

        let record = FrameRecord {
            index: self.frame_count,
            caption: caption.to_string(),
            file,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
        };
        let line = serde_json::to_string(&record).map_err(io::Error::from)?;
        writeln!(dir.index, "{}", line)?;
        dir.index.flush()
    }

    fn draw(&self, lines: &[String]) -> io::Result<()> {
        let mut stdout = io::stdout();
        queue!(
            stdout,
            MoveTo(0, 0),
            Clear(ClearType::All),
            SetForegroundColor(Color::Cyan),
            Print("slidebot"),
            ResetColor,
            Print(format!("  {}  ({} frames)\r\n\r\n", self.caption, self.frame_count)),
        )?;
        for line in lines {
            queue!(stdout, Print(line), Print("\r\n"))?;
        }
        stdout.flush()
    }
}

/// File extension for captured bytes
fn extension(image: &[u8]) -> &'static str {
    if image.starts_with(b"\x89PNG") {
        "png"
    } else {
        "txt"
    }
}

impl FrameSink for ConsoleSink {
    fn publish_frame(&mut self, image: &[u8], caption: &str) {
        if let Err(e) = self.save_frame(image, caption) {
            warn!(error = %e, "failed to save frame");
        }
        self.frame_count += 1;
        self.caption = caption.to_string();
    }

    fn publish_log(&mut self, lines: &[String]) {
        if !self.panel {
            return;
        }
        if let Err(e) = self.draw(lines) {
            warn!(error = %e, "failed to draw log panel");
        }
    }

    fn report_error(&mut self, category: ErrorCategory, detail: &str) {
        if !self.panel {
            return;
        }
        let mut stdout = io::stdout();
        let drawn = queue!(
            stdout,
            Print("\r\n"),
            SetForegroundColor(Color::Red),
            Print(format!("{}\r\n", category)),
            ResetColor,
            Print(format!("{}\r\n", detail)),
        )
        .and_then(|_| stdout.flush());
        if let Err(e) = drawn {
            warn!(error = %e, "failed to draw error");
        }
    }
}
