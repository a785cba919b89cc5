//! Studio configuration.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::encode::sink::Container;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::Background;

/// Output formats matching the usual social placements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectPreset {
    /// 9:16, stories and reels.
    Story,
    /// 1:1, feed posts.
    Square,
    /// 16:9, video posts.
    #[default]
    Landscape,
}

impl AspectPreset {
    /// Every preset, narrow to wide.
    pub const ALL: [Self; 3] = [Self::Story, Self::Square, Self::Landscape];

    /// Canvas size rendered for this format.
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Story => Canvas {
                width: 720,
                height: 1280,
            },
            Self::Square => Canvas {
                width: 720,
                height: 720,
            },
            Self::Landscape => Canvas {
                width: 1280,
                height: 720,
            },
        }
    }

    /// Ratio label, e.g. `9:16`.
    pub fn ratio(self) -> &'static str {
        match self {
            Self::Story => "9:16",
            Self::Square => "1:1",
            Self::Landscape => "16:9",
        }
    }
}

/// Everything the studio reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Rendered canvas size.
    pub canvas: Canvas,

    /// Capture frame rate.
    pub fps: u32,

    /// Output container.
    pub container: Container,

    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,

    /// Directory recordings are delivered into.
    pub download_dir: PathBuf,

    /// Backdrop behind the plane.
    pub background: Background,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "depthreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: AspectPreset::default().canvas(),
            fps: 30,
            container: Container::WebM,
            video_bitrate: 5_000_000,
            download_dir: PathBuf::from("."),
            background: Background::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl StudioConfig {
    /// Load and validate a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| ReelError::serde(format!("config '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings no recording could be produced with.
    pub fn validate(&self) -> ReelResult<()> {
        self.canvas.validate()?;
        if self.fps == 0 {
            return Err(ReelError::validation("fps must be > 0"));
        }
        if self.video_bitrate == 0 {
            return Err(ReelError::validation("video_bitrate must be > 0"));
        }
        Ok(())
    }

    /// Capture frame rate as a rational.
    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }
}
