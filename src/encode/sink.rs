use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::FrameRGBA;

/// Output container (and the codec that goes with it).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// WebM with VP9.
    #[default]
    WebM,
    /// Fragmented MP4 with H.264.
    Mp4,
}

impl Container {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Container {
    type Err = ReelError;

    fn from_str(s: &str) -> ReelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(Self::WebM),
            "mp4" => Ok(Self::Mp4),
            other => Err(ReelError::validation(format!(
                "unknown container '{other}' (expected webm or mp4)"
            ))),
        }
    }
}

/// Configuration provided to a [`FrameSink`] when a stream begins.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
}

/// An encoding stream: consumes frames, produces encoded byte chunks.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order.
/// Chunks produced so far stay available through [`FrameSink::take_chunks`] even when `end`
/// reports an error.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()>;
    /// Finalize the stream.
    fn end(&mut self) -> ReelResult<()>;
    /// Move out every encoded chunk produced so far.
    fn take_chunks(&mut self) -> Vec<Vec<u8>>;
    /// Extension of the file the chunks assemble into.
    fn file_extension(&self) -> &'static str;
}

/// In-memory sink for tests and debugging. Each pushed frame becomes one raw RGBA chunk.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    chunks: Vec<Vec<u8>>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` has run.
    pub fn ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.chunks.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        if self.cfg.is_none() {
            return Err(ReelError::encode("in-memory sink not started"));
        }
        self.frames.push((idx, frame.clone()));
        self.chunks.push(frame.data.clone());
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.ended = true;
        Ok(())
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.chunks)
    }

    fn file_extension(&self) -> &'static str {
        "rgba"
    }
}
