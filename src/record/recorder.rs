use std::path::PathBuf;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::ReelResult;
use crate::record::download::DownloadTarget;
use crate::render::backend::FrameRGBA;

/// Lifecycle of the recorder. Only the recorder moves between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecorderState {
    /// Ready to start.
    Idle,
    /// Capturing frames into an open encoding stream.
    Recording,
    /// Closing the stream and assembling the download.
    Finalizing,
    /// The last session failed to start or ended with an error. Ready to start again.
    Failed,
}

/// A delivered recording.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingOutcome {
    /// Where the file was written.
    pub path: PathBuf,
    /// Frames captured.
    pub frames: u64,
    /// Recording time covered when the session ended.
    pub elapsed_secs: f64,
    /// File size in bytes.
    pub bytes: u64,
    /// Encoded chunks the file was assembled from.
    pub chunks: usize,
    /// Error that cut the session short, if any. The file still holds what was captured.
    pub error: Option<String>,
}

/// What one call to [`Recorder::capture`] did.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureStatus {
    /// Not recording; the frame was ignored.
    Idle,
    /// The session continues.
    Captured {
        /// Samples this frame was pushed for. 0 when the tick fell between sample points,
        /// more than 1 when a long tick skipped some.
        pushed: u64,
        /// Samples left before the timer expires.
        remaining: u64,
    },
    /// The session ended with this frame. `None` when nothing could be delivered.
    Finished(Option<RecordingOutcome>),
}

/// Slack when comparing accumulated tick time against sample points and the deadline.
const TIME_EPS: f64 = 1e-9;

struct RecordingSession {
    sink: Box<dyn FrameSink>,
    frame_secs: f64,
    duration_secs: f64,
    deadline_frames: u64,
    elapsed_secs: f64,
    captured: u64,
}

impl RecordingSession {
    /// Presentation time of the next sample.
    fn next_sample_secs(&self) -> f64 {
        self.captured as f64 * self.frame_secs
    }

    /// Push `frame` for every sample due by the current elapsed time, or for every sample
    /// left when `fill` is set.
    fn catch_up(&mut self, frame: &FrameRGBA, fill: bool) -> ReelResult<()> {
        while self.captured < self.deadline_frames
            && (fill || self.next_sample_secs() <= self.elapsed_secs + TIME_EPS)
        {
            self.sink.push_frame(FrameIndex(self.captured), frame)?;
            self.captured += 1;
        }
        Ok(())
    }
}

/// Captures rendered frames into an encoding stream for a fixed duration and delivers the
/// assembled file.
pub struct Recorder {
    state: RecorderState,
    session: Option<RecordingSession>,
    downloads: DownloadTarget,
    last_outcome: Option<RecordingOutcome>,
    last_error: Option<String>,
}

impl Recorder {
    /// A recorder delivering into `downloads`.
    pub fn new(downloads: DownloadTarget) -> Self {
        Self {
            state: RecorderState::Idle,
            session: None,
            downloads,
            last_outcome: None,
            last_error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// `true` while a session is open or being finalized.
    pub fn is_recording(&self) -> bool {
        matches!(
            self.state,
            RecorderState::Recording | RecorderState::Finalizing
        )
    }

    /// Samples left before the timer expires, if recording.
    pub fn remaining_frames(&self) -> Option<u64> {
        self.session
            .as_ref()
            .map(|s| s.deadline_frames.saturating_sub(s.captured))
    }

    /// Most recent delivered recording.
    pub fn last_outcome(&self) -> Option<&RecordingOutcome> {
        self.last_outcome.as_ref()
    }

    /// Error message from the most recent session, if it failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Where recordings are delivered.
    pub fn downloads(&self) -> &DownloadTarget {
        &self.downloads
    }

    /// Open `sink` for a `canvas`-sized stream at `fps` and arm a timer of `duration_secs`.
    ///
    /// The stream gets one sample every `1 / fps` seconds of recording time, so a finished
    /// recording always holds `duration_secs × fps` frames whatever rate the host ticks at.
    ///
    /// Returns `Ok(false)` without touching anything when a session is already active. If the
    /// stream cannot be opened the recorder moves to [`RecorderState::Failed`], logs, and
    /// returns the error; nothing is delivered.
    pub fn start(
        &mut self,
        canvas: Canvas,
        fps: Fps,
        duration_secs: u32,
        mut sink: Box<dyn FrameSink>,
    ) -> ReelResult<bool> {
        if self.is_recording() {
            tracing::debug!(state = ?self.state, "start ignored: already recording");
            return Ok(false);
        }

        let deadline_frames = fps.secs_to_frames(duration_secs).max(1);
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        };
        if let Err(e) = sink.begin(cfg) {
            tracing::error!(error = %e, "could not start recording");
            self.state = RecorderState::Failed;
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        tracing::info!(
            width = canvas.width,
            height = canvas.height,
            fps = fps.as_f64(),
            duration_secs,
            deadline_frames,
            "recording started"
        );
        self.session = Some(RecordingSession {
            sink,
            frame_secs: fps.frame_duration_secs(),
            duration_secs: f64::from(duration_secs),
            deadline_frames,
            elapsed_secs: 0.0,
            captured: 0,
        });
        self.last_error = None;
        self.state = RecorderState::Recording;
        Ok(true)
    }

    /// Feed the frame rendered for the current recording time, then advance that time by
    /// `delta_secs`.
    ///
    /// The frame is pushed once for every sample point it covers. When the advance reaches
    /// the duration, the samples still missing are filled with this frame and the recording
    /// finalizes. Negative and non-finite deltas count as zero.
    pub fn capture(&mut self, frame: &FrameRGBA, delta_secs: f64) -> CaptureStatus {
        if self.state != RecorderState::Recording {
            return CaptureStatus::Idle;
        }
        let Some(session) = self.session.as_mut() else {
            self.state = RecorderState::Idle;
            return CaptureStatus::Idle;
        };

        let before = session.captured;
        if let Err(e) = session.catch_up(frame, false) {
            tracing::warn!(error = %e, frame = session.captured, "frame capture failed; finalizing early");
            return CaptureStatus::Finished(self.finalize(Some(e.to_string())));
        }

        if delta_secs.is_finite() && delta_secs > 0.0 {
            session.elapsed_secs += delta_secs;
        }
        if session.elapsed_secs + TIME_EPS >= session.duration_secs {
            // Ticks coarser than a sample leave the last points for this frame.
            let error = session.catch_up(frame, true).err().map(|e| {
                tracing::warn!(error = %e, frame = session.captured, "frame capture failed; finalizing early");
                e.to_string()
            });
            return CaptureStatus::Finished(self.finalize(error));
        }

        CaptureStatus::Captured {
            pushed: session.captured - before,
            remaining: session.deadline_frames - session.captured,
        }
    }

    /// Recording time elapsed in the active session.
    pub fn elapsed_secs(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.elapsed_secs)
    }

    /// Stop before the timer expires. Returns the delivered recording, if any.
    pub fn stop(&mut self) -> Option<RecordingOutcome> {
        if self.state != RecorderState::Recording {
            return None;
        }
        tracing::info!("recording stopped early");
        self.finalize(None)
    }

    fn finalize(&mut self, mut error: Option<String>) -> Option<RecordingOutcome> {
        self.state = RecorderState::Finalizing;
        let Some(mut session) = self.session.take() else {
            self.state = RecorderState::Idle;
            return None;
        };

        if let Err(e) = session.sink.end() {
            tracing::error!(error = %e, "encoding stream failed to finalize");
            error.get_or_insert_with(|| e.to_string());
        }

        let chunks = session.sink.take_chunks();
        let bytes: u64 = chunks.iter().map(|c| c.len() as u64).sum();
        let outcome = if bytes == 0 {
            tracing::warn!(frames = session.captured, "no encoded data; nothing delivered");
            None
        } else {
            match self
                .downloads
                .deliver(&chunks, session.sink.file_extension())
            {
                Ok(path) => {
                    tracing::info!(
                        path = %path.display(),
                        frames = session.captured,
                        elapsed_secs = session.elapsed_secs,
                        bytes,
                        chunks = chunks.len(),
                        "recording delivered"
                    );
                    Some(RecordingOutcome {
                        path,
                        frames: session.captured,
                        elapsed_secs: session.elapsed_secs,
                        bytes,
                        chunks: chunks.len(),
                        error: error.clone(),
                    })
                }
                Err(e) => {
                    tracing::error!(error = %e, "could not deliver recording");
                    error.get_or_insert_with(|| e.to_string());
                    None
                }
            }
        };

        self.state = if error.is_some() {
            RecorderState::Failed
        } else {
            RecorderState::Idle
        };
        self.last_error = error;
        if outcome.is_some() {
            self.last_outcome = outcome.clone();
        }
        outcome
    }
}

#[cfg(test)]
#[path = "../../tests/unit/record/recorder.rs"]
mod tests;
