//! The control panel: selection state, the frame scheduler and the recorder.

use std::path::Path;

use crate::animation::preset::Preset;
use crate::config::StudioConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::FrameSink;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::intake::file::{IntakeFile, SelectedImage, first_image};
use crate::record::download::DownloadTarget;
use crate::record::recorder::{CaptureStatus, Recorder, RecordingOutcome};
use crate::render::backend::{
    BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
use crate::scene::composer::Scene;

/// Recording length in whole seconds, between [`RecordDuration::MIN`] and
/// [`RecordDuration::MAX`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecordDuration(u32);

impl RecordDuration {
    /// Shortest allowed recording.
    pub const MIN: u32 = 3;
    /// Longest allowed recording.
    pub const MAX: u32 = 15;

    /// Validate `secs`.
    pub fn new(secs: u32) -> ReelResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&secs) {
            return Err(ReelError::validation(format!(
                "recording duration must be {}..={} seconds, got {secs}",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(secs))
    }

    /// Seconds.
    pub fn secs(self) -> u32 {
        self.0
    }
}

impl Default for RecordDuration {
    fn default() -> Self {
        Self(5)
    }
}

/// Owns everything the user can change and drives rendering and recording from it.
///
/// The scene exists exactly when an image is selected. Selecting another image or preset
/// composes a fresh scene, so the animation restarts at `t = 0`.
pub struct Studio {
    config: StudioConfig,
    fps: Fps,
    backend: Box<dyn RenderBackend>,
    preset: Preset,
    duration: RecordDuration,
    scene: Option<Scene>,
    recorder: Recorder,
}

impl Studio {
    /// Build a studio rendering with the software backend.
    pub fn new(config: StudioConfig) -> ReelResult<Self> {
        config.validate()?;
        let fps = config.fps()?;
        let backend = create_backend(
            BackendKind::Cpu,
            &RenderSettings {
                background: config.background,
            },
        )?;
        let recorder = Recorder::new(DownloadTarget::new(&config.download_dir));
        Ok(Self {
            config,
            fps,
            backend,
            preset: Preset::default(),
            duration: RecordDuration::default(),
            scene: None,
            recorder,
        })
    }

    /// Swap the renderer.
    pub fn with_backend(mut self, backend: Box<dyn RenderBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Accept a drop. Only the first file counts, and only if it declares an image type;
    /// anything else is ignored and nothing changes. Returns whether the image changed.
    pub fn drop_files(&mut self, files: &[IntakeFile]) -> ReelResult<bool> {
        let Some(file) = first_image(files) else {
            tracing::debug!(
                count = files.len(),
                mime = files.first().map(|f| f.mime.as_str()),
                "ignored drop without an image"
            );
            return Ok(false);
        };
        let image = SelectedImage::load(file)?;
        self.select_image(image);
        Ok(true)
    }

    /// Accept a file chosen in a picker. The declared type comes from the extension.
    pub fn pick_file(&mut self, path: impl AsRef<Path>) -> ReelResult<bool> {
        self.drop_files(&[IntakeFile::from_path(path.as_ref())])
    }

    /// Map `image` onto the plane, replacing any previous one.
    pub fn select_image(&mut self, image: SelectedImage) {
        tracing::info!(
            image = %image.id,
            source = %image.source.display(),
            width = image.texture.width,
            height = image.texture.height,
            "image selected"
        );
        self.scene = Some(Scene::compose(&image, self.preset));
    }

    /// Drop the current image ("Change Image"). An active recording is stopped first.
    pub fn clear_image(&mut self) -> Option<RecordingOutcome> {
        let outcome = self.stop_recording();
        if let Some(scene) = self.scene.take() {
            tracing::info!(image = %scene.image().id, "image cleared");
        }
        outcome
    }

    /// Change the animation. Returns `false` when `preset` is already active.
    pub fn set_preset(&mut self, preset: Preset) -> bool {
        if preset == self.preset {
            return false;
        }
        tracing::info!(from = %self.preset, to = %preset, "preset changed");
        self.preset = preset;
        if let Some(scene) = self.scene.as_mut() {
            *scene = Scene::compose(scene.image(), preset);
        }
        true
    }

    /// Change the recording length used by the next recording.
    pub fn set_duration(&mut self, secs: u32) -> ReelResult<()> {
        self.duration = RecordDuration::new(secs)?;
        Ok(())
    }

    /// Drag across the viewport by `(dx, dy)` pixels. Returns `false` when there is no scene
    /// or the preset owns the camera.
    pub fn orbit_drag(&mut self, dx: f32, dy: f32) -> bool {
        let height = self.config.canvas.height;
        self.scene
            .as_mut()
            .is_some_and(|scene| scene.orbit_drag(dx, dy, height))
    }

    /// One frame: render the current pose, hand it to the recorder, then advance the clock by
    /// `delta_secs`. Returns `None` when no image is selected.
    ///
    /// The recorder samples by elapsed time, so any tick rate yields a recording of the
    /// configured length.
    pub fn tick(&mut self, delta_secs: f64) -> ReelResult<Option<FrameRGBA>> {
        Ok(self.step(delta_secs)?.map(|(frame, _)| frame))
    }

    fn step(&mut self, delta_secs: f64) -> ReelResult<Option<(FrameRGBA, CaptureStatus)>> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(None);
        };
        let frame = self.backend.render_scene(scene, self.config.canvas)?;
        let status = self.recorder.capture(&frame, delta_secs);
        if let CaptureStatus::Finished(outcome) = &status {
            tracing::info!(
                delivered = outcome.is_some(),
                state = ?self.recorder.state(),
                "recording finished"
            );
        }
        scene.advance(delta_secs);
        Ok(Some((frame, status)))
    }

    /// Start recording into `sink`. Returns `Ok(false)` when a recording is already running.
    pub fn record(&mut self, sink: Box<dyn FrameSink>) -> ReelResult<bool> {
        if self.scene.is_none() {
            return Err(ReelError::validation("select an image before recording"));
        }
        self.recorder
            .start(self.config.canvas, self.fps, self.duration.secs(), sink)
    }

    /// Start recording through the system `ffmpeg` with the configured container.
    pub fn record_to_file(&mut self) -> ReelResult<bool> {
        let bg = self.config.background.outer;
        let sink = FfmpegSink::new(FfmpegSinkOpts {
            container: self.config.container,
            video_bitrate: self.config.video_bitrate,
            bg_rgba: [bg.r, bg.g, bg.b, 255],
        });
        self.record(Box::new(sink))
    }

    /// Tick at the capture frame rate until the running recording finishes.
    ///
    /// Returns the delivered recording, or `None` when nothing was recording or nothing could
    /// be delivered. A render failure stops the recording (delivering what was captured) and is
    /// returned.
    pub fn run_recording(&mut self) -> ReelResult<Option<RecordingOutcome>> {
        let dt = self.fps.frame_duration_secs();
        while self.recorder.is_recording() {
            match self.step(dt) {
                Ok(Some((_, CaptureStatus::Finished(outcome)))) => return Ok(outcome),
                Ok(Some(_)) => {}
                Ok(None) => return Ok(self.stop_recording()),
                Err(e) => {
                    tracing::error!(error = %e, "rendering failed during recording");
                    self.recorder.stop();
                    return Err(e);
                }
            }
        }
        Ok(None)
    }

    /// Stop an active recording early.
    pub fn stop_recording(&mut self) -> Option<RecordingOutcome> {
        self.recorder.stop()
    }

    /// `true` while a recording is active.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// `true` when an image is selected and no recording is running.
    pub fn can_record(&self) -> bool {
        self.scene.is_some() && !self.is_recording()
    }

    /// Elapsed animation time of the current scene, 0 without one.
    pub fn elapsed(&self) -> f64 {
        self.scene.as_ref().map_or(0.0, Scene::elapsed)
    }

    /// Active preset.
    pub fn preset(&self) -> Preset {
        self.preset
    }

    /// Recording length for the next recording.
    pub fn duration(&self) -> RecordDuration {
        self.duration
    }

    /// Selected image, if any.
    pub fn image(&self) -> Option<&SelectedImage> {
        self.scene.as_ref().map(Scene::image)
    }

    /// Current scene, if an image is selected.
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// The recorder.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Output canvas size.
    pub fn canvas(&self) -> Canvas {
        self.config.canvas
    }

    /// Capture frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Active configuration.
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio.rs"]
mod tests;
