//! depthreel turns a still image into a short animated 3D clip.
//!
//! The image is mapped onto a subdivided plane, animated by one of four parametric presets,
//! rendered with a software rasterizer and streamed to the system `ffmpeg` binary for WebM or
//! MP4 output.
//!
//! # Pipeline overview
//!
//! 1. **Intake**: a dropped or picked file becomes a [`SelectedImage`] (decoded, premultiplied).
//! 2. **Compose**: image + [`Preset`] -> [`Scene`] (plane mesh, camera, lights, optional orbit).
//! 3. **Tick**: [`Studio::tick`] renders the current pose to a [`FrameRGBA`] and advances the clock.
//! 4. **Record**: while recording, frames go to a [`FrameSink`] at fixed sample points of the
//!    elapsed time; the [`Recorder`] stops when the duration has elapsed and delivers one file
//!    through a [`DownloadTarget`].
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Premultiplied RGBA8** end-to-end: renderers output premultiplied pixels.
//! - **Single-threaded scene**: only the renderer fans out (row bands on `rayon`), and it only
//!   reads the scene.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod config;
mod encode;
mod foundation;
mod intake;
mod logging;
mod record;
mod render;
mod scene;
mod studio;

pub use animation::clock::ElapsedClock;
pub use animation::mesh::{
    AnimatedMesh, BOUNDING_BOX, GRID_SEGMENTS, Material, MeshTransform, PlaneGeometry, plane_size,
};
pub use animation::preset::{Preset, wave_height, zoom_scale};
pub use config::{AspectPreset, LoggingConfig, StudioConfig};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::sink::{Container, FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Fps, FrameIndex, Mat4, Quat, Rgb8, Vec2, Vec3, Vec4};
pub use foundation::error::{ReelError, ReelResult};
pub use intake::file::{ImageRef, IntakeFile, SelectedImage, first_image};
pub use intake::texture::{Texture, decode_texture};
pub use logging::init_logging;
pub use record::download::{DEFAULT_PREFIX, DownloadTarget};
pub use record::recorder::{CaptureStatus, Recorder, RecorderState, RecordingOutcome};
pub use render::backend::{
    Background, BackendKind, FrameRGBA, RenderBackend, RenderSettings, create_backend,
};
pub use render::cpu::{CpuBackend, CpuBackendOpts};
pub use scene::camera::{Camera, CameraController};
pub use scene::composer::Scene;
pub use scene::lights::{Light, LightingRig};
pub use scene::orbit::OrbitControls;
pub use studio::{RecordDuration, Studio};
