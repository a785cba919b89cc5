use std::io::Read;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{Container, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;

const STDOUT_CHUNK_BYTES: usize = 64 * 1024;

type Drain<T> = JoinHandle<std::io::Result<T>>;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Container/codec pair.
    pub container: Container,
    /// Target video bitrate in bits per second.
    pub video_bitrate: u32,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            container: Container::WebM,
            video_bitrate: 5_000_000,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Spawns the system `ffmpeg`, streams raw frames to its stdin and collects the encoded
/// container bytes from its stdout as chunks.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_drain: Option<Drain<Vec<Vec<u8>>>>,
    stderr_drain: Option<Drain<Vec<u8>>>,

    chunks: Vec<Vec<u8>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink. Nothing is spawned until [`FrameSink::begin`].
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stdout_drain: None,
            stderr_drain: None,
            chunks: Vec::new(),
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        // yuv420p output needs even dimensions.
        let canvas = Canvas {
            width: cfg.width,
            height: cfg.height,
        };
        canvas.validate()?;
        let frame_bytes = canvas
            .rgba_len()
            .ok_or_else(|| ReelError::validation("ffmpeg sink frame size overflows"))?;
        if self.child.is_some() {
            return Err(ReelError::capture("ffmpeg sink already started"));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelError::capture(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque in push_frame.
        cmd.args([
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0", "-an"]);
        push_output_codec(&mut cmd, self.opts.container, self.opts.video_bitrate);
        cmd.arg("pipe:1");

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReelError::capture("failed to open ffmpeg stdin (unexpected)"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::capture("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::capture("failed to open ffmpeg stderr (unexpected)"))?;

        let stdout_drain = spawn_stdout_drain(stdout);
        let stderr_drain = spawn_stderr_drain(stderr);

        tracing::debug!(
            container = %self.opts.container,
            width = cfg.width,
            height = cfg.height,
            "spawned ffmpeg"
        );

        self.scratch = vec![0u8; frame_bytes];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_drain = Some(stdout_drain);
        self.stderr_drain = Some(stderr_drain);
        self.chunks.clear();
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(ReelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(ReelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        self.cfg = None;

        let (chunks, result) = finish_encoder(
            &mut child,
            self.stdout_drain.take(),
            self.stderr_drain.take(),
        );
        self.chunks.extend(chunks);
        result
    }

    fn take_chunks(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.chunks)
    }

    fn file_extension(&self) -> &'static str {
        self.opts.container.extension()
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn spawn_stdout_drain(mut stdout: impl Read + Send + 'static) -> Drain<Vec<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut chunks = Vec::new();
        let mut buf = vec![0u8; STDOUT_CHUNK_BYTES];
        loop {
            let n = stdout.read(&mut buf)?;
            if n == 0 {
                break;
            }
            chunks.push(buf[..n].to_vec());
        }
        Ok(chunks)
    })
}

fn spawn_stderr_drain(mut stderr: impl Read + Send + 'static) -> Drain<Vec<u8>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        stderr.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain<T: Default>(drain: Option<Drain<T>>, stream: &str) -> ReelResult<T> {
    let Some(handle) = drain else {
        return Ok(T::default());
    };
    handle
        .join()
        .map_err(|_| ReelError::encode(format!("ffmpeg {stream} drain thread panicked")))?
        .map_err(|e| ReelError::encode(format!("ffmpeg {stream} read failed: {e}")))
}

/// Collect the encoded output and reap `child`.
///
/// The child is always waited on and both drains joined before an error is returned. If
/// stdout can no longer be read the encoder is killed first. Output read to the end is returned even when ffmpeg then exits with an error.
fn finish_encoder(
    child: &mut Child,
    stdout_drain: Option<Drain<Vec<Vec<u8>>>>,
    stderr_drain: Option<Drain<Vec<u8>>>,
) -> (Vec<Vec<u8>>, ReelResult<()>) {
    let stdout = join_drain(stdout_drain, "stdout");
    if stdout.is_err() {
        let _ = child.kill();
    }
    let status = child.wait();
    let stderr = join_drain(stderr_drain, "stderr");

    let (chunks, stdout_result) = match stdout {
        Ok(chunks) => (chunks, Ok(())),
        Err(e) => (Vec::new(), Err(e)),
    };
    let result = stdout_result.and_then(|()| {
        let status = status.map_err(|e| {
            ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = stderr?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        Ok(())
    });
    (chunks, result)
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn push_output_codec(cmd: &mut Command, container: Container, bitrate: u32) {
    let bitrate = bitrate.to_string();
    match container {
        Container::WebM => {
            cmd.args([
                "-c:v",
                "libvpx-vp9",
                "-b:v",
                &bitrate,
                "-deadline",
                "realtime",
                "-cpu-used",
                "8",
                "-pix_fmt",
                "yuv420p",
                "-f",
                "webm",
            ]);
        }
        Container::Mp4 => {
            // stdout is not seekable, so the moov atom has to come first.
            cmd.args([
                "-c:v",
                "libx264",
                "-b:v",
                &bitrate,
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "frag_keyframe+empty_moov+default_base_moof",
                "-f",
                "mp4",
            ]);
        }
    }
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255_u16(bg_r, inv),
                u16::from(s[1]) + mul_div255_u16(bg_g, inv),
                u16::from(s[2]) + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(u16::from(s[0]), a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(u16::from(s[1]), a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(u16::from(s[2]), a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
