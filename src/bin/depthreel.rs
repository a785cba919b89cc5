use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "depthreel", version, about = "Animate a still image in 3D and record it")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a clip (requires `ffmpeg` on PATH).
    Record(RecordArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// List the animation presets.
    Presets,
}

#[derive(Parser, Debug)]
struct RecordArgs {
    /// Dropped files. Only the first is used, and only if it is an image.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Animation preset.
    #[arg(long, value_enum, default_value_t = PresetChoice::Rotate)]
    preset: PresetChoice,

    /// Recording length in seconds.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(3..=15))]
    duration: u32,

    /// Output format. Defaults to the config canvas.
    #[arg(long, value_enum)]
    aspect: Option<AspectChoice>,

    /// Output container. Defaults to the config container.
    #[arg(long, value_enum)]
    container: Option<ContainerChoice>,

    /// Directory the recording is written to. Defaults to the config download dir.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// JSON studio config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drag the orbit camera by `DX,DY` pixels before recording.
    #[arg(long, value_parser = parse_orbit, allow_hyphen_values = true)]
    orbit: Option<(f32, f32)>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    file: PathBuf,

    /// Animation time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Animation preset.
    #[arg(long, value_enum, default_value_t = PresetChoice::Rotate)]
    preset: PresetChoice,

    /// Output format.
    #[arg(long, value_enum, default_value_t = AspectChoice::Landscape)]
    aspect: AspectChoice,

    /// JSON studio config.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    Rotate,
    Wave,
    Zoom,
    Parallax,
}

impl From<PresetChoice> for depthreel::Preset {
    fn from(c: PresetChoice) -> Self {
        match c {
            PresetChoice::Rotate => Self::Rotate,
            PresetChoice::Wave => Self::Wave,
            PresetChoice::Zoom => Self::Zoom,
            PresetChoice::Parallax => Self::Parallax,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AspectChoice {
    Story,
    Square,
    Landscape,
}

impl From<AspectChoice> for depthreel::AspectPreset {
    fn from(c: AspectChoice) -> Self {
        match c {
            AspectChoice::Story => Self::Story,
            AspectChoice::Square => Self::Square,
            AspectChoice::Landscape => Self::Landscape,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ContainerChoice {
    Webm,
    Mp4,
}

impl From<ContainerChoice> for depthreel::Container {
    fn from(c: ContainerChoice) -> Self {
        match c {
            ContainerChoice::Webm => Self::WebM,
            ContainerChoice::Mp4 => Self::Mp4,
        }
    }
}

fn parse_orbit(s: &str) -> Result<(f32, f32), String> {
    let (dx, dy) = s
        .split_once(',')
        .ok_or_else(|| format!("expected DX,DY, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid orbit component '{v}': {e}"))
    };
    Ok((parse(dx)?, parse(dy)?))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Record(args) => cmd_record(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Presets => cmd_presets(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<depthreel::StudioConfig> {
    let cfg = match path {
        Some(p) => depthreel::StudioConfig::from_path(p)?,
        None => depthreel::StudioConfig::default(),
    };
    depthreel::init_logging(&cfg.logging);
    Ok(cfg)
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(aspect) = args.aspect {
        cfg.canvas = depthreel::AspectPreset::from(aspect).canvas();
    }
    if let Some(container) = args.container {
        cfg.container = container.into();
    }
    if let Some(dir) = args.out_dir {
        cfg.download_dir = dir;
    }

    let mut studio = depthreel::Studio::new(cfg)?;
    studio.set_preset(args.preset.into());
    studio.set_duration(args.duration)?;

    let files: Vec<_> = args
        .files
        .iter()
        .map(depthreel::IntakeFile::from_path)
        .collect();
    if !studio.drop_files(&files)? {
        anyhow::bail!(
            "'{}' is not an image; nothing to record",
            args.files[0].display()
        );
    }
    if let Some((dx, dy)) = args.orbit
        && !studio.orbit_drag(dx, dy)
    {
        eprintln!("orbit ignored: the {} preset drives the camera", studio.preset());
    }

    if !depthreel::is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg was not found on PATH");
    }
    studio.record_to_file()?;
    let outcome = studio
        .run_recording()?
        .context("recording produced no output")?;

    if let Some(err) = &outcome.error {
        eprintln!("recording ended early: {err}");
    }
    eprintln!(
        "wrote {} ({} frames, {} bytes)",
        outcome.path.display(),
        outcome.frames,
        outcome.bytes
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    cfg.canvas = depthreel::AspectPreset::from(args.aspect).canvas();

    let mut studio = depthreel::Studio::new(cfg)?;
    studio.set_preset(args.preset.into());
    if !studio.pick_file(&args.file)? {
        anyhow::bail!("'{}' is not an image", args.file.display());
    }

    // A tick renders the current pose and then advances, so the pose at `time` is the
    // second frame.
    studio.tick(args.time.max(0.0))?;
    let frame = studio.tick(0.0)?.context("no frame rendered")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_presets() -> anyhow::Result<()> {
    for p in depthreel::Preset::ALL {
        let camera = if p.drives_camera() {
            "camera motion"
        } else {
            "drag to orbit"
        };
        println!("{:<10} {:<16} {}", p.as_str(), p.label(), camera);
    }
    Ok(())
}
