use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use anitype::{
    Alignment, ExportFormat, FfmpegSink, FfmpegSinkOpts, FrameIndex, PngSequenceSink,
    ProjectSettings, Studio, TimingMode, conversion_command, ffmpeg_version,
};

#[derive(Parser, Debug)]
#[command(name = "anitype", version)]
struct Cli {
    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the whole timeline to a PNG sequence or a video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Print layout, timing and frame-rate information as JSON.
    Inspect(InspectArgs),
    /// Simulate playback for a number of host ticks.
    Play(PlayArgs),
    /// List the font packs and variants found in an asset directory.
    Packs(PacksArgs),
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Directory holding letter files or font packs.
    #[arg(long)]
    assets: PathBuf,

    /// Font pack to load (defaults to the first one).
    #[arg(long)]
    pack: Option<String>,

    /// Variant of the font pack (defaults to the first one).
    #[arg(long)]
    variant: Option<String>,

    /// Project settings JSON.
    #[arg(long)]
    project: Option<PathBuf>,

    /// Text to animate; overrides the project file.
    #[arg(long)]
    text: Option<String>,

    /// Frame rate; overrides auto-detection.
    #[arg(long)]
    fps: Option<u32>,

    /// Stagger letters by this many frames.
    #[arg(long)]
    stagger: Option<u32>,

    #[arg(long, value_enum)]
    align: Option<AlignChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlignChoice {
    Center,
    Baseline,
    Left,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// png, webm, prores, hevc or dxv.
    #[arg(long, default_value = "png")]
    format: String,

    /// Output file, or directory for a PNG sequence. Derived from the text when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// ffmpeg executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Format named in the conversion hint printed after a PNG export.
    #[arg(long, default_value = "webm")]
    convert_to: String,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Also print the draw plan for this frame.
    #[arg(long)]
    frame: Option<u64>,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 24)]
    ticks: u64,
}

#[derive(Args, Debug)]
struct PacksArgs {
    /// Directory holding font packs.
    #[arg(long)]
    assets: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Play(args) => cmd_play(args),
        Command::Packs(args) => cmd_packs(args),
    }
}

/// `ANITYPE_LOG`, then `RUST_LOG`, then `-v`/`-q`, default `warn`. Logs go to stderr.
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = std::env::var("ANITYPE_LOG")
        .ok()
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| {
            EnvFilter::new(if verbose {
                "anitype=debug,warn"
            } else if quiet {
                "error"
            } else {
                "warn"
            })
        });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .compact(),
        )
        .try_init();
}

fn open_studio(args: &ProjectArgs) -> anyhow::Result<Studio> {
    let mut settings = match &args.project {
        Some(path) => ProjectSettings::from_path(path)?,
        None => ProjectSettings::default(),
    };
    if let Some(text) = &args.text {
        settings.text = text.clone();
    }
    if let Some(frames) = args.stagger {
        settings.timing_mode = TimingMode::Stagger;
        settings.stagger_frames = frames;
    }
    if let Some(align) = args.align {
        settings.alignment = match align {
            AlignChoice::Center => Alignment::Center,
            AlignChoice::Baseline => Alignment::Baseline,
            AlignChoice::Left => Alignment::Left,
        };
    }
    settings.validate()?;

    let mut studio = Studio::new(settings);
    let load = studio.load_directory(&args.assets, args.pack.as_deref(), args.variant.as_deref())?;
    for path in &load.report.failed {
        tracing::warn!(path = %path.display(), "letter file skipped");
    }
    if load.report.loaded.is_empty() {
        bail!("no letter assets found in '{}'", args.assets.display());
    }
    tracing::info!(fps = %load.fps, "letters loaded");

    if let Some(fps) = args.fps {
        studio.set_fps(anitype::Fps::whole(fps)?);
    }
    Ok(studio)
}

fn write_png(path: &Path, frame: &anitype::FrameRGBA) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.project)?;
    let frame = studio.render_frame(FrameIndex(args.frame))?.cloned();
    let Some(frame) = frame else {
        bail!("{}", studio.status_line());
    };
    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.project)?;

    if args.format.eq_ignore_ascii_case("png") {
        let dir = match args.out {
            Some(dir) => dir,
            None => PathBuf::from(studio.export_file_name("frames").replace('.', "_")),
        };
        let mut sink = PngSequenceSink::new(&dir);
        let summary = studio.export(&mut sink)?;
        let target: ExportFormat = args.convert_to.parse()?;
        eprintln!("wrote {} frames to {}", summary.frames, dir.display());
        eprintln!(
            "convert with: {}",
            conversion_command(summary.fps, target, &format!("output.{}", target.extension()))
        );
        return Ok(());
    }

    let format: ExportFormat = args.format.parse()?;
    let Some(version) = ffmpeg_version(&args.ffmpeg) else {
        bail!(
            "{} export requires ffmpeg, but '{}' could not be run",
            format,
            args.ffmpeg.display()
        );
    };
    tracing::info!(%version, "using ffmpeg");

    let out = match args.out {
        Some(out) => out,
        None => PathBuf::from(studio.export_file_name(format.extension())),
    };
    let mut opts = FfmpegSinkOpts::new(&out, format);
    opts.program = args.ffmpeg;
    let summary = studio.export(&mut FfmpegSink::new(opts))?;
    eprintln!(
        "wrote {} ({} frames at {} fps)",
        out.display(),
        summary.frames,
        summary.fps
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.project)?;
    let layout = anitype::layout_text(&studio.settings().text, studio.library(), studio.settings());
    let timeline = studio.timeline()?;
    let duration = studio.duration_info();
    let plan = match args.frame {
        Some(f) => serde_json::to_value(studio.plan_frame(FrameIndex(f))?)?,
        None => serde_json::Value::Null,
    };
    let out = serde_json::json!({
        "letters": studio.library().letters_sorted().iter().map(char::to_string).collect::<Vec<_>>(),
        "settings": studio.settings(),
        "status": studio.status_line(),
        "duration": duration,
        "layout": layout,
        "timeline": timeline,
        "plan": plan,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let mut studio = open_studio(&args.project)?;
    studio.start();
    for _ in 0..args.ticks {
        let drawn = studio.tick()?;
        tracing::debug!(?drawn, "tick");
        println!("{}", studio.status_line());
    }
    studio.stop();
    Ok(())
}

fn cmd_packs(args: PacksArgs) -> anyhow::Result<()> {
    let index = anitype::discover_font_packs(&args.assets)?;
    for pack in &index.packs {
        for variant in &pack.variants {
            println!("{}/{} ({} files)", pack.name, variant.name, variant.files.len());
        }
    }
    if !index.loose.is_empty() {
        println!("(loose) ({} files)", index.loose.len());
    }
    Ok(())
}
