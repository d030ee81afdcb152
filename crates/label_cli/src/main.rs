use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use image::imageops::FilterType;
use image::ImageFormat;
use image_label::{
    CanvasSink, Content, DisplaySurface, LabelOptions, ManualTimer, ResourceLoader, Size,
    FALLBACK_FRAME_DELAY,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;

type Surface = DisplaySurface<CanvasSink, ManualTimer>;

/// Largest container edge accepted on the command line.
const MAX_DIMENSION: u32 = 16384;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fit and render images the way an image label displays them")]
struct Cli {
    /// Raise log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print what kind of content a file holds
    Inspect(InspectArgs),
    /// Show where content lands in a container, optionally across a series of resizes
    Fit(FitArgs),
    /// Render the first frame into a container and save it as PNG
    Render(RenderArgs),
    /// Play an animation through the label and write every presented frame
    Animate(AnimateArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input image path
    input: PathBuf,
}

#[derive(Parser, Debug)]
struct FitArgs {
    /// Input image path
    input: PathBuf,
    /// Container size to resize to after loading, applied in order (e.g. 1024x768)
    #[arg(long = "resize")]
    resizes: Vec<Dimensions>,
    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image path
    input: PathBuf,
    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input animation path
    input: PathBuf,
    /// Output directory for frame files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Number of frames to write; defaults to one full loop
    #[arg(long)]
    frames: Option<usize>,
    #[command(flatten)]
    surface: SurfaceArgs,
}

#[derive(Parser, Debug, Clone)]
struct SurfaceArgs {
    /// Container width in pixels
    #[arg(
        long,
        default_value_t = 800,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DIMENSION))
    )]
    width: u32,
    /// Container height in pixels
    #[arg(
        long,
        default_value_t = 600,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DIMENSION))
    )]
    height: u32,
    /// Resize the container to the content's natural size instead of fitting
    #[arg(long, default_value_t = false)]
    natural: bool,
    /// Resampling filter used when scaling
    #[arg(long, value_enum, default_value = "catmull-rom")]
    filter: FilterChoice,
    /// Delay in milliseconds for animation frames without timing
    #[arg(
        long,
        default_value_t = FALLBACK_FRAME_DELAY.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    fallback_delay: u64,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FilterChoice {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

/// Container dimensions given as `WIDTHxHEIGHT`, each at most [`MAX_DIMENSION`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Dimensions {
    width: u32,
    height: u32,
}

impl FromStr for Dimensions {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (width, height) = value
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
        let parse = |part: &str| -> Result<u32, String> {
            let value = part
                .trim()
                .parse::<u32>()
                .map_err(|err| format!("invalid dimension {part:?}: {err}"))?;
            if value > MAX_DIMENSION {
                return Err(format!("dimension {value} exceeds {MAX_DIMENSION}"));
            }
            Ok(value)
        };
        Ok(Self { width: parse(width)?, height: parse(height)? })
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<Dimensions> for Size {
    fn from(dimensions: Dimensions) -> Self {
        Size::from((dimensions.width, dimensions.height))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Inspect(args) => inspect(args),
        Commands::Fit(args) => fit(args),
        Commands::Render(args) => render(args),
        Commands::Animate(args) => animate(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

fn inspect(args: InspectArgs) -> Result<()> {
    let content = ResourceLoader
        .load(args.input.as_path())
        .with_context(|| format!("failed to load {:?}", args.input))?;

    println!("kind:    {}", content.kind());
    println!("frames:  {}", content.frame_count());
    println!("size:    {}", content.original_size());
    println!("aspect:  {:.4}", content.aspect_ratio());

    if let Content::Animated(sequence) = &content {
        let total: Duration = sequence.frames().iter().map(|frame| frame.delay).sum();
        println!("loop:    {} ms", total.as_millis());
    }

    Ok(())
}

fn fit(args: FitArgs) -> Result<()> {
    let mut surface = args.surface.open(&args.input)?;
    println!("{:>12}  {}", args.surface.container().to_string(), describe(&surface));

    for resize in args.resizes {
        let presented = surface.sink().presented();
        let rendered = surface.rendered_size();
        surface.on_resize(resize.into());

        let outcome = if surface.rendered_size() != rendered {
            "refit"
        } else if surface.sink().presented() != presented {
            "moved"
        } else {
            "kept"
        };
        println!("{:>12}  {}  ({outcome})", resize.to_string(), describe(&surface));
    }

    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let surface = args.surface.open(&args.input)?;
    surface
        .sink()
        .canvas()
        .save_with_format(&args.output, ImageFormat::Png)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    println!("{}  -> {:?}", describe(&surface), args.output);
    Ok(())
}

fn animate(args: AnimateArgs) -> Result<()> {
    let mut surface = args.surface.open(&args.input)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let frame_count = args
        .frames
        .unwrap_or_else(|| surface.content().map_or(1, Content::frame_count))
        .max(1);
    let progress = ProgressBar::new(frame_count as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
        )
        .context("invalid progress bar template")?
        .progress_chars("=> "),
    );

    let mut elapsed = Duration::ZERO;
    for index in 0..frame_count {
        let frame_path = args.out_dir.join(format!("frame_{index:04}.png"));
        surface
            .sink()
            .canvas()
            .save_with_format(&frame_path, ImageFormat::Png)
            .with_context(|| format!("failed to write {:?}", frame_path))?;
        progress.inc(1);

        if index + 1 == frame_count {
            break;
        }

        match surface.timer_mut().fire() {
            Some(delay) => {
                elapsed += delay;
                surface.on_timer();
            },
            None => {
                log::info!("{:?} is not animated, stopping after one frame", args.input);
                break;
            },
        }
    }

    progress.finish_with_message(format!(
        "Frames written to {:?} ({} ms of playback)",
        args.out_dir,
        elapsed.as_millis()
    ));
    Ok(())
}

fn describe(surface: &Surface) -> String {
    let placement = surface.placement();
    format!(
        "content {} at ({}, {}) in {}",
        placement.size, placement.x, placement.y, placement.container
    )
}

impl SurfaceArgs {
    fn container(&self) -> Dimensions {
        Dimensions { width: self.width, height: self.height }
    }

    fn options(&self) -> LabelOptions {
        LabelOptions {
            filter: self.filter.to_filter(),
            fallback_frame_delay: Duration::from_millis(self.fallback_delay),
        }
    }

    /// Build a surface and load `input` into it.
    fn open(&self, input: &Path) -> Result<Surface> {
        let mut surface = DisplaySurface::with_options(
            CanvasSink::new(),
            ManualTimer::new(),
            self.container().into(),
            self.options(),
        );
        surface
            .load(input, !self.natural)
            .with_context(|| format!("failed to load {:?}", input))?;
        Ok(surface)
    }
}

impl FilterChoice {
    fn to_filter(self) -> FilterType {
        match self {
            FilterChoice::Nearest => FilterType::Nearest,
            FilterChoice::Triangle => FilterType::Triangle,
            FilterChoice::CatmullRom => FilterType::CatmullRom,
            FilterChoice::Gaussian => FilterType::Gaussian,
            FilterChoice::Lanczos3 => FilterType::Lanczos3,
        }
    }
}
