//! myel: headless host for myel sessions.
//!
//! Creates session files from images, replays scripted tool and pointer
//! commands against them, prints summaries and writes the measurement
//! report and overlay.
//!
//! # Usage
//!
//! ```text
//! myel new nerve.png --quality 0.8
//! myel replay nerve-data.json clicks.txt
//! myel summary nerve-data.json --json
//! myel export nerve-data.json out/ --axon-area --g-ratio
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod script;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use myel_core::{EditorConfig, Quality, SessionFile};
use myel_export::ExportSelection;
use myel_io::{StatusMessage, Workspace, session_file_name};

/// Segment nerve fiber cross-sections and measure g-ratios.
#[derive(Parser)]
#[command(name = "myel", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a session file for an image.
    New {
        /// Path to the input image (PNG, JPEG, BMP, TIFF).
        image: PathBuf,

        /// Working resolution as a fraction of the original (0, 1].
        #[arg(long, default_value_t = 1.0)]
        quality: f64,

        /// Session file to write. Defaults to `<stem>-data.json` next to
        /// the image.
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        params: Params,
    },

    /// Apply a script of tool and pointer commands, then save.
    Replay {
        #[command(flatten)]
        session: SessionArgs,

        /// Script file, one command per line.
        script: PathBuf,

        /// Save to this path instead of overwriting the session.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print fiber counts and counter totals.
    Summary {
        #[command(flatten)]
        session: SessionArgs,

        /// Output the summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the measurement report and overlay image.
    Export {
        #[command(flatten)]
        session: SessionArgs,

        /// Directory to write into.
        dir: PathBuf,

        #[command(flatten)]
        fields: Fields,
    },
}

/// Segmentation parameters for a new session.
#[derive(Args)]
struct Params {
    /// Binarization threshold.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Smoothing strength; 0 disables smoothing.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_BLUR)]
    blur: u32,

    /// Smallest candidate area in pixels.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_MIN_SIZE)]
    min_size: f64,

    /// Largest candidate area in pixels.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_MAX_SIZE)]
    max_size: f64,

    /// Overlay opacity in [0, 1].
    #[arg(long, default_value_t = EditorConfig::DEFAULT_ALPHA)]
    alpha: f64,

    /// Physical length of one original pixel.
    #[arg(long, default_value_t = EditorConfig::DEFAULT_CALIBRATION)]
    calibration: f64,

    /// Full editor config as a JSON string.
    ///
    /// When provided, the other parameter flags are ignored. The JSON
    /// must be a valid `EditorConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Which session to operate on.
#[derive(Args)]
struct SessionArgs {
    /// Session file.
    session: PathBuf,

    /// Image to load first, for sessions whose image has moved.
    #[arg(long)]
    image: Option<PathBuf>,
}

/// Export columns. With none given, the default selection is used.
#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
struct Fields {
    /// Export every column.
    #[arg(long)]
    all: bool,
    #[arg(long)]
    axon_area: bool,
    #[arg(long)]
    inner_area: bool,
    #[arg(long)]
    outer_area: bool,
    #[arg(long)]
    axon_perimeter: bool,
    #[arg(long)]
    inner_perimeter: bool,
    #[arg(long)]
    outer_perimeter: bool,
    #[arg(long)]
    axon_diameter: bool,
    #[arg(long)]
    inner_diameter: bool,
    #[arg(long)]
    outer_diameter: bool,
    #[arg(long)]
    g_ratio: bool,
    #[arg(long)]
    misc_area: bool,
    #[arg(long)]
    misc_perimeter: bool,
    #[arg(long)]
    misc_diameter: bool,
    /// Counter totals and counter dots.
    #[arg(long)]
    counters: bool,
}

impl Fields {
    fn selection(&self) -> ExportSelection {
        if self.all {
            return ExportSelection::all();
        }
        let chosen = ExportSelection {
            axon_area: self.axon_area,
            inner_area: self.inner_area,
            outer_area: self.outer_area,
            axon_perimeter: self.axon_perimeter,
            inner_perimeter: self.inner_perimeter,
            outer_perimeter: self.outer_perimeter,
            axon_diameter: self.axon_diameter,
            inner_diameter: self.inner_diameter,
            outer_diameter: self.outer_diameter,
            g_ratio: self.g_ratio,
            misc_area: self.misc_area,
            misc_perimeter: self.misc_perimeter,
            misc_diameter: self.misc_diameter,
            counters: self.counters,
        };
        if chosen == ExportSelection::none() {
            ExportSelection::default()
        } else {
            chosen
        }
    }
}

/// Build an [`EditorConfig`] from CLI arguments.
fn config_from_params(params: &Params, quality: Quality) -> Result<EditorConfig, String> {
    if let Some(ref json) = params.config_json {
        let config: EditorConfig =
            serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?;
        return Ok(EditorConfig { quality, ..config });
    }
    Ok(EditorConfig {
        threshold: params.threshold,
        blur: params.blur,
        min_size: params.min_size,
        max_size: params.max_size,
        alpha: params.alpha,
        calibration: params.calibration,
        quality,
        ..EditorConfig::default()
    })
}

/// Workspace with `args.session` open.
fn open(args: &SessionArgs) -> Result<Workspace, String> {
    let mut ws = Workspace::new(backup_dir(&args.session));
    if let Some(image) = &args.image {
        // Contours are stored in working coordinates, so load at the
        // session's quality.
        let quality = std::fs::read_to_string(&args.session)
            .ok()
            .and_then(|text| SessionFile::parse(&text).ok())
            .and_then(|session| session.quality())
            .unwrap_or(Quality::ORIGINAL);
        ws.new_image(image, quality)
            .map_err(|e| format!("Error loading {}: {e}", image.display()))?;
    }
    let result = ws.open(&args.session);
    let status = StatusMessage::open(&result);
    match result {
        Ok(_) => {
            log::info!("{status}");
            Ok(ws)
        }
        Err(e) => Err(format!("{status}\n{e}")),
    }
}

/// `backups/` beside `path`.
fn backup_dir(session: &Path) -> PathBuf {
    session
        .parent()
        .map_or_else(|| PathBuf::from("backups"), |p| p.join("backups"))
}

fn run_new(image: &Path, quality: f64, out: Option<PathBuf>, params: &Params) -> Result<(), String> {
    let quality = Quality::new(quality).map_err(|e| e.to_string())?;
    let config = config_from_params(params, quality)?;
    let mut ws = Workspace::with_config(backup_dir(image), config);
    ws.new_image(image, quality)
        .map_err(|e| format!("Error loading {}: {e}", image.display()))?;

    let out = out.unwrap_or_else(|| {
        let stem = ws.stem().unwrap_or_else(|| "untitled".to_owned());
        image.with_file_name(session_file_name(&stem))
    });
    let result = ws.save(&out);
    let status = StatusMessage::save(&result);
    result.map_err(|_| status.to_string())?;

    if let Some(editor) = ws.editor() {
        let dims = editor.dimensions();
        eprintln!(
            "{}x{} working image, {} candidate contours",
            dims.width,
            dims.height,
            editor.available().len()
        );
    }
    println!("{}", out.display());
    Ok(())
}

fn run_replay(session: &SessionArgs, script_path: &Path, out: Option<PathBuf>) -> Result<(), String> {
    let text = std::fs::read_to_string(script_path)
        .map_err(|e| format!("Error reading {}: {e}", script_path.display()))?;
    let commands = script::parse(&text).map_err(|e| format!("{}: {e}", script_path.display()))?;

    let mut ws = open(session)?;
    let editor = ws.editor_mut().ok_or("no image loaded")?;
    script::run(editor, &commands);
    eprintln!("Applied {} commands", commands.len());

    let target = out.unwrap_or_else(|| session.session.clone());
    let result = ws.save(&target);
    let status = StatusMessage::save(&result);
    result.map_err(|_| status.to_string())?;
    eprintln!("{status}");
    Ok(())
}

fn run_summary(session: &SessionArgs, json: bool) -> Result<(), String> {
    let ws = open(session)?;
    let editor = ws.editor().ok_or("no image loaded")?;
    let summary = editor.summary();
    if json {
        let text = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Error serializing summary: {e}"))?;
        println!("{text}");
        return Ok(());
    }
    println!("Complete: {}", summary.complete);
    println!("Incomplete: {}", summary.incomplete);
    println!("Misc: {}", summary.misc);
    for (group, count) in summary.counters.iter() {
        println!("{group}: {count}");
    }
    println!("Percent Myelinated: {:.2}%", summary.percent_myelinated);
    Ok(())
}

fn run_export(session: &SessionArgs, dir: &Path, fields: &Fields) -> Result<(), String> {
    let ws = open(session)?;
    let result = ws.export(dir, &fields.selection());
    let status = StatusMessage::export(&result);
    let paths = result.map_err(|_| status.to_string())?;
    println!("{}", paths.report.display());
    println!("{}", paths.overlay.display());
    eprintln!("{status}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::New {
            image,
            quality,
            out,
            params,
        } => run_new(&image, quality, out, &params),
        Command::Replay {
            session,
            script,
            out,
        } => run_replay(&session, &script, out),
        Command::Summary { session, json } => run_summary(&session, json),
        Command::Export {
            session,
            dir,
            fields,
        } => run_export(&session, &dir, &fields),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
