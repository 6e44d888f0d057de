//! Command-line front end: analyze a drum loop and write hook files.

use clap::Parser;
use hookaid::prelude::*;
use hookaid::{list_available_scales, HookSet, LoopAnalysis};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hookaid")]
#[command(about = "Generate melodic hooks locked to a drum loop's groove", long_about = None)]
struct Cli {
    /// Drum loop to analyze (WAV, MP3, FLAC, Ogg)
    #[arg(required_unless_present = "list_scales")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "hooks")]
    output: PathBuf,

    /// Notes per hook (1-16)
    #[arg(short, long, default_value = "7")]
    density: usize,

    /// Off-beat bias (0.0-1.0)
    #[arg(short, long, default_value = "0.5")]
    syncopation: f64,

    /// Pitch range: low, mid or high
    #[arg(short, long, default_value = "mid")]
    register: Register,

    /// Scale to use instead of the detected one, e.g. "F# minor"
    #[arg(long)]
    scale: Option<String>,

    /// Tempo to render at instead of the detected one (60-180)
    #[arg(short, long)]
    bpm: Option<u32>,

    /// Also write hooks.mid
    #[arg(long)]
    midi: bool,

    /// Print the selectable scale names and exit
    #[arg(long)]
    list_scales: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    input: String,
    analysis: &'a LoopAnalysis,
    hook_set: &'a HookSet,
    files: Vec<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_scales {
        for name in list_available_scales() {
            println!("{}", name);
        }
        return Ok(());
    }
    let input = cli.input.ok_or("no input loop given")?;

    let mut builder = HookAid::builder()
        .density(cli.density)
        .syncopation(cli.syncopation)
        .register(cli.register)
        .midi(cli.midi);
    if let Some(scale) = cli.scale {
        builder = builder.scale(scale);
    }
    if let Some(bpm) = cli.bpm {
        builder = builder.bpm(bpm);
    }
    let aid = builder.build()?;

    let bytes = std::fs::read(&input)?;
    let session = aid.run(&bytes)?;
    let written = session.rendered.write_to_dir(&cli.output)?;

    let summary = Summary {
        input: input.display().to_string(),
        analysis: &session.analysis,
        hook_set: &session.hook_set,
        files: written.iter().map(|p| p.display().to_string()).collect(),
    };
    let summary_path = cli.output.join("summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;

    let key = match session.analysis.key.scale {
        Some(scale) => format!("{} ({} confidence)", scale, session.analysis.key.confidence),
        None => "inconclusive".to_string(),
    };
    info!(
        "Detected {:.1} BPM, key {}; rendered {} hooks in {} at {} BPM",
        session.analysis.bpm(),
        key,
        session.hook_set.hooks.len(),
        session.hook_set.scale,
        session.hook_set.bpm
    );
    for path in written.iter().chain(std::iter::once(&summary_path)) {
        println!("{}", path.display());
    }
    Ok(())
}
