//! lyricsync CLI: link lyrics to recognized speech timestamps.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use lyricsync_core::align::{Linker, get_linker};
use lyricsync_core::cache::{get_cached_linking, linking_key, store_linking_cache};
use lyricsync_core::config::AlignConfig;
use lyricsync_core::text::diff::render_diff;
use lyricsync_core::text::matcher::ratio;
use lyricsync_core::timed_text::TimedText;
use lyricsync_core::transcript::{read_phrases, write_phrases};
use lyricsync_core::types::Phrase;

// ─── Top-level CLI ───────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "lyricsync",
    about = "Per-word timestamps for lyrics from speech recognition output",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Link lyrics to a recognized transcript
    Align(AlignArgs),
    /// Show how the lyrics differ from the recognized text
    Diff(DiffArgs),
}

// ─── Shared arguments (embedded in each subcommand) ──────────────

#[derive(Parser, Debug)]
struct SharedArgs {
    /// Lyrics text file, one phrase per line
    #[arg(long)]
    lyrics: PathBuf,

    /// Recognized transcript: Whisper JSON or a phrase array
    #[arg(long)]
    transcript: PathBuf,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ─── Align ───────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Give every lyric word a start and end time")]
struct AlignArgs {
    #[command(flatten)]
    shared: SharedArgs,

    /// Linking strategy
    #[arg(long, default_value = "line", value_parser = ["line", "word"])]
    linker: String,

    /// Output JSON file
    #[arg(long, default_value = "linking.json")]
    output: PathBuf,

    /// JSON file with linking thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    // -- Threshold overrides --
    /// Minimum whole-text similarity
    #[arg(long)]
    min_text_ratio: Option<f64>,

    /// Minimum similarity for a partially matched word
    #[arg(long)]
    min_word_ratio: Option<f64>,

    /// Minimum similarity for a line window
    #[arg(long)]
    min_line_ratio: Option<f64>,

    /// Accept partial word matches with similar vowels
    #[arg(long, default_value_t = false)]
    vowel_linking: bool,

    /// Disable file-based caching
    #[arg(long, default_value_t = false)]
    no_cache: bool,
}

// ─── Diff ────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Print similarity and a character diff of lyrics vs. transcript")]
struct DiffArgs {
    #[command(flatten)]
    shared: SharedArgs,
}

// ─── Main ────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    // Init logging
    let log_level = match &cli.command {
        Command::Align(a) if a.shared.verbose => "debug",
        Command::Diff(a) if a.shared.verbose => "debug",
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Command::Align(args) => run_align(args),
        Command::Diff(args) => run_diff(args),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────

/// Read the lyrics text and the recognized phrases.
fn read_inputs(shared: &SharedArgs) -> Result<(String, Vec<Phrase>)> {
    let lyrics = std::fs::read_to_string(&shared.lyrics)
        .with_context(|| format!("Failed to read lyrics: {}", shared.lyrics.display()))?;
    let recognized = read_phrases(&shared.transcript)?;
    log::info!(
        "Loaded {} lyric lines, {} recognized phrases",
        lyrics.lines().count(),
        recognized.len()
    );
    Ok((lyrics, recognized))
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &AlignArgs) -> Result<AlignConfig> {
    let mut config = match &args.config {
        Some(path) => AlignConfig::load(path)?,
        None => AlignConfig::default(),
    };
    if let Some(r) = args.min_text_ratio {
        config.min_text_ratio = r;
    }
    if let Some(r) = args.min_word_ratio {
        config.min_word_ratio = r;
    }
    if let Some(r) = args.min_line_ratio {
        config.min_line_ratio = r;
    }
    if args.vowel_linking {
        config.vowel_linking = true;
    }
    config.validate()?;
    Ok(config)
}

fn print_summary(phrases: &[Phrase], output: &Path) {
    let words: usize = phrases.iter().map(|p| p.words.len()).sum();
    let span = phrases
        .iter()
        .filter_map(|p| p.timing.bounds())
        .fold(None, |acc: Option<(f64, f64)>, (s, e)| match acc {
            Some((lo, hi)) => Some((lo.min(s), hi.max(e))),
            None => Some((s, e)),
        });

    println!("Phrases: {}, words: {}", phrases.len(), words);
    if let Some((start, end)) = span {
        println!("Span: {:.2}s - {:.2}s", start, end);
    }
    println!("Output: {}", output.display());
}

// ─── Align runner ────────────────────────────────────────────────

fn run_align(args: AlignArgs) -> Result<()> {
    let config = build_config(&args)?;
    let (lyrics, recognized) = read_inputs(&args.shared)?;

    let key = linking_key(&args.linker, &config, &lyrics, &recognized)?;
    let cached = if args.no_cache {
        None
    } else {
        get_cached_linking(&args.linker, &key)
    };

    let phrases = match cached {
        Some(phrases) => phrases,
        None => {
            log::info!("Linking with '{}' linker", args.linker);
            let linker = get_linker(&args.linker, config)?;
            let phrases = linker.link(&lyrics, &recognized)?;
            if !args.no_cache {
                if let Err(e) = store_linking_cache(&args.linker, &key, &phrases) {
                    log::warn!("Failed to cache linking: {:#}", e);
                }
            }
            phrases
        }
    };

    write_phrases(&args.output, &phrases)?;
    print_summary(&phrases, &args.output);
    Ok(())
}

// ─── Diff runner ─────────────────────────────────────────────────

fn run_diff(args: DiffArgs) -> Result<()> {
    let (lyrics, recognized) = read_inputs(&args.shared)?;

    let expected: String = TimedText::from_text(&lyrics).flat().iter().collect();
    let actual = recognized
        .iter()
        .flat_map(|p| p.words.iter())
        .map(|w| w.text.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    println!("Ratio: {:.3}", ratio(&expected, &actual));
    println!("{}", render_diff(&expected, &actual));
    Ok(())
}
