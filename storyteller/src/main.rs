//! storyteller - Narrate markdown and plain text documents as a single WAV file

mod audio;
mod config;
mod pipeline;
mod text;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::StorytellerConfig;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error};
use std::path::{Path, PathBuf};
use tts_client::voices::{CATEGORIES, find_category, voices_in};
use tts_client::{InputFormat, Voice, create_engine, find_voice};

/// Largest input file accepted.
const MAX_INPUT_BYTES: u64 = 2 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Shown instead of upstream error detail, which goes to the log.
const GENERIC_FAILURE: &str = "Audio generation failed. Please try again.";

const SAMPLE_TEXT: &str = "The ancient door creaked open, revealing a chamber bathed in \
    flickering torchlight. Shadows danced along the stone walls as \
    a faint whisper echoed from deep within.";

#[derive(Parser, Debug)]
#[command(name = "storyteller")]
#[command(about = "Narrate markdown or plain text documents as a single WAV file", long_about = None)]
#[command(version)]
struct Args {
    /// Markdown or plain text file (.md, .markdown, .txt)
    input: Option<PathBuf>,

    /// Output file path (default: <input-name>.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice to narrate with (see `storyteller voices`)
    #[arg(long)]
    voice: Option<String>,

    /// Speaking rate (0.25-4.0)
    #[arg(long)]
    rate: Option<f32>,

    /// Pitch in semitones (-20.0-20.0)
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f32>,

    /// Style or mood instruction (Gemini voices only)
    #[arg(long)]
    style: Option<String>,

    /// Byte budget for one synthesis request
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List available voices
    Voices {
        /// Only list one category (e.g. chirp3hd, gemini)
        #[arg(long)]
        category: Option<String>,
    },
    /// Synthesize a short preview sentence with one voice
    Sample {
        /// Voice to preview (default: configured voice)
        #[arg(long)]
        voice: Option<String>,

        /// Output file path (default: <voice>.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice API name
        name: String,
    },
    /// Set default speaking rate
    SetRate {
        /// Value (0.25-4.0)
        value: f32,
    },
    /// Set default pitch
    SetPitch {
        /// Semitones (-20.0-20.0)
        #[arg(allow_hyphen_values = true)]
        value: f32,
    },
    /// Set or clear the default style instruction
    SetStyle {
        /// Instruction text; omit to clear
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // Handle subcommands
    match &args.command {
        Some(Commands::Config { action }) => {
            return handle_config_command(action);
        }
        Some(Commands::Voices { category }) => {
            return list_voices(category.as_deref());
        }
        Some(Commands::Sample { voice, output }) => {
            return generate_sample(voice.as_deref(), output.as_deref()).await;
        }
        None => {}
    }

    let input_path = args
        .input
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Input file path is required. Run 'storyteller --help' for usage."))?;

    let text = read_input(&input_path)?;

    // Load configuration
    let config = StorytellerConfig::load().context("Failed to load configuration")?;

    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = input_path.file_stem().unwrap_or_default();
        input_path.with_file_name(format!("{}.wav", stem.to_string_lossy()))
    });

    let voice = find_voice(args.voice.as_deref().unwrap_or(&config.voice))?;
    let settings = config
        .engine_settings()
        .with_speaking_rate(args.rate.unwrap_or(config.speaking_rate))
        .with_pitch(args.pitch.unwrap_or(config.pitch))
        .with_style(args.style.clone().or_else(|| config.style.clone()));

    let mut limits = config.job_limits();
    if let Some(max_bytes) = args.max_bytes {
        limits.max_bytes_per_request = max_bytes;
    }

    let engine = create_engine(&settings, voice)?;

    if args.debug {
        eprintln!("Input: {}", input_path.display());
        eprintln!("Output: {}", output_path.display());
        eprintln!("Voice: {} ({})", voice.api_name, engine.name());
        eprintln!("Rate: {}", settings.speaking_rate);
        eprintln!("Pitch: {}", settings.pitch);
        eprintln!("Style: {:?}", settings.style);
        eprintln!("Request budget: {} bytes", limits.max_bytes_per_request);
    }

    let job = pipeline::prepare_job(&text, &limits, engine.input_format())?;
    for (i, chunk) in job.chunks.iter().enumerate() {
        debug!("Chunk {}: {} bytes", i + 1, chunk.len());
    }

    let pacing = voice.pacing();
    eprintln!(
        "Narrating {} chunk(s) with {} ({}), ~{:.1}s between requests",
        job.units.len(),
        voice.display_name,
        engine.name(),
        pacing.delay.as_secs_f64()
    );

    // Create progress bar
    let pb = ProgressBar::new(job.units.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let result = pipeline::run_job(engine.as_ref(), &job, &pacing, &mut |done, _total| {
        pb.set_position(done as u64);
    })
    .await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            pb.abandon_with_message("failed");
            error!("Job failed: {:#}", e);
            bail!(GENERIC_FAILURE);
        }
    };
    pb.finish_with_message("done");

    tokio::fs::write(&output_path, &output.audio)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    let size_mb = output.audio.len() as f64 / (1024.0 * 1024.0);
    eprintln!(
        "Output: {} ({:.1} MB, {}, {} segment(s))",
        output_path.display(),
        size_mb,
        format_duration(output.duration_secs),
        output.segments
    );

    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Read an input document, enforcing extension, size and encoding.
fn read_input(path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        bail!(
            "Unsupported file type: {}. Use .md, .markdown or .txt",
            path.display()
        );
    }

    if !path.exists() {
        bail!("Input file not found: {}", path.display());
    }

    let size = std::fs::metadata(path)?.len();
    if size > MAX_INPUT_BYTES {
        bail!(
            "File too large ({:.1} MB). Maximum is {} MB.",
            size as f64 / (1024.0 * 1024.0),
            MAX_INPUT_BYTES / (1024 * 1024)
        );
    }

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    String::from_utf8(bytes).map_err(|_| anyhow::anyhow!("File must be UTF-8 encoded text"))
}

fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, seconds)
    } else {
        format!("{}m {:02}s", minutes, seconds)
    }
}

fn list_voices(category: Option<&str>) -> Result<()> {
    let categories: Vec<_> = match category {
        Some(id) => vec![
            find_category(id).ok_or_else(|| anyhow::anyhow!("Unknown voice category: {}", id))?,
        ],
        None => CATEGORIES.iter().collect(),
    };

    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} [{}] - {} ({}, {} requests/min)",
            category.label,
            category.id,
            category.description,
            category.engine.display_name(),
            category.quota_rpm
        );
        for voice in voices_in(category.id) {
            println!(
                "  {:<28} {:<12} {:?}",
                voice.api_name, voice.display_name, voice.gender
            );
        }
    }
    Ok(())
}

async fn generate_sample(voice_name: Option<&str>, output: Option<&Path>) -> Result<()> {
    let config = StorytellerConfig::load().context("Failed to load configuration")?;
    let voice: &Voice = find_voice(voice_name.unwrap_or(&config.voice))?;
    let engine = create_engine(&config.engine_settings(), voice)?;

    let unit = match engine.input_format() {
        InputFormat::Ssml => text::build_ssml(SAMPLE_TEXT),
        InputFormat::PlainText => text::prepare_plain_text(SAMPLE_TEXT),
    };

    eprintln!("Generating sample for {} ({})...", voice.display_name, voice.api_name);
    let segments = engine
        .synthesize_all(&[unit], &voice.pacing(), &mut |_, _| {})
        .await
        .map_err(|e| {
            error!("Sample failed: {}", e);
            anyhow::anyhow!(GENERIC_FAILURE)
        })?;
    let audio = audio::stitch(segments)?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}.wav", voice.api_name)));
    tokio::fs::write(&path, &audio)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let duration = audio::inspect(&audio)
        .map(|info| info.duration_secs())
        .unwrap_or(0.0);
    eprintln!("Sample: {} ({})", path.display(), format_duration(duration));
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = StorytellerConfig::load()?;
            println!("Configuration file: {:?}", StorytellerConfig::config_path()?);
            println!();
            println!("voice = \"{}\"", config.voice);
            println!("speaking_rate = {}", config.speaking_rate);
            println!("pitch = {}", config.pitch);
            println!("language_code = \"{}\"", config.language_code);
            println!("sample_rate_hertz = {}", config.sample_rate_hertz);
            println!("max_bytes_per_request = {}", config.max_bytes_per_request);
            println!("max_chunks = {}", config.max_chunks);
            println!("max_text_chars = {}", config.max_text_chars);
            match &config.style {
                Some(style) => println!("style = \"{}\"", style),
                None => println!("style = (none)"),
            }
            println!("google_api_key = {}", key_status(&config.google_api_key));
            println!("gemini_api_key = {}", key_status(&config.gemini_api_key));
        }
        ConfigAction::SetVoice { name } => {
            let voice = find_voice(name)?;
            let mut config = StorytellerConfig::load()?;
            config.voice = voice.api_name.to_string();
            config.save()?;
            println!("Default voice set to: {} ({})", voice.display_name, voice.api_name);
        }
        ConfigAction::SetRate { value } => {
            let mut config = StorytellerConfig::load()?;
            config.speaking_rate = value.clamp(0.25, 4.0);
            config.save()?;
            println!("Default speaking rate set to: {}", config.speaking_rate);
        }
        ConfigAction::SetPitch { value } => {
            let mut config = StorytellerConfig::load()?;
            config.pitch = value.clamp(-20.0, 20.0);
            config.save()?;
            println!("Default pitch set to: {}", config.pitch);
        }
        ConfigAction::SetStyle { text } => {
            let mut config = StorytellerConfig::load()?;
            config.style = text.clone().filter(|s| !s.trim().is_empty());
            config.save()?;
            match &config.style {
                Some(style) => println!("Default style set to: {}", style),
                None => println!("Default style cleared"),
            }
        }
    }
    Ok(())
}

fn key_status(key: &Option<String>) -> &'static str {
    match key {
        Some(k) if !k.is_empty() => "(set)",
        _ => "(from environment)",
    }
}
