//! gen-chapter-audio - Convert long chapter text into one audio file per chapter

mod audio;
mod build;
mod config;
mod error;
mod synth;
mod text;

use anyhow::{Context, Result};
use audio::{AudioMerger, ByteConcatMerger, FfmpegMerger};
use build::{BuildOptions, ChapterAudioBuilder};
use clap::{Parser, Subcommand};
use config::GenConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tts_client::{AudioEncoding, MockSynthesizer, SpeechSynthesizer};

#[derive(Parser, Debug)]
#[command(name = "gen-chapter-audio")]
#[command(about = "Convert long chapter text into a single audio file using text-to-speech", long_about = None)]
#[command(version)]
struct Args {
    /// Path to a UTF-8 text file holding one cleaned chapter
    text_file: Option<PathBuf>,

    /// Chapter title (default: the file name)
    #[arg(long)]
    title: Option<String>,

    /// Artifact base name (default: derived from the title)
    #[arg(long)]
    name: Option<String>,

    /// Directory for the finished audio file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Voice name (e.g. en-US-Neural2-D)
    #[arg(long)]
    voice: Option<String>,

    /// Language code (e.g. en-US)
    #[arg(long)]
    language: Option<String>,

    /// Output encoding: mp3, ogg, wav
    #[arg(long)]
    encoding: Option<String>,

    /// Speaking rate (0.25-4.0)
    #[arg(long)]
    rate: Option<f32>,

    /// Pitch in semitones (-20.0-20.0)
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f32>,

    /// Volume gain in dB (-96.0-16.0)
    #[arg(long, allow_hyphen_values = true)]
    gain: Option<f32>,

    /// Maximum characters per synthesis request
    #[arg(long)]
    max_chars: Option<usize>,

    /// Use the mock synthesizer and byte concatenation (no network, no ffmpeg)
    #[arg(long, default_value_t = false)]
    mock: bool,

    /// Print the artifact as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

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
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default voice
    SetVoice {
        /// Voice name
        voice: String,
    },
    /// Set default language code
    SetLanguage {
        /// Language code (e.g. en-GB)
        code: String,
    },
    /// Set the per-request character ceiling
    SetMaxChars {
        /// Characters per request
        value: usize,
    },
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // Handle subcommands
    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let text_path = args.text_file.clone().ok_or_else(|| {
        anyhow::anyhow!("Text file path is required. Run 'gen-chapter-audio --help' for usage.")
    })?;

    if !text_path.exists() {
        anyhow::bail!("Text file not found: {}", text_path.display());
    }

    // Load configuration
    let mut config = GenConfig::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &args)?;

    let text = std::fs::read_to_string(&text_path)
        .with_context(|| format!("Failed to read {}", text_path.display()))?;

    let title = args
        .title
        .clone()
        .unwrap_or_else(|| default_title(&text_path));
    let base_name = args
        .name
        .clone()
        .unwrap_or_else(|| text::derive_base_name(&title));

    let synthesis = config.synthesis_config();
    let (synthesizer, merger) = create_backends(&config, args.mock).await?;

    let options = BuildOptions::new(config.resolved_work_dir()?, config.resolved_output_dir())
        .with_max_segment_chars(config.max_segment_chars);
    let builder = ChapterAudioBuilder::new(synthesizer, merger, options);

    if args.debug {
        eprintln!("Title: {}", title);
        eprintln!("Output: {}", builder.artifact_path(&base_name, synthesis.encoding).display());
        eprintln!("Work dir: {}", builder.options().work_dir.display());
        eprintln!("Voice: {:?}", synthesis.voice);
        eprintln!("Language: {}", synthesis.language_code);
        eprintln!("Max chars: {}", builder.options().max_segment_chars);
    }

    eprintln!(
        "Synthesizing \"{}\" ({} chars)...",
        title,
        text.chars().count()
    );

    // Create progress bar
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} segments ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let result = builder
        .build_with_progress(&title, &text, &base_name, &synthesis, |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .await;

    let artifact = match result {
        Ok(artifact) => {
            pb.finish_and_clear();
            artifact
        }
        Err(e) => {
            pb.abandon();
            let stage = e.stage();
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to build \"{}\" ({} stage)", title, stage)));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&artifact)?);
    } else {
        let size_mb = artifact.size_bytes as f64 / (1024.0 * 1024.0);
        eprintln!(
            "Output: {} ({:.1} MB, {} segment(s))",
            artifact.path.display(),
            size_mb,
            artifact.segments
        );
    }

    Ok(())
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut GenConfig, args: &Args) -> Result<()> {
    if let Some(voice) = &args.voice {
        config.voice = Some(voice.clone());
    }
    if let Some(language) = &args.language {
        config.language_code = language.clone();
    }
    if let Some(encoding) = &args.encoding {
        config.encoding = AudioEncoding::from_str(encoding)
            .ok_or_else(|| anyhow::anyhow!("Unknown encoding: {} (use mp3, ogg or wav)", encoding))?;
    }
    if let Some(rate) = args.rate {
        config.speaking_rate = rate;
    }
    if let Some(pitch) = args.pitch {
        config.pitch = pitch;
    }
    if let Some(gain) = args.gain {
        config.volume_gain_db = gain;
    }
    if let Some(max_chars) = args.max_chars {
        if max_chars == 0 {
            anyhow::bail!("--max-chars must be greater than zero");
        }
        config.max_segment_chars = max_chars;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = Some(dir.clone());
    }
    Ok(())
}

/// Title from the file stem, e.g. "chapter_04" for "chapter_04.txt".
fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string())
}

/// Create the synthesizer and merger for this run.
async fn create_backends(
    config: &GenConfig,
    mock: bool,
) -> Result<(Arc<dyn SpeechSynthesizer>, Arc<dyn AudioMerger>)> {
    if mock {
        return Ok((Arc::new(MockSynthesizer::new()), Arc::new(ByteConcatMerger)));
    }

    let synthesizer: Arc<dyn SpeechSynthesizer> = tts_client::get_provider(&config.provider)
        .context("Failed to create synthesis provider")?
        .into();
    synthesizer
        .is_available()
        .context("Synthesis provider is not usable")?;

    let ffmpeg = FfmpegMerger::new(config.ffmpeg_path.clone());
    if !ffmpeg.is_available().await {
        // Only chunked builds need it, so warn instead of failing
        log::warn!(
            "{} not found; chapters longer than {} characters will fail to merge",
            ffmpeg.program().display(),
            config.max_segment_chars
        );
    }

    Ok((synthesizer, Arc::new(ffmpeg)))
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = GenConfig::load()?;
            println!("Configuration file: {:?}", GenConfig::config_path()?);
            println!();
            if let Some(voice) = &config.voice {
                println!("voice = \"{}\"", voice);
            } else {
                println!("voice = (backend default)");
            }
            println!("language_code = \"{}\"", config.language_code);
            println!("encoding = {:?}", config.encoding);
            println!("speaking_rate = {}", config.speaking_rate);
            println!("pitch = {}", config.pitch);
            println!("volume_gain_db = {}", config.volume_gain_db);
            println!("max_segment_chars = {}", config.max_segment_chars);
            println!("work_dir = {}", config.resolved_work_dir()?.display());
            println!("output_dir = {}", config.resolved_output_dir().display());
            println!("provider = \"{}\"", config.provider.provider);
            if config.provider.api_key.is_some() {
                println!("api_key = (set)");
            } else {
                println!("api_key = (from environment)");
            }
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = GenConfig::load()?;
            config.voice = Some(voice.clone());
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetLanguage { code } => {
            let mut config = GenConfig::load()?;
            config.language_code = code.clone();
            config.save()?;
            println!("Default language set to: {}", code);
        }
        ConfigAction::SetMaxChars { value } => {
            if *value == 0 {
                anyhow::bail!("Character ceiling must be greater than zero");
            }
            let mut config = GenConfig::load()?;
            config.max_segment_chars = *value;
            config.save()?;
            println!("Per-request character ceiling set to: {}", value);
        }
    }
    Ok(())
}
