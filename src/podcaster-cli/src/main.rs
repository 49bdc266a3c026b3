//! Podcaster CLI - AI Podcast Production Tool
//!
//! A command-line tool that turns an outline plus source articles into a
//! finished podcast audio file.

use clap::{ArgAction, Parser};
use colored::Colorize;
use podcaster_core::{
    Config, GeneratorConfig, OutputPaths, PodcastEvent, PodcastPipeline, Source,
    SpeechSynthesizer, TranscriptGenerator, available_stitchers, default_config, get_stitcher,
};
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "podcaster",
    version,
    about = "AI Podcast Tool - Turn outlines and articles into podcast audio",
    long_about = "A CLI tool for producing podcast episodes: a language model writes the \
                  transcript, a local TTS engine voices it, and the clip stitcher assembles \
                  the final audio file."
)]
struct Cli {
    /// Outline file for the episode
    #[arg(value_name = "OUTLINE", required_unless_present = "clips")]
    outline: Option<PathBuf>,

    /// Source article files (specify once per article)
    #[arg(short, long, action = ArgAction::Append, value_name = "FILE")]
    source: Vec<PathBuf>,

    /// Chat model used for transcript generation
    #[arg(short, long, default_value = "gpt-4o-mini", value_name = "MODEL")]
    model: String,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Root directory for transcripts, clips and podcasts
    #[arg(short, long, default_value = "output", value_name = "DIR")]
    output: PathBuf,

    /// Stitching strategy to use
    #[arg(long, value_name = "STRATEGY")]
    stitcher: Option<String>,

    /// Stitch an existing clip directory into a podcast file and exit
    #[arg(long, value_name = "DIR")]
    clips: Option<PathBuf>,

    /// Output file name for --clips mode
    #[arg(long, default_value = "podcast.wav", value_name = "NAME")]
    file_name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => default_config(),
    };

    // Resolve the stitching strategy
    let strategy = cli
        .stitcher
        .clone()
        .unwrap_or_else(|| config.stitcher.strategy.clone());
    let stitcher = get_stitcher(&strategy, config.stitcher.overflow).ok_or_else(|| {
        format!(
            "Unknown stitching strategy: '{}'. Available strategies: {}",
            strategy,
            available_stitchers().join(", ")
        )
    })?;

    let output = OutputPaths::under(&cli.output);

    // Stitch-only mode: assemble an existing clip directory, no generation
    if let Some(clips_dir) = &cli.clips {
        println!(
            "{} {} {}",
            "Stitching".bold(),
            clips_dir.display().to_string().bright_cyan(),
            format!("({})", stitcher.name()).dimmed()
        );
        stitcher
            .stitch(clips_dir, &output.podcasts, &cli.file_name)
            .await?;
        println!(
            "{} {}",
            "Saved".bright_green().bold(),
            output.podcasts.join(&cli.file_name).display()
        );
        return Ok(());
    }

    let Some(outline_path) = &cli.outline else {
        return Err("an outline file is required".into());
    };

    // Get API configuration from environment
    let api_base = env::var("OPENAI_API_BASE")
        .or_else(|_| env::var("OPENAI_BASE_URL"))
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_else(|_| {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
        String::new()
    });

    let outline = Source::load(outline_path).await?;
    let sources = Source::load_all(&cli.source).await?;
    if sources.is_empty() {
        eprintln!(
            "{}",
            "Warning: no source articles given; the transcript will rely on the outline alone."
                .yellow()
        );
    }

    // Print header
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} - {}", "Podcaster".bold(), "Episode Production")
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!(
        "{} {}",
        "Outline:".bold(),
        outline.path.display().to_string().bright_white()
    );
    println!(
        "{} {}",
        "Sources:".bold(),
        sources.len().to_string().bright_white()
    );
    println!();
    println!("{}", "Hosts:".bold());
    for (i, host) in config.hosts.iter().enumerate() {
        println!(
            "  {}. {} ({}) - voice {}",
            i + 1,
            host.name.bright_cyan(),
            host.id.yellow(),
            host.voice.dimmed()
        );
    }
    println!();
    println!("{}", "─".repeat(70).dimmed());

    println!("{}", "Initializing TTS engine...".dimmed());
    let synthesizer = SpeechSynthesizer::new().await?;

    let generator = TranscriptGenerator::new(GeneratorConfig::new(api_base, api_key, &cli.model));

    // Create the pipeline with a console event callback
    let callback = create_console_callback();
    let mut pipeline = PodcastPipeline::new(config, generator, synthesizer, stitcher, output)
        .with_callback(callback);

    let podcast_path = pipeline.run(&outline, &sources).await?;

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  Episode saved to {}", podcast_path.display())
            .bright_green()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// Create a callback that prints pipeline events to the console.
fn create_console_callback() -> Box<dyn Fn(PodcastEvent) + Send + Sync> {
    Box::new(move |event| match event {
        PodcastEvent::TranscriptStart { outline } => {
            println!();
            println!(
                "{} {}",
                "▶".bright_cyan(),
                format!("Generating transcript from {}", outline)
                    .bright_cyan()
                    .bold()
            );
        }
        PodcastEvent::TranscriptReady { title, items } => {
            println!(
                "  {} {}",
                title.bright_white().bold(),
                format!("({} items)", items).dimmed()
            );
        }
        PodcastEvent::ClipRendered { order, speaker } => {
            println!("  {} clip {} - {}", "✓".bright_green(), order, speaker);
        }
        PodcastEvent::ItemSkipped { order, reason } => {
            println!(
                "  {} item {} skipped: {}",
                "·".dimmed(),
                order,
                reason.dimmed()
            );
        }
        PodcastEvent::StitchStart { strategy } => {
            println!();
            println!(
                "{} {}",
                "▶".bright_magenta(),
                format!("Stitching clips ({})", strategy)
                    .bright_magenta()
                    .bold()
            );
        }
        PodcastEvent::Done { output } => {
            println!("  {} {}", "✓".bright_green(), output.display());
        }
    })
}
