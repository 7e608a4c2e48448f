//! Subcommand arguments and handlers

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use super::Context;
use super::progress::{download_with_bar, wait_for_task, with_spinner};
use super::render::{self, IdColumn, STATUS_LYRICS_PREVIEW};
use crate::download::{filename_from_url, track_filename};
use crate::types::{
    ExtendMusicRequest, GenerateMusicRequest, Lyrics, LyricsRequest, Model, SeparateVocalsRequest,
    SeparationType, TaskId, TaskOutput, TaskStatus, Track, UploadCoverRequest, VideoRequest,
    VocalGender, WavRequest,
};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Description of the music
    pub prompt: String,

    /// Model version
    #[arg(short, long, default_value_t = Model::default())]
    pub model: Model,

    /// Custom mode (requires --style and --title)
    #[arg(short, long)]
    pub custom: bool,

    /// Instrumental only, no vocals
    #[arg(short, long)]
    pub instrumental: bool,

    /// Music style or genre (required in custom mode)
    #[arg(short, long)]
    pub style: Option<String>,

    /// Song title (required in custom mode)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Vocal gender: m or f
    #[arg(short = 'v', long = "vocal")]
    pub vocal: Option<VocalGender>,

    /// Styles to exclude
    #[arg(short, long)]
    pub negative: Option<String>,

    /// Print the task id and exit without waiting
    #[arg(long)]
    pub no_wait: bool,

    /// Download generated tracks
    #[arg(short, long)]
    pub download: bool,
}

#[derive(Args, Debug)]
pub struct LyricsArgs {
    /// Description of the lyrics
    pub prompt: String,

    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct ExtendArgs {
    /// Audio id of the track to extend
    pub audio_id: String,

    /// Model (must match the source track)
    #[arg(short, long, default_value_t = Model::default())]
    pub model: Model,

    /// Second at which the extension starts
    #[arg(short, long)]
    pub continue_at: f64,

    /// Description of the extension
    #[arg(short, long)]
    pub prompt: Option<String>,

    #[arg(short, long)]
    pub style: Option<String>,

    #[arg(short, long)]
    pub title: Option<String>,

    /// Reuse the source track's parameters
    #[arg(long)]
    pub use_defaults: bool,

    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct CoverArgs {
    /// Public URL of the audio to cover
    pub upload_url: String,

    #[arg(short, long, default_value_t = Model::default())]
    pub model: Model,

    /// Description of the cover
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Custom mode (requires --style and --title)
    #[arg(short, long)]
    pub custom: bool,

    #[arg(short, long)]
    pub instrumental: bool,

    #[arg(short, long)]
    pub style: Option<String>,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(long)]
    pub no_wait: bool,

    /// Download generated tracks
    #[arg(short, long)]
    pub download: bool,
}

#[derive(Args, Debug)]
pub struct SeparateArgs {
    /// Task that produced the track
    pub task_id: String,
    pub audio_id: String,

    /// vocal (2 stems) or stem (12 stems)
    #[arg(short = 't', long = "type", default_value = "vocal")]
    pub separation: SeparationType,

    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct VideoArgs {
    pub task_id: String,
    pub audio_id: String,

    /// Artist name (max 50 chars)
    #[arg(short, long)]
    pub author: Option<String>,

    /// Watermark domain (max 50 chars)
    #[arg(short, long)]
    pub domain: Option<String>,

    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct WavArgs {
    pub task_id: String,
    pub audio_id: String,

    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub task_id: String,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    pub url: String,

    /// File name inside the downloads directory
    #[arg(short, long)]
    pub output: Option<String>,
}

// ==================== Account ====================

pub async fn credits(ctx: &Context) -> Result<()> {
    let balance = with_spinner("Checking credits...", ctx.client.credits()).await?;
    let body = format!("{balance} credits remaining");
    println!("{}", render::panel("Account Balance", &body).green());
    Ok(())
}

// ==================== Generation ====================

pub async fn generate(ctx: &Context, args: GenerateArgs) -> Result<()> {
    let mut request = GenerateMusicRequest::new(args.prompt)
        .with_model(args.model)
        .with_instrumental(args.instrumental);
    request.custom_mode = args.custom;
    request.style = args.style;
    request.title = args.title;
    if let Some(gender) = args.vocal {
        request = request.with_vocal_gender(gender);
    }
    if let Some(negative) = args.negative {
        request = request.with_negative_tags(negative);
    }
    request.validate()?;

    let summary = format!(
        "Prompt: {}\nModel: {}\nMode: {}\nInstrumental: {}",
        request.prompt,
        request.model,
        if request.custom_mode { "Custom" } else { "Auto" },
        yes_no(request.instrumental),
    );
    println!("{}", render::panel("Generating Music", &summary).blue());

    let task_id = submit("Submitting generation request...", ctx.client.generate_music(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "Music generation").await?;
    show_tracks(ctx, status.tracks(), args.download).await
}

pub async fn lyrics(ctx: &Context, args: LyricsArgs) -> Result<()> {
    let request = LyricsRequest::new(args.prompt);
    request.validate()?;
    println!(
        "{}",
        render::panel("Generating Lyrics", &format!("Prompt: {}", request.prompt)).blue()
    );

    let task_id = submit("Submitting lyrics request...", ctx.client.generate_lyrics(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "Lyrics generation").await?;
    print_lyrics(status.lyrics(), None);
    Ok(())
}

pub async fn extend(ctx: &Context, args: ExtendArgs) -> Result<()> {
    let mut request = ExtendMusicRequest::new(args.audio_id)
        .with_model(args.model)
        .with_custom_params(!args.use_defaults)
        .continue_at(args.continue_at);
    request.prompt = args.prompt;
    request.style = args.style;
    request.title = args.title;
    request.validate()?;

    let summary = format!(
        "Audio ID: {}\nContinue at: {}s\nMode: {}",
        request.audio_id,
        args.continue_at,
        if args.use_defaults { "Default params" } else { "Custom params" },
    );
    println!("{}", render::panel("Extending Music", &summary).blue());

    let task_id = submit("Submitting extend request...", ctx.client.extend_music(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "Music extension").await?;
    for track in status.tracks() {
        println!("\n{} Extended track: {}", "✓".green(), track.title);
        println!("  Duration: {}", track.duration_label());
        println!("  URL: {}", track.audio_url.cyan());
    }
    Ok(())
}

pub async fn cover(ctx: &Context, args: CoverArgs) -> Result<()> {
    let mut request = UploadCoverRequest::new(args.upload_url)
        .with_model(args.model)
        .with_instrumental(args.instrumental);
    request.custom_mode = args.custom;
    request.prompt = args.prompt;
    request.style = args.style;
    request.title = args.title;
    request.validate()?;

    let summary = format!(
        "Source: {}\nModel: {}\nMode: {}",
        request.upload_url,
        request.model,
        if request.custom_mode { "Custom" } else { "Auto" },
    );
    println!("{}", render::panel("Covering Audio", &summary).blue());

    let task_id = submit("Submitting cover request...", ctx.client.upload_and_cover(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "Cover generation").await?;
    show_tracks(ctx, status.tracks(), args.download).await
}

// ==================== Processing ====================

pub async fn separate(ctx: &Context, args: SeparateArgs) -> Result<()> {
    let request = SeparateVocalsRequest::new(args.task_id, args.audio_id).with_type(args.separation);
    request.validate()?;

    let summary = format!(
        "Task ID: {}\nAudio ID: {}\nType: {} ({} stems)",
        request.task_id,
        request.audio_id,
        request.separation_type.as_str(),
        request.separation_type.stem_count(),
    );
    println!("{}", render::panel("Separating Vocals", &summary).blue());

    let task_id = submit("Submitting separation request...", ctx.client.separate_vocals(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "Vocal separation").await?;
    print_output(&status);
    Ok(())
}

pub async fn video(ctx: &Context, args: VideoArgs) -> Result<()> {
    let mut request = VideoRequest::new(args.task_id, args.audio_id);
    if let Some(author) = &args.author {
        request = request.with_author(author);
    }
    if let Some(domain) = &args.domain {
        request = request.with_domain(domain);
    }
    request.validate()?;

    let summary = format!(
        "Task ID: {}\nAudio ID: {}\nAuthor: {}\nDomain: {}",
        request.task_id,
        request.audio_id,
        request.author.as_deref().unwrap_or("Not set"),
        request.domain_name.as_deref().unwrap_or("Not set"),
    );
    println!("{}", render::panel("Creating Video", &summary).blue());

    let task_id = submit("Submitting video request...", ctx.client.create_video(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "Video generation").await?;
    print_output(&status);
    Ok(())
}

pub async fn wav(ctx: &Context, args: WavArgs) -> Result<()> {
    let request = WavRequest::new(args.task_id, args.audio_id);
    request.validate()?;

    let summary = format!("Task ID: {}\nAudio ID: {}", request.task_id, request.audio_id);
    println!("{}", render::panel("Converting to WAV", &summary).blue());

    let task_id = submit("Submitting WAV conversion request...", ctx.client.convert_to_wav(&request)).await?;
    if args.no_wait {
        return no_wait_hint(&task_id);
    }
    let status = wait_for_task(&ctx.client, &task_id, "WAV conversion").await?;
    print_output(&status);
    Ok(())
}

// ==================== Status & downloads ====================

pub async fn status(ctx: &Context, args: StatusArgs) -> Result<()> {
    let task_id = TaskId::new(args.task_id)?;
    let status = with_spinner("Checking task status...", ctx.client.task_status(&task_id)).await?;

    let color = render::state_color(status.state);
    let mut body = format!("Task ID: {}\nStatus: {}", status.task_id, status.raw_status);
    if let Some(created) = status.created_at {
        body.push_str(&format!("\nCreated: {}", created.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if let Some(error) = &status.error_message {
        body.push_str(&format!("\nError: {error}"));
    }
    println!("{}", render::panel("Task Status", &body).color(color));

    match &status.output {
        TaskOutput::Tracks(tracks) => {
            println!("\n{}", render::track_table(tracks, IdColumn::Full));
            print_urls(tracks);
        }
        TaskOutput::Lyrics(lyrics) => print_lyrics(lyrics, Some(STATUS_LYRICS_PREVIEW)),
        _ => print_output(&status),
    }
    Ok(())
}

pub async fn download(ctx: &Context, args: DownloadArgs) -> Result<()> {
    let dir = ctx.settings.ensure_downloads_dir()?;
    let name = args.output.unwrap_or_else(|| filename_from_url(&args.url));
    let dest = dir.join(name);

    println!("{} {}", "Downloading to:".yellow(), dest.display());
    let done = download_with_bar(&ctx.client, &args.url, &dest).await?;
    println!(
        "{} Downloaded: {} ({} bytes)",
        "✓".green(),
        done.path.display(),
        done.bytes
    );
    Ok(())
}

// ==================== Shared output ====================

async fn submit<F>(message: &str, fut: F) -> Result<TaskId>
where
    F: std::future::Future<Output = crate::Result<TaskId>>,
{
    let task_id = with_spinner(message, fut).await?;
    println!("{} Task created: {}", "✓".green(), task_id.cyan());
    Ok(task_id)
}

fn no_wait_hint(task_id: &TaskId) -> Result<()> {
    println!(
        "\nUse {} to check progress",
        format!("suno status {task_id}").cyan()
    );
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

async fn show_tracks(ctx: &Context, tracks: &[Track], download: bool) -> Result<()> {
    if tracks.is_empty() {
        println!("{}", "The task finished without tracks.".yellow());
        return Ok(());
    }
    if download {
        save_tracks(ctx, tracks).await?;
    }
    println!("\n{}", render::track_table(tracks, IdColumn::Short));
    print_urls(tracks);
    Ok(())
}

/// Download every track with an audio URL into the downloads directory
pub(super) async fn save_tracks(ctx: &Context, tracks: &[Track]) -> Result<Vec<PathBuf>> {
    let dir = ctx.settings.ensure_downloads_dir()?;
    let mut saved = Vec::new();
    for track in tracks.iter().filter(|t| t.is_downloadable()) {
        let dest = dir.join(track_filename(track));
        let done = download_with_bar(&ctx.client, &track.audio_url, &dest).await?;
        println!("{} Saved: {}", "✓".green(), done.path.display());
        saved.push(done.path);
    }
    Ok(saved)
}

fn print_urls(tracks: &[Track]) {
    let urls: Vec<&str> = tracks
        .iter()
        .filter(|t| t.is_downloadable())
        .map(|t| t.audio_url.as_str())
        .collect();
    if urls.is_empty() {
        return;
    }
    println!("\n{}", "Audio URLs:".bold());
    for url in urls {
        println!("  • {url}");
    }
}

/// Lyrics panels, optionally cut to `preview` characters
pub(super) fn print_lyrics(lyrics: &[Lyrics], preview: Option<usize>) {
    if lyrics.is_empty() {
        println!("{}", "No lyrics returned.".yellow());
        return;
    }
    for (i, item) in lyrics.iter().enumerate() {
        let text = match preview {
            Some(max) => render::truncate_chars(&item.text, max),
            None => item.text.clone(),
        };
        println!(
            "{}",
            render::panel(&render::lyrics_title(i + 1, item), &text).green()
        );
    }
}

/// Result URLs for whatever shape the task produced
fn print_output(status: &TaskStatus) {
    match &status.output {
        TaskOutput::Tracks(tracks) => print_urls(tracks),
        TaskOutput::Lyrics(lyrics) => print_lyrics(lyrics, None),
        TaskOutput::Stems(stems) => {
            println!("\n{}", "Stems:".bold());
            let named = [
                ("vocals", &stems.vocal_url),
                ("instrumental", &stems.instrumental_url),
                ("original", &stems.origin_url),
            ];
            for (name, url) in named {
                if let Some(url) = url {
                    println!("  • {name:<14} {url}");
                }
            }
            for (name, url) in &stems.stems {
                println!("  • {name:<14} {url}");
            }
        }
        TaskOutput::Video { video_url } => {
            println!("{} Video: {}", "✓".green(), video_url.cyan());
        }
        TaskOutput::Wav { wav_url } => {
            println!("{} WAV: {}", "✓".green(), wav_url.cyan());
        }
        TaskOutput::Empty => {
            if status.is_terminal() {
                println!("{}", "The task returned no downloadable output.".yellow());
            }
        }
    }
}
