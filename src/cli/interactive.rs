//! Guided music or lyrics generation

use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

use super::Context;
use super::commands::{print_lyrics, save_tracks};
use super::progress::{wait_for_task, with_spinner};
use super::render::{self, IdColumn};
use crate::types::{GenerateMusicRequest, LyricsRequest, Model};

/// Default pick in the model menu (1-based)
const DEFAULT_MODEL_CHOICE: usize = 3;

/// Line-oriented prompts over any reader and writer
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Free text; asks again on an empty answer unless a default exists
    pub fn ask(&mut self, question: &str, default: Option<&str>) -> io::Result<String> {
        loop {
            match default {
                Some(d) => write!(self.output, "{question} [{d}]: ")?,
                None => write!(self.output, "{question}: ")?,
            }
            self.output.flush()?;
            let answer = self.read_line()?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            if let Some(d) = default {
                return Ok(d.to_string());
            }
        }
    }

    /// A positive number; anything else asks again
    pub fn ask_number(&mut self, question: &str, default: usize) -> io::Result<usize> {
        loop {
            let answer = self.ask(question, Some(&default.to_string()))?;
            match answer.parse::<usize>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => writeln!(self.output, "Please enter a number.")?,
            }
        }
    }

    pub fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "{question} [{hint}]: ")?;
            self.output.flush()?;
            match self.read_line()?.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Music,
    Lyrics,
    Cancel,
}

impl Choice {
    fn from_menu(n: usize) -> Self {
        match n {
            2 => Choice::Lyrics,
            3 => Choice::Cancel,
            _ => Choice::Music,
        }
    }
}

/// Model for a 1-based menu pick; out-of-range picks clamp to the ends
fn model_for_choice(n: usize) -> Model {
    Model::ALL[n.clamp(1, Model::ALL.len()) - 1]
}

pub async fn run(ctx: &Context) -> Result<()> {
    let stdin = io::stdin();
    let mut prompt = Prompter::new(stdin.lock(), io::stdout());

    println!(
        "{}",
        render::panel(
            "Interactive Mode",
            "Welcome to Suno interactive mode!\n\nAnswer a few questions to create a track."
        )
        .cyan()
    );

    let balance = with_spinner("Checking credits...", ctx.client.credits()).await?;
    println!("{} You have {} credits\n", "✓".green(), balance.bold());

    println!("{}", "What would you like to create?".bold());
    println!("  1. Generate Music");
    println!("  2. Generate Lyrics");
    println!("  3. Cancel");
    let choice = Choice::from_menu(prompt.ask_number("Enter choice", 1)?);

    match choice {
        Choice::Cancel => {
            println!("{}", "Cancelled.".yellow());
            Ok(())
        }
        Choice::Lyrics => {
            let text = prompt.ask("\nDescribe the lyrics you want", None)?;
            let request = LyricsRequest::new(text);
            let task_id = with_spinner(
                "Submitting lyrics request...",
                ctx.client.generate_lyrics(&request),
            )
            .await?;
            let status = wait_for_task(&ctx.client, &task_id, "Lyrics generation").await?;
            print_lyrics(status.lyrics(), None);
            Ok(())
        }
        Choice::Music => music(ctx, &mut prompt).await,
    }
}

async fn music<R: BufRead, W: Write>(ctx: &Context, prompt: &mut Prompter<R, W>) -> Result<()> {
    let description = prompt.ask("\nDescribe the music you want", None)?;
    let mut request = GenerateMusicRequest::new(description);

    if prompt.confirm("Use custom mode (specify style & title)?", false)? {
        let style = prompt.ask("Music style (e.g. Jazz, Rock, Electronic)", None)?;
        let title = prompt.ask("Song title", None)?;
        request = request.custom(style, title);
    }
    request = request.with_instrumental(prompt.confirm("Instrumental only (no vocals)?", false)?);

    println!("\n{}", "Available models:".bold());
    for (i, model) in Model::ALL.iter().enumerate() {
        println!("  {}. {:<9} {}", i + 1, model.as_str(), model.description().dimmed());
    }
    let model = model_for_choice(prompt.ask_number("Choose model", DEFAULT_MODEL_CHOICE)?);
    request = request.with_model(model);

    println!("\n{}", format!("Generating with {model}...").yellow());
    let task_id = with_spinner("Submitting request...", ctx.client.generate_music(&request)).await?;
    let status = wait_for_task(&ctx.client, &task_id, "Music generation").await?;

    let tracks = status.tracks();
    if tracks.is_empty() {
        println!("{}", "The task finished without tracks.".yellow());
        return Ok(());
    }
    println!("\n{}", render::track_table(tracks, IdColumn::Short));

    if prompt.confirm("\nDownload tracks?", true)? {
        save_tracks(ctx, tracks).await?;
    }
    println!("\n{}", "Done!".green().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn ask_uses_default_on_empty_answer() {
        let mut p = prompter("\n");
        assert_eq!(p.ask("Style", Some("Pop")).unwrap(), "Pop");
    }

    #[test]
    fn ask_repeats_until_answered() {
        let mut p = prompter("\n  \nlofi beat\n");
        assert_eq!(p.ask("Prompt", None).unwrap(), "lofi beat");
    }

    #[test]
    fn ask_number_rejects_garbage() {
        let mut p = prompter("abc\n0\n2\n");
        assert_eq!(p.ask_number("Choice", 1).unwrap(), 2);
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(shown.matches("Please enter a number.").count(), 2);
    }

    #[test]
    fn confirm_defaults_and_answers() {
        let mut p = prompter("\nno\nmaybe\ny\n");
        assert!(p.confirm("Download?", true).unwrap());
        assert!(!p.confirm("Download?", true).unwrap());
        assert!(p.confirm("Download?", false).unwrap());
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut p = prompter("");
        let err = p.ask("Prompt", None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn menu_choices() {
        assert_eq!(Choice::from_menu(1), Choice::Music);
        assert_eq!(Choice::from_menu(2), Choice::Lyrics);
        assert_eq!(Choice::from_menu(3), Choice::Cancel);
        assert_eq!(Choice::from_menu(9), Choice::Music);
    }

    #[test]
    fn model_menu_defaults_to_v4_5_and_clamps() {
        assert_eq!(model_for_choice(DEFAULT_MODEL_CHOICE), Model::V45);
        assert_eq!(model_for_choice(1), Model::V35);
        assert_eq!(model_for_choice(99), Model::V5);
    }
}
