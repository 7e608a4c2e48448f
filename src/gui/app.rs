//! Terminal UI state and key handling
//!
//! [`App`] never talks to the network. Key presses turn into [`Action`]s for
//! the event loop; [`WorkerEvent`]s from the worker update the state.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

use super::worker::{Job, WorkerEvent};
use crate::types::{
    CreditBalance, GenerateMusicRequest, LyricsRequest, Model, SeparateVocalsRequest,
    SeparationType, TaskId, TaskOutput, TaskStatus, VideoRequest, VocalGender, WavRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Generate,
    Lyrics,
    Process,
    History,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Generate, Tab::Lyrics, Tab::Process, Tab::History];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Generate => "F1 Generate",
            Tab::Lyrics => "F2 Lyrics",
            Tab::Process => "F3 Process",
            Tab::History => "F4 History",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Toggle(bool),
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Text(String::new()),
        }
    }

    fn toggle(label: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Toggle(false),
        }
    }

    fn choice(label: &'static str, options: Vec<&'static str>, selected: usize) -> Self {
        Self {
            label,
            value: FieldValue::Choice { options, selected },
        }
    }

    /// Value as shown in the form
    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Toggle(on) => if *on { "[x]" } else { "[ ]" }.to_string(),
            FieldValue::Choice { options, selected } => {
                format!("< {} >", options.get(*selected).copied().unwrap_or_default())
            }
        }
    }
}

/// A column of fields with one focused
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Apply an editing key to the focused field; false when not handled
    fn edit(&mut self, key: KeyEvent) -> bool {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return false;
        };
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match (&mut field.value, key.code) {
            (FieldValue::Text(text), KeyCode::Char(c)) if plain => text.push(c),
            (FieldValue::Text(text), KeyCode::Backspace) => {
                text.pop();
            }
            (FieldValue::Toggle(on), KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) => {
                *on = !*on
            }
            (FieldValue::Choice { options, selected }, KeyCode::Right | KeyCode::Char(' ')) => {
                *selected = (*selected + 1) % options.len();
            }
            (FieldValue::Choice { options, selected }, KeyCode::Left) => {
                *selected = (*selected + options.len() - 1) % options.len();
            }
            _ => return false,
        }
        true
    }

    fn text(&self, index: usize) -> &str {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Text(text)) => text.trim(),
            _ => "",
        }
    }

    fn optional_text(&self, index: usize) -> Option<String> {
        Some(self.text(index))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn toggled(&self, index: usize) -> bool {
        matches!(
            self.fields.get(index).map(|f| &f.value),
            Some(FieldValue::Toggle(true))
        )
    }

    fn selected(&self, index: usize) -> usize {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Choice { selected, .. }) => *selected,
            _ => 0,
        }
    }

    fn set_text(&mut self, index: usize, value: &str) {
        if let Some(FieldValue::Text(text)) = self.fields.get_mut(index).map(|f| &mut f.value) {
            *text = value.to_string();
        }
    }
}

mod generate_fields {
    pub const PROMPT: usize = 0;
    pub const MODEL: usize = 1;
    pub const CUSTOM: usize = 2;
    pub const INSTRUMENTAL: usize = 3;
    pub const STYLE: usize = 4;
    pub const TITLE: usize = 5;
    pub const VOCAL: usize = 6;
    pub const EXCLUDE: usize = 7;
}

mod process_fields {
    pub const TASK_ID: usize = 0;
    pub const AUDIO_ID: usize = 1;
    pub const ACTION: usize = 2;
    pub const SEPARATION: usize = 3;
    pub const AUTHOR: usize = 4;
    pub const DOMAIN: usize = 5;

    pub const SEPARATE: usize = 0;
    pub const VIDEO: usize = 1;
    pub const WAV: usize = 2;
}

/// What the event loop should do after a key press
#[derive(Debug, Clone)]
pub enum Action {
    Submit(Job),
    Cancel,
    Quit,
}

/// The job currently owned by the worker
#[derive(Debug, Clone)]
pub struct Running {
    pub label: &'static str,
    pub tab: Tab,
    pub started: Instant,
    pub task_id: Option<TaskId>,
    pub raw_status: String,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub kind: &'static str,
    pub task_id: TaskId,
    pub status: String,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub tab: Tab,
    pub generate: Form,
    pub lyrics: Form,
    pub process: Form,
    pub generate_output: Vec<String>,
    pub lyrics_output: Vec<String>,
    pub process_output: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub history_selected: usize,
    pub credits: Option<CreditBalance>,
    pub auto_download: bool,
    pub running: Option<Running>,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let default_model = Model::ALL
            .iter()
            .position(|m| *m == Model::default())
            .unwrap_or(0);
        let generate = Form::new(vec![
            Field::text("Prompt"),
            Field::choice(
                "Model",
                Model::ALL.iter().map(|m| m.as_str()).collect(),
                default_model,
            ),
            Field::toggle("Custom mode"),
            Field::toggle("Instrumental"),
            Field::text("Style"),
            Field::text("Title"),
            Field::choice("Vocal", vec!["Auto", "Male", "Female"], 0),
            Field::text("Exclude"),
        ]);
        let process = Form::new(vec![
            Field::text("Task ID"),
            Field::text("Audio ID"),
            Field::choice(
                "Action",
                vec!["Separate vocals", "Create video", "Convert to WAV", "Check status"],
                0,
            ),
            Field::choice(
                "Separation",
                vec!["2 stems (vocal/instrumental)", "12 stems (all instruments)"],
                0,
            ),
            Field::text("Video author"),
            Field::text("Video domain"),
        ]);

        Self {
            tab: Tab::Generate,
            generate,
            lyrics: Form::new(vec![Field::text("Describe the lyrics")]),
            process,
            generate_output: Vec::new(),
            lyrics_output: Vec::new(),
            process_output: Vec::new(),
            history: Vec::new(),
            history_selected: 0,
            credits: None,
            auto_download: true,
            running: None,
            notice: None,
            should_quit: false,
        }
    }

    pub fn form(&self, tab: Tab) -> Option<&Form> {
        match tab {
            Tab::Generate => Some(&self.generate),
            Tab::Lyrics => Some(&self.lyrics),
            Tab::Process => Some(&self.process),
            Tab::History => None,
        }
    }

    fn form_mut(&mut self, tab: Tab) -> Option<&mut Form> {
        match tab {
            Tab::Generate => Some(&mut self.generate),
            Tab::Lyrics => Some(&mut self.lyrics),
            Tab::Process => Some(&mut self.process),
            Tab::History => None,
        }
    }

    /// Result lines shown on `tab`; history results appear under Process
    pub fn output(&self, tab: Tab) -> &[String] {
        match tab {
            Tab::Generate => &self.generate_output,
            Tab::Lyrics => &self.lyrics_output,
            Tab::Process | Tab::History => &self.process_output,
        }
    }

    fn output_mut(&mut self, tab: Tab) -> &mut Vec<String> {
        match tab {
            Tab::Generate => &mut self.generate_output,
            Tab::Lyrics => &mut self.lyrics_output,
            Tab::Process | Tab::History => &mut self.process_output,
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: true,
        });
    }

    /// Hand a job to the worker unless one is already running
    pub fn start(&mut self, job: Job) -> Option<Action> {
        if let Some(label) = self.running.as_ref().map(|r| r.label) {
            self.error(format!("{label} is still running (Esc to cancel)"));
            return None;
        }
        self.running = Some(Running {
            label: job.label(),
            tab: self.tab,
            started: Instant::now(),
            task_id: None,
            raw_status: "SUBMITTING".to_string(),
        });
        if !matches!(job, Job::Credits) {
            self.info(format!("{} request submitted", job.label()));
        }
        Some(Action::Submit(job))
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c' | 'q') if ctrl => {
                self.should_quit = true;
                return Some(Action::Quit);
            }
            KeyCode::Esc => {
                let waiting = self
                    .running
                    .as_ref()
                    .is_some_and(|r| r.task_id.is_some());
                if !waiting {
                    return None;
                }
                self.info("Cancelling wait; the remote task keeps running");
                return Some(Action::Cancel);
            }
            KeyCode::F(n @ 1..=4) => {
                self.tab = Tab::ALL[usize::from(n) - 1];
                return None;
            }
            KeyCode::Char('r') if ctrl => return self.start(Job::Credits),
            KeyCode::Char('d') if ctrl => {
                self.auto_download = !self.auto_download;
                let state = if self.auto_download { "on" } else { "off" };
                self.info(format!("Auto-download {state}"));
                return None;
            }
            KeyCode::Char('l') if ctrl => {
                if self.tab == Tab::History {
                    self.history.clear();
                    self.history_selected = 0;
                } else {
                    let tab = self.tab;
                    self.output_mut(tab).clear();
                }
                return None;
            }
            KeyCode::Char('u') if ctrl && self.tab == Tab::Lyrics => {
                self.use_lyrics_in_generate();
                return None;
            }
            _ => {}
        }

        if self.tab == Tab::History {
            return self.on_history_key(key);
        }

        let tab = self.tab;
        match key.code {
            KeyCode::Enter => match self.build_job(tab) {
                Ok(job) => self.start(job),
                Err(message) => {
                    self.error(message);
                    None
                }
            },
            KeyCode::Tab | KeyCode::Down => {
                if let Some(form) = self.form_mut(tab) {
                    form.focus_next();
                }
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(form) = self.form_mut(tab) {
                    form.focus_prev();
                }
                None
            }
            _ => {
                if let Some(form) = self.form_mut(tab) {
                    form.edit(key);
                }
                None
            }
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Up => {
                self.history_selected = self.history_selected.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.history_selected + 1 < self.history.len() {
                    self.history_selected += 1;
                }
                None
            }
            KeyCode::Enter => {
                let task_id = self.history.get(self.history_selected)?.task_id.clone();
                self.process.set_text(process_fields::TASK_ID, task_id.as_str());
                self.start(Job::Status(task_id))
            }
            _ => None,
        }
    }

    /// Copy the first generated lyrics into the Generate prompt
    fn use_lyrics_in_generate(&mut self) {
        let text = self
            .lyrics_output
            .iter()
            .skip_while(|l| !l.starts_with("──"))
            .skip(1)
            .take_while(|l| !l.starts_with("──"))
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            self.error("No lyrics to use yet");
            return;
        }
        self.generate.set_text(generate_fields::PROMPT, &text);
        self.tab = Tab::Generate;
        self.info("Lyrics copied into the prompt");
    }

    fn build_job(&self, tab: Tab) -> Result<Job, String> {
        let job = match tab {
            Tab::Generate => self.generate_job(),
            Tab::Lyrics => {
                let request = LyricsRequest::new(self.lyrics.text(0));
                request.validate().map(|()| Job::Lyrics(request))
            }
            Tab::Process => self.process_job(),
            Tab::History => return Err("Nothing to submit here".to_string()),
        };
        job.map_err(|e| e.to_string())
    }

    fn generate_job(&self) -> crate::Result<Job> {
        use generate_fields::*;
        let form = &self.generate;
        let model = Model::ALL
            .get(form.selected(MODEL))
            .copied()
            .unwrap_or_default();
        let mut request = GenerateMusicRequest::new(form.text(PROMPT))
            .with_model(model)
            .with_instrumental(form.toggled(INSTRUMENTAL));
        if form.toggled(CUSTOM) {
            request.custom_mode = true;
            request.style = form.optional_text(STYLE);
            request.title = form.optional_text(TITLE);
            match form.selected(VOCAL) {
                1 => request = request.with_vocal_gender(VocalGender::Male),
                2 => request = request.with_vocal_gender(VocalGender::Female),
                _ => {}
            }
            if let Some(tags) = form.optional_text(EXCLUDE) {
                request = request.with_negative_tags(tags);
            }
        }
        request.validate()?;
        Ok(Job::Generate {
            request,
            auto_download: self.auto_download,
        })
    }

    fn process_job(&self) -> crate::Result<Job> {
        use process_fields::*;
        let form = &self.process;
        let task_id = form.text(TASK_ID);
        let audio_id = form.text(AUDIO_ID);
        let job = match form.selected(ACTION) {
            SEPARATE => {
                let separation = if form.selected(SEPARATION) == 1 {
                    SeparationType::SplitStem
                } else {
                    SeparationType::SeparateVocal
                };
                let request = SeparateVocalsRequest::new(task_id, audio_id).with_type(separation);
                request.validate()?;
                Job::Separate(request)
            }
            VIDEO => {
                let mut request = VideoRequest::new(task_id, audio_id);
                if let Some(author) = form.optional_text(AUTHOR) {
                    request = request.with_author(author);
                }
                if let Some(domain) = form.optional_text(DOMAIN) {
                    request = request.with_domain(domain);
                }
                request.validate()?;
                Job::Video(request)
            }
            WAV => {
                let request = WavRequest::new(task_id, audio_id);
                request.validate()?;
                Job::Wav(request)
            }
            _ => Job::Status(TaskId::new(task_id)?),
        };
        Ok(job)
    }

    pub fn on_event(&mut self, event: WorkerEvent) -> Option<Action> {
        match event {
            WorkerEvent::Submitted(task_id) => {
                let kind = self.running.as_ref().map_or("Task", |r| r.label);
                let tab = self.running.as_ref().map_or(self.tab, |r| r.tab);
                self.output_mut(tab).push(format!("Task created: {task_id}"));
                self.history.insert(
                    0,
                    HistoryEntry {
                        kind,
                        task_id: task_id.clone(),
                        status: "SUBMITTED".to_string(),
                        at: Local::now(),
                    },
                );
                self.history_selected = 0;
                if let Some(running) = self.running.as_mut() {
                    running.task_id = Some(task_id);
                }
                None
            }
            WorkerEvent::Progress {
                task_id,
                raw_status,
                ..
            } => {
                self.set_history_status(&task_id, &raw_status);
                if let Some(running) = self.running.as_mut() {
                    running.raw_status = raw_status;
                }
                None
            }
            WorkerEvent::Finished(status) => {
                let running = self.running.take();
                let label = running.as_ref().map_or("Task", |r| r.label);
                let tab = running.as_ref().map_or(self.tab, |r| r.tab);
                self.set_history_status(&status.task_id, &status.raw_status);
                let lines = result_lines(&status);
                self.output_mut(tab).extend(lines);
                if status.is_failed() {
                    self.error(format!("{label} failed"));
                } else {
                    self.info(format!("{label}: {}", status.raw_status));
                }
                // generation spends credits
                if matches!(label, "Music" | "Lyrics") {
                    return self.start(Job::Credits);
                }
                None
            }
            WorkerEvent::Failed(message) => {
                let running = self.running.take();
                let tab = running.as_ref().map_or(self.tab, |r| r.tab);
                if let Some(task_id) = running.and_then(|r| r.task_id) {
                    self.set_history_status(&task_id, "FAILED");
                }
                let first = message.lines().next().unwrap_or_default().to_string();
                self.output_mut(tab).push(format!("Error: {first}"));
                self.error(message.replace('\n', " "));
                None
            }
            WorkerEvent::Credits(balance) => {
                self.credits = Some(balance);
                if self
                    .running
                    .as_ref()
                    .is_some_and(|r| r.label == Job::Credits.label())
                {
                    self.running = None;
                }
                None
            }
            WorkerEvent::Downloaded { path, bytes } => {
                self.generate_output
                    .push(format!("Saved: {} ({bytes} bytes)", path.display()));
                None
            }
            WorkerEvent::DownloadFailed { url, message } => {
                self.generate_output
                    .push(format!("Download failed: {url}: {message}"));
                None
            }
        }
    }

    fn set_history_status(&mut self, task_id: &TaskId, status: &str) {
        if let Some(entry) = self.history.iter_mut().find(|e| &e.task_id == task_id) {
            entry.status = status.to_string();
        }
    }
}

/// Human-readable lines for a finished task
pub fn result_lines(status: &TaskStatus) -> Vec<String> {
    let mut lines = vec![format!("Task {}: {}", status.task_id, status.raw_status)];
    if let Some(error) = &status.error_message {
        lines.push(format!("Error: {error}"));
    }
    match &status.output {
        TaskOutput::Tracks(tracks) => {
            for (i, track) in tracks.iter().enumerate() {
                let title = if track.title.is_empty() {
                    "Untitled"
                } else {
                    &track.title
                };
                lines.push(format!("Track {}: {title} ({})", i + 1, track.duration_label()));
                lines.push(format!("  Audio ID: {}", track.id));
                if track.is_downloadable() {
                    lines.push(format!("  URL: {}", track.audio_url));
                } else if let Some(stream) = &track.stream_audio_url {
                    lines.push(format!("  Stream: {stream}"));
                }
            }
        }
        TaskOutput::Lyrics(lyrics) => {
            for (i, item) in lyrics.iter().enumerate() {
                lines.push(format!("── Lyrics #{} {}", i + 1, item.title));
                lines.extend(item.text.lines().map(str::to_string));
            }
            lines.push("──".to_string());
        }
        TaskOutput::Stems(stems) => {
            let named = [
                ("Vocals", &stems.vocal_url),
                ("Instrumental", &stems.instrumental_url),
                ("Original", &stems.origin_url),
            ];
            for (name, url) in named {
                if let Some(url) = url {
                    lines.push(format!("{name}: {url}"));
                }
            }
            for (name, url) in &stems.stems {
                lines.push(format!("{name}: {url}"));
            }
        }
        TaskOutput::Video { video_url } => lines.push(format!("Video: {video_url}")),
        TaskOutput::Wav { wav_url } => lines.push(format!("WAV: {wav_url}")),
        TaskOutput::Empty => {}
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn status(task_id: &str, raw: &str, output: TaskOutput) -> TaskStatus {
        TaskStatus {
            task_id: TaskId::new(task_id).unwrap(),
            state: TaskState::from_remote(raw),
            raw_status: raw.to_string(),
            created_at: None,
            output,
            error_message: None,
        }
    }

    #[test]
    fn enter_submits_a_generate_job() {
        let mut app = App::new();
        type_text(&mut app, "lofi beat");
        match app.on_key(key(KeyCode::Enter)) {
            Some(Action::Submit(Job::Generate {
                request,
                auto_download,
            })) => {
                assert_eq!(request.prompt, "lofi beat");
                assert_eq!(request.model, Model::V45);
                assert!(!request.custom_mode);
                assert!(auto_download);
            }
            other => panic!("unexpected action: {other:?}"),
        }
        assert!(app.running.is_some());
    }

    #[test]
    fn custom_mode_without_style_is_rejected_locally() {
        let mut app = App::new();
        type_text(&mut app, "ballad");
        app.generate.focus = generate_fields::CUSTOM;
        app.on_key(key(KeyCode::Char(' ')));
        assert!(app.on_key(key(KeyCode::Enter)).is_none());
        assert!(app.notice.as_ref().is_some_and(|n| n.is_error));
        assert!(app.running.is_none());
    }

    #[test]
    fn only_one_job_at_a_time() {
        let mut app = App::new();
        app.tab = Tab::Lyrics;
        type_text(&mut app, "sea shanty");
        assert!(matches!(
            app.on_key(key(KeyCode::Enter)),
            Some(Action::Submit(Job::Lyrics(_)))
        ));
        assert!(app.on_key(key(KeyCode::Enter)).is_none());
        assert!(app.on_key(ctrl('r')).is_none());
    }

    #[test]
    fn model_choice_cycles_with_arrows() {
        let mut app = App::new();
        app.generate.focus = generate_fields::MODEL;
        app.on_key(key(KeyCode::Right));
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.generate.selected(generate_fields::MODEL), 4);
        app.on_key(key(KeyCode::Right));
        assert_eq!(app.generate.selected(generate_fields::MODEL), 0);
        app.on_key(key(KeyCode::Left));
        assert_eq!(app.generate.selected(generate_fields::MODEL), 4);
    }

    #[test]
    fn escape_cancels_only_a_submitted_task() {
        let mut app = App::new();
        assert!(app.on_key(key(KeyCode::Esc)).is_none());

        app.tab = Tab::Lyrics;
        type_text(&mut app, "x");
        app.on_key(key(KeyCode::Enter));
        app.on_event(WorkerEvent::Submitted(TaskId::new("t1").unwrap()));
        assert!(matches!(app.on_key(key(KeyCode::Esc)), Some(Action::Cancel)));
    }

    #[test]
    fn events_drive_history_and_output() {
        let mut app = App::new();
        type_text(&mut app, "rain");
        app.on_key(key(KeyCode::Enter));

        let id = TaskId::new("t-42").unwrap();
        app.on_event(WorkerEvent::Submitted(id.clone()));
        app.on_event(WorkerEvent::Progress {
            task_id: id.clone(),
            raw_status: "GENERATING".into(),
            elapsed: std::time::Duration::from_secs(10),
        });
        assert_eq!(app.history[0].status, "GENERATING");
        assert_eq!(app.history[0].kind, "Music");

        let action = app.on_event(WorkerEvent::Finished(status("t-42", "SUCCESS", TaskOutput::Empty)));
        assert!(matches!(action, Some(Action::Submit(Job::Credits))));
        assert_eq!(app.history[0].status, "SUCCESS");
        assert!(app.generate_output.iter().any(|l| l == "Task created: t-42"));

        app.on_event(WorkerEvent::Credits(CreditBalance::new(12.0).unwrap()));
        assert!(app.running.is_none());
        assert_eq!(app.credits.map(|c| c.value()), Some(12.0));
    }

    #[test]
    fn failure_marks_history_and_frees_the_worker() {
        let mut app = App::new();
        app.tab = Tab::Lyrics;
        type_text(&mut app, "x");
        app.on_key(key(KeyCode::Enter));
        app.on_event(WorkerEvent::Submitted(TaskId::new("t9").unwrap()));
        app.on_event(WorkerEvent::Failed("Task t9 failed: policy\nhint".into()));
        assert!(app.running.is_none());
        assert_eq!(app.history[0].status, "FAILED");
        assert_eq!(app.lyrics_output.last().unwrap(), "Error: Task t9 failed: policy");
    }

    #[test]
    fn history_enter_checks_status() {
        let mut app = App::new();
        app.history.push(HistoryEntry {
            kind: "Music",
            task_id: TaskId::new("old-task").unwrap(),
            status: "SUCCESS".into(),
            at: Local::now(),
        });
        app.on_key(key(KeyCode::F(4)));
        match app.on_key(key(KeyCode::Enter)) {
            Some(Action::Submit(Job::Status(id))) => assert_eq!(id.as_str(), "old-task"),
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn process_tab_builds_each_action() {
        let mut app = App::new();
        app.tab = Tab::Process;
        type_text(&mut app, "task-1");
        app.on_key(key(KeyCode::Tab));
        type_text(&mut app, "audio-1");
        assert!(matches!(
            app.build_job(Tab::Process),
            Ok(Job::Separate(r)) if r.separation_type == SeparationType::SeparateVocal
        ));

        app.process.focus = process_fields::ACTION;
        app.on_key(key(KeyCode::Right));
        assert!(matches!(app.build_job(Tab::Process), Ok(Job::Video(_))));
        app.on_key(key(KeyCode::Right));
        assert!(matches!(app.build_job(Tab::Process), Ok(Job::Wav(_))));
        app.on_key(key(KeyCode::Right));
        assert!(matches!(app.build_job(Tab::Process), Ok(Job::Status(_))));
    }

    #[test]
    fn lyrics_can_be_reused_as_prompt() {
        let mut app = App::new();
        app.lyrics_output = result_lines(&status(
            "t",
            "SUCCESS",
            TaskOutput::Lyrics(vec![crate::types::Lyrics {
                id: "l1".into(),
                title: "Sea".into(),
                text: "[Verse]\nWaves".into(),
            }]),
        ));
        app.tab = Tab::Lyrics;
        app.on_key(ctrl('u'));
        assert_eq!(app.tab, Tab::Generate);
        assert_eq!(app.generate.text(generate_fields::PROMPT), "[Verse]\nWaves");
    }

    #[test]
    fn ctrl_c_quits() {
        let mut app = App::new();
        assert!(matches!(app.on_key(ctrl('c')), Some(Action::Quit)));
        assert!(app.should_quit);
    }
}
