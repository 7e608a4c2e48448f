//! Task Types
//!
//! Asynchronous generation tasks and the artifacts they produce.
//!
//! The status endpoint returns a different `response` shape per task kind
//! (track list, lyrics list, stem URLs, a video URL, a WAV URL). Each shape
//! is decoded into one [`TaskOutput`] variant through serde.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SunoError};

/// Opaque identifier of a remote task, never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap an identifier, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(SunoError::InvalidParameters(
                "task id must not be empty".to_string(),
            ));
        }
        if trimmed.len() == id.len() {
            Ok(Self(id))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TaskId {
    type Err = SunoError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a remote task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Queued, not started
    Pending,
    /// Generating; partial results may already be present
    Running,
    /// Finished successfully
    Complete,
    /// Finished with an error
    Failed,
}

impl TaskState {
    /// Map a remote status string.
    ///
    /// Unknown strings are treated as pending so a new intermediate stage
    /// never ends a wait early.
    pub fn from_remote(status: &str) -> Self {
        let status = status.trim().to_ascii_uppercase();
        match status.as_str() {
            "SUCCESS" => Self::Complete,
            "PENDING" => Self::Pending,
            "GENERATING" | "TEXT_SUCCESS" | "FIRST_SUCCESS" => Self::Running,
            "FAILED" => Self::Failed,
            s if s.ends_with("_FAILED") || s.ends_with("_ERROR") || s.ends_with("_EXCEPTION") => {
                Self::Failed
            }
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    /// Download URL; empty while the track is still rendering
    #[serde(alias = "audioUrl", deserialize_with = "string_or_null")]
    pub audio_url: String,
    #[serde(default, alias = "streamAudioUrl", deserialize_with = "non_empty")]
    pub stream_audio_url: Option<String>,
    #[serde(default, alias = "imageUrl", deserialize_with = "non_empty")]
    pub image_url: Option<String>,
    #[serde(default, alias = "videoUrl", deserialize_with = "non_empty")]
    pub video_url: Option<String>,
    #[serde(default, deserialize_with = "string_or_null")]
    pub tags: String,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default, alias = "modelName", deserialize_with = "non_empty")]
    pub model_name: Option<String>,
}

impl Track {
    /// Whether the final audio file can be downloaded yet
    pub fn is_downloadable(&self) -> bool {
        !self.audio_url.is_empty()
    }

    /// Duration as `M:SS`
    pub fn duration_label(&self) -> String {
        format_duration(self.duration)
    }
}

/// `M:SS`, or `-:--` when the duration is unknown
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds.filter(|s| s.is_finite() && *s >= 0.0) {
        Some(s) => {
            let total = s as u64;
            format!("{}:{:02}", total / 60, total % 60)
        }
        None => "-:--".to_string(),
    }
}

/// Generated lyrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lyrics {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    #[serde(deserialize_with = "string_or_null")]
    pub text: String,
}

/// Output of a vocal separation task
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stems {
    pub origin_url: Option<String>,
    pub vocal_url: Option<String>,
    pub instrumental_url: Option<String>,
    /// Per-instrument stems keyed by name (`drums`, `bass`, ...)
    pub stems: BTreeMap<String, String>,
}

/// Result payload of a task, one variant per response shape
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TaskOutput {
    Tracks(Vec<Track>),
    Lyrics(Vec<Lyrics>),
    Stems(Stems),
    Video { video_url: String },
    Wav { wav_url: String },
    #[default]
    Empty,
}

impl TaskOutput {
    /// Decode the `response` object of a status record
    pub fn from_response(response: Option<serde_json::Value>) -> Result<Self> {
        let Some(value) = response.filter(|v| !v.is_null()) else {
            return Ok(Self::Empty);
        };
        let payload: ResponsePayload = serde_json::from_value(value)?;
        Ok(payload.into())
    }
}

/// Snapshot of a task as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStatus {
    pub task_id: TaskId,
    pub state: TaskState,
    /// Status string exactly as the service sent it
    pub raw_status: String,
    pub created_at: Option<DateTime<Utc>>,
    pub output: TaskOutput,
    pub error_message: Option<String>,
}

impl TaskStatus {
    pub fn is_complete(&self) -> bool {
        self.state == TaskState::Complete
    }

    pub fn is_failed(&self) -> bool {
        self.state == TaskState::Failed
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Tracks carried by the output, empty for other shapes
    pub fn tracks(&self) -> &[Track] {
        match &self.output {
            TaskOutput::Tracks(tracks) => tracks,
            _ => &[],
        }
    }

    /// Lyrics carried by the output, empty for other shapes
    pub fn lyrics(&self) -> &[Lyrics] {
        match &self.output {
            TaskOutput::Lyrics(lyrics) => lyrics,
            _ => &[],
        }
    }

    /// Build a snapshot from the `data` of a status response.
    ///
    /// `requested` is used when the record omits its own id.
    pub(crate) fn from_record(requested: &TaskId, record: RecordInfo) -> Result<Self> {
        let task_id = match record.task_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => TaskId::new(id)?,
            _ => requested.clone(),
        };
        let raw_status = record
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "PENDING".to_string());
        Ok(Self {
            task_id,
            state: TaskState::from_remote(&raw_status),
            raw_status,
            created_at: record.create_time.and_then(parse_timestamp),
            output: TaskOutput::from_response(record.response)?,
            error_message: record.error_message.filter(|m| !m.trim().is_empty()),
        })
    }
}

/// `data` object of `GET /generate/record-info`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecordInfo {
    pub task_id: Option<String>,
    pub status: Option<String>,
    pub response: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub create_time: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponsePayload {
    Items {
        #[serde(alias = "sunoData")]
        data: Vec<ResponseItem>,
    },
    Stems(StemsWire),
    Video {
        #[serde(alias = "videoUrl")]
        video_url: String,
    },
    Wav {
        #[serde(alias = "audioWavUrl")]
        audio_wav_url: String,
    },
    Other(serde_json::Value),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseItem {
    Track(Track),
    Lyrics(Lyrics),
    Other(serde_json::Value),
}

#[derive(Deserialize)]
struct StemsWire {
    #[serde(alias = "vocalUrl", deserialize_with = "string_or_null")]
    vocal_url: String,
    #[serde(default, alias = "instrumentalUrl", deserialize_with = "non_empty")]
    instrumental_url: Option<String>,
    #[serde(default, alias = "originUrl", deserialize_with = "non_empty")]
    origin_url: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

impl From<ResponsePayload> for TaskOutput {
    fn from(payload: ResponsePayload) -> Self {
        match payload {
            ResponsePayload::Items { data } => {
                let mut tracks = Vec::new();
                let mut lyrics = Vec::new();
                for item in data {
                    match item {
                        ResponseItem::Track(track) => tracks.push(track),
                        ResponseItem::Lyrics(text) => lyrics.push(text),
                        ResponseItem::Other(_) => {}
                    }
                }
                if !tracks.is_empty() {
                    TaskOutput::Tracks(tracks)
                } else if !lyrics.is_empty() {
                    TaskOutput::Lyrics(lyrics)
                } else {
                    TaskOutput::Empty
                }
            }
            ResponsePayload::Stems(wire) => TaskOutput::Stems(Stems {
                origin_url: wire.origin_url,
                vocal_url: Some(wire.vocal_url).filter(|u| !u.is_empty()),
                instrumental_url: wire.instrumental_url,
                stems: collect_stems(wire.extra),
            }),
            ResponsePayload::Video { video_url } => TaskOutput::Video { video_url },
            ResponsePayload::Wav { audio_wav_url } => TaskOutput::Wav {
                wav_url: audio_wav_url,
            },
            ResponsePayload::Other(_) => TaskOutput::Empty,
        }
    }
}

/// Keep `<name>Url` / `<name>_url` string fields as named stems
fn collect_stems(extra: BTreeMap<String, serde_json::Value>) -> BTreeMap<String, String> {
    extra
        .into_iter()
        .filter_map(|(key, value)| {
            let name = key
                .strip_suffix("Url")
                .or_else(|| key.strip_suffix("_url"))?
                .to_string();
            let url = value.as_str()?.trim();
            (!name.is_empty() && !url.is_empty()).then(|| (name, url.to_string()))
        })
        .collect()
}

/// `createTime` is either epoch milliseconds (number or digits) or RFC 3339
fn parse_timestamp(value: serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        serde_json::Value::String(s) => match s.trim().parse::<i64>() {
            Ok(ms) => DateTime::from_timestamp_millis(ms),
            Err(_) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        },
        _ => None,
    }
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn durations_render_as_minutes_and_seconds() {
        assert_eq!(format_duration(Some(0.0)), "0:00");
        assert_eq!(format_duration(Some(61.9)), "1:01");
        assert_eq!(format_duration(Some(245.2)), "4:05");
        assert_eq!(format_duration(None), "-:--");
        assert_eq!(format_duration(Some(f64::NAN)), "-:--");
    }

    fn record(value: serde_json::Value) -> TaskStatus {
        let requested = TaskId::new("req-1").unwrap();
        let record: RecordInfo = serde_json::from_value(value).unwrap();
        TaskStatus::from_record(&requested, record).unwrap()
    }

    #[test]
    fn task_id_rejects_blank() {
        assert!(TaskId::new("").is_err());
        assert!(TaskId::new("   ").is_err());
        assert_eq!(TaskId::new(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn remote_status_strings_map_to_states() {
        assert_eq!(TaskState::from_remote("SUCCESS"), TaskState::Complete);
        assert_eq!(TaskState::from_remote("GENERATING"), TaskState::Running);
        assert_eq!(TaskState::from_remote("FIRST_SUCCESS"), TaskState::Running);
        assert_eq!(TaskState::from_remote("FAILED"), TaskState::Failed);
        assert_eq!(
            TaskState::from_remote("GENERATE_AUDIO_FAILED"),
            TaskState::Failed
        );
        assert_eq!(
            TaskState::from_remote("SENSITIVE_WORD_ERROR"),
            TaskState::Failed
        );
        assert_eq!(TaskState::from_remote("QUEUED_SOMEHOW"), TaskState::Pending);
    }

    #[test]
    fn track_response_decodes_camel_and_snake_keys() {
        let status = record(json!({
            "taskId": "abc123",
            "status": "SUCCESS",
            "createTime": 1_700_000_000_000i64,
            "response": {
                "sunoData": [
                    {
                        "id": "8551-aaaa",
                        "audioUrl": "https://cdn.example/1.mp3",
                        "streamAudioUrl": "https://cdn.example/1.stream",
                        "title": "Forever",
                        "tags": "pop",
                        "duration": 198.44
                    },
                    {
                        "id": "8551-bbbb",
                        "audio_url": "https://cdn.example/2.mp3",
                        "title": "Forever",
                        "duration": null
                    }
                ]
            }
        }));
        assert_eq!(status.task_id.as_str(), "abc123");
        assert!(status.is_complete());
        assert_eq!(status.tracks().len(), 2);
        assert_eq!(status.tracks()[0].duration, Some(198.44));
        assert_eq!(
            status.tracks()[0].stream_audio_url.as_deref(),
            Some("https://cdn.example/1.stream")
        );
        assert_eq!(status.tracks()[1].audio_url, "https://cdn.example/2.mp3");
        assert!(status.created_at.is_some());
    }

    #[test]
    fn lyrics_response_decodes_into_lyrics() {
        let status = record(json!({
            "status": "SUCCESS",
            "response": {
                "data": [
                    {"text": "[Verse]\nhello", "title": "Hi", "status": "complete"},
                    {"text": "[Verse]\nworld", "title": "Hi 2"}
                ]
            }
        }));
        assert_eq!(status.task_id.as_str(), "req-1");
        assert_eq!(status.lyrics().len(), 2);
        assert!(status.tracks().is_empty());
    }

    #[test]
    fn stem_response_collects_named_urls() {
        let status = record(json!({
            "status": "SUCCESS",
            "response": {
                "originUrl": "https://cdn.example/o.mp3",
                "vocalUrl": "https://cdn.example/v.mp3",
                "instrumentalUrl": "https://cdn.example/i.mp3",
                "drumsUrl": "https://cdn.example/d.mp3",
                "bassUrl": "",
                "taskId": "x"
            }
        }));
        match status.output {
            TaskOutput::Stems(stems) => {
                assert_eq!(stems.vocal_url.as_deref(), Some("https://cdn.example/v.mp3"));
                assert_eq!(stems.stems.get("drums").map(String::as_str), Some("https://cdn.example/d.mp3"));
                assert!(!stems.stems.contains_key("bass"));
                assert!(!stems.stems.contains_key("origin"));
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn video_and_wav_responses_decode() {
        let video = record(json!({"status": "SUCCESS", "response": {"videoUrl": "https://v.mp4"}}));
        assert_eq!(
            video.output,
            TaskOutput::Video {
                video_url: "https://v.mp4".into()
            }
        );
        let wav = record(json!({"status": "SUCCESS", "response": {"audioWavUrl": "https://a.wav"}}));
        assert_eq!(
            wav.output,
            TaskOutput::Wav {
                wav_url: "https://a.wav".into()
            }
        );
    }

    #[test]
    fn missing_or_unknown_response_is_empty() {
        let pending = record(json!({"status": "PENDING", "response": null}));
        assert_eq!(pending.output, TaskOutput::Empty);
        assert_eq!(pending.state, TaskState::Pending);

        let odd = record(json!({"response": {"something": 1}}));
        assert_eq!(odd.output, TaskOutput::Empty);
        assert_eq!(odd.raw_status, "PENDING");
    }

    #[test]
    fn failed_record_keeps_error_message() {
        let status = record(json!({
            "status": "CREATE_TASK_FAILED",
            "errorMessage": "prompt rejected"
        }));
        assert!(status.is_failed());
        assert_eq!(status.error_message.as_deref(), Some("prompt rejected"));
    }

    #[test]
    fn create_time_accepts_rfc3339() {
        let status = record(json!({"status": "PENDING", "createTime": "2024-05-01T12:00:00Z"}));
        assert_eq!(
            status.created_at.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+00:00"
        );
    }
}
