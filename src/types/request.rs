//! Request payloads
//!
//! One type per submission endpoint. Optional fields are omitted from the
//! JSON body when unset; the service treats `null` differently from absent.

use serde::Serialize;

use super::model::{Model, SeparationType, VocalGender};
use crate::defaults::limits::VIDEO_TEXT_MAX_CHARS;
use crate::error::{Result, SunoError};

/// Style tuning knobs shared by generate, extend and cover requests
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTuning {
    /// Apply a specific persona style
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    /// Styles to exclude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocal_gender: Option<VocalGender>,
    /// Style influence (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_weight: Option<f32>,
    /// Creative deviation (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weirdness_constraint: Option<f32>,
    /// Audio influence (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_weight: Option<f32>,
}

impl GenerationTuning {
    fn validate(&self) -> Result<()> {
        let weights = [
            ("styleWeight", self.style_weight),
            ("weirdnessConstraint", self.weirdness_constraint),
            ("audioWeight", self.audio_weight),
        ];
        for (name, value) in weights {
            if let Some(v) = value
                && !(0.0..=1.0).contains(&v)
            {
                return Err(SunoError::InvalidParameters(format!(
                    "{name} must be between 0.0 and 1.0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Tuning setters shared by every request embedding [`GenerationTuning`]
macro_rules! tuning_setters {
    ($ty:ty) => {
        impl $ty {
            /// Apply a persona
            pub fn with_persona(mut self, persona_id: impl Into<String>) -> Self {
                self.tuning.persona_id = Some(persona_id.into());
                self
            }

            /// Exclude styles
            pub fn with_negative_tags(mut self, tags: impl Into<String>) -> Self {
                self.tuning.negative_tags = Some(tags.into());
                self
            }

            /// Set the vocal gender hint
            pub fn with_vocal_gender(mut self, gender: VocalGender) -> Self {
                self.tuning.vocal_gender = Some(gender);
                self
            }

            /// Set the style weight (0.0-1.0)
            pub fn with_style_weight(mut self, weight: f32) -> Self {
                self.tuning.style_weight = Some(weight);
                self
            }

            /// Set the weirdness constraint (0.0-1.0)
            pub fn with_weirdness(mut self, weirdness: f32) -> Self {
                self.tuning.weirdness_constraint = Some(weirdness);
                self
            }

            /// Set the audio weight (0.0-1.0)
            pub fn with_audio_weight(mut self, weight: f32) -> Self {
                self.tuning.audio_weight = Some(weight);
                self
            }
        }
    };
}

/// Music generation request (`POST /generate`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMusicRequest {
    /// Text description of the music, or lyrics in custom mode
    pub prompt: String,
    pub model: Model,
    /// Enable custom parameters (requires style and title)
    pub custom_mode: bool,
    /// Generate instrumental only (no vocals)
    pub instrumental: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub tuning: GenerationTuning,
}

impl GenerateMusicRequest {
    /// Create a request in automatic mode with the default model
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: Model::default(),
            custom_mode: false,
            instrumental: false,
            style: None,
            title: None,
            tuning: GenerationTuning::default(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Switch to custom mode with the required style and title
    pub fn custom(mut self, style: impl Into<String>, title: impl Into<String>) -> Self {
        self.custom_mode = true;
        self.style = Some(style.into());
        self.title = Some(title.into());
        self
    }

    pub fn with_instrumental(mut self, instrumental: bool) -> Self {
        self.instrumental = instrumental;
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check the request locally before it costs credits
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(SunoError::InvalidParameters(
                "prompt must not be empty".to_string(),
            ));
        }
        if self.custom_mode && (is_blank(&self.style) || is_blank(&self.title)) {
            return Err(SunoError::InvalidParameters(
                "custom mode requires both style and title".to_string(),
            ));
        }
        self.tuning.validate()
    }
}

tuning_setters!(GenerateMusicRequest);

/// Lyrics generation request (`POST /lyrics`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricsRequest {
    /// Description of the desired lyrics (max 200 words)
    pub prompt: String,
}

impl LyricsRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(SunoError::InvalidParameters(
                "prompt must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Track extension request (`POST /generate/extend`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendMusicRequest {
    /// Track to extend
    pub audio_id: String,
    /// Must match the source track's model
    pub model: Model,
    /// `true` sends the custom parameters below, `false` reuses the original ones
    pub default_param_flag: bool,
    /// Time in seconds where the extension starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continue_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub tuning: GenerationTuning,
}

impl ExtendMusicRequest {
    /// Extend a track reusing its original parameters
    pub fn new(audio_id: impl Into<String>) -> Self {
        Self {
            audio_id: audio_id.into(),
            model: Model::default(),
            default_param_flag: false,
            continue_at: None,
            prompt: None,
            style: None,
            title: None,
            tuning: GenerationTuning::default(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Send custom parameters instead of the original ones
    pub fn with_custom_params(mut self, custom: bool) -> Self {
        self.default_param_flag = custom;
        self
    }

    pub fn continue_at(mut self, seconds: f64) -> Self {
        self.continue_at = Some(seconds);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_id("audioId", &self.audio_id)?;
        if let Some(at) = self.continue_at
            && (!at.is_finite() || at < 0.0)
        {
            return Err(SunoError::InvalidParameters(format!(
                "continueAt must be a non-negative number of seconds, got {at}"
            )));
        }
        self.tuning.validate()
    }
}

tuning_setters!(ExtendMusicRequest);

/// Restyle an uploaded track while keeping its melody (`POST /generate/upload-cover`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCoverRequest {
    /// URL of the audio to transform (max 8 min)
    pub upload_url: String,
    pub model: Model,
    pub custom_mode: bool,
    pub instrumental: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub tuning: GenerationTuning,
}

impl UploadCoverRequest {
    pub fn new(upload_url: impl Into<String>) -> Self {
        Self {
            upload_url: upload_url.into(),
            model: Model::default(),
            custom_mode: false,
            instrumental: false,
            prompt: None,
            style: None,
            title: None,
            tuning: GenerationTuning::default(),
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn custom(mut self, style: impl Into<String>, title: impl Into<String>) -> Self {
        self.custom_mode = true;
        self.style = Some(style.into());
        self.title = Some(title.into());
        self
    }

    pub fn with_instrumental(mut self, instrumental: bool) -> Self {
        self.instrumental = instrumental;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_id("uploadUrl", &self.upload_url)?;
        if self.custom_mode && (is_blank(&self.style) || is_blank(&self.title)) {
            return Err(SunoError::InvalidParameters(
                "custom mode requires both style and title".to_string(),
            ));
        }
        self.tuning.validate()
    }
}

tuning_setters!(UploadCoverRequest);

/// Vocal separation request (`POST /vocal-removal/generate`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparateVocalsRequest {
    /// Original music generation task
    pub task_id: String,
    /// Specific track inside that task
    pub audio_id: String,
    #[serde(rename = "type")]
    pub separation_type: SeparationType,
}

impl SeparateVocalsRequest {
    pub fn new(task_id: impl Into<String>, audio_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            audio_id: audio_id.into(),
            separation_type: SeparationType::default(),
        }
    }

    pub fn with_type(mut self, separation_type: SeparationType) -> Self {
        self.separation_type = separation_type;
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_id("taskId", &self.task_id)?;
        require_id("audioId", &self.audio_id)
    }
}

/// Music video request (`POST /mp4/generate`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub task_id: String,
    pub audio_id: String,
    /// Artist name shown in the video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Website used as watermark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
}

impl VideoRequest {
    pub fn new(task_id: impl Into<String>, audio_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            audio_id: audio_id.into(),
            author: None,
            domain_name: None,
        }
    }

    /// Set the author, truncated to the service limit
    pub fn with_author(mut self, author: impl AsRef<str>) -> Self {
        self.author = Some(truncate_chars(author.as_ref(), VIDEO_TEXT_MAX_CHARS));
        self
    }

    /// Set the watermark domain, truncated to the service limit
    pub fn with_domain(mut self, domain: impl AsRef<str>) -> Self {
        self.domain_name = Some(truncate_chars(domain.as_ref(), VIDEO_TEXT_MAX_CHARS));
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_id("taskId", &self.task_id)?;
        require_id("audioId", &self.audio_id)
    }
}

/// WAV conversion request (`POST /wav/generate`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WavRequest {
    pub task_id: String,
    pub audio_id: String,
}

impl WavRequest {
    pub fn new(task_id: impl Into<String>, audio_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            audio_id: audio_id.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id("taskId", &self.task_id)?;
        require_id("audioId", &self.audio_id)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|s| s.trim().is_empty())
}

fn require_id(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SunoError::InvalidParameters(format!(
            "{name} must not be empty"
        )));
    }
    Ok(())
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}
