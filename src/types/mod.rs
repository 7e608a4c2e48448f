//! Types Module
//!
//! Request payloads, response envelopes and the typed records built from
//! them.

pub mod credits;
pub mod envelope;
pub mod model;
pub mod request;
pub mod task;

pub use credits::CreditBalance;
pub use envelope::ApiEnvelope;
pub use model::{Model, SeparationType, VocalGender};
pub use request::{
    ExtendMusicRequest, GenerateMusicRequest, GenerationTuning, LyricsRequest,
    SeparateVocalsRequest, UploadCoverRequest, VideoRequest, WavRequest,
};
pub use task::{format_duration, Lyrics, Stems, TaskId, TaskOutput, TaskState, TaskStatus, Track};
