//! Model and option enums shared by request types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SunoError;

/// Available Suno generation models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Model {
    /// Creative diversity, up to 4 min
    #[serde(rename = "V3_5")]
    V35,
    /// Best audio quality, up to 4 min
    #[serde(rename = "V4")]
    V4,
    /// Advanced features, up to 8 min
    #[default]
    #[serde(rename = "V4_5")]
    V45,
    /// Richer sound, up to 8 min
    #[serde(rename = "V4_5PLUS")]
    V45Plus,
    /// Fastest, superior musicality, up to 8 min
    #[serde(rename = "V5")]
    V5,
}

impl Model {
    /// All models in release order
    pub const ALL: [Model; 5] = [Model::V35, Model::V4, Model::V45, Model::V45Plus, Model::V5];

    /// Identifier sent on the wire
    pub const fn as_str(self) -> &'static str {
        match self {
            Model::V35 => "V3_5",
            Model::V4 => "V4",
            Model::V45 => "V4_5",
            Model::V45Plus => "V4_5PLUS",
            Model::V5 => "V5",
        }
    }

    /// One-line description for pickers
    pub const fn description(self) -> &'static str {
        match self {
            Model::V35 => "creative diversity, up to 4 min",
            Model::V4 => "best audio quality, up to 4 min",
            Model::V45 => "advanced features, up to 8 min",
            Model::V45Plus => "richer sound, up to 8 min",
            Model::V5 => "fastest, superior musicality, up to 8 min",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = SunoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('.', "_");
        Model::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| {
                SunoError::InvalidParameters(format!(
                    "unknown model '{s}', expected one of: {}",
                    Model::ALL.map(Model::as_str).join(", ")
                ))
            })
    }
}

/// Vocal gender hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VocalGender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl VocalGender {
    pub const fn as_str(self) -> &'static str {
        match self {
            VocalGender::Male => "m",
            VocalGender::Female => "f",
        }
    }
}

impl FromStr for VocalGender {
    type Err = SunoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(VocalGender::Male),
            "f" | "female" => Ok(VocalGender::Female),
            other => Err(SunoError::InvalidParameters(format!(
                "unknown vocal gender '{other}', expected 'm' or 'f'"
            ))),
        }
    }
}

/// Vocal separation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationType {
    /// Vocals + instrumental
    #[default]
    SeparateVocal,
    /// Up to 12 instrument stems
    SplitStem,
}

impl SeparationType {
    pub const fn as_str(self) -> &'static str {
        match self {
            SeparationType::SeparateVocal => "separate_vocal",
            SeparationType::SplitStem => "split_stem",
        }
    }

    /// Number of stems the mode produces at most
    pub const fn stem_count(self) -> u32 {
        match self {
            SeparationType::SeparateVocal => 2,
            SeparationType::SplitStem => 12,
        }
    }
}

impl FromStr for SeparationType {
    type Err = SunoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vocal" | "separate_vocal" => Ok(SeparationType::SeparateVocal),
            "stem" | "split_stem" => Ok(SeparationType::SplitStem),
            other => Err(SunoError::InvalidParameters(format!(
                "unknown separation type '{other}', expected 'vocal' or 'stem'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_parses_loose_spellings() {
        assert_eq!("v4_5".parse::<Model>().unwrap(), Model::V45);
        assert_eq!("V4.5PLUS".parse::<Model>().unwrap(), Model::V45Plus);
        assert_eq!("V5".parse::<Model>().unwrap(), Model::V5);
        assert!("V6".parse::<Model>().is_err());
    }

    #[test]
    fn model_serializes_to_wire_name() {
        assert_eq!(serde_json::to_value(Model::V35).unwrap(), "V3_5");
        assert_eq!(serde_json::to_value(Model::default()).unwrap(), "V4_5");
        assert_eq!(Model::V45Plus.to_string(), "V4_5PLUS");
    }

    #[test]
    fn separation_type_accepts_cli_aliases() {
        assert_eq!(
            "stem".parse::<SeparationType>().unwrap(),
            SeparationType::SplitStem
        );
        assert_eq!(SeparationType::SplitStem.stem_count(), 12);
        assert_eq!(
            serde_json::to_value(SeparationType::SeparateVocal).unwrap(),
            "separate_vocal"
        );
    }
}
