//! Severity bands, band colors and glyph size scaling.
//!
//! Band edges are inclusive at the lower bound: a score of exactly `7.0` is
//! good and exactly `5.0` is weak.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const GOOD_THRESHOLD: f32 = 7.0;
pub const WEAK_THRESHOLD: f32 = 5.0;
const QUALITY_SCALE: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    Good,
    Weak,
    Poor,
    /// Never retrieved; kept apart from the quality bands.
    Unretrieved,
    /// Exact-zero intensity sentinel.
    Neutral,
}

impl QualityBand {
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Weak => "weak",
            Self::Poor => "poor",
            Self::Unretrieved => "unretrieved",
            Self::Neutral => "neutral",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Good => [46, 184, 114],
            Self::Weak => [240, 180, 41],
            Self::Poor => [226, 82, 72],
            Self::Unretrieved => [124, 132, 148],
            Self::Neutral => [186, 190, 198],
        }
    }

    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

/// Maps a score to its band.
///
/// With `is_quality_score` the score is on the 0-10 scale; otherwise it is a
/// 0-1 intensity where an exact zero is the neutral sentinel.
pub fn classify(score: f32, is_orphan: bool, is_quality_score: bool) -> QualityBand {
    if is_orphan {
        return QualityBand::Unretrieved;
    }

    let score = if score.is_finite() { score } else { 0.0 };
    let score = if is_quality_score {
        score
    } else {
        if score == 0.0 {
            return QualityBand::Neutral;
        }
        score * QUALITY_SCALE
    };

    if score >= GOOD_THRESHOLD {
        QualityBand::Good
    } else if score >= WEAK_THRESHOLD {
        QualityBand::Weak
    } else {
        QualityBand::Poor
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn scale(self, normalized: f32) -> f32 {
        scale(normalized, self.min, self.max)
    }

    pub fn times(self, factor: f32) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }
}

/// `min + normalized * (max - min)`, with `normalized` clamped to `[0, 1]`.
pub fn scale(normalized: f32, min: f32, max: f32) -> f32 {
    let normalized = if normalized.is_finite() {
        normalized.clamp(0.0, 1.0)
    } else {
        0.0
    };
    min + (normalized * (max - min))
}

/// `value / max`, or zero when there is nothing to compare against.
pub fn normalize(value: usize, max: usize) -> f32 {
    if max == 0 {
        0.0
    } else {
        (value as f32 / max as f32).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizePreset {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

/// Glyph radius ranges in unit-square units, one per preset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizePresets {
    pub small: SizeRange,
    pub medium: SizeRange,
    pub large: SizeRange,
}

impl Default for SizePresets {
    fn default() -> Self {
        Self {
            small: SizeRange::new(0.6, 2.0),
            medium: SizeRange::new(0.8, 3.0),
            large: SizeRange::new(1.0, 4.0),
        }
    }
}

impl SizePresets {
    pub fn range(&self, preset: SizePreset) -> SizeRange {
        match preset {
            SizePreset::Small => self.small,
            SizePreset::Medium => self.medium,
            SizePreset::Large => self.large,
        }
    }
}
