use serde::Serialize;

use super::entity::Entity;
use crate::quality::QualityBand;

/// Device-space placement filled in by projection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScreenPosition {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Render-ready glyph.
///
/// `x`, `y` and `radius` live in the 0-100 unit square; `screen` holds the
/// same glyph in canvas pixels once projected.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    pub entity: Entity,
    pub x: f32,
    pub y: f32,
    /// Normalized magnitude before scaling, 0-1.
    pub size: f32,
    pub radius: f32,
    pub color_value: f32,
    pub band: QualityBand,
    pub opacity: f32,
    /// Index of the owner point for chunks drawn inside a document or role.
    pub parent: Option<usize>,
    pub tooltip: Option<String>,
    pub screen: ScreenPosition,
}

impl Point {
    pub fn new(entity: Entity, size: f32, radius: f32, opacity: f32) -> Self {
        let band = entity.band();
        let color_value = entity.quality();
        Self {
            entity,
            x: 50.0,
            y: 50.0,
            size,
            radius,
            color_value,
            band,
            opacity,
            parent: None,
            tooltip: None,
            screen: ScreenPosition::default(),
        }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn key(&self) -> String {
        self.entity.key()
    }
}
