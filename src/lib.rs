//! Perspective transform and spatial layout for retrieval-quality scatter
//! plots.
//!
//! A [`Snapshot`] of questions and the chunks retrieved for them is folded
//! into entities for one [`Perspective`], placed in a 0-100 unit square,
//! pushed apart until glyphs stop overlapping and finally projected onto a
//! canvas. Identical inputs always give identical positions.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod perspective;
pub mod quality;
pub mod util;

pub use aggregate::aggregate;
pub use config::LayoutSettings;
pub use error::{Error, Result};
pub use model::{Entity, Point, Snapshot};
pub use perspective::{
    Canvas, Perspective, QualityFilter, ViewConfig, build_points, project, render_points,
};
pub use quality::{QualityBand, SizePreset, classify, scale};
