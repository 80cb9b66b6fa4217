//! Layered layout settings.
//!
//! Defaults, then an optional TOML file, then `RETRIEVAL_LENS_*` environment
//! variables, with `__` separating nested keys
//! (`RETRIEVAL_LENS_COLLISION__DAMPING=0.5`).

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::layout::{CollisionSettings, GridSettings, OrphanSettings, RingSettings};
use crate::quality::SizePresets;

pub const ENV_PREFIX: &str = "RETRIEVAL_LENS_";
pub const DEFAULT_CONFIG_FILE: &str = "retrieval-lens.toml";

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub collision: CollisionSettings,
    pub rings: RingSettings,
    pub grid: GridSettings,
    pub orphans: OrphanSettings,
    pub sizes: SizePresets,
    /// Device-space margin around the projected unit square, in pixels.
    pub canvas_margin: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            collision: CollisionSettings::default(),
            rings: RingSettings::default(),
            grid: GridSettings::default(),
            orphans: OrphanSettings::default(),
            sizes: SizePresets::default(),
            canvas_margin: 24.0,
        }
    }
}

impl LayoutSettings {
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads settings; a missing file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::figment(path).extract().map_err(Box::new).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_figment() {
        let settings: LayoutSettings = Figment::from(Serialized::defaults(LayoutSettings::default()))
            .extract()
            .expect("defaults extract");
        assert_eq!(settings, LayoutSettings::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let settings: LayoutSettings = Figment::from(Serialized::defaults(LayoutSettings::default()))
            .merge(Toml::string("[collision]\nmax_iterations = 12\n"))
            .extract()
            .expect("toml extract");
        assert_eq!(settings.collision.max_iterations, 12);
        assert_eq!(settings.collision.damping, CollisionSettings::default().damping);
        assert_eq!(settings.rings, RingSettings::default());
    }
}
