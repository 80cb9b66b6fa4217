use eframe::egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

use crate::util::stable_pair;

/// Square sub-region of the unit square, `[min, max]` on both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub min: f32,
    pub max: f32,
}

impl Region {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Region left after shaving `margin` off every edge of the unit square.
    pub fn inset(margin: f32) -> Self {
        let margin = margin.clamp(0.0, 49.0);
        Self::new(margin, 100.0 - margin)
    }

    pub fn span(self) -> f32 {
        (self.max - self.min).max(0.0)
    }

    pub fn contains(self, point: Pos2) -> bool {
        (self.min..=self.max).contains(&point.x) && (self.min..=self.max).contains(&point.y)
    }

    pub fn clamp(self, point: Pos2) -> Pos2 {
        pos2(
            point.x.clamp(self.min, self.max),
            point.y.clamp(self.min, self.max),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Jitter amplitude as a fraction of a grid cell.
    pub jitter: f32,
    /// Edge margin of the interior region when nothing sits on the perimeter.
    pub margin: f32,
    /// Edge margin of the interior region when perimeter anchors are in use.
    pub perimeter_margin: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            jitter: 0.35,
            margin: 10.0,
            perimeter_margin: 18.0,
        }
    }
}

/// Centered `ceil(sqrt(n))`-column grid with jitter seeded by each id.
pub fn grid_positions<S: AsRef<str>>(ids: &[S], region: Region, jitter: f32) -> Vec<Pos2> {
    let count = ids.len();
    if count == 0 {
        return Vec::new();
    }

    let columns = (count as f32).sqrt().ceil().max(1.0) as usize;
    let rows = count.div_ceil(columns);
    let cell_width = region.span() / columns as f32;
    let cell_height = region.span() / rows as f32;
    let jitter = jitter.clamp(0.0, 1.0);

    // Center a partially filled last row.
    let last_row_len = count - (rows - 1) * columns;

    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let row = index / columns;
            let column = index % columns;
            let row_offset = if row == rows - 1 {
                (columns - last_row_len) as f32 * 0.5
            } else {
                0.0
            };

            let (jx, jy) = stable_pair(id.as_ref());
            let x = region.min
                + (column as f32 + row_offset + 0.5) * cell_width
                + jx * jitter * cell_width * 0.5;
            let y = region.min + (row as f32 + 0.5) * cell_height + jy * jitter * cell_height * 0.5;
            region.clamp(pos2(x, y))
        })
        .collect()
}
