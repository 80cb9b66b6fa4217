//! Placement in the 0-100 unit square: interior grid, perimeter anchors for
//! never-retrieved chunks, role lanes, rings inside owner glyphs and the
//! collision pass that runs last.

mod collision;
mod grid;
mod perimeter;
mod quadtree;
mod rings;
mod rows;

pub use collision::{CollisionOutcome, CollisionSettings, resolve_collisions};
pub use grid::{GridSettings, Region, grid_positions};
pub use perimeter::{
    EDGE_ANCHORS, OrphanSettings, anchor_index, anchor_position, cluster_orphans,
    perimeter_positions,
};
pub use rings::{PositionedChild, RingSettings, layout_children_in_rings};
pub use rows::row_positions;
