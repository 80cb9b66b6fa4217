use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::quadtree::QuadNode;
use crate::model::Point;

const UNIT: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSettings {
    pub max_iterations: usize,
    /// Fraction of each overlap corrected per pass.
    pub damping: f32,
    /// Minimum separation as a multiple of the summed radii, never below 2.
    pub padding: f32,
    pub edge_margin: f32,
    /// Total movement below which a pass counts as settled.
    pub convergence_threshold: f32,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            max_iterations: 60,
            damping: 0.55,
            padding: 2.0,
            edge_margin: 2.0,
            convergence_threshold: 0.1,
        }
    }
}

/// Smallest padding that still leaves a visible gap between glyphs.
pub const MIN_PADDING: f32 = 2.0;

impl CollisionSettings {
    pub fn effective_padding(&self) -> f32 {
        if self.padding.is_finite() {
            self.padding.max(MIN_PADDING)
        } else {
            MIN_PADDING
        }
    }

    pub fn min_separation(&self, radius_a: f32, radius_b: f32) -> f32 {
        (radius_a + radius_b) * self.effective_padding()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionOutcome {
    /// Correction passes applied.
    pub iterations: usize,
    pub converged: bool,
    /// Movement of the last measured pass.
    pub movement: f32,
}

#[derive(Clone, Copy)]
struct PairParams {
    padding: f32,
    strength: f32,
    max_distance_sq: f32,
}

/// Pushes overlapping points apart in place.
///
/// Each pass accumulates an equal and opposite correction for every pair
/// closer than its minimum separation, then clamps everything back into the
/// unit square. Stops once a pass would move less than the convergence
/// threshold or after `max_iterations` passes.
pub fn resolve_collisions(points: &mut [Point], settings: &CollisionSettings) -> CollisionOutcome {
    let margin = settings.edge_margin.clamp(0.0, UNIT * 0.5);
    let clamp = |position: Vec2| {
        vec2(
            position.x.clamp(margin, UNIT - margin),
            position.y.clamp(margin, UNIT - margin),
        )
    };

    let mut positions = points
        .iter()
        .map(|point| clamp(vec2(point.x, point.y)))
        .collect::<Vec<_>>();
    let radii = points
        .iter()
        .map(|point| point.radius.max(0.0))
        .collect::<Vec<_>>();
    let max_radius = radii.iter().copied().fold(0.0_f32, f32::max);
    let padding = settings.effective_padding();
    let max_distance = max_radius * 2.0 * padding;

    let params = PairParams {
        padding,
        strength: 0.5 * settings.damping.clamp(0.01, 1.0),
        max_distance_sq: max_distance * max_distance,
    };
    let mut displacement = vec![Vec2::ZERO; positions.len()];
    let mut outcome = CollisionOutcome::default();

    loop {
        displacement.fill(Vec2::ZERO);
        let mut movement = 0.0;
        if positions.len() >= 2
            && max_distance > 0.0
            && let Some(tree) = QuadNode::build(&positions)
        {
            accumulate_pairs(
                &tree,
                &tree,
                true,
                &positions,
                &radii,
                params,
                &mut displacement,
                &mut movement,
            );
        }
        outcome.movement = movement;

        if movement < settings.convergence_threshold {
            outcome.converged = true;
            break;
        }
        if outcome.iterations >= settings.max_iterations {
            break;
        }

        for (position, push) in positions.iter_mut().zip(&displacement) {
            *position = clamp(*position + *push);
        }
        outcome.iterations += 1;
    }

    for (point, position) in points.iter_mut().zip(&positions) {
        point.x = position.x;
        point.y = position.y;
    }

    if outcome.converged {
        debug!(
            points = points.len(),
            iterations = outcome.iterations,
            "collisions resolved"
        );
    } else {
        warn!(
            points = points.len(),
            iterations = outcome.iterations,
            movement = outcome.movement,
            "collision resolver hit its iteration cap"
        );
    }
    outcome
}

fn push_apart(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: PairParams,
    displacement: &mut [Vec2],
    movement: &mut f32,
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    let min_distance = (radii[from] + radii[to]) * params.padding;
    if distance >= min_distance {
        return;
    }

    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * TAU;
        vec2(angle.cos(), angle.sin())
    };
    let push = (min_distance - distance) * params.strength;
    displacement[from] += direction * push;
    displacement[to] -= direction * push;
    *movement += push * 2.0;
}

#[allow(clippy::too_many_arguments)]
fn accumulate_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Vec2],
    radii: &[f32],
    params: PairParams,
    displacement: &mut [Vec2],
    movement: &mut f32,
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    push_apart(from, to, positions, radii, params, displacement, movement);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    push_apart(from, to, positions, radii, params, displacement, movement);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };
            accumulate_pairs(
                child_a, child_a, true, positions, radii, params, displacement, movement,
            );
            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_pairs(
                    child_a, child_b, false, positions, radii, params, displacement, movement,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    let (split, keep) = if split_a {
        (node_a, node_b)
    } else {
        (node_b, node_a)
    };
    for child in split.children.iter().flatten() {
        accumulate_pairs(
            child, keep, false, positions, radii, params, displacement, movement,
        );
    }
}
