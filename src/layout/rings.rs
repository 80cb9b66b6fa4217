use std::f32::consts::TAU;

use eframe::egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

use crate::model::ChildChunk;

/// Share of `max_to_show` reserved for retrieved children.
const RETRIEVED_SHARE: f32 = 0.7;
/// Ring spacing relative to the child pitch.
const RING_STEP: f32 = 0.8;
/// Per-ring angular offset so spokes do not line up.
const RING_TWIST: f32 = 0.37;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingSettings {
    pub spacing_multiplier: f32,
    /// Rings never grow past this share of the owner radius.
    pub max_coverage_ratio: f32,
    pub max_children: Option<usize>,
    /// Owner radius range relative to the active size preset.
    pub owner_scale: f32,
    /// Child radius relative to the preset minimum.
    pub child_scale: f32,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            spacing_multiplier: 2.5,
            max_coverage_ratio: 0.85,
            max_children: Some(60),
            owner_scale: 1.6,
            child_scale: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedChild<'a> {
    pub chunk: &'a ChildChunk,
    pub position: Pos2,
    /// 0 for the center slot.
    pub ring: usize,
}

/// Places `children` in concentric rings inside an owner glyph.
///
/// The first child takes the center; later ones fill rings outward. Ring
/// radii stop growing at `owner_radius * max_coverage_ratio`.
pub fn layout_children_in_rings<'a>(
    center: Pos2,
    owner_radius: f32,
    child_radius: f32,
    children: &'a [ChildChunk],
    spacing_multiplier: f32,
    max_coverage_ratio: f32,
    max_to_show: Option<usize>,
) -> Vec<PositionedChild<'a>> {
    let shown = visible_children(children, max_to_show);
    if shown.is_empty() {
        return Vec::new();
    }

    let pitch = (child_radius * spacing_multiplier).max(0.01);
    let step = pitch * RING_STEP;
    let max_ring_radius = (owner_radius * max_coverage_ratio.clamp(0.0, 1.0)).max(0.0);

    let mut placed = Vec::with_capacity(shown.len());
    let mut remaining = shown.into_iter();
    if let Some(first) = remaining.next() {
        placed.push(PositionedChild {
            chunk: first,
            position: center,
            ring: 0,
        });
    }

    let mut rest = remaining.collect::<Vec<_>>();
    let mut ring = 0usize;
    while !rest.is_empty() {
        ring += 1;
        let radius = (ring as f32 * step).min(max_ring_radius);
        let capacity = ((TAU * radius) / pitch).floor().max(1.0) as usize;
        let take = capacity.min(rest.len());
        let offset = ring as f32 * RING_TWIST;

        for (slot, chunk) in rest.drain(..take).enumerate() {
            let angle = offset + (slot as f32 / take as f32) * TAU;
            placed.push(PositionedChild {
                chunk,
                position: pos2(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                ),
                ring,
            });
        }
    }
    placed
}

/// Orders children retrieved-first and trims them to `max_to_show`, keeping
/// roughly 70% of the allowance for retrieved chunks. Unused quota on either
/// side goes to the other.
fn visible_children(children: &[ChildChunk], max_to_show: Option<usize>) -> Vec<&ChildChunk> {
    let mut ordered = children.iter().collect::<Vec<_>>();
    ordered.sort_by(|a, b| {
        a.is_orphan
            .cmp(&b.is_orphan)
            .then_with(|| b.retrieval_frequency.cmp(&a.retrieval_frequency))
    });

    let Some(max) = max_to_show else {
        return ordered;
    };
    if ordered.len() <= max {
        return ordered;
    }

    let split = ordered.partition_point(|child| !child.is_orphan);
    let (retrieved, orphans) = ordered.split_at(split);

    let retrieved_quota = ((max as f32) * RETRIEVED_SHARE).ceil() as usize;
    let orphan_take = orphans.len().min(max - retrieved_quota.min(max));
    let retrieved_take = retrieved.len().min(max - orphan_take);
    let orphan_take = orphans.len().min(max - retrieved_take);

    retrieved[..retrieved_take]
        .iter()
        .chain(&orphans[..orphan_take])
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(id: &str, frequency: usize, is_orphan: bool) -> ChildChunk {
        ChildChunk {
            chunk_id: id.to_owned(),
            doc_id: "d".to_owned(),
            title: id.to_owned(),
            content: None,
            retrieval_frequency: frequency,
            avg_similarity: 0.0,
            is_orphan,
        }
    }

    fn family(retrieved: usize, orphans: usize) -> Vec<ChildChunk> {
        let mut children = (0..orphans)
            .map(|index| child(&format!("o{index}"), 0, true))
            .collect::<Vec<_>>();
        children.extend((0..retrieved).map(|index| child(&format!("r{index}"), index + 1, false)));
        children
    }

    fn layout(children: &[ChildChunk], max: Option<usize>) -> Vec<PositionedChild<'_>> {
        layout_children_in_rings(pos2(50.0, 50.0), 10.0, 0.5, children, 2.5, 0.85, max)
    }

    #[test]
    fn first_child_sits_at_the_center() {
        let children = family(5, 3);
        let placed = layout(&children, None);

        assert_eq!(placed.len(), 8);
        assert_eq!(placed[0].position, pos2(50.0, 50.0));
        assert_eq!(placed[0].ring, 0);
        assert_eq!(placed[0].chunk.chunk_id, "r4");
    }

    #[test]
    fn retrieved_children_come_before_orphans() {
        let children = family(4, 4);
        let placed = layout(&children, None);
        let flags = placed
            .iter()
            .map(|child| child.chunk.is_orphan)
            .collect::<Vec<_>>();
        assert_eq!(flags, [false, false, false, false, true, true, true, true]);
    }

    #[test]
    fn rings_stay_inside_the_owner() {
        let children = family(150, 150);
        for child in layout(&children, None) {
            assert!(child.position.distance(pos2(50.0, 50.0)) <= 10.0 * 0.85 + 1e-3);
        }
    }

    #[test]
    fn rings_grow_outward() {
        let children = family(30, 0);
        let placed = layout(&children, None);
        for pair in placed.windows(2) {
            assert!(pair[0].ring <= pair[1].ring);
        }
        assert!(placed.last().is_some_and(|child| child.ring >= 2));
    }

    #[test]
    fn truncation_keeps_most_of_the_allowance_for_retrieved() {
        let children = family(20, 20);
        let placed = layout(&children, Some(10));
        let orphans = placed.iter().filter(|child| child.chunk.is_orphan).count();
        assert_eq!(placed.len(), 10);
        assert_eq!(orphans, 3);
    }

    #[test]
    fn unused_quota_is_redistributed() {
        let few_retrieved = family(2, 20);
        let placed = layout(&few_retrieved, Some(10));
        assert_eq!(placed.len(), 10);
        assert_eq!(placed.iter().filter(|child| child.chunk.is_orphan).count(), 8);

        let few_orphans = family(20, 1);
        let placed = layout(&few_orphans, Some(10));
        assert_eq!(placed.len(), 10);
        assert_eq!(placed.iter().filter(|child| child.chunk.is_orphan).count(), 1);
    }

    #[test]
    fn zero_allowance_shows_nothing() {
        let children = family(3, 3);
        assert!(layout(&children, Some(0)).is_empty());
        assert!(layout(&[], None).is_empty());
    }
}
