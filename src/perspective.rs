//! Perspective orchestration: aggregate, place, resolve collisions, project.

use clap::ValueEnum;
use eframe::egui::pos2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{
    chunks_to_questions, chunks_to_roles, documents_to_chunks, questions_to_chunks,
    roles_to_chunks,
};
use crate::config::LayoutSettings;
use crate::layout::{
    Region, anchor_position, cluster_orphans, grid_positions, layout_children_in_rings,
    perimeter_positions, resolve_collisions, row_positions,
};
use crate::model::{
    ChunkEntity, Entity, OwnerChunkEntity, OwnerEntity, OwnerKind, Point, Snapshot,
    UNASSIGNED_ROLE,
};
use crate::quality::{QualityBand, SizePreset, SizeRange, classify, normalize};

const RETRIEVED_OPACITY: f32 = 0.85;
const ORPHAN_OPACITY: f32 = 0.35;
const CLUSTER_OPACITY: f32 = 0.55;
const ORPHAN_CHILD_OPACITY: f32 = 0.4;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Perspective {
    #[default]
    QuestionsToChunks,
    ChunksToQuestions,
    DocumentsToChunks,
    RolesToChunks,
    ChunksToRoles,
}

impl Perspective {
    pub const ALL: [Self; 5] = [
        Self::QuestionsToChunks,
        Self::ChunksToQuestions,
        Self::DocumentsToChunks,
        Self::RolesToChunks,
        Self::ChunksToRoles,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::QuestionsToChunks => "Questions → Chunks",
            Self::ChunksToQuestions => "Chunks → Questions",
            Self::DocumentsToChunks => "Documents → Chunks",
            Self::RolesToChunks => "Roles → Chunks",
            Self::ChunksToRoles => "Chunks → Roles",
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum QualityFilter {
    #[default]
    All,
    Good,
    Weak,
    Poor,
}

impl QualityFilter {
    pub const ALL: [Self; 4] = [Self::All, Self::Good, Self::Weak, Self::Poor];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Good => "Good",
            Self::Weak => "Weak",
            Self::Poor => "Poor",
        }
    }

    pub fn matches(self, band: QualityBand) -> bool {
        match self {
            Self::All => true,
            Self::Good => band == QualityBand::Good,
            Self::Weak => band == QualityBand::Weak,
            Self::Poor => band == QualityBand::Poor,
        }
    }

    fn shows_orphans(self) -> bool {
        self == Self::All
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub perspective: Perspective,
    pub quality_filter: QualityFilter,
    pub size_preset: SizePreset,
    pub tooltips: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            perspective: Perspective::default(),
            quality_filter: QualityFilter::default(),
            size_preset: SizePreset::default(),
            tooltips: true,
        }
    }
}

/// Device-space drawing area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin: margin.max(0.0),
        }
    }

    /// Width and height left inside the margins, if any.
    pub fn usable(self) -> Option<(f32, f32)> {
        let width = self.width - self.margin * 2.0;
        let height = self.height - self.margin * 2.0;
        (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
            .then_some((width, height))
    }
}

/// Full pipeline: unit-square points for `view`, projected onto `canvas`.
///
/// An unusable canvas produces no points.
pub fn render_points(
    snapshot: &Snapshot,
    view: &ViewConfig,
    settings: &LayoutSettings,
    canvas: Canvas,
) -> Vec<Point> {
    if canvas.usable().is_none() {
        debug!(?canvas, "canvas has no drawable area");
        return Vec::new();
    }
    let mut points = build_points(snapshot, view, settings);
    project(&mut points, canvas);
    points
}

/// Unit-square points for `view`, collisions already resolved.
pub fn build_points(snapshot: &Snapshot, view: &ViewConfig, settings: &LayoutSettings) -> Vec<Point> {
    let range = settings.sizes.range(view.size_preset);
    let filter = view.quality_filter;

    let mut points = match view.perspective {
        Perspective::QuestionsToChunks => question_points(snapshot, filter, range, settings),
        Perspective::ChunksToQuestions => chunk_points(snapshot, filter, range, settings),
        Perspective::DocumentsToChunks => owner_points(
            documents_to_chunks(snapshot),
            OwnerKind::Document,
            filter,
            range,
            settings,
        ),
        Perspective::RolesToChunks => owner_points(
            roles_to_chunks(snapshot),
            OwnerKind::Role,
            filter,
            range,
            settings,
        ),
        Perspective::ChunksToRoles => role_lane_points(snapshot, filter, range, settings),
    };

    if view.tooltips {
        for point in &mut points {
            point.tooltip = Some(point.entity.tooltip());
        }
    }

    debug!(
        perspective = ?view.perspective,
        filter = ?filter,
        records = snapshot.record_count(),
        points = points.len(),
        "built points"
    );
    points
}

/// Maps unit-square positions into `[margin, dim - margin]`.
///
/// Returns `false`, leaving points untouched, when the canvas has no
/// drawable area.
pub fn project(points: &mut [Point], canvas: Canvas) -> bool {
    let Some((width, height)) = canvas.usable() else {
        return false;
    };
    let radius_scale = width.min(height) / 100.0;

    for point in points {
        let x = canvas.margin + (point.x / 100.0) * width;
        let y = canvas.margin + (point.y / 100.0) * height;
        point.screen.x = x.clamp(canvas.margin, canvas.width - canvas.margin);
        point.screen.y = y.clamp(canvas.margin, canvas.height - canvas.margin);
        point.screen.radius = point.radius.max(0.0) * radius_scale;
    }
    true
}

fn quality_band(score: f32) -> QualityBand {
    classify(score, false, true)
}

fn question_points(
    snapshot: &Snapshot,
    filter: QualityFilter,
    range: SizeRange,
    settings: &LayoutSettings,
) -> Vec<Point> {
    let entities = questions_to_chunks(&snapshot.questions);
    let max_chunks = entities.iter().map(|entity| entity.chunk_count).max().unwrap_or(0);

    let mut entities = entities
        .into_iter()
        .filter(|entity| filter.matches(quality_band(entity.avg_similarity)))
        .collect::<Vec<_>>();
    entities.sort_by(|a, b| {
        b.avg_similarity
            .total_cmp(&a.avg_similarity)
            .then_with(|| a.id.cmp(&b.id))
    });

    let ids = entities.iter().map(|entity| entity.id.as_str()).collect::<Vec<_>>();
    let positions = grid_positions(&ids, Region::inset(settings.grid.margin), settings.grid.jitter);

    let mut points = entities
        .into_iter()
        .zip(positions)
        .map(|(entity, position)| {
            let size = normalize(entity.chunk_count, max_chunks);
            Point::new(
                Entity::Question(entity),
                size,
                range.scale(size),
                RETRIEVED_OPACITY,
            )
            .at(position.x, position.y)
        })
        .collect::<Vec<_>>();

    resolve_collisions(&mut points, &settings.collision);
    points
}

fn chunk_points(
    snapshot: &Snapshot,
    filter: QualityFilter,
    range: SizeRange,
    settings: &LayoutSettings,
) -> Vec<Point> {
    let (orphans, retrieved): (Vec<ChunkEntity>, Vec<ChunkEntity>) = chunks_to_questions(snapshot)
        .into_iter()
        .partition(|entity| entity.is_orphan);
    let max_frequency = retrieved
        .iter()
        .map(|entity| entity.retrieval_frequency)
        .max()
        .unwrap_or(0);

    let retrieved = retrieved
        .into_iter()
        .filter(|entity| filter.matches(quality_band(entity.avg_similarity)))
        .collect::<Vec<_>>();
    let show_orphans = filter.shows_orphans() && !orphans.is_empty();
    let region = if show_orphans {
        Region::inset(settings.grid.perimeter_margin)
    } else {
        Region::inset(settings.grid.margin)
    };

    let ids = retrieved.iter().map(|entity| entity.id.as_str()).collect::<Vec<_>>();
    let positions = grid_positions(&ids, region, settings.grid.jitter);
    let mut points = retrieved
        .into_iter()
        .zip(positions)
        .map(|(entity, position)| {
            let size = normalize(entity.retrieval_frequency, max_frequency);
            Point::new(Entity::Chunk(entity), size, range.scale(size), RETRIEVED_OPACITY)
                .at(position.x, position.y)
        })
        .collect::<Vec<_>>();

    if show_orphans {
        if settings.orphans.should_cluster(orphans.len()) {
            points.extend(cluster_points(&orphans, range, settings));
        } else {
            let ids = orphans.iter().map(|entity| entity.id.as_str()).collect::<Vec<_>>();
            let positions = perimeter_positions(&ids);
            points.extend(orphans.into_iter().zip(positions).map(|(entity, position)| {
                Point::new(Entity::Chunk(entity), 0.0, range.min, ORPHAN_OPACITY)
                    .at(position.x, position.y)
            }));
        }
    }

    resolve_collisions(&mut points, &settings.collision);
    points
}

fn cluster_points(orphans: &[ChunkEntity], range: SizeRange, settings: &LayoutSettings) -> Vec<Point> {
    let count = settings.orphans.cluster_count(orphans.len());
    let clusters = cluster_orphans(orphans, count);
    let max_members = clusters
        .iter()
        .map(|cluster| cluster.members.len())
        .max()
        .unwrap_or(0);
    debug!(
        orphans = orphans.len(),
        clusters = clusters.len(),
        "clustered unretrieved chunks"
    );

    clusters
        .into_iter()
        .map(|cluster| {
            let size = normalize(cluster.members.len(), max_members);
            let anchor = anchor_position(cluster.anchor);
            Point::new(
                Entity::UnassociatedCluster(cluster),
                size,
                range.scale(size),
                CLUSTER_OPACITY,
            )
            .at(anchor.x, anchor.y)
        })
        .collect()
}

fn owner_points(
    owners: Vec<OwnerEntity>,
    kind: OwnerKind,
    filter: QualityFilter,
    range: SizeRange,
    settings: &LayoutSettings,
) -> Vec<Point> {
    let max_children = owners.iter().map(|owner| owner.children.len()).max().unwrap_or(0);
    let owners = owners
        .into_iter()
        .filter(|owner| {
            if owner.is_unassociated {
                filter.shows_orphans()
            } else {
                filter.matches(quality_band(owner.avg_similarity))
            }
        })
        .collect::<Vec<_>>();

    let ids = owners.iter().map(|owner| owner.id.as_str()).collect::<Vec<_>>();
    let positions = grid_positions(&ids, Region::inset(settings.grid.margin), settings.grid.jitter);
    let owner_range = range.times(settings.rings.owner_scale);

    let mut points = owners
        .into_iter()
        .zip(positions)
        .map(|(owner, position)| {
            let size = normalize(owner.children.len(), max_children);
            let opacity = if owner.is_unassociated {
                CLUSTER_OPACITY
            } else {
                RETRIEVED_OPACITY
            };
            let entity = match kind {
                OwnerKind::Document => Entity::Document(owner),
                OwnerKind::Role => Entity::Role(owner),
            };
            Point::new(entity, size, owner_range.scale(size), opacity).at(position.x, position.y)
        })
        .collect::<Vec<_>>();
    resolve_collisions(&mut points, &settings.collision);

    let children = child_points(&points, kind, range, settings);
    debug!(
        owners = points.len(),
        children = children.len(),
        "placed owner children"
    );
    points.extend(children);
    points
}

/// Children ring-packed inside each owner point; `parent` indexes `owners`.
fn child_points(
    owners: &[Point],
    kind: OwnerKind,
    range: SizeRange,
    settings: &LayoutSettings,
) -> Vec<Point> {
    let child_radius = range.min * settings.rings.child_scale;
    let bounds = Region::new(0.0, 100.0);
    let mut children = Vec::new();

    for (index, owner_point) in owners.iter().enumerate() {
        let Some(owner) = owner_point.entity.owner() else {
            continue;
        };
        let max_frequency = owner
            .children
            .iter()
            .map(|child| child.retrieval_frequency)
            .max()
            .unwrap_or(0);

        let placed = layout_children_in_rings(
            pos2(owner_point.x, owner_point.y),
            owner_point.radius,
            child_radius,
            &owner.children,
            settings.rings.spacing_multiplier,
            settings.rings.max_coverage_ratio,
            settings.rings.max_children,
        );
        for child in placed {
            let opacity = if child.chunk.is_orphan {
                ORPHAN_CHILD_OPACITY
            } else {
                RETRIEVED_OPACITY
            };
            let size = normalize(child.chunk.retrieval_frequency, max_frequency);
            let position = bounds.clamp(child.position);
            let entity = Entity::OwnerChunk(OwnerChunkEntity {
                owner_id: owner.id.clone(),
                owner_kind: kind,
                chunk: child.chunk.clone(),
            });

            let mut point = Point::new(entity, size, child_radius, opacity).at(position.x, position.y);
            point.parent = Some(index);
            children.push(point);
        }
    }
    children
}

fn role_lane_points(
    snapshot: &Snapshot,
    filter: QualityFilter,
    range: SizeRange,
    settings: &LayoutSettings,
) -> Vec<Point> {
    let entities = chunks_to_roles(snapshot);
    let max_roles = entities.iter().map(|entity| entity.roles.len()).max().unwrap_or(0);
    let entities = entities
        .into_iter()
        .filter(|entity| filter.matches(quality_band(entity.avg_similarity)))
        .collect::<Vec<_>>();

    let lanes = entities
        .iter()
        .map(|entity| {
            (
                entity.dominant_role.as_deref().unwrap_or(UNASSIGNED_ROLE),
                entity.avg_similarity,
            )
        })
        .collect::<Vec<_>>();
    let positions = row_positions(&lanes, Region::inset(settings.grid.margin));

    let mut points = entities
        .into_iter()
        .zip(positions)
        .map(|(entity, position)| {
            let size = normalize(entity.roles.len(), max_roles);
            Point::new(Entity::Chunk(entity), size, range.scale(size), RETRIEVED_OPACITY)
                .at(position.x, position.y)
        })
        .collect::<Vec<_>>();

    resolve_collisions(&mut points, &settings.collision);
    points
}
