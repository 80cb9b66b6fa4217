use eframe::egui::{Pos2, pos2};
use serde::{Deserialize, Serialize};

use crate::model::{ChunkEntity, ClusterEntity};
use crate::util::stable_pair;

/// Fixed anchors along the edges of the unit square, clockwise from the top
/// left. All of them sit outside the interior region used by the grid.
pub const EDGE_ANCHORS: [(f32, f32); 20] = [
    (10.0, 7.0),
    (26.0, 7.0),
    (42.0, 7.0),
    (58.0, 7.0),
    (74.0, 7.0),
    (90.0, 7.0),
    (93.0, 24.0),
    (93.0, 41.0),
    (93.0, 58.0),
    (93.0, 75.0),
    (90.0, 93.0),
    (74.0, 93.0),
    (58.0, 93.0),
    (42.0, 93.0),
    (26.0, 93.0),
    (10.0, 93.0),
    (7.0, 75.0),
    (7.0, 58.0),
    (7.0, 41.0),
    (7.0, 24.0),
];

const ANCHOR_JITTER: f32 = 3.0;
const SAMPLE_TITLES: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrphanSettings {
    /// Above this many orphans they are clustered instead of drawn one by one.
    pub cluster_threshold: usize,
    pub chunks_per_cluster: usize,
    pub min_clusters: usize,
    pub max_clusters: usize,
}

impl Default for OrphanSettings {
    fn default() -> Self {
        Self {
            cluster_threshold: 12,
            chunks_per_cluster: 50,
            min_clusters: 3,
            max_clusters: 8,
        }
    }
}

impl OrphanSettings {
    pub fn should_cluster(&self, orphan_count: usize) -> bool {
        orphan_count > self.cluster_threshold
    }

    /// `ceil(n / chunks_per_cluster)` bounded to `[min, max]`, never more
    /// clusters than orphans or anchors.
    pub fn cluster_count(&self, orphan_count: usize) -> usize {
        if orphan_count == 0 {
            return 0;
        }
        let per_cluster = self.chunks_per_cluster.max(1);
        let max_clusters = self.max_clusters.clamp(1, EDGE_ANCHORS.len());
        let min_clusters = self.min_clusters.clamp(1, max_clusters);
        orphan_count
            .div_ceil(per_cluster)
            .clamp(min_clusters, max_clusters)
            .min(orphan_count)
    }
}

/// Anchor for cluster `index` out of `count`, spread evenly around the edge.
pub fn anchor_index(index: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    (index * EDGE_ANCHORS.len() / count) % EDGE_ANCHORS.len()
}

pub fn anchor_position(anchor: usize) -> Pos2 {
    let (x, y) = EDGE_ANCHORS[anchor % EDGE_ANCHORS.len()];
    pos2(x, y)
}

/// Round-robin distribution of orphans into `count` clusters.
pub fn cluster_orphans(orphans: &[ChunkEntity], count: usize) -> Vec<ClusterEntity> {
    if count == 0 || orphans.is_empty() {
        return Vec::new();
    }

    let mut clusters = (0..count)
        .map(|index| ClusterEntity {
            id: format!("unretrieved-{}", index + 1),
            members: Vec::new(),
            sample_titles: Vec::new(),
            anchor: anchor_index(index, count),
        })
        .collect::<Vec<_>>();

    for (index, orphan) in orphans.iter().enumerate() {
        let cluster = &mut clusters[index % count];
        cluster.members.push(orphan.id.clone());
        if cluster.sample_titles.len() < SAMPLE_TITLES {
            cluster.sample_titles.push(orphan.title.clone());
        }
    }
    clusters
}

/// Individual orphans spread over the anchors, jittered by id.
pub fn perimeter_positions<S: AsRef<str>>(ids: &[S]) -> Vec<Pos2> {
    let count = ids.len();
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let anchor = if count <= EDGE_ANCHORS.len() {
                anchor_index(index, count)
            } else {
                index % EDGE_ANCHORS.len()
            };
            let (jx, jy) = stable_pair(id.as_ref());
            let base = anchor_position(anchor);
            pos2(base.x + jx * ANCHOR_JITTER, base.y + jy * ANCHOR_JITTER)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::grid::{GridSettings, Region};

    fn orphan(id: &str) -> ChunkEntity {
        ChunkEntity {
            id: id.to_owned(),
            doc_id: "d".to_owned(),
            title: format!("Title {id}"),
            content: None,
            retrieval_frequency: 0,
            record_count: 0,
            avg_similarity: 0.0,
            best_question: None,
            questions: Vec::new(),
            roles: Vec::new(),
            dominant_role: None,
            is_orphan: true,
        }
    }

    #[test]
    fn anchors_avoid_the_interior() {
        let interior = Region::inset(GridSettings::default().perimeter_margin);
        for anchor in 0..EDGE_ANCHORS.len() {
            assert!(!interior.contains(anchor_position(anchor)));
        }
    }

    #[test]
    fn cluster_count_is_bounded() {
        let settings = OrphanSettings::default();
        assert_eq!(settings.cluster_count(0), 0);
        assert_eq!(settings.cluster_count(2), 2);
        assert_eq!(settings.cluster_count(90), 3);
        assert_eq!(settings.cluster_count(260), 6);
        assert_eq!(settings.cluster_count(10_000), 8);
    }

    #[test]
    fn round_robin_keeps_every_orphan() {
        let orphans = (0..90).map(|index| orphan(&format!("c{index}"))).collect::<Vec<_>>();
        let clusters = cluster_orphans(&orphans, 3);

        assert_eq!(clusters.len(), 3);
        assert_eq!(
            clusters.iter().map(|cluster| cluster.members.len()).sum::<usize>(),
            90
        );
        assert!(clusters.iter().all(|cluster| cluster.members.len() == 30));
        assert_eq!(clusters[1].members[0], "c1");
        assert!(clusters.iter().all(|cluster| cluster.sample_titles.len() == SAMPLE_TITLES));
    }

    #[test]
    fn clusters_use_distinct_anchors() {
        let orphans = (0..400).map(|index| orphan(&format!("c{index}"))).collect::<Vec<_>>();
        let clusters = cluster_orphans(&orphans, 8);
        let mut anchors = clusters.iter().map(|cluster| cluster.anchor).collect::<Vec<_>>();
        anchors.dedup();
        assert_eq!(anchors.len(), 8);
    }

    #[test]
    fn perimeter_positions_stay_near_the_edge() {
        let ids = (0..30).map(|index| format!("orphan-{index}")).collect::<Vec<_>>();
        let interior = Region::inset(12.0);
        for position in perimeter_positions(&ids) {
            assert!(!interior.contains(position), "{position:?} is inside");
        }
    }
}
