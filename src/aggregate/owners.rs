use crate::model::{ChildChunk, OwnerEntity, RoleCount, Snapshot, UNASSOCIATED_OWNER, role_key};

use super::chunks::{orphan_child, orphaned_catalog_chunks, tally_chunks};
use super::{ChunkTally, OrderedGroups, sort_children};

struct OwnerTally {
    id: String,
    similarity_sum: f32,
    retrieval_count: usize,
    question_ids: OrderedGroups<()>,
    children: Vec<ChildChunk>,
}

impl OwnerTally {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            similarity_sum: 0.0,
            retrieval_count: 0,
            question_ids: OrderedGroups::default(),
            children: Vec::new(),
        }
    }

    fn add_retrieved(&mut self, tally: &ChunkTally) {
        self.similarity_sum += tally.similarity_sum;
        self.retrieval_count += tally.record_count;
        for question_id in tally.question_ids() {
            self.question_ids.entry_with(question_id, || ());
        }
        self.children.push(tally.to_child());
    }

    fn finish(self, is_unassociated: bool) -> OwnerEntity {
        let mut children = self.children;
        sort_children(&mut children);
        let orphan_count = children.iter().filter(|child| child.is_orphan).count();
        let avg_similarity = if self.retrieval_count == 0 {
            0.0
        } else {
            self.similarity_sum / self.retrieval_count as f32
        };

        OwnerEntity {
            id: self.id,
            retrieval_count: self.retrieval_count,
            question_count: self.question_ids.len(),
            avg_similarity,
            orphan_count,
            children,
            is_unassociated,
        }
    }
}

/// One owner per document; each owns its retrieved and orphaned chunks.
pub fn documents_to_chunks(snapshot: &Snapshot) -> Vec<OwnerEntity> {
    let records = snapshot.records();
    let tallies = tally_chunks(&records);
    let mut owners = OrderedGroups::<OwnerTally>::default();

    for tally in tallies.iter() {
        owners
            .entry_with(tally.doc_id(), || OwnerTally::new(tally.doc_id()))
            .add_retrieved(tally);
    }

    for entry in orphaned_catalog_chunks(snapshot.catalog(), &tallies) {
        owners
            .entry_with(entry.doc_key(), || OwnerTally::new(entry.doc_key()))
            .children
            .push(orphan_child(entry));
    }

    owners
        .into_vec()
        .into_iter()
        .map(|owner| owner.finish(false))
        .collect()
}

/// Role owning the most retrieved chunks of each document.
fn dominant_roles_by_document(roles: &OrderedGroups<RoleChunks>) -> OrderedGroups<Vec<RoleCount>> {
    let mut by_document = OrderedGroups::<Vec<RoleCount>>::default();
    for role in roles.iter() {
        for tally in role.chunks.iter() {
            let counts = by_document.entry_with(tally.doc_id(), Vec::new);
            if let Some(entry) = counts.iter_mut().find(|entry| entry.role == role.name) {
                entry.count += 1;
            } else {
                counts.push(RoleCount {
                    role: role.name.clone(),
                    count: 1,
                });
            }
        }
    }
    by_document
}

struct RoleChunks {
    name: String,
    chunks: OrderedGroups<ChunkTally>,
}

/// One owner per question role, plus a synthetic owner for orphans whose
/// role cannot be deduced from their document.
pub fn roles_to_chunks(snapshot: &Snapshot) -> Vec<OwnerEntity> {
    let records = snapshot.records();
    let mut roles = OrderedGroups::<RoleChunks>::default();
    for record in &records {
        let role = record.role();
        roles
            .entry_with(role, || RoleChunks {
                name: role.to_owned(),
                chunks: OrderedGroups::default(),
            })
            .chunks
            .entry_with(record.chunk_id(), || ChunkTally::new(record))
            .add(record);
    }

    // Roles of questions that retrieved nothing still get an owner glyph.
    for question in &snapshot.questions {
        if question.chunks.is_empty() {
            let role = role_key(question.role.as_deref());
            roles.entry_with(role, || RoleChunks {
                name: role.to_owned(),
                chunks: OrderedGroups::default(),
            });
        }
    }

    let dominant = dominant_roles_by_document(&roles);
    let mut owners = OrderedGroups::<OwnerTally>::default();
    for role in roles.iter() {
        let owner = owners.entry_with(&role.name, || OwnerTally::new(&role.name));
        for tally in role.chunks.iter() {
            owner.add_retrieved(tally);
        }
    }

    let mut unassociated = OwnerTally::new(UNASSOCIATED_OWNER);
    let retrieved = tally_chunks(&records);
    for entry in orphaned_catalog_chunks(snapshot.catalog(), &retrieved) {
        let role = dominant.get(entry.doc_key()).and_then(|counts| {
            counts
                .iter()
                .fold(None::<&RoleCount>, |best, candidate| match best {
                    Some(best) if best.count >= candidate.count => Some(best),
                    _ => Some(candidate),
                })
                .map(|entry| entry.role.as_str())
        });

        let owner = match role.and_then(|role| owners.get_mut(role)) {
            Some(owner) => owner,
            None => &mut unassociated,
        };
        owner.children.push(orphan_child(entry));
    }

    let mut entities = owners
        .into_vec()
        .into_iter()
        .map(|owner| owner.finish(false))
        .collect::<Vec<_>>();
    if !unassociated.children.is_empty() {
        entities.push(unassociated.finish(true));
    }
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::{catalog_entry, chunk, question};
    use crate::model::{Entity, UNASSIGNED_ROLE};

    fn snapshot() -> Snapshot {
        Snapshot {
            questions: vec![
                question(
                    "q1",
                    Some("nurse"),
                    vec![chunk("c1", "d1", 0.9), chunk("c2", "d2", 0.5)],
                ),
                question("q2", Some("nurse"), vec![chunk("c1", "d1", 0.7)]),
                question("q3", None, vec![chunk("c3", "d2", 0.3)]),
            ],
            catalog: Some(vec![
                catalog_entry("c1", "d1"),
                catalog_entry("c2", "d2"),
                catalog_entry("c3", "d2"),
                catalog_entry("c4", "d1"),
                catalog_entry("c5", "d9"),
            ]),
        }
    }

    #[test]
    fn documents_own_retrieved_and_orphaned_chunks() {
        let owners = documents_to_chunks(&snapshot());
        let ids = owners
            .iter()
            .map(|owner| owner.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["d1", "d2", "d9"]);

        let d1 = &owners[0];
        let children = d1
            .children
            .iter()
            .map(|child| (child.chunk_id.as_str(), child.is_orphan))
            .collect::<Vec<_>>();
        assert_eq!(children, [("c1", false), ("c4", true)]);
        assert_eq!(d1.retrieval_count, 2);
        assert_eq!(d1.question_count, 2);
        assert_eq!(d1.orphan_count, 1);
        assert!((d1.avg_similarity - 8.0).abs() < 1e-4);

        let d9 = &owners[2];
        assert_eq!(d9.retrieval_count, 0);
        assert_eq!(d9.avg_similarity, 0.0);
        assert!(d9.children.iter().all(|child| child.is_orphan));
    }

    #[test]
    fn roles_group_by_question_role() {
        let owners = roles_to_chunks(&snapshot());
        let ids = owners
            .iter()
            .map(|owner| owner.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["nurse", UNASSIGNED_ROLE, UNASSOCIATED_OWNER]);

        let nurse = &owners[0];
        assert_eq!(nurse.retrieval_count, 3);
        assert_eq!(nurse.question_count, 2);
        assert_eq!(nurse.children[0].chunk_id, "c1");
        assert_eq!(nurse.children[0].retrieval_frequency, 2);
    }

    #[test]
    fn orphans_follow_the_dominant_role_of_their_document() {
        let owners = roles_to_chunks(&snapshot());
        let nurse = &owners[0];
        assert!(
            nurse
                .children
                .iter()
                .any(|child| child.chunk_id == "c4" && child.is_orphan)
        );

        let unassociated = owners.last().expect("unassociated owner");
        assert!(unassociated.is_unassociated);
        assert_eq!(unassociated.children.len(), 1);
        assert_eq!(unassociated.children[0].chunk_id, "c5");
    }

    #[test]
    fn role_named_like_the_synthetic_owner_keeps_its_own_key() {
        let snapshot = Snapshot {
            questions: vec![question(
                "q1",
                Some(UNASSOCIATED_OWNER),
                vec![chunk("c1", "d1", 0.8)],
            )],
            catalog: Some(vec![catalog_entry("c1", "d1"), catalog_entry("c9", "d9")]),
        };
        let owners = roles_to_chunks(&snapshot)
            .into_iter()
            .map(Entity::Role)
            .collect::<Vec<_>>();

        assert_eq!(owners.len(), 2);
        assert!(owners.iter().all(|owner| owner.id() == UNASSOCIATED_OWNER));
        assert_ne!(owners[0].key(), owners[1].key());
    }

    #[test]
    fn no_orphans_means_no_unassociated_owner() {
        let mut snapshot = snapshot();
        snapshot.catalog = None;
        let owners = roles_to_chunks(&snapshot);
        assert!(owners.iter().all(|owner| !owner.is_unassociated));
    }
}
