use crate::model::{CatalogChunk, ChildChunk, ChunkEntity, RetrievalRecord, Snapshot};

use super::{ChunkTally, OrderedGroups};

pub(crate) fn tally_chunks(records: &[RetrievalRecord<'_>]) -> OrderedGroups<ChunkTally> {
    let mut tallies = OrderedGroups::<ChunkTally>::default();
    for record in records {
        tallies
            .entry_with(record.chunk_id(), || ChunkTally::new(record))
            .add(record);
    }
    tallies
}

/// Catalog chunks that no record retrieved, deduplicated, in catalog order.
pub(crate) fn orphaned_catalog_chunks<'a>(
    catalog: &'a [CatalogChunk],
    retrieved: &OrderedGroups<ChunkTally>,
) -> Vec<&'a CatalogChunk> {
    let mut seen = OrderedGroups::<()>::default();
    let mut orphans = Vec::new();
    for entry in catalog {
        let key = entry.key();
        if retrieved.contains(key) || seen.contains(key) {
            continue;
        }
        seen.entry_with(key, || ());
        orphans.push(entry);
    }
    orphans
}

pub(crate) fn orphan_child(entry: &CatalogChunk) -> ChildChunk {
    ChildChunk {
        chunk_id: entry.key().to_owned(),
        doc_id: entry.doc_key().to_owned(),
        title: crate::util::or_placeholder(&entry.title, crate::model::UNKNOWN_TITLE).to_owned(),
        content: entry.content.clone(),
        retrieval_frequency: 0,
        avg_similarity: 0.0,
        is_orphan: true,
    }
}

fn orphan_entity(entry: &CatalogChunk) -> ChunkEntity {
    let child = orphan_child(entry);
    ChunkEntity {
        id: child.chunk_id,
        doc_id: child.doc_id,
        title: child.title,
        content: child.content,
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

/// One entity per retrieved chunk, followed by one per orphaned catalog chunk.
pub fn chunks_to_questions(snapshot: &Snapshot) -> Vec<ChunkEntity> {
    let records = snapshot.records();
    let tallies = tally_chunks(&records);
    let orphans = orphaned_catalog_chunks(snapshot.catalog(), &tallies)
        .into_iter()
        .map(orphan_entity)
        .collect::<Vec<_>>();

    let mut entities = tallies
        .into_vec()
        .into_iter()
        .map(ChunkTally::into_entity)
        .collect::<Vec<_>>();
    entities.extend(orphans);
    entities
}

/// Retrieved chunks only, each annotated with the roles that retrieved it.
pub fn chunks_to_roles(snapshot: &Snapshot) -> Vec<ChunkEntity> {
    let records = snapshot.records();
    tally_chunks(&records)
        .into_vec()
        .into_iter()
        .map(ChunkTally::into_entity)
        .collect()
}
