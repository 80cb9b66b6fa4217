use crate::model::{
    ChunkMatch, QuestionEntity, QuestionResult, RetrievalRecord, question_key, question_text,
};

use super::OrderedGroups;

/// One entity per distinct question id.
///
/// Questions that retrieved nothing still produce a zero-count entity.
pub fn questions_to_chunks(questions: &[QuestionResult]) -> Vec<QuestionEntity> {
    let mut groups = OrderedGroups::<QuestionEntity>::default();

    for question in questions {
        let id = question_key(&question.id);
        let entity = groups.entry_with(id, || QuestionEntity {
            id: id.to_owned(),
            text: question_text(&question.text).to_owned(),
            source: question.source.clone(),
            role: question.role.clone(),
            chunk_count: 0,
            avg_similarity: 0.0,
            best_chunk: None,
            chunks: Vec::new(),
        });

        for chunk in &question.chunks {
            let record = RetrievalRecord { question, chunk };
            entity.chunks.push(ChunkMatch {
                chunk_id: record.chunk_id().to_owned(),
                doc_id: record.doc_id().to_owned(),
                title: record.title().to_owned(),
                similarity: record.score(),
            });
        }
    }

    let mut entities = groups.into_vec();
    for entity in &mut entities {
        entity.chunk_count = entity.chunks.len();
        if entity.chunk_count > 0 {
            let total = entity.chunks.iter().map(|chunk| chunk.similarity).sum::<f32>();
            entity.avg_similarity = total / entity.chunk_count as f32;
        }
        entity.best_chunk = entity
            .chunks
            .iter()
            .fold(None::<&ChunkMatch>, |best, candidate| match best {
                Some(best) if best.similarity >= candidate.similarity => Some(best),
                _ => Some(candidate),
            })
            .cloned();
    }
    entities
}
