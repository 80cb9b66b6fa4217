//! Perspective aggregators: fold retrieval records into entities.
//!
//! Grouping keeps the first-appearance order of keys so identical snapshots
//! always produce identical entity lists. Nothing here fails; malformed
//! fields fall back to placeholders and zeros.

mod chunks;
mod owners;
mod questions;

use std::collections::HashMap;

use crate::model::{
    ChildChunk, ChunkEntity, Entity, QuestionMatch, RetrievalRecord, RoleCount, Snapshot,
};
use crate::perspective::Perspective;

pub use chunks::{chunks_to_questions, chunks_to_roles};
pub use owners::{documents_to_chunks, roles_to_chunks};
pub use questions::questions_to_chunks;

/// Entities for `perspective`, before any filtering or placement.
pub fn aggregate(snapshot: &Snapshot, perspective: Perspective) -> Vec<Entity> {
    match perspective {
        Perspective::QuestionsToChunks => questions_to_chunks(&snapshot.questions)
            .into_iter()
            .map(Entity::Question)
            .collect(),
        Perspective::ChunksToQuestions => chunks_to_questions(snapshot)
            .into_iter()
            .map(Entity::Chunk)
            .collect(),
        Perspective::ChunksToRoles => chunks_to_roles(snapshot)
            .into_iter()
            .map(Entity::Chunk)
            .collect(),
        Perspective::DocumentsToChunks => documents_to_chunks(snapshot)
            .into_iter()
            .map(Entity::Document)
            .collect(),
        Perspective::RolesToChunks => roles_to_chunks(snapshot)
            .into_iter()
            .map(Entity::Role)
            .collect(),
    }
}

/// Insertion-ordered grouping keyed by string.
pub(crate) struct OrderedGroups<T> {
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Default for OrderedGroups<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<T> OrderedGroups<T> {
    pub(crate) fn entry_with(&mut self, key: &str, make: impl FnOnce() -> T) -> &mut T {
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                self.items.push(make());
                self.index.insert(key.to_owned(), self.items.len() - 1);
                self.items.len() - 1
            }
        };
        &mut self.items[position]
    }

    pub(crate) fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&position| &self.items[position])
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let position = *self.index.get(key)?;
        self.items.get_mut(position)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub(crate) fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Running statistics for one chunk across the records that retrieved it.
pub(crate) struct ChunkTally {
    chunk_id: String,
    doc_id: String,
    title: String,
    content: Option<String>,
    similarity_sum: f32,
    record_count: usize,
    questions: Vec<QuestionMatch>,
    roles: Vec<RoleCount>,
}

impl ChunkTally {
    pub(crate) fn new(record: &RetrievalRecord<'_>) -> Self {
        Self {
            chunk_id: record.chunk_id().to_owned(),
            doc_id: record.doc_id().to_owned(),
            title: record.title().to_owned(),
            content: record.content().map(str::to_owned),
            similarity_sum: 0.0,
            record_count: 0,
            questions: Vec::new(),
            roles: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, record: &RetrievalRecord<'_>) {
        let score = record.score();
        self.similarity_sum += score;
        self.record_count += 1;

        if self.content.is_none() {
            self.content = record.content().map(str::to_owned);
        }

        let question_id = record.question_id();
        if let Some(existing) = self
            .questions
            .iter_mut()
            .find(|question| question.question_id == question_id)
        {
            existing.similarity = existing.similarity.max(score);
        } else {
            self.questions.push(QuestionMatch {
                question_id: question_id.to_owned(),
                text: record.question_text().to_owned(),
                similarity: score,
            });

            let role = record.role();
            if let Some(existing) = self.roles.iter_mut().find(|entry| entry.role == role) {
                existing.count += 1;
            } else {
                self.roles.push(RoleCount {
                    role: role.to_owned(),
                    count: 1,
                });
            }
        }
    }

    pub(crate) fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub(crate) fn avg_similarity(&self) -> f32 {
        if self.record_count == 0 {
            0.0
        } else {
            self.similarity_sum / self.record_count as f32
        }
    }

    pub(crate) fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.questions
            .iter()
            .map(|question| question.question_id.as_str())
    }

    pub(crate) fn to_child(&self) -> ChildChunk {
        ChildChunk {
            chunk_id: self.chunk_id.clone(),
            doc_id: self.doc_id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            retrieval_frequency: self.questions.len(),
            avg_similarity: self.avg_similarity(),
            is_orphan: false,
        }
    }

    pub(crate) fn into_entity(self) -> ChunkEntity {
        let avg_similarity = self.avg_similarity();
        let best_question = self
            .questions
            .iter()
            .fold(None::<&QuestionMatch>, |best, candidate| match best {
                Some(best) if best.similarity >= candidate.similarity => Some(best),
                _ => Some(candidate),
            })
            .cloned();
        let dominant_role = self
            .roles
            .iter()
            .fold(None::<&RoleCount>, |best, candidate| match best {
                Some(best) if best.count >= candidate.count => Some(best),
                _ => Some(candidate),
            })
            .map(|entry| entry.role.clone());

        ChunkEntity {
            id: self.chunk_id,
            doc_id: self.doc_id,
            title: self.title,
            content: self.content,
            retrieval_frequency: self.questions.len(),
            record_count: self.record_count,
            avg_similarity,
            best_question,
            questions: self.questions,
            roles: self.roles,
            dominant_role,
            is_orphan: false,
        }
    }
}

/// Non-orphans first, each group by descending retrieval frequency; stable.
pub(crate) fn sort_children(children: &mut [ChildChunk]) {
    children.sort_by(|a, b| {
        a.is_orphan
            .cmp(&b.is_orphan)
            .then_with(|| b.retrieval_frequency.cmp(&a.retrieval_frequency))
    });
}
