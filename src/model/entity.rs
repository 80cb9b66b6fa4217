use serde::Serialize;

use crate::quality::{QualityBand, classify};
use crate::util::truncate_chars;

pub const UNASSOCIATED_OWNER: &str = "Unassociated";

/// A retrieved chunk as seen from a question.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChunkMatch {
    pub chunk_id: String,
    pub doc_id: String,
    pub title: String,
    /// 0-10 scale.
    pub similarity: f32,
}

/// A question as seen from a chunk.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuestionMatch {
    pub question_id: String,
    pub text: String,
    /// Best similarity this question reached for the chunk, 0-10 scale.
    pub similarity: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuestionEntity {
    pub id: String,
    pub text: String,
    pub source: String,
    pub role: Option<String>,
    pub chunk_count: usize,
    pub avg_similarity: f32,
    pub best_chunk: Option<ChunkMatch>,
    pub chunks: Vec<ChunkMatch>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChunkEntity {
    pub id: String,
    pub doc_id: String,
    pub title: String,
    pub content: Option<String>,
    /// Distinct questions that retrieved this chunk.
    pub retrieval_frequency: usize,
    pub record_count: usize,
    pub avg_similarity: f32,
    pub best_question: Option<QuestionMatch>,
    pub questions: Vec<QuestionMatch>,
    pub roles: Vec<RoleCount>,
    pub dominant_role: Option<String>,
    pub is_orphan: bool,
}

/// Chunk summary owned by a document or role.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChildChunk {
    pub chunk_id: String,
    pub doc_id: String,
    pub title: String,
    pub content: Option<String>,
    pub retrieval_frequency: usize,
    pub avg_similarity: f32,
    pub is_orphan: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OwnerEntity {
    pub id: String,
    pub retrieval_count: usize,
    pub question_count: usize,
    pub avg_similarity: f32,
    pub orphan_count: usize,
    /// Non-orphans first, then by descending retrieval frequency.
    pub children: Vec<ChildChunk>,
    pub is_unassociated: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Document,
    Role,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OwnerChunkEntity {
    pub owner_id: String,
    pub owner_kind: OwnerKind,
    pub chunk: ChildChunk,
}

/// Bucket of never-retrieved chunks drawn as one glyph on the perimeter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterEntity {
    pub id: String,
    pub members: Vec<String>,
    pub sample_titles: Vec<String>,
    pub anchor: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Question(QuestionEntity),
    Chunk(ChunkEntity),
    Role(OwnerEntity),
    Document(OwnerEntity),
    OwnerChunk(OwnerChunkEntity),
    UnassociatedCluster(ClusterEntity),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Self::Question(question) => &question.id,
            Self::Chunk(chunk) => &chunk.id,
            Self::Role(owner) | Self::Document(owner) => &owner.id,
            Self::OwnerChunk(child) => &child.chunk.chunk_id,
            Self::UnassociatedCluster(cluster) => &cluster.id,
        }
    }

    /// Unique within one point set; child chunks are keyed by their owner.
    pub fn key(&self) -> String {
        match self {
            Self::Question(question) => format!("question:{}", question.id),
            Self::Chunk(chunk) => format!("chunk:{}", chunk.id),
            Self::Role(owner) if owner.is_unassociated => {
                format!("unassociated-role:{}", owner.id)
            }
            Self::Role(owner) => format!("role:{}", owner.id),
            Self::Document(owner) => format!("document:{}", owner.id),
            Self::OwnerChunk(child) => {
                format!("owner-chunk:{}/{}", child.owner_id, child.chunk.chunk_id)
            }
            Self::UnassociatedCluster(cluster) => format!("cluster:{}", cluster.id),
        }
    }

    pub fn owner(&self) -> Option<&OwnerEntity> {
        match self {
            Self::Role(owner) | Self::Document(owner) => Some(owner),
            _ => None,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Question(_) => "Question",
            Self::Chunk(_) => "Chunk",
            Self::Role(_) => "Role",
            Self::Document(_) => "Document",
            Self::OwnerChunk(_) => "Chunk",
            Self::UnassociatedCluster(_) => "Unretrieved cluster",
        }
    }

    /// Aggregated similarity on the 0-10 scale.
    pub fn quality(&self) -> f32 {
        match self {
            Self::Question(question) => question.avg_similarity,
            Self::Chunk(chunk) => chunk.avg_similarity,
            Self::Role(owner) | Self::Document(owner) => owner.avg_similarity,
            Self::OwnerChunk(child) => child.chunk.avg_similarity,
            Self::UnassociatedCluster(_) => 0.0,
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            Self::Question(question) => question.chunk_count,
            Self::Chunk(chunk) => chunk.record_count,
            Self::Role(owner) | Self::Document(owner) => owner.retrieval_count,
            Self::OwnerChunk(child) => child.chunk.retrieval_frequency,
            Self::UnassociatedCluster(_) => 0,
        }
    }

    pub fn is_orphan(&self) -> bool {
        match self {
            Self::Question(_) => false,
            Self::Chunk(chunk) => chunk.is_orphan,
            Self::Role(owner) | Self::Document(owner) => owner.is_unassociated,
            Self::OwnerChunk(child) => child.chunk.is_orphan,
            Self::UnassociatedCluster(_) => true,
        }
    }

    pub fn band(&self) -> QualityBand {
        classify(self.quality(), self.is_orphan(), true)
    }

    /// Short human label for canvases and lists.
    pub fn label(&self) -> String {
        match self {
            Self::Question(question) => truncate_chars(&question.text, 60),
            Self::Chunk(chunk) => truncate_chars(&chunk.title, 60),
            Self::Role(owner) | Self::Document(owner) => owner.id.clone(),
            Self::OwnerChunk(child) => truncate_chars(&child.chunk.title, 60),
            Self::UnassociatedCluster(cluster) => {
                format!("{} unretrieved chunks", cluster.members.len())
            }
        }
    }

    pub fn tooltip(&self) -> String {
        let mut lines = vec![format!("{}: {}", self.kind_label(), self.label())];
        match self {
            Self::Question(question) => {
                lines.push(format!("Retrieved chunks: {}", question.chunk_count));
                lines.push(format!("Avg similarity: {:.2}", question.avg_similarity));
                if let Some(best) = &question.best_chunk {
                    lines.push(format!(
                        "Best chunk: {} ({:.2})",
                        truncate_chars(&best.title, 48),
                        best.similarity
                    ));
                }
            }
            Self::Chunk(chunk) => {
                lines.push(format!("Document: {}", chunk.doc_id));
                if chunk.is_orphan {
                    lines.push("Never retrieved".to_owned());
                } else {
                    lines.push(format!("Retrieved by {} questions", chunk.retrieval_frequency));
                    lines.push(format!("Avg similarity: {:.2}", chunk.avg_similarity));
                }
                if let Some(best) = &chunk.best_question {
                    lines.push(format!(
                        "Best question: {} ({:.2})",
                        truncate_chars(&best.text, 48),
                        best.similarity
                    ));
                }
                if let Some(role) = &chunk.dominant_role {
                    lines.push(format!("Dominant role: {role}"));
                }
            }
            Self::Role(owner) | Self::Document(owner) => {
                lines.push(format!(
                    "Chunks: {} ({} never retrieved)",
                    owner.children.len(),
                    owner.orphan_count
                ));
                lines.push(format!("Retrievals: {}", owner.retrieval_count));
                lines.push(format!("Avg similarity: {:.2}", owner.avg_similarity));
            }
            Self::OwnerChunk(child) => {
                lines.push(format!("Owner: {}", child.owner_id));
                if child.chunk.is_orphan {
                    lines.push("Never retrieved".to_owned());
                } else {
                    lines.push(format!("Retrieved {} times", child.chunk.retrieval_frequency));
                    lines.push(format!("Avg similarity: {:.2}", child.chunk.avg_similarity));
                }
            }
            Self::UnassociatedCluster(cluster) => {
                for title in cluster.sample_titles.iter().take(3) {
                    lines.push(format!("- {}", truncate_chars(title, 48)));
                }
            }
        }
        lines.join("\n")
    }
}
