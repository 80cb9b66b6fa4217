use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

pub const UNKNOWN_KEY: &str = "unknown";
pub const UNKNOWN_QUESTION: &str = "Unknown question";
pub const UNKNOWN_DOCUMENT: &str = "Unknown document";
pub const UNKNOWN_TITLE: &str = "Untitled chunk";
pub const UNASSIGNED_ROLE: &str = "Unassigned";

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One chunk returned for a question by the retrieval backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievedChunk {
    #[serde(deserialize_with = "null_as_default")]
    pub chunk_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub doc_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub content: Option<String>,
    /// Raw similarity on the 0-1 scale.
    #[serde(deserialize_with = "null_as_default")]
    pub similarity: f32,
}

/// A question together with everything retrieved for it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionResult {
    #[serde(alias = "question_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(alias = "question", deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    pub role: Option<String>,
    #[serde(alias = "retrieved_chunks", deserialize_with = "null_as_default")]
    pub chunks: Vec<RetrievedChunk>,
}

/// An entry in the full corpus listing, retrieved or not.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogChunk {
    #[serde(deserialize_with = "null_as_default")]
    pub chunk_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub doc_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub content: Option<String>,
}

impl CatalogChunk {
    pub fn key(&self) -> &str {
        chunk_key(&self.chunk_id)
    }

    pub fn doc_key(&self) -> &str {
        doc_key(&self.doc_id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    #[serde(alias = "results", deserialize_with = "null_as_default")]
    pub questions: Vec<QuestionResult>,
    pub catalog: Option<Vec<CatalogChunk>>,
}

impl Snapshot {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::ReadSnapshot {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Flattens the snapshot into question x chunk pairs.
    ///
    /// Questions without retrieved chunks contribute no record.
    pub fn records(&self) -> Vec<RetrievalRecord<'_>> {
        self.questions
            .iter()
            .flat_map(|question| {
                question
                    .chunks
                    .iter()
                    .map(move |chunk| RetrievalRecord { question, chunk })
            })
            .collect()
    }

    pub fn catalog(&self) -> &[CatalogChunk] {
        self.catalog.as_deref().unwrap_or_default()
    }

    pub fn record_count(&self) -> usize {
        self.questions.iter().map(|question| question.chunks.len()).sum()
    }
}

/// Borrowed view of one question x retrieved-chunk pair with fail-soft accessors.
#[derive(Clone, Copy, Debug)]
pub struct RetrievalRecord<'a> {
    pub question: &'a QuestionResult,
    pub chunk: &'a RetrievedChunk,
}

impl<'a> RetrievalRecord<'a> {
    pub fn question_id(&self) -> &'a str {
        question_key(&self.question.id)
    }

    pub fn question_text(&self) -> &'a str {
        question_text(&self.question.text)
    }

    pub fn question_source(&self) -> &'a str {
        self.question.source.as_str()
    }

    pub fn role(&self) -> &'a str {
        role_key(self.question.role.as_deref())
    }

    pub fn chunk_id(&self) -> &'a str {
        chunk_key(&self.chunk.chunk_id)
    }

    pub fn doc_id(&self) -> &'a str {
        doc_key(&self.chunk.doc_id)
    }

    pub fn title(&self) -> &'a str {
        crate::util::or_placeholder(&self.chunk.title, UNKNOWN_TITLE)
    }

    pub fn content(&self) -> Option<&'a str> {
        self.chunk.content.as_deref()
    }

    /// Similarity on the 0-10 display scale.
    pub fn score(&self) -> f32 {
        display_score(self.chunk.similarity)
    }
}

pub(crate) fn question_key(id: &str) -> &str {
    crate::util::or_placeholder(id, UNKNOWN_KEY)
}

pub(crate) fn question_text(text: &str) -> &str {
    crate::util::or_placeholder(text, UNKNOWN_QUESTION)
}

pub(crate) fn chunk_key(id: &str) -> &str {
    crate::util::or_placeholder(id, UNKNOWN_KEY)
}

pub(crate) fn doc_key(id: &str) -> &str {
    crate::util::or_placeholder(id, UNKNOWN_DOCUMENT)
}

pub(crate) fn role_key(role: Option<&str>) -> &str {
    crate::util::or_placeholder(role.unwrap_or_default(), UNASSIGNED_ROLE)
}

/// Rescales a raw 0-1 similarity to the 0-10 display scale.
pub fn display_score(similarity: f32) -> f32 {
    if similarity.is_finite() {
        similarity.clamp(0.0, 1.0) * 10.0
    } else {
        0.0
    }
}
