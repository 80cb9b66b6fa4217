mod entity;
mod point;
mod records;

pub use entity::{
    ChildChunk, ChunkEntity, ChunkMatch, ClusterEntity, Entity, OwnerChunkEntity, OwnerEntity,
    OwnerKind, QuestionEntity, QuestionMatch, RoleCount, UNASSOCIATED_OWNER,
};
pub use point::{Point, ScreenPosition};
pub use records::{
    CatalogChunk, QuestionResult, RetrievalRecord, RetrievedChunk, Snapshot, UNASSIGNED_ROLE,
    UNKNOWN_DOCUMENT, UNKNOWN_KEY, UNKNOWN_QUESTION, UNKNOWN_TITLE, display_score,
};
pub(crate) use records::{question_key, question_text, role_key};
