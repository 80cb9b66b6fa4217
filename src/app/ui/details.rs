use eframe::egui::{self, RichText, Ui};
use retrieval_lens::model::{
    ChildChunk, ChunkEntity, ClusterEntity, Entity, OwnerChunkEntity, OwnerEntity, QuestionEntity,
};
use retrieval_lens::util::truncate_chars;

use super::super::ViewModel;

const CONTENT_PREVIEW_CHARS: usize = 600;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(point) = self.selected_point() else {
            ui.label("Select a point on the canvas or in the weakest list.");
            return;
        };

        ui.label(RichText::new(point.entity.label()).strong());
        ui.small(format!("{} · {}", point.entity.kind_label(), point.entity.id()));
        ui.add_space(6.0);
        ui.label(format!(
            "Quality: {:.2} ({})",
            point.color_value,
            point.band.label()
        ));
        ui.label(format!("Contributing records: {}", point.entity.record_count()));
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| match &point.entity {
                Entity::Question(question) => question_details(ui, question),
                Entity::Chunk(chunk) => chunk_details(ui, chunk),
                Entity::Role(owner) | Entity::Document(owner) => owner_details(ui, owner),
                Entity::OwnerChunk(child) => owner_chunk_details(ui, child),
                Entity::UnassociatedCluster(cluster) => cluster_details(ui, cluster),
            });
    }
}

fn content_preview(ui: &mut Ui, content: Option<&str>) {
    if let Some(content) = content.filter(|content| !content.trim().is_empty()) {
        ui.separator();
        ui.label(RichText::new("Content").strong());
        ui.label(truncate_chars(content, CONTENT_PREVIEW_CHARS));
    }
}

fn question_details(ui: &mut Ui, question: &QuestionEntity) {
    if !question.source.is_empty() {
        ui.label(format!("Source: {}", question.source));
    }
    if let Some(role) = &question.role {
        ui.label(format!("Role: {role}"));
    }
    ui.label(format!("Retrieved chunks: {}", question.chunk_count));
    ui.label(format!("Average similarity: {:.2}", question.avg_similarity));

    ui.separator();
    ui.label(RichText::new("Retrieved chunks").strong());
    if question.chunks.is_empty() {
        ui.label("Nothing was retrieved for this question.");
    }
    for chunk in &question.chunks {
        ui.label(format!(
            "{:.2}  {}  ({})",
            chunk.similarity,
            truncate_chars(&chunk.title, 48),
            chunk.doc_id
        ));
    }
}

fn chunk_details(ui: &mut Ui, chunk: &ChunkEntity) {
    ui.label(format!("Document: {}", chunk.doc_id));
    if chunk.is_orphan {
        ui.label("Never retrieved by any question in this snapshot.");
    } else {
        ui.label(format!("Retrieved by {} questions", chunk.retrieval_frequency));
        ui.label(format!("Average similarity: {:.2}", chunk.avg_similarity));
    }
    if let Some(role) = &chunk.dominant_role {
        ui.label(format!("Dominant role: {role}"));
    }
    if let Some(best) = &chunk.best_question {
        ui.label(format!(
            "Best question: {} ({:.2})",
            truncate_chars(&best.text, 64),
            best.similarity
        ));
    }

    if !chunk.roles.is_empty() {
        ui.separator();
        ui.label(RichText::new("Roles").strong());
        for role in &chunk.roles {
            ui.label(format!("{}  ×{}", role.role, role.count));
        }
    }

    if !chunk.questions.is_empty() {
        ui.separator();
        ui.label(RichText::new("Questions").strong());
        for question in &chunk.questions {
            ui.label(format!(
                "{:.2}  {}",
                question.similarity,
                truncate_chars(&question.text, 64)
            ));
        }
    }
    content_preview(ui, chunk.content.as_deref());
}

fn child_row(ui: &mut Ui, child: &ChildChunk) {
    let status = if child.is_orphan {
        "never retrieved".to_owned()
    } else {
        format!("×{}  {:.2}", child.retrieval_frequency, child.avg_similarity)
    };
    ui.label(format!("{}  ({status})", truncate_chars(&child.title, 48)));
}

fn owner_details(ui: &mut Ui, owner: &OwnerEntity) {
    if owner.is_unassociated {
        ui.label("Never-retrieved chunks whose owner could not be deduced.");
    }
    ui.label(format!("Chunks: {}", owner.children.len()));
    ui.label(format!("Never retrieved: {}", owner.orphan_count));
    ui.label(format!("Retrievals: {}", owner.retrieval_count));
    ui.label(format!("Distinct questions: {}", owner.question_count));
    ui.label(format!("Average similarity: {:.2}", owner.avg_similarity));

    ui.separator();
    ui.label(RichText::new("Chunks").strong());
    for child in &owner.children {
        child_row(ui, child);
    }
}

fn owner_chunk_details(ui: &mut Ui, child: &OwnerChunkEntity) {
    ui.label(format!("Owner: {}", child.owner_id));
    ui.label(format!("Document: {}", child.chunk.doc_id));
    if child.chunk.is_orphan {
        ui.label("Never retrieved by any question in this snapshot.");
    } else {
        ui.label(format!("Retrieved by {} questions", child.chunk.retrieval_frequency));
        ui.label(format!("Average similarity: {:.2}", child.chunk.avg_similarity));
    }
    content_preview(ui, child.chunk.content.as_deref());
}

fn cluster_details(ui: &mut Ui, cluster: &ClusterEntity) {
    ui.label(format!("Never-retrieved chunks: {}", cluster.members.len()));
    ui.separator();
    ui.label(RichText::new("Sample titles").strong());
    for title in &cluster.sample_titles {
        ui.label(truncate_chars(title, 64));
    }
    ui.separator();
    ui.label(RichText::new("Members").strong());
    for member in &cluster.members {
        ui.small(member.as_str());
    }
}
