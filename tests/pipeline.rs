use std::collections::HashSet;
use std::io::Write as _;

use retrieval_lens::layout::resolve_collisions;
use retrieval_lens::model::{CatalogChunk, QuestionResult, RetrievedChunk};
use retrieval_lens::{
    Canvas, Entity, Error, LayoutSettings, Perspective, Point, QualityBand, QualityFilter,
    Snapshot, ViewConfig, aggregate, build_points, render_points,
};

const THREE_QUESTIONS: &str = r#"{
    "questions": [
        {
            "id": "q-1",
            "text": "How do I reset a badge?",
            "source": "helpdesk",
            "role": "nurse",
            "chunks": [
                { "chunk_id": "c-1", "doc_id": "badges", "title": "Badge resets", "similarity": 0.9 },
                { "chunk_id": "c-2", "doc_id": "badges", "title": "Badge office hours", "similarity": 0.8 }
            ]
        },
        { "id": "q-2", "text": "Who signs off overtime?", "source": "helpdesk", "role": "admin", "chunks": [] },
        {
            "id": "q-3",
            "text": "Where is the parking form?",
            "source": "helpdesk",
            "chunks": [
                { "chunk_id": "c-3", "doc_id": "parking", "title": "Parking", "similarity": 0.4 }
            ]
        }
    ]
}"#;

fn three_questions() -> Snapshot {
    Snapshot::from_json_str(THREE_QUESTIONS).expect("valid snapshot")
}

fn retrieved(chunk_id: &str, doc_id: &str, similarity: f32) -> RetrievedChunk {
    RetrievedChunk {
        chunk_id: chunk_id.to_owned(),
        doc_id: doc_id.to_owned(),
        title: format!("Chunk {chunk_id}"),
        content: None,
        similarity,
    }
}

/// 100 catalog chunks over 5 documents; the first 10 are retrieved once each.
fn large_catalog() -> Snapshot {
    let questions = (0..10)
        .map(|index| QuestionResult {
            id: format!("q-{index}"),
            text: format!("Question {index}?"),
            source: "eval".to_owned(),
            role: Some(if index % 2 == 0 { "nurse" } else { "admin" }.to_owned()),
            chunks: vec![retrieved(
                &format!("c-{index}"),
                &format!("doc-{}", index % 5),
                0.55 + index as f32 * 0.04,
            )],
        })
        .collect();
    let catalog = (0..100)
        .map(|index| CatalogChunk {
            chunk_id: format!("c-{index}"),
            doc_id: format!("doc-{}", index % 5),
            title: format!("Chunk c-{index}"),
            content: Some(format!("Body of chunk {index}")),
        })
        .collect();

    Snapshot {
        questions,
        catalog: Some(catalog),
    }
}

/// `count` documents, each retrieved by one question; roles cycle through
/// twelve names and child counts through one to four.
fn many_documents(count: usize) -> Snapshot {
    let questions = (0..count)
        .map(|index| QuestionResult {
            id: format!("q-{index}"),
            text: format!("Question {index}?"),
            source: "eval".to_owned(),
            role: Some(format!("role-{}", index % 12)),
            chunks: (0..=index % 4)
                .map(|slot| {
                    retrieved(
                        &format!("c-{index}-{slot}"),
                        &format!("doc-{index}"),
                        0.5 + slot as f32 * 0.1,
                    )
                })
                .collect(),
        })
        .collect();

    Snapshot {
        questions,
        catalog: None,
    }
}

fn view(perspective: Perspective) -> ViewConfig {
    ViewConfig {
        perspective,
        ..ViewConfig::default()
    }
}

#[test]
fn three_question_scenario() {
    let settings = LayoutSettings::default();
    let points = build_points(&three_questions(), &view(Perspective::QuestionsToChunks), &settings);
    assert_eq!(points.len(), 3);

    let empty = points
        .iter()
        .find(|point| point.entity.id() == "q-2")
        .expect("zero-chunk question is kept");
    let minimum = settings.sizes.medium.min;
    assert_eq!(empty.size, 0.0);
    assert_eq!(empty.radius, minimum);
    assert_eq!(empty.band, QualityBand::Poor);
    assert_eq!(empty.color_value, 0.0);

    let best = points
        .iter()
        .find(|point| point.entity.id() == "q-1")
        .expect("q-1 point");
    assert_eq!(best.band, QualityBand::Good);
    assert_eq!(best.size, 1.0);
    assert!((best.color_value - 8.5).abs() < 1e-4);
}

#[test]
fn large_catalog_clusters_orphans() {
    let settings = LayoutSettings::default();
    let points = build_points(&large_catalog(), &view(Perspective::ChunksToQuestions), &settings);

    let real = points
        .iter()
        .filter(|point| matches!(&point.entity, Entity::Chunk(chunk) if !chunk.is_orphan))
        .count();
    let clusters = points
        .iter()
        .filter_map(|point| match &point.entity {
            Entity::UnassociatedCluster(cluster) => Some(cluster),
            _ => None,
        })
        .collect::<Vec<_>>();

    assert_eq!(real, 10);
    assert!(!clusters.is_empty() && clusters.len() <= 8);
    assert_eq!(clusters.iter().map(|cluster| cluster.members.len()).sum::<usize>(), 90);
    assert!(points.iter().all(|point| !matches!(&point.entity, Entity::Chunk(chunk) if chunk.is_orphan)));
    assert!(clusters.iter().all(|cluster| cluster.members.iter().all(|id| {
        let index = id.trim_start_matches("c-").parse::<usize>().unwrap_or(0);
        index >= 10
    })));
    assert_eq!(points.len(), 10 + clusters.len());
    assert!(
        points
            .iter()
            .filter(|point| point.entity.is_orphan())
            .all(|point| point.band == QualityBand::Unretrieved)
    );
}

#[test]
fn filters_hide_orphan_clusters() {
    let settings = LayoutSettings::default();
    let config = ViewConfig {
        perspective: Perspective::ChunksToQuestions,
        quality_filter: QualityFilter::Good,
        ..ViewConfig::default()
    };
    let points = build_points(&large_catalog(), &config, &settings);
    assert!(!points.is_empty());
    assert!(points.iter().all(|point| point.band == QualityBand::Good));
}

#[test]
fn question_entities_match_distinct_ids() {
    let mut snapshot = large_catalog();
    snapshot.questions.push(snapshot.questions[3].clone());
    snapshot.questions.push(QuestionResult::default());

    let distinct = snapshot
        .questions
        .iter()
        .map(|question| {
            if question.id.trim().is_empty() {
                "unknown".to_owned()
            } else {
                question.id.clone()
            }
        })
        .collect::<HashSet<_>>();
    assert_eq!(aggregate(&snapshot, Perspective::QuestionsToChunks).len(), distinct.len());
}

#[test]
fn unretrieved_catalog_chunks_are_orphans() {
    let entities = aggregate(&large_catalog(), Perspective::ChunksToQuestions);
    assert_eq!(entities.len(), 100);

    for entity in entities {
        let chunk = match entity {
            Entity::Chunk(chunk) => chunk,
            other => panic!("unexpected entity {other:?}"),
        };
        let index = chunk.id.trim_start_matches("c-").parse::<usize>().expect("numeric id");
        assert_eq!(chunk.is_orphan, index >= 10, "{}", chunk.id);
        if chunk.is_orphan {
            assert_eq!(chunk.retrieval_frequency, 0);
        }
    }
}

#[test]
fn pipeline_is_deterministic() {
    let settings = LayoutSettings::default();
    for perspective in Perspective::ALL {
        let first = build_points(&large_catalog(), &view(perspective), &settings);
        let second = build_points(&large_catalog(), &view(perspective), &settings);
        let bits = |points: &[Point]| {
            points
                .iter()
                .map(|point| (point.key(), point.x.to_bits(), point.y.to_bits()))
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(first.as_slice()), bits(second.as_slice()), "{perspective:?}");
    }
}

#[test]
fn every_point_stays_in_the_unit_square() {
    let settings = LayoutSettings::default();
    for snapshot in [three_questions(), large_catalog()] {
        for perspective in Perspective::ALL {
            for point in build_points(&snapshot, &view(perspective), &settings) {
                assert!((0.0..=100.0).contains(&point.x), "{perspective:?} {}", point.key());
                assert!((0.0..=100.0).contains(&point.y), "{perspective:?} {}", point.key());
            }
        }
    }
}

#[test]
fn settled_layouts_keep_their_separation() {
    let settings = LayoutSettings::default();
    for perspective in [
        Perspective::QuestionsToChunks,
        Perspective::ChunksToQuestions,
        Perspective::ChunksToRoles,
    ] {
        let mut points = build_points(&large_catalog(), &view(perspective), &settings);
        let outcome = resolve_collisions(&mut points, &settings.collision);
        if !outcome.converged {
            continue;
        }

        for (index, a) in points.iter().enumerate() {
            for b in &points[index + 1..] {
                let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                let required = settings.collision.min_separation(a.radius, b.radius);
                assert!(
                    distance >= required - 0.25,
                    "{perspective:?}: {} and {} overlap",
                    a.key(),
                    b.key()
                );
            }
        }
    }
}

#[test]
fn owner_glyphs_keep_double_radius_gaps() {
    let settings = LayoutSettings::default();
    for count in [12, 30] {
        let snapshot = many_documents(count);
        for (perspective, expected) in [
            (Perspective::DocumentsToChunks, count),
            (Perspective::RolesToChunks, count.min(12)),
        ] {
            let points = build_points(&snapshot, &view(perspective), &settings);
            let owners = points
                .iter()
                .filter(|point| point.parent.is_none())
                .collect::<Vec<_>>();
            assert_eq!(owners.len(), expected, "{perspective:?} with {count} documents");

            for (index, a) in owners.iter().enumerate() {
                for b in &owners[index + 1..] {
                    let distance = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                    let required = settings.collision.min_separation(a.radius, b.radius);
                    assert!(required >= (a.radius + b.radius) * 2.0);
                    assert!(
                        distance >= required - 0.25,
                        "{perspective:?} with {count} documents: {} and {} are {distance} apart, need {required}",
                        a.key(),
                        b.key()
                    );
                }
            }
        }
    }
}

#[test]
fn owner_perspectives_nest_children() {
    let settings = LayoutSettings::default();
    let points = build_points(&large_catalog(), &view(Perspective::DocumentsToChunks), &settings);

    let owners = points
        .iter()
        .filter(|point| matches!(point.entity, Entity::Document(_)))
        .count();
    assert_eq!(owners, 5);
    for point in &points {
        if let Some(parent) = point.parent {
            assert!(matches!(points[parent].entity, Entity::Document(_)));
            assert!(matches!(point.entity, Entity::OwnerChunk(_)));
        }
    }

    let roles = build_points(&large_catalog(), &view(Perspective::RolesToChunks), &settings);
    let role_ids = roles
        .iter()
        .filter_map(|point| match &point.entity {
            Entity::Role(owner) if !owner.is_unassociated => Some(owner.id.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(role_ids, ["nurse", "admin"]);
}

#[test]
fn empty_snapshot_renders_nothing() {
    let settings = LayoutSettings::default();
    let canvas = Canvas::new(800.0, 600.0, settings.canvas_margin);
    for perspective in Perspective::ALL {
        assert!(render_points(&Snapshot::default(), &view(perspective), &settings, canvas).is_empty());
    }
}

#[test]
fn projected_points_respect_canvas_margins() {
    let settings = LayoutSettings::default();
    let canvas = Canvas::new(640.0, 480.0, 20.0);
    let points = render_points(&large_catalog(), &view(Perspective::RolesToChunks), &settings, canvas);

    assert!(!points.is_empty());
    for point in &points {
        assert!((20.0..=620.0).contains(&point.screen.x));
        assert!((20.0..=460.0).contains(&point.screen.y));
    }
}

#[test]
fn export_json_carries_entity_details() {
    let settings = LayoutSettings::default();
    let points = build_points(&three_questions(), &view(Perspective::ChunksToQuestions), &settings);
    let json = serde_json::to_value(&points).expect("points serialize");

    let first = &json[0];
    assert_eq!(first["entity"]["type"], "chunk");
    assert!(first["entity"]["best_question"]["text"].is_string());
    assert!(first["tooltip"].is_string());
}

#[test]
fn snapshot_files_load_and_fail_cleanly() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(THREE_QUESTIONS.as_bytes()).expect("write snapshot");
    let snapshot = Snapshot::load(file.path()).expect("load snapshot");
    assert_eq!(snapshot.record_count(), 3);

    let missing = Snapshot::load(std::path::Path::new("/definitely/not/here.json"));
    assert!(matches!(missing, Err(Error::ReadSnapshot { .. })));

    assert!(matches!(Snapshot::from_json_str("{ nope"), Err(Error::ParseSnapshot(_))));
}
