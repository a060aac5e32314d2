use review_insight::graph::builder::{build_graph_parallel, GraphBuilder};
use review_insight::graph::csr::CsrGraph;
use review_insight::graph::similarity::SimilarityMeasure;
use review_insight::nlp::tokenizer::Tokenizer;
use review_insight::pipeline::observer::PipelineObserver;
use review_insight::{
    EmbeddingError, EmbeddingVector, HashingEmbedder, InsightError, Review, ReviewPipeline,
    NOISE_LABEL,
};

fn topic_embedding(texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
    Ok(texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let jitter = i as f32 * 0.001;
            if text.to_lowercase().contains("battery") {
                vec![1.0 + jitter, 0.0, jitter]
            } else {
                vec![0.0, 1.0 + jitter, jitter]
            }
        })
        .collect())
}

fn short_embedding(texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
    Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
}

fn unreachable_embedding(_texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
    panic!("adapter must not be called")
}

fn failing_embedding(_texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
    Err(EmbeddingError::backend("service returned 503"))
}

/// 50-dim vectors keyed by the review id prefix ("r6: ..."); r6 sits far away
fn keyed_embedding(texts: &[&str]) -> Result<Vec<EmbeddingVector>, EmbeddingError> {
    texts
        .iter()
        .map(|text| {
            let id = text.split(':').next().unwrap_or_default();
            let n: usize = id
                .trim_start_matches('r')
                .parse()
                .map_err(|_| EmbeddingError::backend(format!("no id in {text:?}")))?;
            Ok((0..50)
                .map(|j| {
                    if id == "r6" {
                        10.0
                    } else {
                        ((n * 7 + j * 3) % 11) as f32 * 0.01
                    }
                })
                .collect())
        })
        .collect()
}

#[derive(Default)]
struct ReducedCapture {
    embeddings: Vec<EmbeddingVector>,
    reduced: Vec<EmbeddingVector>,
}

impl PipelineObserver for ReducedCapture {
    fn on_embeddings(&mut self, embeddings: &[EmbeddingVector]) {
        self.embeddings = embeddings.to_vec();
    }

    fn on_reduced(&mut self, vectors: &[EmbeddingVector]) {
        self.reduced = vectors.to_vec();
    }
}

fn phone_reviews() -> Vec<Review> {
    vec![
        Review::new("r1", "Battery drain is brutal. Battery dies fast.").with_sentiment("negative"),
        Review::new("r2", "Screen looks sharp. Camera is sharp.").with_sentiment("positive"),
        Review::new("r3", "Battery drain after the update.").with_sentiment("negative"),
        Review::new("r4", "Sharp screen and sharp camera.").with_sentiment("positive"),
        Review::new("r5", "The battery drain ruins it.").with_rating(2),
        Review::new("r6", "Love the sharp camera.").with_rating(5),
    ]
}

#[test]
fn kmeans_groups_reviews_by_topic() {
    let pipeline = ReviewPipeline::from_json(
        r#"{ "clustering": { "method": "kmeans", "cluster_count": 2 },
             "reduction": { "target_dimensions": 2 } }"#,
    )
    .unwrap();
    let report = pipeline.run(&phone_reviews(), &topic_embedding).unwrap();
    let clusters = &report.clusters;

    assert_eq!(clusters.clusters.len(), 2);
    assert_eq!(clusters.total_members(), 6);

    let battery = clusters.label_of("r1").unwrap();
    assert_eq!(clusters.label_of("r3"), Some(battery));
    assert_eq!(clusters.label_of("r5"), Some(battery));
    let screen = clusters.label_of("r2").unwrap();
    assert_ne!(battery, screen);
    assert_eq!(clusters.label_of("r4"), Some(screen));

    let battery_summary = clusters.cluster(battery).unwrap();
    assert_eq!(battery_summary.keywords[0].term, "battery");
    assert_eq!(battery_summary.sentiment.as_ref().unwrap()["negative"], 2);
    assert_eq!(battery_summary.mean_rating, Some(2.0));
}

#[test]
fn member_counts_sum_to_batch_size() {
    let reviews = phone_reviews();
    for method in ["kmeans", "density"] {
        let json = format!(
            r#"{{ "clustering": {{ "method": "{method}", "cluster_count": 3, "min_cluster_size": 2 }} }}"#
        );
        let report = ReviewPipeline::from_json(&json)
            .unwrap()
            .cluster(&reviews, &HashingEmbedder::new(32))
            .unwrap();

        let total: usize = report.clusters.iter().map(|c| c.member_count).sum();
        assert_eq!(total, reviews.len(), "method {method}");
        assert_eq!(report.assignments.len(), reviews.len());
    }
}

#[test]
fn min_cluster_size_above_batch_gives_single_cluster() {
    let pipeline = ReviewPipeline::from_json(
        r#"{ "clustering": { "method": "density", "min_cluster_size": 20 } }"#,
    )
    .unwrap();
    let report = pipeline.cluster(&phone_reviews(), &topic_embedding).unwrap();

    assert_eq!(report.clusters.len(), 1);
    assert_eq!(report.clusters[0].label, 0);
    assert_eq!(report.clusters[0].member_count, 6);
    assert!(report.assignments.iter().all(|a| a.label != NOISE_LABEL));
}

#[test]
fn reduced_rows_stay_aligned_with_review_ids() {
    let reviews: Vec<Review> = (0..10)
        .map(|i| Review::new(format!("r{i}"), format!("r{i}: screen works fine")))
        .collect();
    let pipeline = ReviewPipeline::from_json(
        r#"{ "clustering": { "cluster_count": 2 }, "reduction": { "target_dimensions": 3 } }"#,
    )
    .unwrap();

    let mut capture = ReducedCapture::default();
    let report = pipeline
        .run_with_observer(&reviews, &keyed_embedding, &mut capture)
        .unwrap();

    assert_eq!(capture.embeddings.len(), 10);
    assert!(capture.embeddings.iter().all(|v| v.len() == 50));
    assert_eq!(capture.reduced.len(), 10);
    assert!(capture.reduced.iter().all(|v| v.len() == 3));

    // The far-away review is the outlier of the reduced rows, at its own index
    let norms: Vec<f32> = capture
        .reduced
        .iter()
        .map(|v| v.iter().map(|x| x * x).sum::<f32>().sqrt())
        .collect();
    let outlier = (0..norms.len())
        .max_by(|&a, &b| norms[a].total_cmp(&norms[b]))
        .unwrap();
    assert_eq!(outlier, 6);
    assert!(norms.iter().enumerate().all(|(i, &n)| i == 6 || n * 5.0 < norms[6]));

    let clusters = &report.clusters;
    let ids: Vec<&str> = clusters.assignments.iter().map(|a| a.review_id.as_str()).collect();
    assert_eq!(ids, reviews.iter().map(|r| r.id.as_str()).collect::<Vec<_>>());
    let lone = clusters.label_of("r6").unwrap();
    assert!(clusters
        .assignments
        .iter()
        .all(|a| (a.review_id == "r6") == (a.label == lone)));
}

#[test]
fn empty_batch_returns_empty_outputs_without_embedding() {
    let pipeline = ReviewPipeline::new(Default::default()).unwrap();
    let report = pipeline.run(&[], &unreachable_embedding).unwrap();

    assert!(report.summary.is_empty());
    assert!(report.clusters.is_empty());
    assert_eq!(report.clusters.dimensions, 0);
}

#[test]
fn single_sentence_batch() {
    let reviews = vec![Review::new("only", "Honestly the best purchase I made this year!")];
    let pipeline = ReviewPipeline::from_json(r#"{ "summary": { "top_k_sentences": 5 } }"#).unwrap();
    let report = pipeline.run(&reviews, &HashingEmbedder::new(16)).unwrap();

    assert_eq!(report.summary.sentences.len(), 1);
    assert_eq!(
        report.summary.sentences[0].text,
        "Honestly the best purchase I made this year!"
    );
    assert_eq!(report.clusters.clusters.len(), 1);
    assert_eq!(report.clusters.clusters[0].review_ids, vec!["only"]);
}

#[test]
fn two_topic_summary_picks_one_sentence_per_topic() {
    let reviews: Vec<Review> = [
        "Battery drain all day.",
        "The battery drain is brutal.",
        "Interface is confusing.",
        "Battery drain ruins it.",
        "The interface feels confusing.",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| Review::new(format!("r{i}"), *text))
    .collect();

    let pipeline = ReviewPipeline::from_json(r#"{ "summary": { "top_k_sentences": 2 } }"#).unwrap();
    let summary = pipeline.summarize(&reviews);

    assert_eq!(summary.sentences.len(), 2);
    let battery = summary
        .sentences
        .iter()
        .filter(|s| s.text.to_lowercase().contains("battery"))
        .count();
    let interface = summary
        .sentences
        .iter()
        .filter(|s| s.text.contains("nterface"))
        .count();
    assert_eq!((battery, interface), (1, 1));
    // Corpus order
    assert!(summary.sentences[0].index < summary.sentences[1].index);
}

#[test]
fn two_topic_summary_holds_for_long_sentences() {
    let reviews: Vec<Review> = [
        "Battery drain ruined weekend camping trip photos videos maps.",
        "Battery drain overnight kills alarms reminders podcasts downloads syncing.",
        "Interface confusing menus hidden toggles buried settings icons cryptic.",
        "Battery drain spikes navigation streaming gaming hotspot tethering flashlight.",
        "Interface confusing gestures conflict swipe shortcuts labels tiny fonts.",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| Review::new(format!("r{i}"), *text))
    .collect();

    let pipeline = ReviewPipeline::from_json(r#"{ "summary": { "top_k_sentences": 2 } }"#).unwrap();
    let summary = pipeline.summarize(&reviews);

    let battery = summary
        .sentences
        .iter()
        .filter(|s| s.text.starts_with("Battery"))
        .count();
    let interface = summary
        .sentences
        .iter()
        .filter(|s| s.text.starts_with("Interface"))
        .count();
    assert_eq!((battery, interface), (1, 1));
}

#[test]
fn stopwords_never_become_keywords() {
    let pipeline = ReviewPipeline::from_json(
        r#"{ "clustering": { "cluster_count": 2 },
             "stopwords": { "extra": ["sharp"] } }"#,
    )
    .unwrap();
    let report = pipeline.cluster(&phone_reviews(), &topic_embedding).unwrap();

    for cluster in &report.clusters {
        for keyword in &cluster.keywords {
            assert_ne!(keyword.term, "the");
            assert_ne!(keyword.term, "is");
            assert_ne!(keyword.term, "sharp");
        }
    }
}

#[test]
fn invalid_configuration_fails_fast() {
    for json in [
        r#"{ "summary": { "damping": 0.0 } }"#,
        r#"{ "summary": { "top_k_sentences": 0 } }"#,
        r#"{ "clustering": { "cluster_count": 0 } }"#,
        r#"{ "embedding_batch_size": 0 }"#,
        r#"{ "report": { "samples_per_cluster": 0 } }"#,
        r#"{ "report": { "keywords_per_cluster": 0 } }"#,
        r#"{ "strict": true, "unknown": 1 }"#,
    ] {
        match ReviewPipeline::from_json(json) {
            Err(InsightError::Configuration(report)) => assert!(report.has_errors(), "{json}"),
            Err(other) => panic!("{json}: unexpected error {other}"),
            Ok(_) => panic!("{json}: accepted"),
        }
    }
}

#[test]
fn malformed_configuration_is_a_configuration_error() {
    let err = ReviewPipeline::from_json("{ not json").err().unwrap();
    assert!(err.is_configuration());
}

#[test]
fn adapter_count_mismatch_is_embedding_unavailable() {
    let pipeline = ReviewPipeline::new(Default::default()).unwrap();
    let err = pipeline.run(&phone_reviews(), &short_embedding).unwrap_err();
    assert!(matches!(err, InsightError::EmbeddingUnavailable { .. }));
}

#[test]
fn adapter_failure_is_embedding_unavailable() {
    let pipeline = ReviewPipeline::new(Default::default()).unwrap();
    let err = pipeline.cluster(&phone_reviews(), &failing_embedding).unwrap_err();
    match err {
        InsightError::EmbeddingUnavailable { reason } => assert!(reason.contains("503")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parallel_graph_matches_sequential() {
    let tokenizer = Tokenizer::default();
    let reviews: Vec<Review> = (0..150)
        .map(|i| {
            Review::new(
                format!("r{i}"),
                format!(
                    "Battery number {} drains overnight. Screen {} glare outdoors.",
                    i % 7,
                    i % 5
                ),
            )
        })
        .collect();
    let sentences: Vec<_> = tokenizer.split_corpus(&reviews).into_iter().flatten().collect();
    assert!(sentences.len() >= 300);

    let sequential =
        CsrGraph::from_builder(&GraphBuilder::from_sentences(&sentences, SimilarityMeasure::default()));
    let parallel =
        CsrGraph::from_builder(&build_graph_parallel(&sentences, SimilarityMeasure::default()));

    assert_eq!(sequential.num_nodes, parallel.num_nodes);
    assert_eq!(sequential.num_edges(), parallel.num_edges());
    for a in 0..sentences.len() as u32 {
        for b in 0..sentences.len() as u32 {
            assert_eq!(sequential.weight(a, b), parallel.weight(a, b));
        }
    }
}

#[test]
fn report_serializes_to_json() {
    let pipeline = ReviewPipeline::from_json(r#"{ "clustering": { "cluster_count": 2 } }"#).unwrap();
    let report = pipeline.run(&phone_reviews(), &topic_embedding).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["clusters"]["method"], "kmeans");
    assert_eq!(json["clusters"]["assignments"].as_array().unwrap().len(), 6);
    assert!(json["summary"]["sentences"].as_array().unwrap().len() <= 3);
}
