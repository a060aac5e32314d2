use proptest::prelude::*;

use review_insight::reduce::Pca;
use review_insight::{HashingEmbedder, Review, ReviewPipeline};

const WORDS: &[&str] = &[
    "battery", "drain", "screen", "sharp", "camera", "shipping", "late", "refund", "support",
    "slow", "the", "is", "very", "price", "fair", "login", "fails",
];

fn review_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::collection::vec(prop::sample::select(WORDS), 1..8).prop_map(|w| w.join(" ")),
        1..4,
    )
    .prop_map(|sentences| sentences.join(". ") + ".")
}

fn reviews() -> impl Strategy<Value = Vec<Review>> {
    prop::collection::vec(review_text(), 0..12).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Review::new(format!("r{i}"), text))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_identical_runs_give_identical_reports(batch in reviews(), density in any::<bool>()) {
        let method = if density { "density" } else { "kmeans" };
        let json = format!(
            r#"{{ "clustering": {{ "method": "{method}", "cluster_count": 3, "min_cluster_size": 2 }} }}"#
        );
        let pipeline = ReviewPipeline::from_json(&json).unwrap();
        let embedder = HashingEmbedder::new(24);

        let first = pipeline.run(&batch, &embedder).unwrap();
        let second = pipeline.run(&batch, &embedder).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_every_review_assigned_once(batch in reviews(), k in 1usize..6) {
        let json = format!(r#"{{ "clustering": {{ "cluster_count": {k} }} }}"#);
        let report = ReviewPipeline::from_json(&json)
            .unwrap()
            .cluster(&batch, &HashingEmbedder::new(24))
            .unwrap();

        let total: usize = report.clusters.iter().map(|c| c.member_count).sum();
        prop_assert_eq!(total, batch.len());
        prop_assert_eq!(report.assignments.len(), batch.len());
        prop_assert!(report.clusters.len() <= k);
    }

    #[test]
    fn prop_summary_bounded_by_top_k(batch in reviews(), top_k in 1usize..6) {
        let json = format!(r#"{{ "summary": {{ "top_k_sentences": {top_k} }} }}"#);
        let summary = ReviewPipeline::from_json(&json).unwrap().summarize(&batch);

        prop_assert!(summary.sentences.len() <= top_k);
        prop_assert!(summary.sentences.windows(2).all(|w| w[0].index < w[1].index));
    }

    #[test]
    fn prop_reducer_preserves_count_and_order(n in 1usize..20, d in 1usize..40, target in 1usize..8) {
        let vectors: Vec<Vec<f32>> = (0..n)
            .map(|i| (0..d).map(|j| ((i * 31 + j * 17) % 13) as f32 - 6.0).collect())
            .collect();
        let reduced = Pca::new(target).fit_transform(&vectors);

        prop_assert_eq!(reduced.len(), n);
        let expected = target.min(n).min(d);
        prop_assert!(reduced.iter().all(|v| v.len() == expected));
    }
}
