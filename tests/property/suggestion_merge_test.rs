//! Property-based tests for merging metadata and legacy history candidates.

use std::collections::HashSet;

use awesomebar::services::suggestion_provider::merge_suggestions;
use awesomebar::types::history::SearchResult;
use awesomebar::types::metadata::{DocumentType, HistoryMetadata, HistoryMetadataKey};
use proptest::prelude::*;

/// URLs drawn from a small pool so both sources overlap often.
fn arb_url() -> impl Strategy<Value = String> {
    (0u8..8).prop_map(|n| format!("https://site{}.example.com/", n))
}

fn arb_metadata() -> impl Strategy<Value = HistoryMetadata> {
    (arb_url(), proptest::option::of("[a-z]{1,8}"), 0i32..100_000).prop_map(
        |(url, title, view_time)| HistoryMetadata {
            key: HistoryMetadataKey::for_url(&url),
            title,
            created_at: 0,
            updated_at: 0,
            total_view_time: view_time,
            document_type: DocumentType::Regular,
            preview_image_url: None,
        },
    )
}

fn arb_legacy() -> impl Strategy<Value = SearchResult> {
    (arb_url(), "[a-z]{0,8}", 0i32..10_000).prop_map(|(url, title, score)| SearchResult {
        id: url.clone(),
        url,
        title,
        score,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merged_urls_are_unique(
        metadata in proptest::collection::vec(arb_metadata(), 0..10),
        history in proptest::collection::vec(arb_legacy(), 0..10),
        max in 1usize..=100,
    ) {
        let merged = merge_suggestions("provider", metadata, history, max);
        let unique: HashSet<&str> = merged.iter().map(|s| s.url.as_str()).collect();
        prop_assert_eq!(unique.len(), merged.len());
    }

    #[test]
    fn merged_length_is_bounded_and_scores_descend(
        metadata in proptest::collection::vec(arb_metadata(), 0..10),
        history in proptest::collection::vec(arb_legacy(), 0..10),
        max in 1usize..=100,
    ) {
        let distinct: HashSet<String> = metadata
            .iter()
            .map(|m| m.key.url.clone())
            .chain(history.iter().map(|h| h.url.clone()))
            .collect();

        let merged = merge_suggestions("provider", metadata, history, max);

        prop_assert_eq!(merged.len(), distinct.len().min(max));
        prop_assert!(merged.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn every_suggestion_has_a_title_and_provider(
        metadata in proptest::collection::vec(arb_metadata(), 0..10),
        history in proptest::collection::vec(arb_legacy(), 0..10),
    ) {
        let merged = merge_suggestions("provider-42", metadata, history, 100);
        for s in &merged {
            prop_assert!(!s.title.is_empty());
            prop_assert_eq!(s.provider_id.as_str(), "provider-42");
            prop_assert_eq!(&s.id, &s.url);
        }
    }

    #[test]
    fn legacy_only_candidates_keep_their_score(
        history in proptest::collection::vec(arb_legacy(), 1..10),
    ) {
        let merged = merge_suggestions("provider", Vec::new(), history.clone(), 100);
        for s in &merged {
            let best = history
                .iter()
                .filter(|h| h.url == s.url)
                .map(|h| h.score)
                .max()
                .unwrap();
            prop_assert_eq!(s.score, best);
        }
    }
}
