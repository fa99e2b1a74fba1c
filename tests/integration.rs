//! Integration tests for multisrc
//!
//! Registry-wide search over in-memory sources, including failing ones.

use multisrc::Error;
use multisrc::prelude::*;

mod common;
use common::{MockSource, setup_test_dir};

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn registry() -> Sources {
        let mut sources = Sources::new();
        sources
            .add(MockSource::new("alpha", &["Hana no Kage", "Cinzas", "Hana"]))
            .add(MockSource::new("beta", &["Kuroi Hana", "Ashita"]));
        sources
    }

    #[tokio::test]
    async fn test_flatten_merges_all_sources() {
        let sources = registry();
        let results = sources.search("hana").flatten().await.unwrap();

        assert_eq!(results.len(), 3);
        assert!(results.iter().any(|m| m.source_id == "alpha"));
        assert!(results.iter().any(|m| m.source_id == "beta"));
    }

    #[tokio::test]
    async fn test_flatten_sorts_and_limits() {
        let sources = registry();
        let results = sources
            .search("hana")
            .sort_by(SortOrder::Relevance)
            .limit(2)
            .flatten()
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Hana");
    }

    #[tokio::test]
    async fn test_flatten_tolerates_a_failing_source() {
        let mut sources = registry();
        sources.add(MockSource::failing("broken"));

        let results = sources.search("hana").flatten().await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_flatten_fails_when_every_source_fails() {
        let mut sources = Sources::new();
        sources
            .add(MockSource::failing("broken"))
            .add(MockSource::failing("down"));

        let result = sources.search("hana").flatten().await;
        match result {
            Err(Error::Other(msg)) => {
                assert!(msg.contains("broken"));
                assert!(msg.contains("down"));
            }
            other => panic!("expected an aggregated error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_group_keeps_each_outcome() {
        let mut sources = registry();
        sources.add(MockSource::failing("broken"));

        let grouped = sources.search("hana").group().await;
        assert_eq!(grouped.len(), 3);

        let (id, result) = &grouped[0];
        assert_eq!(id, "alpha");
        assert_eq!(result.as_ref().map(Vec::len).ok(), Some(2));

        let (id, result) = &grouped[2];
        assert_eq!(id, "broken");
        assert!(matches!(result, Err(Error::Source { .. })));
    }

    #[tokio::test]
    async fn test_from_source() {
        let sources = registry();

        let results = sources.search("hana").from_source("beta").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Kuroi Hana");
        assert_eq!(results[0].source_id, "beta");

        let missing = sources.search("hana").from_source("gamma").await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_tag_filters_apply_after_search() {
        let sources = registry();

        let kept = sources
            .search("hana")
            .include_tags(vec!["drama".to_string()])
            .flatten()
            .await
            .unwrap();
        assert_eq!(kept.len(), 3);

        let dropped = sources
            .search("hana")
            .exclude_tags(vec!["Drama".to_string()])
            .flatten()
            .await
            .unwrap();
        assert!(dropped.is_empty());
    }

    #[tokio::test]
    async fn test_browse_through_trait_objects() {
        let sources = registry();
        let source = sources.get("alpha").unwrap();

        let popular = source.popular(1).await.unwrap();
        assert_eq!(popular.mangas.len(), 3);
        assert!(!popular.has_next_page);

        let details = source.get_details(&popular.mangas[0].id).await.unwrap();
        assert_eq!(details.title, "Hana no Kage");

        let chapters = source.get_chapters(&details.id).await.unwrap();
        assert_eq!(chapters[0].manga_id, details.id);
        assert_eq!(chapters[0].number, 1.0);
    }

    #[tokio::test]
    async fn test_download_chapter_without_pages_fails_cleanly() {
        let dir = setup_test_dir();
        let sources = registry();
        let source = sources.get("alpha").unwrap();

        let result = source.download_chapter("/manga/hana/capitulo-1/", dir.path()).await;
        assert!(matches!(result, Err(Error::Source { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
